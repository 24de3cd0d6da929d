//! Time-bounded cache of computed skies.
//!
//! Requests are keyed by a quantized fingerprint so that nearby requests
//! (same planet, same UTC minute, observer within 0.01 rad, radius within
//! half a light year, same level of detail) share one entry. Entries expire
//! after a fixed TTL; when the cache is full, expired entries are purged
//! first and then the oldest-created entry is evicted.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::api::{LevelOfDetail, NightSkyRequest, NightSkyResult, PlanetId};

/// Default entry lifetime.
pub const DEFAULT_TTL_SECONDS: u64 = 300;
/// Default maximum number of resident entries.
pub const DEFAULT_CAPACITY: usize = 100;
/// Longest accepted TTL (ten years).
const MAX_TTL_SECONDS: u64 = 315_360_000;

/// Source of "now" for expiry decisions.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests and simulations.
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.write() += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.write() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read()
    }
}

/// Quantized request fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub planet_id: PlanetId,
    /// Whole minutes since the Unix epoch.
    pub minute_bucket: i64,
    /// Observer latitude in hundredths of a radian.
    pub lat_centirad: i64,
    /// Observer longitude in hundredths of a radian.
    pub lon_centirad: i64,
    pub radius_ly: i64,
    pub level_of_detail: LevelOfDetail,
}

impl CacheKey {
    pub fn from_request(request: &NightSkyRequest) -> Self {
        Self {
            planet_id: request.planet_id.clone(),
            minute_bucket: request.instant_utc.timestamp().div_euclid(60),
            lat_centirad: (request.observer_lat_rad * 100.0).round() as i64,
            lon_centirad: (request.observer_lon_rad * 100.0).round() as i64,
            radius_ly: request.radius_ly.round() as i64,
            level_of_detail: request.level_of_detail,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    result: NightSkyResult,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

/// TTL expiry plus FIFO-under-pressure eviction.
#[derive(Debug, Clone, Copy)]
pub struct EvictionPolicy {
    ttl: Duration,
    capacity: usize,
}

impl EvictionPolicy {
    /// A zero capacity is raised to one; the TTL is capped at ten years.
    pub fn new(ttl_seconds: u64, capacity: usize) -> Self {
        Self {
            ttl: Duration::seconds(ttl_seconds.min(MAX_TTL_SECONDS) as i64),
            capacity: capacity.max(1),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn expires_at(&self, created_at: DateTime<Utc>) -> DateTime<Utc> {
        created_at + self.ttl
    }

    fn is_expired(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now >= entry.expires_at
    }

    fn purge_expired(
        &self,
        entries: &mut HashMap<CacheKey, CacheEntry>,
        now: DateTime<Utc>,
    ) -> usize {
        let before = entries.len();
        entries.retain(|_, entry| !self.is_expired(entry, now));
        before - entries.len()
    }

    fn oldest(&self, entries: &HashMap<CacheKey, CacheEntry>) -> Option<CacheKey> {
        entries
            .iter()
            .min_by_key(|(_, entry)| entry.created_at)
            .map(|(key, _)| key.clone())
    }

    /// Free a slot for `incoming` if it is a new key and the map is full.
    fn make_room(
        &self,
        entries: &mut HashMap<CacheKey, CacheEntry>,
        incoming: &CacheKey,
        now: DateTime<Utc>,
    ) {
        if entries.contains_key(incoming) || entries.len() < self.capacity {
            return;
        }

        let purged = self.purge_expired(entries, now);
        if purged > 0 {
            log::debug!("Purged {} expired sky cache entries", purged);
        }

        while entries.len() >= self.capacity {
            let Some(victim) = self.oldest(entries) else {
                break;
            };
            entries.remove(&victim);
            log::debug!("Evicted oldest sky cache entry for planet {}", victim.planet_id);
        }
    }
}

impl Default for EvictionPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_TTL_SECONDS, DEFAULT_CAPACITY)
    }
}

/// Snapshot of cache occupancy and effectiveness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub entry_count: usize,
    pub valid_entry_count: usize,
    pub capacity: usize,
    pub ttl_seconds: i64,
    pub hits: u64,
    pub misses: u64,
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sky cache: {}/{} entries ({} valid), TTL {}s, {} hits, {} misses",
            self.entry_count,
            self.capacity,
            self.valid_entry_count,
            self.ttl_seconds,
            self.hits,
            self.misses
        )
    }
}

/// Concurrent cache of [`NightSkyResult`]s.
#[derive(Debug)]
pub struct NightSkyCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    policy: EvictionPolicy,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl NightSkyCache {
    pub fn new(policy: EvictionPolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    pub fn with_clock(policy: EvictionPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            policy,
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn policy(&self) -> &EvictionPolicy {
        &self.policy
    }

    /// Cached result for `request`, flagged `from_cache`.
    ///
    /// Expired entries count as misses and are removed.
    pub fn get(&self, request: &NightSkyRequest) -> Option<NightSkyResult> {
        let key = CacheKey::from_request(request);
        let now = self.clock.now();

        let expired = {
            let entries = self.entries.read();
            match entries.get(&key) {
                Some(entry) if !self.policy.is_expired(entry, now) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    let mut result = entry.result.clone();
                    result.from_cache = true;
                    return Some(result);
                }
                Some(_) => true,
                None => false,
            }
        };

        if expired {
            let mut entries = self.entries.write();
            // Another writer may have refreshed the entry in between.
            if entries
                .get(&key)
                .is_some_and(|entry| self.policy.is_expired(entry, now))
            {
                entries.remove(&key);
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store `result` under the fingerprint of `request`. Last write wins.
    pub fn put(&self, request: &NightSkyRequest, result: NightSkyResult) {
        let key = CacheKey::from_request(request);
        let now = self.clock.now();
        let entry = CacheEntry {
            result,
            created_at: now,
            expires_at: self.policy.expires_at(now),
        };

        let mut entries = self.entries.write();
        self.policy.make_room(&mut entries, &key, now);
        entries.insert(key, entry);
    }

    /// Drop every entry of `planet_id`, returning how many were removed.
    pub fn invalidate(&self, planet_id: &PlanetId) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|key, _| &key.planet_id != planet_id);
        let removed = before - entries.len();
        log::info!("Invalidated {} sky cache entries for planet {}", removed, planet_id);
        removed
    }

    pub fn clear(&self) {
        self.entries.write().clear();
        log::info!("Sky cache cleared");
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let entries = self.entries.read();
        CacheStats {
            entry_count: entries.len(),
            valid_entry_count: entries
                .values()
                .filter(|entry| !self.policy.is_expired(entry, now))
                .count(),
            capacity: self.policy.capacity(),
            ttl_seconds: self.policy.ttl().num_seconds(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for NightSkyCache {
    fn default() -> Self {
        Self::new(EvictionPolicy::default())
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod cache_tests;
