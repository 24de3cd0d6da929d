//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use nalgebra::Vector3;
use nightsky::api::{OrbitalElements, StarRenderRow};
use nightsky::db::LocalRepository;
use nightsky::services::{
    EvictionPolicy, NightSkyCache, NightSkyService, TimeContext, TimeScales,
};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores the variables on unwind and serializes access to the process
/// environment across parallel tests.
///
/// `Some(v)` sets a variable, `None` removes it.
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

pub const HOST_STAR: &str = "sol";
pub const PLANET: &str = "terra";

pub fn instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2032, 3, 20, 23, 45, 12).unwrap()
}

pub fn star(id: &str, x: f64, y: f64, z: f64, magnitude: f64) -> StarRenderRow {
    StarRenderRow::new(id, Vector3::new(x, y, z), magnitude, 6000.0, Some("F8V"), id)
}

/// A host star at the world origin with a circular, uninclined planet.
pub fn solar_system() -> LocalRepository {
    let repo = LocalRepository::new();
    repo.insert_star("default", star(HOST_STAR, 0.0, 0.0, 0.0, 4.83));
    repo.insert_orbital_elements(PLANET, OrbitalElements::default());
    repo
}

pub fn time_context() -> Arc<TimeContext> {
    Arc::new(TimeContext::initialized(TimeScales::default()))
}

pub fn service(repo: &LocalRepository) -> NightSkyService {
    service_with_cache(repo, Arc::new(NightSkyCache::new(EvictionPolicy::default())))
}

pub fn service_with_cache(repo: &LocalRepository, cache: Arc<NightSkyCache>) -> NightSkyService {
    NightSkyService::new(Arc::new(repo.clone()), time_context(), cache)
}
