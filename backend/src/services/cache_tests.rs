use super::*;
use crate::api::{Rgb, SkyStarPoint, StarId};
use chrono::TimeZone;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 5, 17, 3, 0, 5).unwrap()
}

fn request(planet: &str, instant: DateTime<Utc>) -> NightSkyRequest {
    NightSkyRequest::builder(planet, "host", instant)
        .observer(0.5, 1.0)
        .build()
        .unwrap()
}

fn result_with(names: &[&str]) -> NightSkyResult {
    let stars: Vec<SkyStarPoint> = names
        .iter()
        .enumerate()
        .map(|(i, name)| SkyStarPoint {
            azimuth_rad: 0.1 * i as f64,
            altitude_rad: 0.5,
            apparent_magnitude: i as f64,
            color: Rgb::new(255, 255, 255),
            star_id: StarId::new(*name),
            name: name.to_string(),
            distance_ly: 10.0,
        })
        .collect();
    NightSkyResult {
        visible_count: stars.len(),
        total_stars_queried: stars.len(),
        stars,
        host_star: None,
        compute_time: std::time::Duration::from_millis(3),
        computed_at: t0(),
        from_cache: false,
    }
}

fn cache_with_clock(ttl_seconds: u64, capacity: usize) -> (NightSkyCache, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(t0()));
    let cache = NightSkyCache::with_clock(EvictionPolicy::new(ttl_seconds, capacity), clock.clone());
    (cache, clock)
}

#[test]
fn test_put_then_get_is_flagged_from_cache() {
    let (cache, _) = cache_with_clock(300, 10);
    let req = request("p1", t0());
    let result = result_with(&["vega", "deneb"]);

    cache.put(&req, result.clone());
    let cached = cache.get(&req).unwrap();

    assert!(cached.from_cache);
    assert_eq!(cached.stars, result.stars);
    assert_eq!(cached.visible_count, 2);
}

#[test]
fn test_expired_entry_is_a_miss_and_removed() {
    let (cache, clock) = cache_with_clock(300, 10);
    let req = request("p1", t0());
    cache.put(&req, result_with(&["vega"]));

    clock.advance(Duration::seconds(299));
    assert!(cache.get(&req).is_some());

    clock.advance(Duration::seconds(1));
    assert!(cache.get(&req).is_none());
    assert_eq!(cache.len(), 0);
}

#[test]
fn test_same_minute_bucket_shares_entry() {
    let (cache, _) = cache_with_clock(300, 10);
    cache.put(&request("p1", t0()), result_with(&["vega"]));

    // 10 s later, same UTC minute
    let near = request("p1", t0() + Duration::seconds(10));
    assert!(cache.get(&near).is_some());

    // 90 s later crosses into another minute
    let later = request("p1", t0() + Duration::seconds(90));
    assert!(cache.get(&later).is_none());
}

#[test]
fn test_key_quantization() {
    let base = request("p1", t0());
    let mut nudged = base.clone();
    nudged.observer_lat_rad += 0.001;
    nudged.radius_ly += 0.3;
    assert_eq!(CacheKey::from_request(&base), CacheKey::from_request(&nudged));

    let mut moved = base.clone();
    moved.observer_lon_rad += 0.02;
    assert_ne!(CacheKey::from_request(&base), CacheKey::from_request(&moved));

    let mut detailed = base.clone();
    detailed.level_of_detail = LevelOfDetail::Ultra;
    assert_ne!(CacheKey::from_request(&base), CacheKey::from_request(&detailed));
}

#[test]
fn test_minute_bucket_before_epoch_floors() {
    let instant = Utc.with_ymd_and_hms(1969, 12, 31, 23, 59, 30).unwrap();
    assert_eq!(CacheKey::from_request(&request("p", instant)).minute_bucket, -1);
}

#[test]
fn test_capacity_is_never_exceeded() {
    let (cache, clock) = cache_with_clock(300, 5);
    for i in 0..6 {
        cache.put(&request(&format!("p{}", i), t0()), result_with(&["s"]));
        clock.advance(Duration::seconds(1));
        assert!(cache.len() <= 5);
    }
    assert_eq!(cache.len(), 5);
}

#[test]
fn test_evicts_oldest_created_entry() {
    let (cache, clock) = cache_with_clock(300, 3);
    for planet in ["a", "b", "c"] {
        cache.put(&request(planet, t0()), result_with(&["s"]));
        clock.advance(Duration::seconds(10));
    }
    // Reading "a" does not protect it: eviction is by age, not use.
    assert!(cache.get(&request("a", t0())).is_some());

    cache.put(&request("d", t0()), result_with(&["s"]));
    assert!(cache.get(&request("a", t0())).is_none());
    for planet in ["b", "c", "d"] {
        assert!(cache.get(&request(planet, t0())).is_some(), "{} missing", planet);
    }
}

#[test]
fn test_expired_entries_are_purged_before_eviction() {
    let (cache, clock) = cache_with_clock(300, 3);
    cache.put(&request("a", t0()), result_with(&["s"]));
    clock.advance(Duration::seconds(200));
    cache.put(&request("b", t0()), result_with(&["s"]));
    cache.put(&request("c", t0()), result_with(&["s"]));
    clock.advance(Duration::seconds(110));

    cache.put(&request("d", t0()), result_with(&["s"]));
    assert_eq!(cache.len(), 3);
    for planet in ["b", "c", "d"] {
        assert!(cache.get(&request(planet, t0())).is_some());
    }
}

#[test]
fn test_overwrite_at_capacity_does_not_evict() {
    let (cache, _) = cache_with_clock(300, 2);
    cache.put(&request("a", t0()), result_with(&["one"]));
    cache.put(&request("b", t0()), result_with(&["s"]));
    cache.put(&request("a", t0()), result_with(&["two"]));

    assert_eq!(cache.len(), 2);
    let a = cache.get(&request("a", t0())).unwrap();
    assert_eq!(a.stars[0].name, "two");
    assert!(cache.get(&request("b", t0())).is_some());
}

#[test]
fn test_invalidate_only_touches_one_planet() {
    let (cache, _) = cache_with_clock(300, 10);
    cache.put(&request("p1", t0()), result_with(&["s"]));
    cache.put(&request("p1", t0() + Duration::minutes(2)), result_with(&["s"]));
    cache.put(&request("p2", t0()), result_with(&["s"]));

    assert_eq!(cache.invalidate(&PlanetId::new("p1")), 2);
    assert!(cache.get(&request("p1", t0())).is_none());
    assert!(cache.get(&request("p2", t0())).is_some());
    assert_eq!(cache.invalidate(&PlanetId::new("p9")), 0);
}

#[test]
fn test_clear_and_stats() {
    let (cache, clock) = cache_with_clock(60, 10);
    cache.put(&request("p1", t0()), result_with(&["s"]));
    clock.advance(Duration::seconds(30));
    cache.put(&request("p2", t0()), result_with(&["s"]));
    clock.advance(Duration::seconds(40));

    assert!(cache.get(&request("p2", t0())).is_some());
    assert!(cache.get(&request("p3", t0())).is_none());

    let stats = cache.stats();
    assert_eq!(stats.entry_count, 2);
    assert_eq!(stats.valid_entry_count, 1);
    assert_eq!(stats.capacity, 10);
    assert_eq!(stats.ttl_seconds, 60);
    assert_eq!((stats.hits, stats.misses), (1, 1));
    assert_eq!(
        stats.to_string(),
        "Sky cache: 2/10 entries (1 valid), TTL 60s, 1 hits, 1 misses"
    );

    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn test_zero_capacity_is_raised() {
    let policy = EvictionPolicy::new(10, 0);
    assert_eq!(policy.capacity(), 1);
}

#[test]
fn test_concurrent_access_respects_capacity() {
    let cache = Arc::new(NightSkyCache::new(EvictionPolicy::new(300, 16)));

    std::thread::scope(|scope| {
        for worker in 0..8 {
            let cache = Arc::clone(&cache);
            scope.spawn(move || {
                for i in 0..200 {
                    let req = request(&format!("p{}", (worker * 7 + i) % 40), t0());
                    if i % 3 == 0 {
                        cache.invalidate(&req.planet_id);
                    } else if cache.get(&req).is_none() {
                        cache.put(&req, result_with(&["s"]));
                    }
                    assert!(cache.len() <= 16);
                }
            });
        }
    });

    let stats = cache.stats();
    assert!(stats.entry_count <= 16);
    assert!(stats.hits + stats.misses > 0);
}
