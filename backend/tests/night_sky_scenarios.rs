mod support;

use std::f64::consts::FRAC_PI_2;
use std::io::Write;
use std::sync::Arc;

use chrono::Duration;
use nightsky::api::{AtmosphereModel, LevelOfDetail, NightSkyRequest, PlanetId};
use nightsky::db::LocalRepository;
use nightsky::services::{EvictionPolicy, ManualClock, NightSkyCache};
use support::{instant, service, service_with_cache, solar_system, star, HOST_STAR, PLANET};

fn polar_request() -> NightSkyRequest {
    NightSkyRequest::builder(PLANET, HOST_STAR, instant())
        .observer(FRAC_PI_2, 0.0)
        .max_magnitude(10.0)
        .atmosphere(AtmosphereModel::none())
        .build()
        .unwrap()
}

#[tokio::test]
async fn star_at_zenith_matches_distance_modulus() {
    let repo = solar_system();
    repo.insert_star("default", star("overhead", 0.0, 0.0, 10.0, 2.0));

    let result = service(&repo).compute_night_sky(&polar_request()).await.unwrap();

    assert_eq!(result.stars.len(), 1);
    let point = &result.stars[0];
    assert!((point.altitude_rad - FRAC_PI_2).abs() < 1e-5);
    assert!((point.distance_ly - 10.0).abs() < 1e-9);

    let parsecs = 10.0 / 3.26156;
    let expected = 2.0 + 5.0 * f64::log10(parsecs) - 5.0;
    assert!((point.apparent_magnitude - expected).abs() < 1e-9);
}

#[tokio::test]
async fn strict_limit_leaves_no_stars_but_counts_candidates() {
    let repo = solar_system();
    repo.insert_star("default", star("overhead", 0.0, 0.0, 10.0, 2.0));
    // Apparent magnitude of "near" is about -2.96, still fainter than -5.
    repo.insert_star("default", star("near", 1.0, 1.0, 3.0, 2.0));

    let mut request = polar_request();
    request.max_magnitude = -5.0;
    let result = service(&repo).compute_night_sky(&request).await.unwrap();

    assert!(result.stars.is_empty());
    assert_eq!(result.visible_count, 0);
    assert!(result.total_stars_queried > 0);
}

#[tokio::test]
async fn minute_bucket_decides_cache_hits() {
    let repo = solar_system();
    repo.insert_star("default", star("overhead", 0.0, 0.0, 10.0, 2.0));
    let svc = service(&repo);

    // instant() is at :12 s, so +10 s stays in the same minute.
    let first = svc.compute_night_sky(&polar_request()).await.unwrap();
    assert!(!first.from_cache);

    let mut same_minute = polar_request();
    same_minute.instant_utc = instant() + Duration::seconds(10);
    let second = svc.compute_night_sky(&same_minute).await.unwrap();
    assert!(second.from_cache);
    assert_eq!(second.stars, first.stars);

    let mut next_minute = polar_request();
    next_minute.instant_utc = instant() + Duration::seconds(90);
    assert!(!svc.compute_night_sky(&next_minute).await.unwrap().from_cache);
}

#[tokio::test]
async fn invalidation_is_scoped_to_one_planet() {
    let repo = solar_system();
    repo.insert_orbital_elements(
        "cinder",
        nightsky::api::OrbitalElements::new(0.4, 0.2, 7.0, 29.1, 48.3, 88.0),
    );
    let svc = service(&repo);

    let terra = polar_request();
    let mut cinder = polar_request();
    cinder.planet_id = PlanetId::new("cinder");

    svc.compute_night_sky(&terra).await.unwrap();
    svc.compute_night_sky(&cinder).await.unwrap();
    assert_eq!(svc.cache_stats().entry_count, 2);

    assert_eq!(svc.invalidate_planet(&PlanetId::new(PLANET)), 1);
    assert_eq!(svc.cache_stats().entry_count, 1);
    assert!(svc.compute_night_sky(&cinder).await.unwrap().from_cache);
}

#[tokio::test]
async fn cached_sky_expires_with_the_clock() {
    let repo = solar_system();
    let clock = Arc::new(ManualClock::new(chrono::Utc::now()));
    let cache = Arc::new(NightSkyCache::with_clock(
        EvictionPolicy::new(60, 10),
        clock.clone(),
    ));
    let svc = service_with_cache(&repo, cache);

    svc.compute_night_sky(&polar_request()).await.unwrap();
    assert!(svc.compute_night_sky(&polar_request()).await.unwrap().from_cache);

    clock.advance(Duration::seconds(61));
    assert!(!svc.compute_night_sky(&polar_request()).await.unwrap().from_cache);
}

#[tokio::test]
async fn level_of_detail_limits_candidates() {
    let repo = solar_system();
    repo.insert_stars(
        "default",
        (0..40).map(|i| star(&format!("faint-{}", i), 0.0, 0.1 * i as f64, 5.0, 9.0)),
    );

    let mut low = polar_request();
    low.level_of_detail = LevelOfDetail::Low;
    low.max_magnitude = 20.0;
    let coarse = service(&repo).compute_night_sky(&low).await.unwrap();
    assert_eq!(coarse.visible_count, 0);

    let mut high = low.clone();
    high.level_of_detail = LevelOfDetail::High;
    let fine = service(&repo).compute_night_sky(&high).await.unwrap();
    assert_eq!(fine.visible_count, 40);
}

#[tokio::test]
async fn seeded_catalog_drives_the_pipeline() {
    let mut seed = tempfile::NamedTempFile::new().unwrap();
    write!(
        seed,
        r#"{{
            "datasets": {{
                "default": [
                    {{"id": "sol", "common_name": "Sun", "x": 0, "y": 0, "z": 0, "absolute_magnitude": 4.83, "temperature": 5772}},
                    {{"id": "hip-91262", "display_name": "Vega", "x": 3.0, "y": -2.0, "z": 24.5, "magv": 0.58, "spectral_class": "A0V"}},
                    {{"id": "hip-0", "x": 1.0, "y": 1.0, "z": -20.0}}
                ]
            }},
            "planets": {{
                "terra": {{"semi_major_axis": 1.0, "orbital_period": 365.25}}
            }}
        }}"#
    )
    .unwrap();

    let repo = LocalRepository::new();
    assert_eq!(repo.load_seed_file(seed.path()).unwrap(), 3);

    let result = service(&repo).compute_night_sky(&polar_request()).await.unwrap();
    assert_eq!(result.visible_count, 1);
    assert_eq!(result.stars[0].name, "Vega");
    // A0 stars use the fixed blue-white spectral color.
    assert!(result.stars[0].color.b >= result.stars[0].color.r);
    assert_eq!(result.host_star.unwrap().name, "Sun");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_share_one_cache() {
    let repo = solar_system();
    repo.insert_stars(
        "default",
        (0..200).map(|i| star(&format!("s{}", i), (i % 7) as f64, (i % 11) as f64, 1.0 + i as f64 * 0.2, 1.0)),
    );
    let svc = service(&repo);

    let mut handles = Vec::new();
    for worker in 0..16 {
        let svc = svc.clone();
        handles.push(tokio::spawn(async move {
            let mut request = polar_request();
            request.instant_utc = instant() + Duration::minutes(worker % 4);
            svc.compute_night_sky(&request).await.unwrap()
        }));
    }

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap());
    }

    assert!(results.iter().all(|r| r.visible_count == results[0].visible_count));
    let stats = svc.cache_stats();
    assert_eq!(stats.entry_count, 4);
    assert_eq!(stats.hits + stats.misses, 16);
}
