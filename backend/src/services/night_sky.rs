//! Night-sky orchestrator.
//!
//! Composes time, ephemeris, star query, sky transform and photometry into a
//! single snapshot computation, fronted by the sky cache.

use nalgebra::Vector3;
use std::sync::Arc;
use std::time::Instant;

use crate::api::{
    AtmosphereModel, EnuFrame, NightSkyRequest, NightSkyResult, PlanetId, SkyStarPoint,
    StarRenderRow,
};
use crate::db::repository::FullRepository;
use crate::services::cache::{CacheStats, NightSkyCache};
use crate::services::ephemeris::EphemerisService;
use crate::services::error::NightSkyError;
use crate::services::photometry::{apparent_magnitude, apply_extinction, star_to_color};
use crate::services::sky_transform::{is_above_horizon, world_to_horizontal, HorizontalCoord};
use crate::services::star_query::StarQueryService;
use crate::services::time::{TimeContext, TimeService};

/// Computes what an observer on a planet sees in the sky.
///
/// Cheap to clone; clones share the cache and the stores.
#[derive(Clone)]
pub struct NightSkyService {
    time: TimeService,
    ephemeris: EphemerisService,
    star_query: StarQueryService,
    cache: Arc<NightSkyCache>,
}

/// Why candidates were dropped, for the debug log.
#[derive(Debug, Default)]
struct FilterCounts {
    host: usize,
    zero_distance: usize,
    below_horizon: usize,
    too_faint: usize,
}

impl NightSkyService {
    pub fn new(
        repository: Arc<dyn FullRepository>,
        time_context: Arc<TimeContext>,
        cache: Arc<NightSkyCache>,
    ) -> Self {
        let time = TimeService::new(time_context);
        Self {
            ephemeris: EphemerisService::new(Arc::clone(&repository), time.clone()),
            star_query: StarQueryService::new(repository),
            time,
            cache,
        }
    }

    pub fn time(&self) -> &TimeService {
        &self.time
    }

    pub fn ephemeris(&self) -> &EphemerisService {
        &self.ephemeris
    }

    pub fn star_query(&self) -> &StarQueryService {
        &self.star_query
    }

    pub fn cache(&self) -> &Arc<NightSkyCache> {
        &self.cache
    }

    /// Compute (or fetch from cache) the sky for `request`.
    ///
    /// Stars are returned brightest first, truncated to `max_stars`. The host
    /// star never appears in `stars`, even when it is above the horizon; it is
    /// reported only in `host_star`, which is not subject to the magnitude
    /// limit.
    pub async fn compute_night_sky(
        &self,
        request: &NightSkyRequest,
    ) -> Result<NightSkyResult, NightSkyError> {
        request.validate()?;
        self.time.ensure_ready()?;

        if let Some(cached) = self.cache.get(request) {
            log::info!("Returning cached sky for planet {}", request.planet_id);
            return Ok(cached);
        }

        let started = Instant::now();
        log::info!(
            "Computing night sky for planet {} at {}",
            request.planet_id,
            request.instant_utc
        );

        let attitude = self
            .ephemeris
            .attitude_at(&request.planet_id, &request.host_star_id, request.instant_utc)
            .await?;
        let observer = attitude.position_ly;
        let enu = self.ephemeris.enu_frame(
            &attitude,
            request.observer_lat_rad,
            request.observer_lon_rad,
        );

        let candidates = self
            .star_query
            .query_candidates(
                &observer,
                request.radius_ly,
                &request.dataset_name,
                request.level_of_detail,
            )
            .await?;

        let mut counts = FilterCounts::default();
        let mut stars = Vec::new();
        for star in &candidates {
            if star.id == request.host_star_id {
                counts.host += 1;
                continue;
            }

            let coord = world_to_horizontal(&star.position_ly, &observer, &enu);
            if coord.distance_ly == 0.0 {
                counts.zero_distance += 1;
                continue;
            }
            if !is_above_horizon(coord.altitude_rad) {
                counts.below_horizon += 1;
                continue;
            }

            let point = sky_point(star, &coord, &request.atmosphere);
            if point.apparent_magnitude > request.max_magnitude {
                counts.too_faint += 1;
                continue;
            }
            stars.push(point);
        }

        log::debug!(
            "Planet {}: {} candidates, {} visible, {:?}",
            request.planet_id,
            candidates.len(),
            stars.len(),
            counts
        );

        stars.sort_by(|a, b| a.apparent_magnitude.total_cmp(&b.apparent_magnitude));
        stars.truncate(request.max_stars);

        let host_star = self.host_star_point(request, &observer, &enu).await?;

        let result = NightSkyResult {
            visible_count: stars.len(),
            total_stars_queried: candidates.len(),
            stars,
            host_star,
            compute_time: started.elapsed(),
            computed_at: chrono::Utc::now(),
            from_cache: false,
        };

        self.cache.put(request, result.clone());
        log::info!(
            "Computed night sky: {} visible stars in {}ms",
            result.visible_count,
            result.compute_time.as_millis()
        );
        Ok(result)
    }

    /// Whether the host star is at or below the observer's horizon.
    ///
    /// A planet without a known host star is always in night.
    pub async fn is_night_time(&self, request: &NightSkyRequest) -> Result<bool, NightSkyError> {
        Ok(self
            .host_star_horizontal(request)
            .await?
            .map_or(true, |coord| !is_above_horizon(coord.altitude_rad)))
    }

    /// Horizontal position of the host star, if it is known.
    pub(crate) async fn host_star_horizontal(
        &self,
        request: &NightSkyRequest,
    ) -> Result<Option<HorizontalCoord>, NightSkyError> {
        request.validate()?;
        let attitude = self
            .ephemeris
            .attitude_at(&request.planet_id, &request.host_star_id, request.instant_utc)
            .await?;
        let enu = self.ephemeris.enu_frame(
            &attitude,
            request.observer_lat_rad,
            request.observer_lon_rad,
        );

        let host = self.star_query.get_host_star(&request.host_star_id).await?;
        Ok(host.map(|star| world_to_horizontal(&star.position_ly, &attitude.position_ly, &enu)))
    }

    async fn host_star_point(
        &self,
        request: &NightSkyRequest,
        observer: &Vector3<f64>,
        enu: &EnuFrame,
    ) -> Result<Option<SkyStarPoint>, NightSkyError> {
        let host = self.star_query.get_host_star(&request.host_star_id).await?;
        Ok(host.map(|star| {
            let coord = world_to_horizontal(&star.position_ly, observer, enu);
            sky_point(&star, &coord, &request.atmosphere)
        }))
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Drop the cached skies of one planet, e.g. after its elements changed.
    pub fn invalidate_planet(&self, planet_id: &PlanetId) -> usize {
        self.cache.invalidate(planet_id)
    }
}

/// Photometry for one star at a known horizontal position.
fn sky_point(
    star: &StarRenderRow,
    coord: &HorizontalCoord,
    atmosphere: &AtmosphereModel,
) -> SkyStarPoint {
    let magnitude = apparent_magnitude(star.absolute_magnitude, coord.distance_ly);
    SkyStarPoint {
        azimuth_rad: coord.azimuth_rad,
        altitude_rad: coord.altitude_rad,
        apparent_magnitude: apply_extinction(magnitude, coord.altitude_rad, atmosphere),
        color: star_to_color(star),
        star_id: star.id.clone(),
        name: star.name.clone(),
        distance_ly: coord.distance_ly,
    }
}

#[cfg(test)]
#[path = "night_sky_tests.rs"]
mod night_sky_tests;
