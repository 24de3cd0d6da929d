//! Data Transfer Objects for the HTTP API.
//!
//! Angles are degrees on the wire; instants are RFC 3339 strings.

use chrono::{DateTime, Utc};
use qtty::{Degrees, Radian};
use serde::{Deserialize, Serialize};

pub use crate::api::{CacheStats, PlanetarySkyModel};
pub use crate::services::planetary_sky::VisibleStar;

use crate::api::{AtmosphereModel, LevelOfDetail, NightSkyRequest, NightSkyResult};
use crate::services::NightSkyError;

/// Body of the night-sky endpoints.
///
/// Only the planet, host star and instant are required; everything else
/// falls back to the engine defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NightSkyRequestDto {
    pub planet_id: String,
    pub host_star_id: String,
    pub instant: DateTime<Utc>,
    #[serde(default)]
    pub observer_lat_deg: f64,
    #[serde(default)]
    pub observer_lon_deg: f64,
    #[serde(default)]
    pub radius_ly: Option<f64>,
    #[serde(default)]
    pub max_magnitude: Option<f64>,
    #[serde(default)]
    pub max_stars: Option<usize>,
    #[serde(default)]
    pub level_of_detail: Option<LevelOfDetail>,
    #[serde(default)]
    pub dataset: Option<String>,
    #[serde(default)]
    pub atmosphere: Option<AtmosphereDto>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AtmosphereDto {
    pub enabled: bool,
    #[serde(default)]
    pub extinction_coefficient: f64,
}

fn radians(deg: f64) -> f64 {
    Degrees::new(deg).to::<Radian>().value()
}

impl NightSkyRequestDto {
    pub fn into_request(self) -> Result<NightSkyRequest, NightSkyError> {
        let mut builder = NightSkyRequest::builder(self.planet_id, self.host_star_id, self.instant)
            .observer(radians(self.observer_lat_deg), radians(self.observer_lon_deg));

        if let Some(radius) = self.radius_ly {
            builder = builder.radius_ly(radius);
        }
        if let Some(limit) = self.max_magnitude {
            builder = builder.max_magnitude(limit);
        }
        if let Some(max_stars) = self.max_stars {
            builder = builder.max_stars(max_stars);
        }
        if let Some(lod) = self.level_of_detail {
            builder = builder.level_of_detail(lod);
        }
        if let Some(dataset) = self.dataset {
            builder = builder.dataset(dataset);
        }
        if let Some(atmosphere) = self.atmosphere {
            builder = builder.atmosphere(AtmosphereModel::new(
                atmosphere.enabled,
                atmosphere.extinction_coefficient,
            ));
        }
        builder.build()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NightSkyResponse {
    pub stars: Vec<VisibleStar>,
    pub host_star: Option<VisibleStar>,
    pub total_stars_queried: usize,
    pub visible_count: usize,
    pub compute_time_ms: f64,
    pub computed_at: DateTime<Utc>,
    pub from_cache: bool,
}

impl From<&NightSkyResult> for NightSkyResponse {
    fn from(result: &NightSkyResult) -> Self {
        Self {
            stars: result.stars.iter().map(VisibleStar::from).collect(),
            host_star: result.host_star.as_ref().map(VisibleStar::from),
            total_stars_queried: result.total_stars_queried,
            visible_count: result.visible_count,
            compute_time_ms: result.compute_time.as_secs_f64() * 1_000.0,
            computed_at: result.computed_at,
            from_cache: result.from_cache,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IsNightResponse {
    pub planet_id: String,
    pub is_night: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheClearedResponse {
    pub removed: usize,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub store: String,
    pub time_initialized: bool,
}
