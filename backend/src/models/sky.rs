//! Night-sky request/response value types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use std::time::Duration;

use crate::api::{PlanetId, StarId};
use crate::services::error::{ErrorContext, NightSkyError};

/// Level of detail: a magnitude cutoff plus a hard cap on candidate count.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LevelOfDetail {
    Low,
    #[default]
    Medium,
    High,
    Ultra,
}

impl LevelOfDetail {
    /// Faintest stored magnitude admitted at this level.
    pub fn magnitude_limit(&self) -> f64 {
        match self {
            Self::Low => 6.5,
            Self::Medium => 8.0,
            Self::High => 10.0,
            Self::Ultra => 16.0,
        }
    }

    /// Maximum number of candidates returned by a store query.
    pub fn max_stars(&self) -> usize {
        match self {
            Self::Low => 2_000,
            Self::Medium => 5_000,
            Self::High => 20_000,
            Self::Ultra => 100_000,
        }
    }

    /// Coarsest level whose cutoff still covers `magnitude_limit`.
    pub fn for_magnitude_limit(magnitude_limit: f64) -> Self {
        if magnitude_limit >= 10.0 {
            Self::Ultra
        } else if magnitude_limit >= 8.0 {
            Self::High
        } else if magnitude_limit >= 6.5 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl std::fmt::Display for LevelOfDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Ultra => "ultra",
        };
        write!(f, "{}", s)
    }
}

/// Atmospheric extinction settings for the observer's planet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtmosphereModel {
    pub enabled: bool,
    /// Extinction in magnitudes per airmass.
    pub extinction_coefficient: f64,
}

impl AtmosphereModel {
    /// Negative or non-finite coefficients are clamped to 0 so extinction never brightens.
    pub fn new(enabled: bool, extinction_coefficient: f64) -> Self {
        let extinction_coefficient = if extinction_coefficient.is_finite() {
            extinction_coefficient.max(0.0)
        } else {
            0.0
        };
        Self {
            enabled,
            extinction_coefficient,
        }
    }

    /// Typical V-band extinction at a good terrestrial site.
    pub fn earth_like() -> Self {
        Self::new(true, 0.2)
    }

    /// Airless body.
    pub fn none() -> Self {
        Self::new(false, 0.0)
    }
}

impl Default for AtmosphereModel {
    fn default() -> Self {
        Self::earth_like()
    }
}

/// 8-bit RGB display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Packed as 0xRRGGBB.
    pub fn to_packed(&self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// One star as seen from the observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkyStarPoint {
    /// Azimuth in radians, 0 = north, increasing through east, in [0, 2π).
    pub azimuth_rad: f64,
    /// Altitude in radians; positive above the horizon.
    pub altitude_rad: f64,
    pub apparent_magnitude: f64,
    pub color: Rgb,
    pub star_id: StarId,
    pub name: String,
    pub distance_ly: f64,
}

/// Parameters of one night-sky snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NightSkyRequest {
    pub planet_id: PlanetId,
    pub host_star_id: StarId,
    pub instant_utc: DateTime<Utc>,
    pub observer_lat_rad: f64,
    pub observer_lon_rad: f64,
    pub radius_ly: f64,
    pub max_magnitude: f64,
    pub max_stars: usize,
    pub level_of_detail: LevelOfDetail,
    pub dataset_name: String,
    pub atmosphere: AtmosphereModel,
}

impl NightSkyRequest {
    pub const DEFAULT_RADIUS_LY: f64 = 100.0;
    pub const DEFAULT_MAX_MAGNITUDE: f64 = 6.5;
    pub const DEFAULT_MAX_STARS: usize = 2_000;
    pub const DEFAULT_DATASET: &'static str = "default";

    pub fn builder(
        planet_id: impl Into<String>,
        host_star_id: impl Into<String>,
        instant_utc: DateTime<Utc>,
    ) -> NightSkyRequestBuilder {
        NightSkyRequestBuilder {
            request: NightSkyRequest {
                planet_id: PlanetId::new(planet_id),
                host_star_id: StarId::new(host_star_id),
                instant_utc,
                observer_lat_rad: 0.0,
                observer_lon_rad: 0.0,
                radius_ly: Self::DEFAULT_RADIUS_LY,
                max_magnitude: Self::DEFAULT_MAX_MAGNITUDE,
                max_stars: Self::DEFAULT_MAX_STARS,
                level_of_detail: LevelOfDetail::default(),
                dataset_name: Self::DEFAULT_DATASET.to_string(),
                atmosphere: AtmosphereModel::default(),
            },
        }
    }

    /// Check the invariants the builder enforces. Used for requests that
    /// arrive through deserialization.
    pub fn validate(&self) -> Result<(), NightSkyError> {
        let invalid = |field: &str, details: String| {
            NightSkyError::validation_with_context(
                format!("invalid {}", field),
                ErrorContext::new("validate_request")
                    .with_entity("planet")
                    .with_entity_id(&self.planet_id)
                    .with_details(details),
            )
        };

        if !self.observer_lat_rad.is_finite() || self.observer_lat_rad.abs() > FRAC_PI_2 {
            return Err(invalid(
                "observer_lat_rad",
                format!("{} not in [-π/2, π/2]", self.observer_lat_rad),
            ));
        }
        if !self.observer_lon_rad.is_finite() {
            return Err(invalid(
                "observer_lon_rad",
                format!("{} is not finite", self.observer_lon_rad),
            ));
        }
        if !self.radius_ly.is_finite() || self.radius_ly < 0.0 {
            return Err(invalid(
                "radius_ly",
                format!("{} must be finite and >= 0", self.radius_ly),
            ));
        }
        if !self.max_magnitude.is_finite() {
            return Err(invalid(
                "max_magnitude",
                format!("{} is not finite", self.max_magnitude),
            ));
        }
        if self.max_stars == 0 {
            return Err(invalid("max_stars", "must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Builder for [`NightSkyRequest`]; `build` validates.
#[derive(Debug, Clone)]
pub struct NightSkyRequestBuilder {
    request: NightSkyRequest,
}

impl NightSkyRequestBuilder {
    pub fn observer(mut self, lat_rad: f64, lon_rad: f64) -> Self {
        self.request.observer_lat_rad = lat_rad;
        self.request.observer_lon_rad = lon_rad;
        self
    }

    pub fn radius_ly(mut self, radius_ly: f64) -> Self {
        self.request.radius_ly = radius_ly;
        self
    }

    pub fn max_magnitude(mut self, max_magnitude: f64) -> Self {
        self.request.max_magnitude = max_magnitude;
        self
    }

    pub fn max_stars(mut self, max_stars: usize) -> Self {
        self.request.max_stars = max_stars;
        self
    }

    pub fn level_of_detail(mut self, lod: LevelOfDetail) -> Self {
        self.request.level_of_detail = lod;
        self
    }

    pub fn dataset(mut self, dataset_name: impl Into<String>) -> Self {
        self.request.dataset_name = dataset_name.into();
        self
    }

    pub fn atmosphere(mut self, atmosphere: AtmosphereModel) -> Self {
        self.request.atmosphere = atmosphere;
        self
    }

    pub fn build(self) -> Result<NightSkyRequest, NightSkyError> {
        self.request.validate()?;
        Ok(self.request)
    }
}

/// A computed sky snapshot. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NightSkyResult {
    /// Visible stars, brightest first, at most `max_stars`.
    pub stars: Vec<SkyStarPoint>,
    pub host_star: Option<SkyStarPoint>,
    pub total_stars_queried: usize,
    pub visible_count: usize,
    pub compute_time: Duration,
    pub computed_at: DateTime<Utc>,
    pub from_cache: bool,
}
