//! Public API surface for the night-sky engine.
//!
//! This file consolidates the identifier newtypes and re-exports the value
//! types that cross the crate boundary (requests, results, store rows).
//! All types derive Serialize/Deserialize for JSON serialization.

pub use crate::models::frame::{EnuFrame, PlanetAttitude};
pub use crate::models::sky::{
    AtmosphereModel, LevelOfDetail, NightSkyRequest, NightSkyRequestBuilder, NightSkyResult, Rgb,
    SkyStarPoint,
};
pub use crate::models::star::{BoundingBox, CatalogStar, OrbitalElements, StarRenderRow};
pub use crate::models::time::{AstronomicalTime, JulianDate};
pub use crate::services::cache::CacheStats;
pub use crate::services::planetary_sky::PlanetarySkyModel;
pub use crate::services::sky_transform::HorizontalCoord;

use serde::{Deserialize, Serialize};

/// Planet identifier (orbital-elements store key).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanetId(pub String);

/// Star identifier (star store key).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StarId(pub String);

impl PlanetId {
    pub fn new(value: impl Into<String>) -> Self {
        PlanetId(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl StarId {
    pub fn new(value: impl Into<String>) -> Self {
        StarId(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlanetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for StarId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PlanetId {
    fn from(value: &str) -> Self {
        PlanetId::new(value)
    }
}

impl From<&str> for StarId {
    fn from(value: &str) -> Self {
        StarId::new(value)
    }
}
