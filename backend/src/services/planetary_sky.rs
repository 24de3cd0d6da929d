//! Observer-facing summary of a planet's sky.
//!
//! Wraps [`NightSkyService::compute_night_sky`] with a day/night decision:
//! while the host star is above the horizon nothing but the host is visible.

use qtty::{Degree, Radians};
use serde::{Deserialize, Serialize};

use crate::api::{NightSkyRequest, SkyStarPoint};
use crate::services::error::NightSkyError;
use crate::services::night_sky::NightSkyService;
use crate::services::sky_transform::is_above_horizon;

/// Number of stars listed in [`PlanetarySkyModel::top_brightest`].
pub const TOP_BRIGHTEST_COUNT: usize = 20;

/// Magnitude limit reported in daytime.
pub const DAYTIME_MAGNITUDE_LIMIT: f64 = -3.0;

/// Altitude reported when the host star is unknown.
const ABSENT_HOST_ALTITUDE_DEG: f64 = -90.0;

/// A visible star with angles in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibleStar {
    pub star_id: String,
    pub name: String,
    pub azimuth_deg: f64,
    pub altitude_deg: f64,
    pub apparent_magnitude: f64,
    pub distance_ly: f64,
    /// "#rrggbb"
    pub color: String,
}

impl From<&SkyStarPoint> for VisibleStar {
    fn from(point: &SkyStarPoint) -> Self {
        Self {
            star_id: point.star_id.to_string(),
            name: point.name.clone(),
            azimuth_deg: to_degrees(point.azimuth_rad),
            altitude_deg: to_degrees(point.altitude_rad),
            apparent_magnitude: point.apparent_magnitude,
            distance_ly: point.distance_ly,
            color: point.color.to_hex(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetarySkyModel {
    /// Brightest first.
    pub visible_stars: Vec<VisibleStar>,
    pub top_brightest: Vec<VisibleStar>,
    pub visible_count: usize,
    pub host_star_altitude_deg: f64,
    pub effective_magnitude_limit: f64,
    pub is_day: bool,
}

impl PlanetarySkyModel {
    fn daytime(host_star_altitude_deg: f64) -> Self {
        Self {
            visible_stars: Vec::new(),
            top_brightest: Vec::new(),
            visible_count: 0,
            host_star_altitude_deg,
            effective_magnitude_limit: DAYTIME_MAGNITUDE_LIMIT,
            is_day: true,
        }
    }
}

fn to_degrees(angle_rad: f64) -> f64 {
    Radians::new(angle_rad).to::<Degree>().value()
}

impl NightSkyService {
    /// Day/night aware sky summary for `request`.
    pub async fn compute_planetary_sky(
        &self,
        request: &NightSkyRequest,
    ) -> Result<PlanetarySkyModel, NightSkyError> {
        self.time().ensure_ready()?;

        let host = self.host_star_horizontal(request).await?;
        let host_altitude_deg = host
            .as_ref()
            .map_or(ABSENT_HOST_ALTITUDE_DEG, |coord| to_degrees(coord.altitude_rad));

        if host.is_some_and(|coord| is_above_horizon(coord.altitude_rad)) {
            log::info!(
                "Planet {}: host star up at {:.1}°, daytime sky",
                request.planet_id,
                host_altitude_deg
            );
            return Ok(PlanetarySkyModel::daytime(host_altitude_deg));
        }

        let result = self.compute_night_sky(request).await?;
        let visible_stars: Vec<VisibleStar> = result.stars.iter().map(VisibleStar::from).collect();
        let top_brightest = visible_stars
            .iter()
            .take(TOP_BRIGHTEST_COUNT)
            .cloned()
            .collect();

        Ok(PlanetarySkyModel {
            visible_count: visible_stars.len(),
            visible_stars,
            top_brightest,
            host_star_altitude_deg: host_altitude_deg,
            effective_magnitude_limit: request.max_magnitude,
            is_day: false,
        })
    }
}
