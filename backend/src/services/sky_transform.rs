//! World positions to observer-relative horizontal coordinates.
//!
//! Pure functions only. Azimuth is measured from north through east and
//! normalized into [0, 2π); altitude is positive above the horizon.

use nalgebra::Vector3;
use qtty::Radians;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

use crate::api::EnuFrame;
use crate::services::time::wrap_rad;

/// Distances below this are treated as the observer's own position (ly).
pub const DEGENERATE_DISTANCE_LY: f64 = 1e-12;

/// Horizontal (alt-az) coordinates of a point as seen by the observer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizontalCoord {
    pub azimuth_rad: f64,
    pub altitude_rad: f64,
    pub distance_ly: f64,
}

/// Project a world position into the observer's horizontal frame.
///
/// A target coincident with the observer is reported at the zenith with
/// zero distance.
pub fn world_to_horizontal(
    target_ly: &Vector3<f64>,
    observer_ly: &Vector3<f64>,
    enu: &EnuFrame,
) -> HorizontalCoord {
    let offset = target_ly - observer_ly;
    let distance_ly = offset.norm();
    if distance_ly < DEGENERATE_DISTANCE_LY {
        return HorizontalCoord {
            azimuth_rad: 0.0,
            altitude_rad: FRAC_PI_2,
            distance_ly: 0.0,
        };
    }

    let direction = offset / distance_ly;
    let (east, north, up) = enu.project(&direction);

    HorizontalCoord {
        azimuth_rad: wrap_rad(Radians::new(east.atan2(north))),
        altitude_rad: up.atan2(east.hypot(north)),
        distance_ly,
    }
}

/// Strictly above the horizon; altitude exactly 0 is not visible.
pub fn is_above_horizon(altitude_rad: f64) -> bool {
    altitude_rad > 0.0
}

/// Point on a dome of radius `dome_radius`, as (east, north, up) components.
pub fn horizontal_to_screen(
    azimuth_rad: f64,
    altitude_rad: f64,
    dome_radius: f64,
) -> Vector3<f64> {
    let (sin_alt, cos_alt) = altitude_rad.sin_cos();
    let (sin_az, cos_az) = azimuth_rad.sin_cos();
    Vector3::new(
        dome_radius * cos_alt * sin_az,
        dome_radius * cos_alt * cos_az,
        dome_radius * sin_alt,
    )
}

/// Great-circle separation between two horizontal directions (haversine), in [0, π].
pub fn angular_separation(az1: f64, alt1: f64, az2: f64, alt2: f64) -> f64 {
    let half_dalt = ((alt2 - alt1) / 2.0).sin();
    let half_daz = ((az2 - az1) / 2.0).sin();
    let h = half_dalt * half_dalt + alt1.cos() * alt2.cos() * half_daz * half_daz;
    2.0 * h.sqrt().clamp(0.0, 1.0).asin()
}
