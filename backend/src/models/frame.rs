//! Derived orientation state: planet attitude and the observer's local frame.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Seconds in a 24 hour day.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Position and body-fixed orientation of a planet at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetAttitude {
    /// World position in light years.
    pub position_ly: Vector3<f64>,
    pub spin_axis_unit: Vector3<f64>,
    /// Prime-meridian direction at the instant, perpendicular to the spin axis.
    pub prime_meridian_unit: Vector3<f64>,
    pub rotation_rate_rad_per_sec: f64,
    /// False when the Kepler solver hit its iteration cap.
    pub kepler_converged: bool,
}

impl PlanetAttitude {
    /// Neutral attitude used when the planet or its host star is unknown:
    /// at the world origin, spin axis +Z, prime meridian +X, 24 h day.
    pub fn neutral() -> Self {
        Self {
            position_ly: Vector3::zeros(),
            spin_axis_unit: Vector3::z(),
            prime_meridian_unit: Vector3::x(),
            rotation_rate_rad_per_sec: std::f64::consts::TAU / SECONDS_PER_DAY,
            kepler_converged: true,
        }
    }
}

/// East-North-Up basis anchored at an observer on the planet surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnuFrame {
    pub east: Vector3<f64>,
    pub north: Vector3<f64>,
    pub up: Vector3<f64>,
    pub lat_rad: f64,
    pub lon_rad: f64,
}

impl EnuFrame {
    /// Components of a world direction along (east, north, up).
    pub fn project(&self, direction: &Vector3<f64>) -> (f64, f64, f64) {
        (
            direction.dot(&self.east),
            direction.dot(&self.north),
            direction.dot(&self.up),
        )
    }
}
