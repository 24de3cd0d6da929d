//! Ephemeris service: planet position and attitude from Keplerian elements.
//!
//! Orbits are propagated from the J2000.0 epoch: mean anomaly is zero (the
//! planet sits at periapsis) at 2000-01-01 12:00 UTC. The spin axis is the
//! orbit normal, i.e. the planet's obliquity equals its orbital inclination,
//! and the prime meridian rotates about it from the same epoch.

use chrono::{DateTime, Utc};
use nalgebra::Vector3;
use qtty::{AstronomicalUnits, LightYear, Radian, Radians};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::sync::Arc;

use crate::api::{EnuFrame, JulianDate, OrbitalElements, PlanetAttitude, PlanetId, StarId};
use crate::db::repository::{FullRepository, OrbitRepository, StarRepository};
use crate::models::frame::SECONDS_PER_DAY;
use crate::services::error::NightSkyError;
use crate::services::time::{wrap_rad, TimeService};

/// Newton-Raphson stops once the correction drops below this.
pub const KEPLER_TOLERANCE: f64 = 1e-10;
/// Hard cap on Newton-Raphson iterations.
pub const KEPLER_MAX_ITERATIONS: u32 = 10;
/// Upper bound applied to eccentricity.
pub const MAX_ECCENTRICITY: f64 = 0.99;
/// Lower bound applied to the orbital period (days).
pub const MIN_ORBITAL_PERIOD_DAYS: f64 = 0.01;

const DEFAULT_ROTATION_PERIOD_HOURS: f64 = 24.0;
const POLE_EPSILON: f64 = 1e-12;

/// Outcome of solving Kepler's equation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeplerSolution {
    pub eccentric_anomaly: f64,
    pub iterations: u32,
    /// False when the iteration cap was reached before the tolerance.
    pub converged: bool,
}

/// Solve M = E − e·sin(E) for E by Newton-Raphson starting from E₀ = M.
///
/// When the cap is hit the last iterate is returned with `converged = false`.
pub fn solve_kepler(mean_anomaly: f64, eccentricity: f64) -> KeplerSolution {
    let mut e_anomaly = mean_anomaly;
    for iteration in 1..=KEPLER_MAX_ITERATIONS {
        let delta = (mean_anomaly - e_anomaly + eccentricity * e_anomaly.sin())
            / (1.0 - eccentricity * e_anomaly.cos());
        e_anomaly += delta;
        if delta.abs() < KEPLER_TOLERANCE {
            return KeplerSolution {
                eccentric_anomaly: e_anomaly,
                iterations: iteration,
                converged: true,
            };
        }
    }

    KeplerSolution {
        eccentric_anomaly: e_anomaly,
        iterations: KEPLER_MAX_ITERATIONS,
        converged: false,
    }
}

/// Mean anomaly after `elapsed_days`, normalized into [0, 2π).
pub fn mean_anomaly(elapsed_days: f64, period_days: f64) -> f64 {
    let mean_motion = TAU / period_days;
    wrap_rad(Radians::new(mean_motion * elapsed_days))
}

/// True anomaly from eccentric anomaly (half-angle form).
pub fn true_anomaly(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    let half = eccentric_anomaly / 2.0;
    2.0 * ((1.0 + eccentricity).sqrt() * half.sin())
        .atan2((1.0 - eccentricity).sqrt() * half.cos())
}

/// Elements with eccentricity and period forced into their usable ranges.
fn sanitized(planet_id: &PlanetId, elements: &OrbitalElements) -> OrbitalElements {
    let mut clean = elements.clone();

    let e = elements.eccentricity;
    if !e.is_finite() || !(0.0..=MAX_ECCENTRICITY).contains(&e) {
        clean.eccentricity = if e.is_finite() {
            e.clamp(0.0, MAX_ECCENTRICITY)
        } else {
            0.0
        };
        log::warn!(
            "Planet {}: eccentricity {} clamped to {}",
            planet_id,
            e,
            clean.eccentricity
        );
    }

    let period = elements.orbital_period.value();
    if !period.is_finite() || period < MIN_ORBITAL_PERIOD_DAYS {
        clean.orbital_period = MIN_ORBITAL_PERIOD_DAYS.into();
        log::warn!(
            "Planet {}: orbital period {} d clamped to {} d",
            planet_id,
            period,
            MIN_ORBITAL_PERIOD_DAYS
        );
    }

    let rotation = elements.rotation_period.value();
    if !rotation.is_finite() || rotation <= 0.0 {
        clean.rotation_period = DEFAULT_ROTATION_PERIOD_HOURS.into();
        log::warn!(
            "Planet {}: rotation period {} h replaced by {} h",
            planet_id,
            rotation,
            DEFAULT_ROTATION_PERIOD_HOURS
        );
    }

    let a = elements.semi_major_axis.value();
    if !a.is_finite() || a < 0.0 {
        clean.semi_major_axis = AstronomicalUnits::new(1.0);
        log::warn!("Planet {}: semi-major axis {} AU replaced by 1 AU", planet_id, a);
    }

    clean
}

/// Offset of the planet from its host star in AU, plus the solver outcome.
pub fn orbital_offset_au(
    elements: &OrbitalElements,
    elapsed_days: f64,
) -> (Vector3<f64>, KeplerSolution) {
    let e = elements.eccentricity;
    let a = elements.semi_major_axis.value();

    let m = mean_anomaly(elapsed_days, elements.orbital_period.value());
    let solution = solve_kepler(m, e);
    let nu = true_anomaly(solution.eccentric_anomaly, e);
    let r = a * (1.0 - e * solution.eccentric_anomaly.cos());

    let x_orbit = r * nu.cos();
    let y_orbit = r * nu.sin();

    let (sin_node, cos_node) = elements.longitude_of_ascending_node.sin_cos();
    let (sin_i, cos_i) = elements.inclination.sin_cos();
    let (sin_peri, cos_peri) = elements.argument_of_periapsis.sin_cos();

    // Rz(Ω) · Rx(i) · Rz(ω) applied to the in-plane position.
    let x = (cos_node * cos_peri - sin_node * sin_peri * cos_i) * x_orbit
        + (-cos_node * sin_peri - sin_node * cos_peri * cos_i) * y_orbit;
    let y = (sin_node * cos_peri + cos_node * sin_peri * cos_i) * x_orbit
        + (-sin_node * sin_peri + cos_node * cos_peri * cos_i) * y_orbit;
    let z = (sin_peri * sin_i) * x_orbit + (cos_peri * sin_i) * y_orbit;

    (Vector3::new(x, y, z), solution)
}

/// Unit normal of the orbital plane; +Z for an uninclined orbit.
pub fn orbit_normal(inclination_rad: f64, ascending_node_rad: f64) -> Vector3<f64> {
    let (sin_i, cos_i) = inclination_rad.sin_cos();
    let (sin_node, cos_node) = ascending_node_rad.sin_cos();
    Vector3::new(sin_i * sin_node, -cos_node * sin_i, cos_i).normalize()
}

/// Prime meridian after rotating `angle_rad` about `spin_axis`.
///
/// The zero-angle meridian is world +X projected onto the equatorial plane
/// (world +Y when the spin axis lies close to X).
pub fn prime_meridian(spin_axis: &Vector3<f64>, angle_rad: f64) -> Vector3<f64> {
    let reference = if spin_axis.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let meridian = (reference - spin_axis * spin_axis.dot(&reference)).normalize();
    rotate_about_axis(&meridian, spin_axis, angle_rad)
}

/// Rodrigues rotation of `v` about the unit vector `axis`.
fn rotate_about_axis(v: &Vector3<f64>, axis: &Vector3<f64>, angle_rad: f64) -> Vector3<f64> {
    let (sin, cos) = angle_rad.sin_cos();
    v * cos + axis.cross(v) * sin + axis * (axis.dot(v) * (1.0 - cos))
}

/// Attitude of a planet orbiting a host star at `host_position_ly`.
pub fn attitude_from_elements(
    planet_id: &PlanetId,
    elements: &OrbitalElements,
    host_position_ly: &Vector3<f64>,
    jd_utc: JulianDate,
) -> PlanetAttitude {
    let elements = sanitized(planet_id, elements);
    let elapsed_days = jd_utc.days_since_j2000();

    let (offset_au, solution) = orbital_offset_au(&elements, elapsed_days);
    if !solution.converged {
        log::warn!(
            "Planet {}: Kepler solver did not converge (e = {}), using last iterate",
            planet_id,
            elements.eccentricity
        );
    }
    let offset_ly = offset_au.map(|au| AstronomicalUnits::new(au).to::<LightYear>().value());

    let spin_axis_unit = orbit_normal(
        elements.inclination.to::<Radian>().value(),
        elements.longitude_of_ascending_node.to::<Radian>().value(),
    );

    let rotation_period_days = elements.rotation_period.value() / 24.0;
    let rotation_angle = elapsed_days / rotation_period_days * TAU;

    PlanetAttitude {
        position_ly: host_position_ly + offset_ly,
        prime_meridian_unit: prime_meridian(&spin_axis_unit, rotation_angle),
        spin_axis_unit,
        rotation_rate_rad_per_sec: TAU / (rotation_period_days * SECONDS_PER_DAY),
        kepler_converged: solution.converged,
    }
}

/// Observer East-North-Up frame at (`lat_rad`, `lon_rad`) on the planet.
///
/// Longitude is measured eastward from the prime meridian. At the poles,
/// where east is undefined by the spin axis alone, east is taken along the
/// requested longitude's parallel direction.
pub fn enu_frame(attitude: &PlanetAttitude, lat_rad: f64, lon_rad: f64) -> EnuFrame {
    let spin = attitude.spin_axis_unit;
    let meridian = attitude.prime_meridian_unit;
    let quadrature = spin.cross(&meridian).normalize();

    let (sin_lat, cos_lat) = lat_rad.sin_cos();
    let (sin_lon, cos_lon) = lon_rad.sin_cos();

    let up =
        (meridian * (cos_lat * cos_lon) + quadrature * (cos_lat * sin_lon) + spin * sin_lat)
            .normalize();

    let east_raw = spin.cross(&up);
    let east = if east_raw.norm() > POLE_EPSILON {
        east_raw.normalize()
    } else {
        (quadrature * cos_lon - meridian * sin_lon).normalize()
    };
    let north = up.cross(&east).normalize();

    EnuFrame {
        east,
        north,
        up,
        lat_rad,
        lon_rad,
    }
}

/// Resolves planet attitudes against the stores.
#[derive(Clone)]
pub struct EphemerisService {
    repository: Arc<dyn FullRepository>,
    time: TimeService,
}

impl EphemerisService {
    pub fn new(repository: Arc<dyn FullRepository>, time: TimeService) -> Self {
        Self { repository, time }
    }

    /// Attitude of `planet_id` at `instant`.
    ///
    /// An unknown planet or host star yields [`PlanetAttitude::neutral`].
    pub async fn attitude_at(
        &self,
        planet_id: &PlanetId,
        host_star_id: &StarId,
        instant: DateTime<Utc>,
    ) -> Result<PlanetAttitude, NightSkyError> {
        let jd = self.time.to_julian_date(instant)?;

        let Some(host) = self.repository.get_star(host_star_id).await? else {
            log::warn!("Host star not found: {}", host_star_id);
            return Ok(PlanetAttitude::neutral());
        };
        let Some(elements) = self.repository.get_orbital_elements(planet_id).await? else {
            log::warn!("Planet not found: {}", planet_id);
            return Ok(PlanetAttitude::neutral());
        };

        Ok(attitude_from_elements(
            planet_id,
            &elements,
            &host.position_ly,
            jd,
        ))
    }

    pub fn enu_frame(&self, attitude: &PlanetAttitude, lat_rad: f64, lon_rad: f64) -> EnuFrame {
        enu_frame(attitude, lat_rad, lon_rad)
    }
}
