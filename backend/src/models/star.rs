//! Store-facing records: star rows, catalog seed entries and orbital elements.

use nalgebra::Vector3;
use qtty::{AstronomicalUnits, Days, Degrees, Hours};
use serde::{Deserialize, Serialize};

use crate::api::StarId;

/// Magnitude used when a catalog entry carries no usable photometry.
pub const DEFAULT_MAGNITUDE: f64 = 10.0;

/// Effective temperature used when a catalog entry has none (Kelvin).
pub const DEFAULT_TEMPERATURE_K: f64 = 5500.0;

/// Read-only projection of a persisted star.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarRenderRow {
    pub id: StarId,
    /// World position in light years.
    pub position_ly: Vector3<f64>,
    pub absolute_magnitude: f64,
    /// Effective temperature in Kelvin.
    pub temperature_k: f64,
    pub spectral_class: Option<String>,
    pub name: String,
}

impl StarRenderRow {
    pub fn new(
        id: impl Into<String>,
        position_ly: Vector3<f64>,
        absolute_magnitude: f64,
        temperature_k: f64,
        spectral_class: Option<&str>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: StarId::new(id),
            position_ly,
            absolute_magnitude,
            temperature_k,
            spectral_class: spectral_class.map(str::to_string),
            name: name.into(),
        }
    }
}

/// Axis-aligned box in world coordinates (light years).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Vector3<f64>,
    pub max: Vector3<f64>,
}

impl BoundingBox {
    /// Cube of half-size `radius_ly` centred on `center`.
    pub fn around(center: &Vector3<f64>, radius_ly: f64) -> Self {
        let half = Vector3::repeat(radius_ly);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.min.iter().chain(self.max.iter()).all(|v| v.is_finite())
    }

    pub fn contains(&self, p: &Vector3<f64>) -> bool {
        (0..3).all(|i| p[i] >= self.min[i] && p[i] <= self.max[i])
    }
}

/// Keplerian orbital elements of a planet, as held by the orbital-elements store.
///
/// Missing fields take the defaults of a circular, one-year, Earth-like orbit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitalElements {
    pub semi_major_axis: AstronomicalUnits,
    pub eccentricity: f64,
    pub inclination: Degrees,
    pub argument_of_periapsis: Degrees,
    pub longitude_of_ascending_node: Degrees,
    pub orbital_period: Days,
    /// Sidereal rotation period of the planet.
    pub rotation_period: Hours,
}

impl Default for OrbitalElements {
    fn default() -> Self {
        Self {
            semi_major_axis: AstronomicalUnits::new(1.0),
            eccentricity: 0.0,
            inclination: Degrees::new(0.0),
            argument_of_periapsis: Degrees::new(0.0),
            longitude_of_ascending_node: Degrees::new(0.0),
            orbital_period: Days::new(365.25),
            rotation_period: Hours::new(24.0),
        }
    }
}

impl OrbitalElements {
    pub fn new(
        semi_major_axis_au: f64,
        eccentricity: f64,
        inclination_deg: f64,
        argument_of_periapsis_deg: f64,
        longitude_of_ascending_node_deg: f64,
        orbital_period_days: f64,
    ) -> Self {
        Self {
            semi_major_axis: AstronomicalUnits::new(semi_major_axis_au),
            eccentricity,
            inclination: Degrees::new(inclination_deg),
            argument_of_periapsis: Degrees::new(argument_of_periapsis_deg),
            longitude_of_ascending_node: Degrees::new(longitude_of_ascending_node_deg),
            orbital_period: Days::new(orbital_period_days),
            ..Default::default()
        }
    }

    pub fn with_rotation_period_hours(mut self, hours: f64) -> Self {
        self.rotation_period = Hours::new(hours);
        self
    }
}

/// A raw star entry as found in a JSON catalog seed.
///
/// Catalogs are heterogeneous: names and photometry come from whichever
/// columns a source filled in. [`CatalogStar::to_render_row`] picks the best
/// available value for each.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogStar {
    pub id: String,
    pub common_name: Option<String>,
    pub display_name: Option<String>,
    pub system_name: Option<String>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub absolute_magnitude: Option<f64>,
    pub magv: Option<f64>,
    pub grp: Option<f64>,
    pub bpg: Option<f64>,
    pub magb: Option<f64>,
    pub magr: Option<f64>,
    pub magi: Option<f64>,
    pub magu: Option<f64>,
    pub temperature: Option<f64>,
    pub spectral_class: Option<String>,
}

impl CatalogStar {
    /// First non-blank name among common, display and system names, then the id.
    pub fn resolve_name(&self) -> String {
        [
            self.common_name.as_deref(),
            self.display_name.as_deref(),
            self.system_name.as_deref(),
            Some(self.id.as_str()),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or("Unknown")
        .to_string()
    }

    /// First finite, non-zero magnitude in catalog preference order.
    pub fn select_magnitude(&self) -> f64 {
        [
            self.absolute_magnitude,
            self.magv,
            self.grp,
            self.bpg,
            self.magb,
            self.magr,
            self.magi,
            self.magu,
        ]
        .into_iter()
        .flatten()
        .find(|m| m.is_finite() && *m != 0.0)
        .unwrap_or(DEFAULT_MAGNITUDE)
    }

    pub fn to_render_row(&self) -> StarRenderRow {
        let temperature_k = self
            .temperature
            .filter(|t| t.is_finite() && *t > 0.0)
            .unwrap_or(DEFAULT_TEMPERATURE_K);
        let spectral_class = self
            .spectral_class
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        StarRenderRow::new(
            self.id.trim(),
            Vector3::new(self.x, self.y, self.z),
            self.select_magnitude(),
            temperature_k,
            spectral_class,
            self.resolve_name(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounding_box_contains() {
        let bbox = BoundingBox::around(&Vector3::new(1.0, 2.0, 3.0), 5.0);
        assert!(bbox.contains(&Vector3::new(1.0, 2.0, 3.0)));
        assert!(bbox.contains(&Vector3::new(6.0, -3.0, 8.0)));
        assert!(!bbox.contains(&Vector3::new(6.1, 2.0, 3.0)));
    }

    #[test]
    fn test_orbital_elements_defaults_from_partial_json() {
        let elements: OrbitalElements =
            serde_json::from_str(r#"{"eccentricity": 0.2, "semi_major_axis": 2.5}"#).unwrap();
        assert_eq!(elements.eccentricity, 0.2);
        assert_eq!(elements.semi_major_axis.value(), 2.5);
        assert_eq!(elements.orbital_period.value(), 365.25);
        assert_eq!(elements.rotation_period.value(), 24.0);
        assert_eq!(elements.inclination.value(), 0.0);
    }

    #[test]
    fn test_catalog_name_resolution_order() {
        let mut star = CatalogStar {
            id: " HIP 71683 ".to_string(),
            common_name: Some("  ".to_string()),
            display_name: Some("Rigil Kentaurus".to_string()),
            system_name: Some("Alpha Centauri".to_string()),
            ..Default::default()
        };
        assert_eq!(star.resolve_name(), "Rigil Kentaurus");

        star.display_name = None;
        assert_eq!(star.resolve_name(), "Alpha Centauri");

        star.system_name = None;
        assert_eq!(star.resolve_name(), "HIP 71683");

        star.id = String::new();
        assert_eq!(star.resolve_name(), "Unknown");
    }

    #[test]
    fn test_catalog_magnitude_preference() {
        let mut star = CatalogStar {
            absolute_magnitude: Some(0.0),
            magv: Some(f64::NAN),
            grp: Some(4.2),
            magb: Some(5.0),
            ..Default::default()
        };
        assert_eq!(star.select_magnitude(), 4.2);

        star.absolute_magnitude = Some(4.38);
        assert_eq!(star.select_magnitude(), 4.38);

        let empty = CatalogStar::default();
        assert_eq!(empty.select_magnitude(), DEFAULT_MAGNITUDE);
    }

    #[test]
    fn test_catalog_to_render_row_defaults_temperature() {
        let star = CatalogStar {
            id: "gj-581".to_string(),
            x: 1.0,
            y: -2.0,
            z: 20.0,
            temperature: Some(-1.0),
            spectral_class: Some(" ".to_string()),
            ..Default::default()
        };
        let row = star.to_render_row();
        assert_eq!(row.temperature_k, DEFAULT_TEMPERATURE_K);
        assert_eq!(row.spectral_class, None);
        assert_eq!(row.position_ly, Vector3::new(1.0, -2.0, 20.0));
        assert_eq!(row.name, "gj-581");
    }
}
