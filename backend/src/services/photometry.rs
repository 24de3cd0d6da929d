//! Photometry: apparent brightness, atmospheric extinction and display color.
//!
//! Every function here is total: invalid input falls back to a documented
//! default instead of failing, and identical inputs give identical outputs.

use std::fmt;

use crate::api::{AtmosphereModel, Rgb, StarRenderRow};
use crate::models::star::{DEFAULT_MAGNITUDE, DEFAULT_TEMPERATURE_K};

/// Light years per parsec.
pub const LIGHT_YEARS_PER_PARSEC: f64 = 3.26156;

/// Magnitude mapped to the largest display size.
const BRIGHT_MAGNITUDE: f64 = -1.5;
/// Magnitude mapped to the smallest display size (naked-eye limit).
const FAINT_MAGNITUDE: f64 = 6.5;
const MAX_SIZE: f64 = 5.0;
const MIN_SIZE: f64 = 0.5;

/// Harvard spectral classes, extended with the L and T brown-dwarf classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpectralClass {
    O,
    B,
    A,
    F,
    G,
    K,
    M,
    L,
    T,
}

impl SpectralClass {
    /// Class from the leading letter of a designation such as "G2V" or "m5.5Ve".
    pub fn from_designation(designation: &str) -> Option<Self> {
        let first = designation.trim().chars().next()?.to_ascii_uppercase();
        Some(match first {
            'O' => Self::O,
            'B' => Self::B,
            'A' => Self::A,
            'F' => Self::F,
            'G' => Self::G,
            'K' => Self::K,
            'M' => Self::M,
            'L' => Self::L,
            'T' => Self::T,
            _ => return None,
        })
    }

    /// Representative display color of the class.
    pub fn display_color(&self) -> Rgb {
        match self {
            Self::O => Rgb::new(155, 176, 255),
            Self::B => Rgb::new(170, 191, 255),
            Self::A => Rgb::new(202, 215, 255),
            Self::F => Rgb::new(248, 247, 255),
            Self::G => Rgb::new(255, 244, 234),
            Self::K => Rgb::new(255, 210, 161),
            Self::M => Rgb::new(255, 204, 111),
            Self::L => Rgb::new(255, 130, 70),
            Self::T => Rgb::new(200, 90, 110),
        }
    }
}

impl fmt::Display for SpectralClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Self::O => 'O',
            Self::B => 'B',
            Self::A => 'A',
            Self::F => 'F',
            Self::G => 'G',
            Self::K => 'K',
            Self::M => 'M',
            Self::L => 'L',
            Self::T => 'T',
        };
        write!(f, "{}", c)
    }
}

/// Apparent magnitude of a star of absolute magnitude `absolute_magnitude`
/// seen from `distance_ly`.
///
/// Uses the distance modulus m = M + 5·log10(d_pc) − 5. A non-positive
/// distance returns the absolute magnitude unchanged; a non-finite absolute
/// magnitude is replaced by the catalog default.
pub fn apparent_magnitude(absolute_magnitude: f64, distance_ly: f64) -> f64 {
    let absolute_magnitude = if absolute_magnitude.is_finite() {
        absolute_magnitude
    } else {
        DEFAULT_MAGNITUDE
    };
    if distance_ly.is_nan() || distance_ly <= 0.0 {
        return absolute_magnitude;
    }

    let distance_pc = distance_ly / LIGHT_YEARS_PER_PARSEC;
    absolute_magnitude + 5.0 * distance_pc.log10() - 5.0
}

/// Relative optical path length through the atmosphere (Kasten & Young 1989).
///
/// 1.0 at the zenith, about 38 at the horizon.
pub fn airmass(altitude_rad: f64) -> f64 {
    let zenith_rad = std::f64::consts::FRAC_PI_2 - altitude_rad;
    let zenith_deg = zenith_rad.to_degrees();
    1.0 / (zenith_rad.cos() + 0.50572 * (96.07995 - zenith_deg).powf(-1.6364))
}

/// Dim `magnitude` by atmospheric extinction at `altitude_rad`.
///
/// Disabled atmospheres and targets at or below the horizon are unchanged.
pub fn apply_extinction(magnitude: f64, altitude_rad: f64, atmosphere: &AtmosphereModel) -> f64 {
    if !atmosphere.enabled || altitude_rad.is_nan() || altitude_rad <= 0.0 {
        return magnitude;
    }
    magnitude + atmosphere.extinction_coefficient.max(0.0) * airmass(altitude_rad)
}

/// Display color of a star: spectral class first, blackbody temperature otherwise.
pub fn star_to_color(star: &StarRenderRow) -> Rgb {
    star.spectral_class
        .as_deref()
        .and_then(SpectralClass::from_designation)
        .map(|class| class.display_color())
        .unwrap_or_else(|| temperature_to_color(star.temperature_k))
}

/// Approximate blackbody color (Tanner Helland fit), channels clamped to [0, 255].
///
/// Non-finite or non-positive temperatures use the catalog default.
pub fn temperature_to_color(temperature_k: f64) -> Rgb {
    let temperature_k = if temperature_k.is_finite() && temperature_k > 0.0 {
        temperature_k
    } else {
        DEFAULT_TEMPERATURE_K
    };
    let t = temperature_k / 100.0;

    let red = if t <= 66.0 {
        255.0
    } else {
        329.698_727_446 * (t - 60.0).powf(-0.133_204_759_2)
    };

    let green = if t <= 66.0 {
        99.470_802_586_1 * t.ln() - 161.119_568_166_1
    } else {
        288.122_169_528_3 * (t - 60.0).powf(-0.075_514_849_2)
    };

    let blue = if t >= 66.0 {
        255.0
    } else if t <= 19.0 {
        0.0
    } else {
        138.517_731_223_1 * (t - 10.0).ln() - 305.044_792_730_7
    };

    Rgb::new(channel(red), channel(green), channel(blue))
}

fn channel(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Display size of a star: brighter is larger, clamped to [0.5, 5.0].
pub fn magnitude_to_size(magnitude: f64) -> f64 {
    if magnitude.is_nan() {
        return MIN_SIZE;
    }
    let fraction = (magnitude - BRIGHT_MAGNITUDE) / (FAINT_MAGNITUDE - BRIGHT_MAGNITUDE);
    (MAX_SIZE - fraction * (MAX_SIZE - MIN_SIZE)).clamp(MIN_SIZE, MAX_SIZE)
}
