use serde::*;

/// Julian Date at the Unix epoch (1970-01-01 00:00:00 UTC).
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// Julian Date of the J2000.0 reference epoch (2000-01-01 12:00:00).
pub const J2000_JD: f64 = 2_451_545.0;

/// Days per Julian century.
pub const DAYS_PER_JULIAN_CENTURY: f64 = 36_525.0;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Julian Date representation.
/// JD 0 = -4712-01-01 12:00:00 (proleptic Julian calendar)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct JulianDate(qtty::Days);

impl JulianDate {
    /// The J2000.0 epoch.
    pub const J2000: JulianDate = JulianDate(qtty::Days::new(J2000_JD));

    /// Create a new JD value.
    pub fn new<V: Into<qtty::Days>>(v: V) -> Self {
        Self(v.into())
    }

    /// Raw JD value as f64.
    pub fn value(&self) -> f64 {
        self.0.value()
    }

    /// Days elapsed since J2000.0 (negative before the epoch).
    pub fn days_since_j2000(&self) -> f64 {
        self.value() - J2000_JD
    }

    /// Julian centuries elapsed since J2000.0.
    pub fn centuries_since_j2000(&self) -> f64 {
        self.days_since_j2000() / DAYS_PER_JULIAN_CENTURY
    }

    /// Convert to Unix time in milliseconds.
    pub fn to_unix_millis(&self) -> f64 {
        (self.value() - UNIX_EPOCH_JD) * MILLIS_PER_DAY
    }

    /// Create from Unix time in milliseconds.
    pub fn from_unix_millis(millis: f64) -> Self {
        Self::new(millis / MILLIS_PER_DAY + UNIX_EPOCH_JD)
    }

    /// Create from chrono DateTime<Utc> (millisecond resolution).
    pub fn from_datetime(dt: chrono::DateTime<chrono::Utc>) -> Self {
        Self::from_unix_millis(dt.timestamp_millis() as f64)
    }

    /// Convert to chrono DateTime<Utc>, rounded to the nearest millisecond.
    pub fn to_datetime(&self) -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::from_timestamp_millis(self.to_unix_millis().round() as i64)
            .unwrap_or(chrono::DateTime::UNIX_EPOCH)
    }
}

impl From<f64> for JulianDate {
    fn from(v: f64) -> Self {
        JulianDate::new(v)
    }
}

/// Astronomical time derived from a UTC instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AstronomicalTime {
    /// Julian Date on the UTC scale.
    pub julian_date_utc: JulianDate,
    /// Julian Date on the TT scale (UTC + ΔT).
    pub julian_date_tt: JulianDate,
    /// Julian centuries of TT since J2000.0.
    pub julian_centuries_tt: f64,
    /// Greenwich mean sidereal time in radians, in [0, 2π).
    pub gmst_rad: f64,
}
