//! Time service: calendar instants to Julian dates and sidereal time.
//!
//! The time scales (TT−UTC offset) live in an explicit [`TimeContext`] that
//! is initialized once and handed to the services that need it. Any
//! conversion attempted before initialization fails with
//! [`NightSkyError::Initialization`].

use chrono::{DateTime, Utc};
use qtty::{Degrees, Radian, Radians};
use std::sync::{Arc, OnceLock};

use crate::api::{AstronomicalTime, JulianDate};
use crate::services::error::{ErrorContext, NightSkyError};

/// TT−UTC at the J2000 epoch region (32.184 s + 37 leap seconds).
pub const DEFAULT_DELTA_T_SECONDS: f64 = 69.184;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Time-scale parameters fixed at initialization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScales {
    /// TT − UTC in seconds.
    pub delta_t_seconds: f64,
}

impl Default for TimeScales {
    fn default() -> Self {
        Self {
            delta_t_seconds: DEFAULT_DELTA_T_SECONDS,
        }
    }
}

/// Set-once holder for the astronomical time scales.
#[derive(Debug, Default)]
pub struct TimeContext {
    scales: OnceLock<TimeScales>,
}

impl TimeContext {
    /// An uninitialized context.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that is ready for use.
    pub fn initialized(scales: TimeScales) -> Self {
        let context = Self::new();
        context.initialize(scales);
        context
    }

    /// Initialize the context. Returns false if it was already initialized,
    /// in which case the first scales stay in effect.
    pub fn initialize(&self, scales: TimeScales) -> bool {
        let fresh = self.scales.set(scales).is_ok();
        if fresh {
            log::info!(
                "Time context initialized (ΔT = {:.3} s)",
                scales.delta_t_seconds
            );
        }
        fresh
    }

    pub fn is_initialized(&self) -> bool {
        self.scales.get().is_some()
    }

    /// The time scales, or an initialization error if not yet set.
    pub fn scales(&self) -> Result<&TimeScales, NightSkyError> {
        self.scales.get().ok_or_else(|| {
            NightSkyError::initialization_with_context(
                "astronomical time backend is not initialized",
                ErrorContext::new("time_scales").with_entity("time_context"),
            )
        })
    }
}

/// Greenwich mean sidereal time (IAU 1982 polynomial), radians in [0, 2π).
pub fn gmst_rad(jd_utc: JulianDate) -> f64 {
    let d = jd_utc.days_since_j2000();
    let t = jd_utc.centuries_since_j2000();
    let gmst = Degrees::new(
        280.460_618_37 + 360.985_647_366_29 * d + 0.000_387_933 * t * t
            - t * t * t / 38_710_000.0,
    );
    wrap_rad(gmst.to::<Radian>())
}

/// Wrap an angle into [0, 2π), folding the rounding edge case back to 0.
pub(crate) fn wrap_rad(angle: Radians) -> f64 {
    let wrapped = angle.wrap_pos().value();
    if wrapped >= std::f64::consts::TAU {
        0.0
    } else {
        wrapped
    }
}

/// Converts UTC instants to astronomical time.
#[derive(Debug, Clone)]
pub struct TimeService {
    context: Arc<TimeContext>,
}

impl TimeService {
    pub fn new(context: Arc<TimeContext>) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &Arc<TimeContext> {
        &self.context
    }

    /// Check that the time backend is ready.
    pub fn ensure_ready(&self) -> Result<(), NightSkyError> {
        self.context.scales().map(|_| ())
    }

    /// Julian Date on the UTC scale.
    pub fn to_julian_date(&self, instant: DateTime<Utc>) -> Result<JulianDate, NightSkyError> {
        self.ensure_ready()?;
        Ok(JulianDate::from_datetime(instant))
    }

    pub fn to_astronomical_time(
        &self,
        instant: DateTime<Utc>,
    ) -> Result<AstronomicalTime, NightSkyError> {
        let scales = self.context.scales()?;
        let julian_date_utc = JulianDate::from_datetime(instant);
        let julian_date_tt =
            JulianDate::new(julian_date_utc.value() + scales.delta_t_seconds / SECONDS_PER_DAY);

        Ok(AstronomicalTime {
            julian_date_utc,
            julian_date_tt,
            julian_centuries_tt: julian_date_tt.centuries_since_j2000(),
            gmst_rad: gmst_rad(julian_date_utc),
        })
    }

    /// Local sidereal time at east longitude `lon_rad`, radians in [0, 2π).
    pub fn local_sidereal_time(
        &self,
        instant: DateTime<Utc>,
        lon_rad: f64,
    ) -> Result<f64, NightSkyError> {
        let time = self.to_astronomical_time(instant)?;
        Ok(wrap_rad(Radians::new(time.gmst_rad + lon_rad)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::f64::consts::{PI, TAU};

    fn service() -> TimeService {
        TimeService::new(Arc::new(TimeContext::initialized(TimeScales::default())))
    }

    #[test]
    fn test_uninitialized_context_fails() {
        let service = TimeService::new(Arc::new(TimeContext::new()));
        let instant = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        assert!(matches!(
            service.to_julian_date(instant),
            Err(NightSkyError::Initialization { .. })
        ));
        assert!(service.to_astronomical_time(instant).is_err());
        assert!(service.local_sidereal_time(instant, 0.0).is_err());
    }

    #[test]
    fn test_initialize_only_once() {
        let context = TimeContext::new();
        assert!(context.initialize(TimeScales {
            delta_t_seconds: 64.0
        }));
        assert!(!context.initialize(TimeScales::default()));
        assert_eq!(context.scales().unwrap().delta_t_seconds, 64.0);
    }

    #[test]
    fn test_julian_date_j2000() {
        let instant = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        let jd = service().to_julian_date(instant).unwrap();
        assert!((jd.value() - 2_451_545.0).abs() < 1e-9);
    }

    #[test]
    fn test_tt_offset() {
        let instant = Utc.with_ymd_and_hms(2010, 7, 1, 0, 0, 0).unwrap();
        let time = service().to_astronomical_time(instant).unwrap();
        let offset_s =
            (time.julian_date_tt.value() - time.julian_date_utc.value()) * SECONDS_PER_DAY;
        assert!((offset_s - DEFAULT_DELTA_T_SECONDS).abs() < 1e-3);
    }

    #[test]
    fn test_gmst_at_j2000() {
        // 280.46061837° at J2000.0
        let gmst = gmst_rad(JulianDate::J2000);
        assert!((gmst - 280.460_618_37_f64.to_radians()).abs() < 1e-12);
    }

    #[test]
    fn test_gmst_reference_value() {
        // Meeus example 12.b: 1987-04-10 19:21:00 UT, GMST = 128.7378734°
        let instant = Utc.with_ymd_and_hms(1987, 4, 10, 19, 21, 0).unwrap();
        let gmst = gmst_rad(JulianDate::from_datetime(instant)).to_degrees();
        assert!((gmst - 128.737_873_4).abs() < 1e-4);
    }

    #[test]
    fn test_local_sidereal_time_wraps() {
        let service = service();
        let instant = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        let lst_east = service.local_sidereal_time(instant, PI).unwrap();
        let lst_west = service.local_sidereal_time(instant, -PI).unwrap();

        assert!((0.0..TAU).contains(&lst_east));
        assert!((0.0..TAU).contains(&lst_west));
        assert!((lst_east - lst_west).abs() < 1e-9);
    }

    #[test]
    fn test_repeatable_for_fixed_instant() {
        let service = service();
        let instant = Utc.with_ymd_and_hms(2031, 2, 3, 4, 5, 6).unwrap();
        let a = service.to_astronomical_time(instant).unwrap();
        let b = service.to_astronomical_time(instant).unwrap();
        assert_eq!(a, b);
        assert_eq!(JulianDate::from_datetime(instant).to_datetime(), instant);
    }
}
