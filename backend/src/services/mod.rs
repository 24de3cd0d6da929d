//! Service layer: the night-sky pipeline and its building blocks.
//!
//! [`night_sky::NightSkyService`] orchestrates the others. The pure math
//! (ephemeris, sky transform, photometry) is exposed as free functions so it
//! can be used and tested without a store.

pub mod cache;
pub mod ephemeris;
pub mod error;
pub mod night_sky;
pub mod photometry;
pub mod planetary_sky;
pub mod sky_transform;
pub mod star_query;
pub mod time;

pub use cache::{CacheKey, CacheStats, Clock, EvictionPolicy, ManualClock, NightSkyCache, SystemClock};
pub use ephemeris::{EphemerisService, KeplerSolution};
pub use error::{NightSkyError, NightSkyResultOf};
pub use night_sky::NightSkyService;
pub use planetary_sky::{PlanetarySkyModel, VisibleStar};
pub use star_query::{select_lod, StarQueryService};
pub use time::{TimeContext, TimeScales, TimeService};
