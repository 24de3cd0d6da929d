//! Store layer for star catalogs and planetary orbital elements.
//!
//! The services depend only on the traits in [`repository`]; concrete stores
//! live in [`repositories`] and are built by [`factory`].
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  Services (ephemeris, star query, night sky) │
//! └───────────────────┬──────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────┐
//! │  StarRepository + OrbitRepository traits     │
//! └───────────────────┬──────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────┐
//! │  LocalRepository (in-memory, JSON seed)      │
//! └──────────────────────────────────────────────┘
//! ```

#[cfg(not(feature = "local-repo"))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repositories;
pub mod repository;

pub use factory::{RepositoryFactory, RepositoryType};
pub use repositories::LocalRepository;
pub use repository::{
    ErrorContext, FullRepository, OrbitRepository, RepositoryError, RepositoryResult,
    StarRepository, StarStream,
};
