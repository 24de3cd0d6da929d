//! Store trait definitions.
//!
//! The engine reads from two external stores: the star store (positions and
//! photometry, grouped in named datasets) and the orbital-elements store.
//! Both are read-only from the engine's point of view.
//!
//! # Module Organization
//!
//! - [`error`]: Error types for store operations
//! - [`stars`]: Star store, streaming bounding-box queries
//! - [`orbits`]: Orbital-elements store
//!
//! # Convenience Trait Bound
//!
//! Services that need both stores take an `Arc<dyn FullRepository>`:
//!
//! ```ignore
//! async fn host_and_orbit<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<()> {
//!     let star = repo.get_star(&StarId::new("sol")).await?;
//!     let orbit = repo.get_orbital_elements(&PlanetId::new("earth")).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod orbits;
pub mod stars;

// Re-export error types
pub use error::{ErrorContext, RepositoryError, RepositoryResult};

// Re-export all traits
pub use orbits::OrbitRepository;
pub use stars::{StarRepository, StarStream};

/// Composite trait bound for a complete store implementation.
pub trait FullRepository: StarRepository + OrbitRepository {}

// Blanket implementation: any type implementing both traits automatically implements FullRepository
impl<T> FullRepository for T where T: StarRepository + OrbitRepository {}
