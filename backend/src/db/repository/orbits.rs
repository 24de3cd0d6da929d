//! Orbital-elements store trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{OrbitalElements, PlanetId};

/// Repository trait for planetary orbital elements.
#[async_trait]
pub trait OrbitRepository: Send + Sync {
    /// Fetch the orbital elements of a planet.
    ///
    /// # Returns
    /// * `Ok(None)` - If the planet doesn't exist
    async fn get_orbital_elements(
        &self,
        planet_id: &PlanetId,
    ) -> RepositoryResult<Option<OrbitalElements>>;
}
