//! Star store trait.

use async_trait::async_trait;
use futures::stream::BoxStream;

use super::error::RepositoryResult;
use crate::api::{BoundingBox, StarId, StarRenderRow};

/// Lazily produced star rows; the consumer decides how many to pull.
pub type StarStream<'a> = BoxStream<'a, RepositoryResult<StarRenderRow>>;

/// Repository trait for the star store.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait StarRepository: Send + Sync {
    /// Check if the store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Stream every star of `dataset` whose position lies inside `bounds`.
    ///
    /// An unknown dataset yields an empty stream. Rows are produced lazily so
    /// the caller can stop early without the full dataset being materialized.
    fn stream_stars_in_box<'a>(&'a self, dataset: &'a str, bounds: BoundingBox) -> StarStream<'a>;

    /// Look up a single star by id, across all datasets.
    ///
    /// # Returns
    /// * `Ok(None)` - If the star doesn't exist
    async fn get_star(&self, star_id: &StarId) -> RepositoryResult<Option<StarRenderRow>>;

    /// Names of the datasets currently held.
    async fn list_datasets(&self) -> RepositoryResult<Vec<String>>;
}
