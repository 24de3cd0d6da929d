//! Candidate star retrieval around an observer.
//!
//! The store is asked for a bounding cube; rows are then filtered by exact
//! distance and the level-of-detail magnitude cutoff while streaming, and
//! the stream is dropped as soon as the level's count cap is reached.

use futures::StreamExt;
use nalgebra::Vector3;
use std::sync::Arc;

use crate::api::{BoundingBox, LevelOfDetail, StarId, StarRenderRow};
use crate::db::repository::{FullRepository, StarRepository};
use crate::services::error::NightSkyError;

/// Level of detail whose cutoff covers `magnitude_limit`.
pub fn select_lod(magnitude_limit: f64) -> LevelOfDetail {
    LevelOfDetail::for_magnitude_limit(magnitude_limit)
}

#[derive(Clone)]
pub struct StarQueryService {
    repository: Arc<dyn FullRepository>,
}

impl StarQueryService {
    pub fn new(repository: Arc<dyn FullRepository>) -> Self {
        Self { repository }
    }

    /// Stars of `dataset` within `radius_ly` of `center`, in store order,
    /// at most `lod.max_stars()` of them.
    ///
    /// An unknown dataset gives an empty list.
    pub async fn query_candidates(
        &self,
        center: &Vector3<f64>,
        radius_ly: f64,
        dataset: &str,
        lod: LevelOfDetail,
    ) -> Result<Vec<StarRenderRow>, NightSkyError> {
        let bounds = BoundingBox::around(center, radius_ly);
        let magnitude_limit = lod.magnitude_limit();
        let cap = lod.max_stars();

        let mut stream = self.repository.stream_stars_in_box(dataset, bounds);
        let mut candidates = Vec::new();
        let mut scanned = 0usize;
        let mut out_of_radius = 0usize;
        let mut too_faint = 0usize;

        while let Some(row) = stream.next().await {
            let row = row?;
            scanned += 1;

            if (row.position_ly - center).norm() > radius_ly {
                out_of_radius += 1;
                continue;
            }
            if row.absolute_magnitude > magnitude_limit {
                too_faint += 1;
                continue;
            }

            candidates.push(row);
            if candidates.len() >= cap {
                log::debug!("Candidate cap {} reached for LOD {}", cap, lod);
                break;
            }
        }

        log::debug!(
            "Dataset {}: scanned {}, outside radius {}, beyond LOD {} {}, kept {}",
            dataset,
            scanned,
            out_of_radius,
            lod,
            too_faint,
            candidates.len()
        );
        Ok(candidates)
    }

    /// The host star, if the store knows it.
    pub async fn get_host_star(
        &self,
        host_star_id: &StarId,
    ) -> Result<Option<StarRenderRow>, NightSkyError> {
        let host = self.repository.get_star(host_star_id).await?;
        if host.is_none() {
            log::warn!("Host star not found: {}", host_star_id);
        }
        Ok(host)
    }
}
