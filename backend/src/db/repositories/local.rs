//! In-memory local repository implementation.
//!
//! This module provides a local implementation of both store traits suitable
//! for unit testing and local development. Star rows are held per dataset in
//! shared, copy-on-write vectors so a running query stream never holds the lock.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::api::*;
use crate::db::repository::*;

/// In-memory local repository.
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use nightsky::api::StarRenderRow;
/// use nightsky::db::repositories::LocalRepository;
///
/// let repo = LocalRepository::new();
/// repo.insert_star(
///     "default",
///     StarRenderRow::new("sol", Vector3::zeros(), 4.83, 5772.0, Some("G2V"), "Sol"),
/// );
/// assert_eq!(repo.star_count("default"), 1);
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    datasets: HashMap<String, Arc<Vec<StarRenderRow>>>,
    orbits: HashMap<PlanetId, OrbitalElements>,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            datasets: HashMap::new(),
            orbits: HashMap::new(),
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Add a star to a dataset, creating the dataset if needed.
    pub fn insert_star(&self, dataset: &str, row: StarRenderRow) {
        let mut data = self.data.write();
        let rows = data.datasets.entry(dataset.to_string()).or_default();
        Arc::make_mut(rows).push(row);
    }

    /// Add many stars to a dataset at once.
    pub fn insert_stars(&self, dataset: &str, rows: impl IntoIterator<Item = StarRenderRow>) {
        let mut data = self.data.write();
        let entry = data.datasets.entry(dataset.to_string()).or_default();
        Arc::make_mut(entry).extend(rows);
    }

    /// Register (or replace) the orbital elements of a planet.
    pub fn insert_orbital_elements(&self, planet_id: impl Into<String>, elements: OrbitalElements) {
        self.data
            .write()
            .orbits
            .insert(PlanetId::new(planet_id), elements);
    }

    /// Set the health status for testing store failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            ..Default::default()
        };
    }

    /// Number of stars held in a dataset.
    pub fn star_count(&self, dataset: &str) -> usize {
        self.data
            .read()
            .datasets
            .get(dataset)
            .map(|rows| rows.len())
            .unwrap_or(0)
    }

    /// Load a JSON catalog seed into the repository.
    ///
    /// The seed has the shape:
    /// ```json
    /// {
    ///   "datasets": { "default": [ { "id": "sol", "x": 0.0, "y": 0.0, "z": 0.0, "magv": 4.83 } ] },
    ///   "planets": { "earth": { "semi_major_axis": 1.0, "orbital_period": 365.25 } }
    /// }
    /// ```
    ///
    /// # Returns
    /// Number of stars loaded.
    pub fn load_seed_file<P: AsRef<Path>>(&self, path: P) -> RepositoryResult<usize> {
        let path = path.as_ref();
        let context = || {
            ErrorContext::new("load_seed_file")
                .with_entity("seed")
                .with_entity_id(path.display())
        };

        let content = std::fs::read_to_string(path).map_err(|e| {
            RepositoryError::configuration_with_context(
                format!("Failed to read seed file: {}", e),
                context(),
            )
        })?;
        let seed: CatalogSeed = serde_json::from_str(&content).map_err(|e| {
            RepositoryError::configuration_with_context(
                format!("Failed to parse seed file: {}", e),
                context(),
            )
        })?;

        self.load_seed(seed)
    }

    /// Validates every row before inserting any, so a bad seed loads nothing.
    fn load_seed(&self, seed: CatalogSeed) -> RepositoryResult<usize> {
        for (dataset, stars) in &seed.datasets {
            if let Some(index) = stars.iter().position(|star| star.id.trim().is_empty()) {
                return Err(RepositoryError::validation_with_context(
                    "Seed star has a blank id",
                    ErrorContext::new("load_seed")
                        .with_entity("star")
                        .with_details(format!("dataset={} index={}", dataset, index)),
                ));
            }
        }

        let mut loaded = 0;
        for (dataset, stars) in seed.datasets {
            loaded += stars.len();
            self.insert_stars(&dataset, stars.iter().map(CatalogStar::to_render_row));
        }
        for (planet_id, elements) in seed.planets {
            self.insert_orbital_elements(planet_id, elements);
        }
        Ok(loaded)
    }

    fn ensure_healthy(&self, operation: &str) -> RepositoryResult<()> {
        if self.data.read().is_healthy {
            Ok(())
        } else {
            Err(RepositoryError::connection_with_context(
                "Local repository marked unhealthy",
                ErrorContext::new(operation),
            ))
        }
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct CatalogSeed {
    datasets: HashMap<String, Vec<CatalogStar>>,
    planets: HashMap<String, OrbitalElements>,
}

#[async_trait]
impl StarRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    fn stream_stars_in_box<'a>(&'a self, dataset: &'a str, bounds: BoundingBox) -> StarStream<'a> {
        Box::pin(async_stream::stream! {
            if let Err(e) = self.ensure_healthy("stream_stars_in_box") {
                yield Err(e);
                return;
            }
            if !bounds.is_finite() {
                yield Err(RepositoryError::query_with_context(
                    "Bounding box must be finite",
                    ErrorContext::new("stream_stars_in_box")
                        .with_entity("dataset")
                        .with_entity_id(dataset),
                ));
                return;
            }

            // Snapshot the dataset; inserts made after this point are not seen.
            let rows = self.data.read().datasets.get(dataset).cloned();
            if let Some(rows) = rows {
                for row in rows.iter() {
                    if bounds.contains(&row.position_ly) {
                        yield Ok(row.clone());
                    }
                }
            }
        })
    }

    async fn get_star(&self, star_id: &StarId) -> RepositoryResult<Option<StarRenderRow>> {
        self.ensure_healthy("get_star")?;
        let data = self.data.read();
        Ok(data
            .datasets
            .values()
            .flat_map(|rows| rows.iter())
            .find(|row| &row.id == star_id)
            .cloned())
    }

    async fn list_datasets(&self) -> RepositoryResult<Vec<String>> {
        self.ensure_healthy("list_datasets")?;
        let mut names: Vec<String> = self.data.read().datasets.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

#[async_trait]
impl OrbitRepository for LocalRepository {
    async fn get_orbital_elements(
        &self,
        planet_id: &PlanetId,
    ) -> RepositoryResult<Option<OrbitalElements>> {
        self.ensure_healthy("get_orbital_elements")?;
        Ok(self.data.read().orbits.get(planet_id).cloned())
    }
}
