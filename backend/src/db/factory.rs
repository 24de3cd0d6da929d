//! Repository factory for dependency injection.
//!
//! Builds store instances from the `[repository]` configuration section.

use std::str::FromStr;
use std::sync::Arc;

use super::repositories::LocalRepository;
use super::repository::{FullRepository, RepositoryError, RepositoryResult};
use crate::config::RepositorySettings;

/// Repository type configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// In-memory local repository
    Local,
}

impl FromStr for RepositoryType {
    type Err = RepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "memory" => Ok(Self::Local),
            _ => Err(RepositoryError::configuration(format!(
                "Unknown repository type: {}",
                s
            ))),
        }
    }
}

pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create an empty in-memory repository.
    pub fn create_local() -> Arc<dyn FullRepository> {
        Arc::new(LocalRepository::new())
    }

    /// Create the repository described by `settings`, loading the seed
    /// catalog when one is configured.
    pub fn from_settings(settings: &RepositorySettings) -> RepositoryResult<Arc<dyn FullRepository>> {
        match settings.repo_type.parse::<RepositoryType>()? {
            RepositoryType::Local => {
                let repo = LocalRepository::new();
                if let Some(seed) = &settings.seed_path {
                    let stars = repo.load_seed_file(seed)?;
                    log::info!("Seeded local repository with {} stars from {}", stars, seed.display());
                }
                Ok(Arc::new(repo))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::StarRepository;
    use std::io::Write;

    #[test]
    fn test_repository_type_parsing() {
        assert_eq!("local".parse::<RepositoryType>().unwrap(), RepositoryType::Local);
        assert_eq!(" LOCAL ".parse::<RepositoryType>().unwrap(), RepositoryType::Local);
        assert!(matches!(
            "postgres".parse::<RepositoryType>(),
            Err(RepositoryError::ConfigurationError { .. })
        ));
    }

    #[tokio::test]
    async fn test_from_settings_without_seed() {
        let repo = RepositoryFactory::from_settings(&RepositorySettings::default()).unwrap();
        assert!(repo.health_check().await.unwrap());
        assert!(repo.list_datasets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_from_settings_with_seed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"datasets": {{"hyg": [{{"id": "sol", "x": 0, "y": 0, "z": 0, "absolute_magnitude": 4.83}}]}}}}"#
        )
        .unwrap();

        let settings = RepositorySettings {
            seed_path: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let repo = RepositoryFactory::from_settings(&settings).unwrap();
        assert_eq!(repo.list_datasets().await.unwrap(), vec!["hyg".to_string()]);
    }

    #[test]
    fn test_from_settings_missing_seed_fails() {
        let settings = RepositorySettings {
            seed_path: Some("/no/such/seed.json".into()),
            ..Default::default()
        };
        assert!(RepositoryFactory::from_settings(&settings).is_err());
    }
}
