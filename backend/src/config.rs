//! Engine configuration file support.
//!
//! Settings are read from a TOML file (`nightsky.toml`). Every field has a
//! default, so an empty file or a missing section is valid. A relative
//! `seed_path` is resolved against the directory holding the file.
//!
//! ```toml
//! [cache]
//! ttl_seconds = 300
//! capacity = 100
//!
//! [time]
//! delta_t_seconds = 69.184
//!
//! [repository]
//! type = "local"
//! seed_path = "data/catalog.json"
//!
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::db::repository::{ErrorContext, RepositoryError};
use crate::services::cache::{EvictionPolicy, DEFAULT_CAPACITY, DEFAULT_TTL_SECONDS};
use crate::services::time::{TimeScales, DEFAULT_DELTA_T_SECONDS};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "NIGHTSKY_CONFIG";

const DEFAULT_FILE_NAME: &str = "nightsky.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NightSkyConfig {
    pub cache: CacheSettings,
    pub time: TimeSettings,
    pub repository: RepositorySettings,
    pub server: ServerSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub ttl_seconds: u64,
    pub capacity: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_TTL_SECONDS,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeSettings {
    /// TT − UTC in seconds.
    pub delta_t_seconds: f64,
}

impl Default for TimeSettings {
    fn default() -> Self {
        Self {
            delta_t_seconds: DEFAULT_DELTA_T_SECONDS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositorySettings {
    #[serde(rename = "type")]
    pub repo_type: String,
    /// JSON catalog seed loaded into the local store at startup.
    pub seed_path: Option<PathBuf>,
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            repo_type: "local".to_string(),
            seed_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerSettings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl NightSkyConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let path = path.as_ref();
        let context = || {
            ErrorContext::new("load_config")
                .with_entity("config_file")
                .with_entity_id(path.display())
        };

        let content = fs::read_to_string(path).map_err(|e| {
            RepositoryError::configuration_with_context(
                format!("Failed to read config file: {}", e),
                context(),
            )
        })?;

        let mut config: Self = toml::from_str(&content).map_err(|e| {
            RepositoryError::configuration_with_context(
                format!("Failed to parse config file: {}", e),
                context(),
            )
        })?;

        // A relative seed path is relative to the config file.
        if let (Some(seed), Some(dir)) = (config.repository.seed_path.as_mut(), path.parent()) {
            if seed.is_relative() {
                *seed = dir.join(&*seed);
            }
        }

        Ok(config)
    }

    /// Load configuration from the first `nightsky.toml` found in the current
    /// directory, `backend/`, or the parent directory.
    pub fn from_default_location() -> Result<Self, RepositoryError> {
        let search_paths = [
            PathBuf::from(DEFAULT_FILE_NAME),
            PathBuf::from("backend").join(DEFAULT_FILE_NAME),
            PathBuf::from("..").join(DEFAULT_FILE_NAME),
        ];

        search_paths
            .iter()
            .find(|path| path.exists())
            .map(Self::from_file)
            .unwrap_or_else(|| {
                Err(RepositoryError::configuration(format!(
                    "No {} found in standard locations",
                    DEFAULT_FILE_NAME
                )))
            })
    }

    /// Resolve the configuration for a server process.
    ///
    /// `NIGHTSKY_CONFIG` names the file explicitly and must be readable.
    /// Otherwise the default locations are searched, falling back to built-in
    /// defaults. `HOST` and `PORT` override the server section.
    pub fn load_or_default() -> Result<Self, RepositoryError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::from_default_location().unwrap_or_else(|e| {
                log::info!("Using default configuration ({})", e);
                Self::default()
            }),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `HOST` / `PORT` overrides read through `lookup`.
    ///
    /// An unparseable `PORT` is ignored with a warning.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("HOST").filter(|h| !h.trim().is_empty()) {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => log::warn!("Ignoring invalid PORT value: {}", port),
            }
        }
    }

    pub fn eviction_policy(&self) -> EvictionPolicy {
        EvictionPolicy::new(self.cache.ttl_seconds, self.cache.capacity)
    }

    pub fn time_scales(&self) -> TimeScales {
        TimeScales {
            delta_t_seconds: self.time.delta_t_seconds,
        }
    }
}
