//! Application-level configuration loading: storage backend selection and
//! the team-size preferences used to infer a default team count.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "PICKUP_GAMES_CONFIG_PATH";
/// Common team sizes, most preferred first.
const DEFAULT_TEAM_SIZES: [u32; 6] = [11, 7, 6, 5, 4, 3];

/// Persistence backend the server should connect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local maps; data is lost on restart.
    #[default]
    Memory,
    /// MongoDB, configured through `MONGO_URI` / `MONGO_DB`.
    Mongo,
    /// CouchDB, configured through the `COUCH_*` variables.
    Couch,
}

impl StorageBackend {
    /// Lowercase name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            StorageBackend::Memory => "memory",
            StorageBackend::Mongo => "mongo",
            StorageBackend::Couch => "couch",
        }
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    storage: StorageBackend,
    team_sizes: Vec<u32>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        storage = app_config.storage.as_str(),
                        team_sizes = ?app_config.team_sizes,
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Selected storage backend.
    pub fn storage(&self) -> StorageBackend {
        self.storage
    }

    /// Team sizes tried in order when inferring how many teams a game splits into.
    pub fn team_sizes(&self) -> &[u32] {
        &self.team_sizes
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageBackend::default(),
            team_sizes: DEFAULT_TEAM_SIZES.to_vec(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    storage: StorageBackend,
    #[serde(default)]
    team_sizes: Option<Vec<u32>>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        // Sizes below two cannot form a team.
        let team_sizes = value
            .team_sizes
            .map(|sizes| sizes.into_iter().filter(|size| *size >= 2).collect::<Vec<_>>())
            .filter(|sizes| !sizes.is_empty())
            .unwrap_or_else(|| DEFAULT_TEAM_SIZES.to_vec());

        Self {
            storage: value.storage,
            team_sizes,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
