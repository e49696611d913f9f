use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

pub const DEFAULT_CONFIG_PATH: &str = "/etc/pkgsift.toml";

/// Paths and repositories for one invocation.
///
/// `repos` fixes the sync database search order; when empty, the
/// subdirectories of `<db_path>/sync` are discovered in sorted order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiftConfig {
    /// Filesystem root stripped from file-ownership search terms.
    pub root: PathBuf,
    pub db_path: PathBuf,
    pub cache_dirs: Vec<PathBuf>,
    pub repos: Vec<String>,
}

impl Default for SiftConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/"),
            db_path: PathBuf::from("/var/lib/pkgsift"),
            cache_dirs: vec![PathBuf::from("/var/cache/pkgsift/pkg")],
            repos: Vec::new(),
        }
    }
}

/// Load configuration. An explicit path must exist and parse; the
/// default path is optional and silently falls back to defaults.
pub fn load_config(path: Option<&Path>) -> Result<SiftConfig, ConfigError> {
    match path {
        Some(path) => load_config_from_path(path),
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            if default.exists() {
                load_config_from_path(default)
            } else {
                Ok(SiftConfig::default())
            }
        }
    }
}

pub fn load_config_from_path(path: &Path) -> Result<SiftConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str::<SiftConfig>(&raw).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}
