//! Per-user config file holding the remote backend credential.
//!
//! The file lives at `~/.aicommits.json` (overridable with `AICOMMIT_CONFIG`)
//! and is only read when the remote backend is selected:
//!
//! ```json
//! { "GEMINI_API_KEY": "...", "GEMINI_MODEL": "gemini-3-flash-preview" }
//! ```

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;

/// Config file name in the user's home directory.
pub const CONFIG_FILE_NAME: &str = ".aicommits.json";

/// Environment variable to override the config file location.
pub const CONFIG_PATH_ENV_VAR: &str = "AICOMMIT_CONFIG";

/// Default Gemini model when the config does not name one.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";

/// Raw contents of the config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(rename = "GEMINI_API_KEY", default)]
    pub gemini_api_key: Option<String>,
    #[serde(rename = "GEMINI_MODEL", default)]
    pub gemini_model: Option<String>,
}

/// Validated settings for the remote backend, loaded once at startup.
#[derive(Clone)]
pub struct RemoteConfig {
    pub api_key: String,
    pub model: String,
}

impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

/// Resolve the config file path.
///
/// Uses `AICOMMIT_CONFIG` if set and non-empty, otherwise `~/.aicommits.json`.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    match env::var(CONFIG_PATH_ENV_VAR) {
        Ok(v) if !v.trim().is_empty() => Ok(PathBuf::from(v)),
        _ => dirs::home_dir()
            .map(|home| home.join(CONFIG_FILE_NAME))
            .ok_or(ConfigError::NoHomeDir),
    }
}

/// Read and parse the config file at `path`.
pub fn load_config(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Unreadable {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    debug!("Loaded config from {}", path.display());

    serde_json::from_str(&content).map_err(|source| ConfigError::Invalid {
        path: path.to_path_buf(),
        source,
    })
}

impl ConfigFile {
    /// Validate the remote backend settings; the API key must be present and non-empty.
    pub fn into_remote(self, path: &Path) -> Result<RemoteConfig, ConfigError> {
        let api_key = self
            .gemini_api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ConfigError::MissingCredential {
                path: path.to_path_buf(),
            })?;

        let model = self
            .gemini_model
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());

        Ok(RemoteConfig { api_key, model })
    }
}

/// Load the remote backend settings from the config file at `path`.
pub fn load_remote_config(path: &Path) -> Result<RemoteConfig, ConfigError> {
    load_config(path)?.into_remote(path)
}
