//! Client configuration.
//!
//! Resolution order, later wins:
//! 1. Built-in defaults
//! 2. `~/.ragchat/config.json`, when present
//! 3. `RAGCHAT_URL` and `RAGCHAT_CONNECT_TIMEOUT`
//! 4. Command-line flags (applied by the binary)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{RagError, RagResult};
use crate::transport::DEFAULT_BASE_URL;

/// Directory under the home directory holding config and credentials.
pub const CONFIG_DIR: &str = ".ragchat";

/// The config file name.
pub const CONFIG_FILE: &str = "config.json";

pub const ENV_URL: &str = "RAGCHAT_URL";
pub const ENV_CONNECT_TIMEOUT: &str = "RAGCHAT_CONNECT_TIMEOUT";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Resolved client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the assistant service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bound on connection establishment. None means the HTTP client default.
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,

    /// Where the API key is stored. None means `~/.ragchat/credentials.json`.
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            connect_timeout_secs: None,
            credentials_path: None,
        }
    }
}

impl ClientConfig {
    /// Path of the default config file, if the home directory is known.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load from `path` (or the default location) and apply environment
    /// overrides. A missing file is not an error.
    pub fn load(path: Option<&Path>) -> RagResult<Self> {
        let path = path.map(Path::to_path_buf).or_else(Self::default_path);

        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) => {
                tracing::debug!("No config file at {}, using defaults", path.display());
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_vars()?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> RagResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| RagError::Config(format!("Failed to read config file: {}", e)))?;
        serde_json::from_str(&contents)
            .map_err(|e| RagError::Config(format!("Failed to parse config: {}", e)))
    }

    fn apply_env_vars(&mut self) -> RagResult<()> {
        if let Ok(url) = std::env::var(ENV_URL) {
            if !url.trim().is_empty() {
                self.base_url = url.trim().to_string();
            }
        }

        if let Ok(timeout) = std::env::var(ENV_CONNECT_TIMEOUT) {
            let secs = timeout.trim().parse::<u64>().map_err(|_| {
                RagError::Config(format!("Invalid {}: {}", ENV_CONNECT_TIMEOUT, timeout))
            })?;
            self.connect_timeout_secs = Some(secs);
        }

        Ok(())
    }

    /// Apply command-line overrides.
    pub fn with_overrides(mut self, base_url: Option<String>) -> RagResult<Self> {
        if let Some(url) = base_url {
            self.base_url = url.trim().to_string();
        }
        self.validate()?;
        Ok(self)
    }

    /// Check the settings make sense.
    pub fn validate(&self) -> RagResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(RagError::Config(format!(
                "Server URL must start with http:// or https://: {}",
                self.base_url
            )));
        }
        if self.connect_timeout_secs == Some(0) {
            return Err(RagError::Config(
                "connect_timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }

    /// Configured credentials path, falling back to the default location.
    pub fn credentials_path(&self) -> Option<PathBuf> {
        self.credentials_path.clone().or_else(|| {
            dirs::home_dir().map(|home| {
                home.join(CONFIG_DIR)
                    .join(crate::adapters::file_credentials::CREDENTIALS_FILE)
            })
        })
    }
}
