//! `runwatch.ron` loading and environment overrides.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use runwatch_engine::ClientSettings;
use runwatch_logging::{monitor_debug, monitor_info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FILENAME: &str = "runwatch.ron";
pub const ENV_BASE_URL: &str = "RUNWATCH_API_BASE_URL";
pub const ENV_SESSION_COOKIE: &str = "RUNWATCH_SESSION_COOKIE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("api_base_url must start with http:// or https://, got {0:?}")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub api_base_url: String,
    pub session_cookie: Option<String>,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        let client = ClientSettings::default();
        Self {
            api_base_url: client.base_url,
            session_cookie: None,
            connect_timeout_secs: client.connect_timeout.as_secs(),
            request_timeout_secs: client.request_timeout.as_secs(),
        }
    }
}

impl MonitorConfig {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                monitor_debug!("No config at {:?}; using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config: Self = ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        monitor_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Empty values are ignored so an exported-but-blank variable does not
    /// wipe the file setting.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|value| !value.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(cookie) = lookup(ENV_SESSION_COOKIE).filter(|value| !value.trim().is_empty()) {
            self.session_cookie = Some(cookie);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api_base_url.trim();
        if url.starts_with("http://") || url.starts_with("https://") {
            Ok(())
        } else {
            Err(ConfigError::InvalidBaseUrl(self.api_base_url.clone()))
        }
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.api_base_url.trim().to_string(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs.max(1)),
            request_timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
            session_cookie: self.session_cookie.clone(),
        }
    }
}
