//! Client configuration, loaded from TOML and layered with env and flags.
//!
//! Precedence, lowest first: built-in defaults, the config file, the
//! `BASKETLAB_API_URL` environment variable, then an explicit `--api-url`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Service base URL used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Environment variable overriding `api_url`.
pub const API_URL_ENV: &str = "BASKETLAB_API_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(String),

    #[error("invalid api_url '{0}': expected an http:// or https:// URL")]
    InvalidUrl(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Base URL of the backtest service.
    pub api_url: String,
    /// Per-request timeout. Unset means requests may wait indefinitely.
    pub request_timeout_secs: Option<u64>,
    /// Log file for the TUI. Unset means the data-dir default.
    pub log_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: None,
            log_file: None,
        }
    }
}

impl ClientConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Build the effective configuration.
    ///
    /// `explicit_path` must exist when given. `default_path` is used only if it
    /// exists; a missing default file just means defaults. The result is
    /// validated before it is returned.
    pub fn resolve(
        explicit_path: Option<&Path>,
        default_path: Option<&Path>,
        env_url: Option<String>,
        flag_url: Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match (explicit_path, default_path) {
            (Some(path), _) => Self::from_file(path)?,
            (None, Some(path)) if path.exists() => Self::from_file(path)?,
            _ => Self::default(),
        };

        if let Some(url) = env_url.filter(|u| !u.trim().is_empty()) {
            debug!(%url, env = API_URL_ENV, "api_url from environment");
            config.api_url = url;
        }
        if let Some(url) = flag_url {
            config.api_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the URL scheme and strip trailing slashes.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        let url = self.api_url.trim();
        let has_scheme = ["http://", "https://"]
            .iter()
            .any(|scheme| url.len() > scheme.len() && url.starts_with(scheme));
        if !has_scheme {
            return Err(ConfigError::InvalidUrl(self.api_url.clone()));
        }
        self.api_url = url.trim_end_matches('/').to_string();
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
    }
}

/// `<config_dir>/basketlab/config.toml` under the given config root.
pub fn default_config_path(config_root: &Path) -> PathBuf {
    config_root.join("basketlab").join("config.toml")
}
