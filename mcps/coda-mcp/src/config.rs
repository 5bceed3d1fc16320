//! Configuration loading for coda-mcp
//!
//! Configuration is layered, later sources winning:
//! 1. Default values
//! 2. TOML file at `CODA_MCP_CONFIG`, or `~/.coda-mcp/config.toml`
//! 3. Environment variables (`CODA_API_KEY`, `CODA_API_BASE_URL`,
//!    `CODA_REQUEST_TIMEOUT_SECS`, `CODA_EXPORT_POLL_INTERVAL_MS`,
//!    `CODA_EXPORT_MAX_ATTEMPTS`, `MCP_AUTH_TOKEN`)
//!
//! A `.env` file is loaded into the environment by the binary before any
//! of this runs.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("CODA_API_KEY is not set; a Coda API token is required")]
    MissingApiKey,

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Coda API access
    #[serde(default)]
    pub coda: CodaConfig,
    /// Access control for the HTTP transports
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Coda API configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct CodaConfig {
    /// Bearer token for the Coda API
    #[serde(default)]
    pub api_key: String,
    /// API root, without a trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Delay before each export status poll, in milliseconds
    #[serde(default = "default_export_poll_interval_ms")]
    pub export_poll_interval_ms: u64,
    /// Status polls before an export is given up on
    #[serde(default = "default_export_max_attempts")]
    pub export_max_attempts: u32,
}

/// Shared-token gate for the HTTP transports
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Expected `?token=` value; unset means the endpoints are open
    #[serde(default)]
    pub token: Option<String>,
}

fn default_base_url() -> String {
    "https://coda.io/apis/v1".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_export_poll_interval_ms() -> u64 {
    1000
}

fn default_export_max_attempts() -> u32 {
    5
}

impl Default for CodaConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            export_poll_interval_ms: default_export_poll_interval_ms(),
            export_max_attempts: default_export_max_attempts(),
        }
    }
}

impl fmt::Debug for CodaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodaConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("export_poll_interval_ms", &self.export_poll_interval_ms)
            .field("export_max_attempts", &self.export_max_attempts)
            .finish()
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl CodaConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn export_poll_interval(&self) -> Duration {
        Duration::from_millis(self.export_poll_interval_ms)
    }
}

impl Config {
    /// Load configuration from file and environment, then validate it
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::find_config_path() {
            Some(path) if path.exists() => {
                tracing::info!("Loading config from: {}", path.display());
                Self::from_file(&path)?
            }
            _ => {
                tracing::debug!("No config file found, using defaults");
                Self::default()
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlay environment values; blank values count as unset
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("CODA_API_KEY") {
            self.coda.api_key = key.trim().to_string();
        }
        if let Some(url) = get("CODA_API_BASE_URL") {
            self.coda.base_url = url.trim().to_string();
        }
        if let Some(raw) = get("CODA_REQUEST_TIMEOUT_SECS") {
            self.coda.request_timeout_secs = parse_number("CODA_REQUEST_TIMEOUT_SECS", &raw)?;
        }
        if let Some(raw) = get("CODA_EXPORT_POLL_INTERVAL_MS") {
            self.coda.export_poll_interval_ms =
                parse_number("CODA_EXPORT_POLL_INTERVAL_MS", &raw)?;
        }
        if let Some(raw) = get("CODA_EXPORT_MAX_ATTEMPTS") {
            self.coda.export_max_attempts = parse_number("CODA_EXPORT_MAX_ATTEMPTS", &raw)?;
        }
        if let Some(token) = get("MCP_AUTH_TOKEN") {
            self.auth.token = Some(token);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.coda.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if let Err(e) = url::Url::parse(&self.coda.base_url) {
            return Err(ConfigError::InvalidValue {
                key: "CODA_API_BASE_URL",
                reason: e.to_string(),
            });
        }
        if self.coda.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "CODA_REQUEST_TIMEOUT_SECS",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.coda.export_max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                key: "CODA_EXPORT_MAX_ATTEMPTS",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    fn find_config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("CODA_MCP_CONFIG") {
            return Some(PathBuf::from(path));
        }

        std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".coda-mcp").join("config.toml"))
    }
}

fn parse_number<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            key,
            reason: format!("'{}': {}", raw, e),
        })
}
