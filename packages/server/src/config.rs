//! Server configuration loaded from a TOML file.
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//!
//! [session]
//! seconds_until_expiry = 86400
//!
//! [sse]
//! session_check_interval_secs = 2
//!
//! [logger]
//! default_level = "debug"
//! ```
//!
//! Every field has a default, so an empty file (or no file) is a valid config.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming the config file when `--config` is absent
pub const CONFIG_FILEPATH_ENV: &str = "BEANGO_CONFIG_FILEPATH";

/// Error type for configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not open config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub seconds_until_expiry: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seconds_until_expiry: 86_400,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SseConfig {
    /// 0 disables the session watchdog on event streams
    pub session_check_interval_secs: u64,
}

impl Default for SseConfig {
    fn default() -> Self {
        Self {
            session_check_interval_secs: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Used when `RUST_LOG` is not set
    pub default_level: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            default_level: "debug".to_string(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub sse: SseConfig,
    pub logger: LoggerConfig,
}

impl AppConfig {
    /// Parse and validate a TOML document
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load the config file at `path`, or the defaults when there is none
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content, path)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.session.seconds_until_expiry == 0 {
            return Err(ConfigError::Invalid(
                "session.seconds_until_expiry must be positive".to_string(),
            ));
        }
        if self.logger.default_level.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "logger.default_level cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Pick the config file: the CLI flag wins over the environment variable.
pub fn config_path(cli: Option<PathBuf>, env: Option<String>) -> Option<PathBuf> {
    cli.or_else(|| env.filter(|v| !v.is_empty()).map(PathBuf::from))
}
