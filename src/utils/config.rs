// src/utils/config.rs
//! Shim configuration
//!
//! Values are layered: built-in defaults, then an optional
//! `loopback-redirect.{toml,yaml,json}` file (or an explicit path), then
//! environment variables prefixed with `LOOPBACK_REDIRECT_`. Command-line
//! flags are applied on top by the binary.

use crate::utils::errors::{Result, ShimError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Base name of the configuration file searched in the working directory
pub const CONFIG_FILE_NAME: &str = "loopback-redirect";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "LOOPBACK_REDIRECT";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Shim configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShimConfig {
    /// Host every connection is expected to target
    pub expected_host: String,

    /// Use a mismatching host as-is instead of forcing it back
    pub follow_redirect: bool,

    /// TCP connect timeout in milliseconds (none = OS default)
    pub connect_timeout_ms: Option<u64>,

    /// Disable Nagle's algorithm on new sockets
    pub tcp_nodelay: bool,

    /// Log output format for the binary
    pub log_format: LogFormat,
}

impl Default for ShimConfig {
    fn default() -> Self {
        Self {
            expected_host: String::new(),
            follow_redirect: false,
            connect_timeout_ms: None,
            tcp_nodelay: false,
            log_format: LogFormat::Pretty,
        }
    }
}

impl ShimConfig {
    /// Load configuration from the default file location and environment
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, reading `path` instead of the default file if given
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        builder = match path {
            Some(path) => {
                debug!("Loading configuration from {:?}", path);
                builder.add_source(config::File::from(path).required(true))
            }
            None => builder.add_source(config::File::with_name(CONFIG_FILE_NAME).required(false)),
        };

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let config: ShimConfig = settings.try_deserialize()?;
        Ok(config)
    }

    /// Connect timeout as a `Duration`
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }

    /// Check that the configuration can drive a connection attempt
    pub fn validate(&self) -> Result<()> {
        if self.expected_host.trim().is_empty() {
            return Err(ShimError::ConfigError(
                "expected_host must not be empty".to_string(),
            ));
        }

        if self.connect_timeout_ms == Some(0) {
            return Err(ShimError::ConfigError(
                "connect_timeout_ms must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
