// src/utils/errors.rs
//! Error types for shim setup
//!
//! Socket creation never produces a `ShimError`: transport and name-resolution
//! failures travel as `std::io::Error` exactly as the underlying provider
//! reported them. `ShimError` only covers building the pieces before the
//! first connection attempt.

use thiserror::Error;

/// Result alias used by setup code
pub type Result<T> = std::result::Result<T, ShimError>;

/// Setup-time failures
#[derive(Debug, Error)]
pub enum ShimError {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// TLS client configuration could not be built
    #[error("TLS setup failed: {0}")]
    TlsError(#[from] rustls::Error),

    /// Tracing subscriber could not be installed
    #[error("Logging setup failed: {0}")]
    LoggingError(String),

    /// I/O failure outside the socket path (e.g. reading a config file)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<config::ConfigError> for ShimError {
    fn from(err: config::ConfigError) -> Self {
        ShimError::ConfigError(err.to_string())
    }
}
