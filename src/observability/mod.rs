// src/observability/mod.rs
//! Logging setup
//!
//! Installs the global `tracing` subscriber. Output goes to stderr so that
//! probe results on stdout stay machine-readable. `RUST_LOG` overrides the
//! level chosen on the command line.
//!
//! The library records two `metrics` counters but installs no recorder:
//!
//! - `loopback_redirect_connections_total`: host/port connection requests
//! - `loopback_redirect_mismatches_total{mode}`: requests for an unexpected host

use crate::utils::config::LogFormat;
use crate::utils::errors::{Result, ShimError};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Default filter directive for a `-v` count
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Initialize tracing
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(format: LogFormat, verbosity: u8) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));
    let registry = tracing_subscriber::registry().with(filter);

    let result = match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init(),
    };

    result.map_err(|e| ShimError::LoggingError(e.to_string()))
}
