// src/cli.rs
//! Command-line interface for the probe binary
//!
//! Uses clap's derive API. Flags given here override the configuration file
//! and environment.

use crate::utils::config::{LogFormat, ShimConfig};
use clap::Parser;
use std::path::PathBuf;

/// Open a TLS connection through the redirecting socket factory.
///
/// HOST is the host a remote object reference advertises. When it differs
/// from the expected host the connection is sent to the expected host
/// instead, unless --follow is given.
#[derive(Parser, Debug)]
#[command(name = "loopback-redirect")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Host requested by the remote object reference.
    #[arg(required_unless_present = "list_ciphers")]
    pub host: Option<String>,

    /// Port requested by the remote object reference.
    #[arg(required_unless_present = "list_ciphers")]
    pub port: Option<u16>,

    /// Host all connections are expected to target.
    ///
    /// Falls back to the configured value, then to HOST itself.
    #[arg(short = 'e', long = "expected-host", value_name = "HOST")]
    pub expected_host: Option<String>,

    /// Follow redirects to unexpected hosts instead of forcing them back.
    #[arg(long = "follow")]
    pub follow: bool,

    /// Path to a configuration file.
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// TCP connect timeout in milliseconds.
    #[arg(long = "connect-timeout", value_name = "MS")]
    pub connect_timeout_ms: Option<u64>,

    /// Disable Nagle's algorithm on the connection.
    #[arg(long = "nodelay")]
    pub nodelay: bool,

    /// Emit logs as JSON.
    #[arg(long = "json")]
    pub json: bool,

    /// Print the redirect notice without color.
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Print default and supported cipher suites and exit.
    #[arg(long = "list-ciphers")]
    pub list_ciphers: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Layer command-line flags over a loaded configuration
    pub fn apply(&self, config: &mut ShimConfig) {
        if let Some(expected_host) = &self.expected_host {
            config.expected_host = expected_host.clone();
        } else if config.expected_host.is_empty() {
            if let Some(host) = &self.host {
                config.expected_host = host.clone();
            }
        }

        if self.follow {
            config.follow_redirect = true;
        }

        if self.connect_timeout_ms.is_some() {
            config.connect_timeout_ms = self.connect_timeout_ms;
        }

        if self.nodelay {
            config.tcp_nodelay = true;
        }

        if self.json {
            config.log_format = LogFormat::Json;
        }
    }
}
