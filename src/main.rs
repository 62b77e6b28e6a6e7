// src/main.rs
//! Loopback Redirect probe
//!
//! Opens one TLS connection through the redirecting socket factory and
//! reports where it actually landed.

use anyhow::{bail, Context, Result};
use clap::Parser;
use loopback_redirect::cli::Cli;
use loopback_redirect::observability::init_tracing;
use loopback_redirect::{
    RedirectPolicy, RedirectingSocketFactory, RustlsProvider, SecureSocketProvider, ShimConfig,
    StderrSink,
};
use std::sync::Arc;
use tracing::{debug, error, info};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ShimConfig::load_from(cli.config.as_deref())
        .context("Failed to load configuration")?;
    cli.apply(&mut config);

    init_tracing(config.log_format, cli.verbose).context("Failed to initialize logging")?;
    debug!("Configuration loaded: {:?}", config);

    let provider = RustlsProvider::from_config(&config).context("Failed to set up TLS")?;

    if cli.list_ciphers {
        println!("Default cipher suites:");
        for suite in provider.default_cipher_suites() {
            println!("  {}", suite);
        }
        println!("Supported cipher suites:");
        for suite in provider.supported_cipher_suites() {
            println!("  {}", suite);
        }
        return Ok(());
    }

    let (Some(host), Some(port)) = (cli.host.as_deref(), cli.port) else {
        bail!("HOST and PORT are required");
    };

    config.validate().context("Invalid configuration")?;

    let policy = Arc::new(RedirectPolicy::from_config(&config));
    let factory = RedirectingSocketFactory::with_sink(
        provider,
        policy,
        Arc::new(StderrSink::new(!cli.no_color)),
    );

    info!("Connecting to {}:{}", host, port);
    let socket = match factory.create_socket(host, port) {
        Ok(socket) => socket,
        Err(e) => {
            error!("Connection to {}:{} failed: {}", host, port, e);
            return Err(e).with_context(|| format!("Failed to connect to {}:{}", host, port));
        }
    };

    let peer = socket
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    println!("Connected to {}", peer);
    println!(
        "Protocol: {}",
        socket.protocol_version().unwrap_or_else(|| "unknown".to_string())
    );
    println!(
        "Cipher suite: {}",
        socket.negotiated_cipher_suite().unwrap_or_else(|| "unknown".to_string())
    );

    Ok(())
}
