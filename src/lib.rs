// src/lib.rs
//! Loopback Redirect Library
//!
//! Socket-creation shim for remote object enumeration. Registries often hand
//! out object references pointing at `127.0.0.1` or some other address that
//! only makes sense on the server; this library intercepts the host/port
//! connection step and sends such connections back to the host the operator
//! actually targeted.
//!
//! # Architecture
//!
//! - **cli**: Command-line flags for the probe binary
//! - **redirect**: Redirect policy, socket provider trait, redirecting factory, rustls provider
//! - **observability**: Tracing setup and metric names
//! - **utils**: Configuration and error types
//!
//! # Example
//!
//! ```no_run
//! use loopback_redirect::{RedirectPolicy, RedirectingSocketFactory, RustlsProvider, SecureSocketProvider};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let policy = Arc::new(RedirectPolicy::new("10.0.0.5"));
//! let factory = RedirectingSocketFactory::new(RustlsProvider::new()?, policy);
//!
//! // Opens a TLS connection to 10.0.0.5:1099
//! let socket = factory.create_socket("127.0.0.1", 1099)?;
//! # drop(socket);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod observability;
pub mod redirect;
pub mod utils;

// Re-export commonly used types
pub use redirect::{
    RedirectMode, RedirectPolicy, RedirectingSocketFactory, Resolution, RustlsProvider,
    SecureSocket, SecureSocketProvider, StderrSink, TracingSink, WarningSink,
};
pub use utils::config::ShimConfig;
pub use utils::errors::{Result, ShimError};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
