// src/utils/mod.rs
//! Common utilities shared by the redirect layer and the probe binary
//!
//! - **config**: Layered configuration (defaults, file, environment)
//! - **errors**: Setup-time error type

pub mod config;
pub mod errors;

pub use config::{LogFormat, ShimConfig};
pub use errors::{Result, ShimError};
