// src/redirect/mod.rs
//! Connection redirection layer
//!
//! Remote objects fetched from a registry often advertise an endpoint bound
//! to loopback or another address the client cannot reach. This layer sits
//! at the socket-creation step and pulls such connections back to the host
//! the operator actually targeted:
//!
//! - **Policy**: Expected host, follow mode, one-shot notice flag
//! - **Provider**: The secure socket capability set
//! - **Factory**: Decorator that applies the policy to host/port connections
//! - **Sink**: Where the mismatch notice goes
//! - **TLS**: rustls-backed concrete provider
//!
//! # Architecture
//!
//! ```text
//! Protocol layer
//!     │ create_socket("127.0.0.1", 1099)
//!     ▼
//! RedirectingSocketFactory ──resolve──► RedirectPolicy (Arc, shared)
//!     │                     └─notice──► WarningSink (once per policy)
//!     │ create_socket("10.0.0.5", 1099)
//!     ▼
//! RustlsProvider ──► TCP connect + TLS handshake
//! ```
//!
//! Only `create_socket` consults the policy. The address, bind and upgrade
//! variants and the cipher suite queries go to the wrapped provider as-is.

pub mod factory;
pub mod policy;
pub mod provider;
pub mod sink;
pub mod tls;

// Re-export commonly used types
pub use factory::{notice_lines, RedirectingSocketFactory};
pub use policy::{RedirectMode, RedirectPolicy, Resolution};
pub use provider::SecureSocketProvider;
pub use sink::{StderrSink, TracingSink, WarningSink};
pub use tls::{RustlsProvider, SecureSocket};
