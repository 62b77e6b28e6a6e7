// src/redirect/policy.rs
//! Redirect policy
//!
//! Holds the host the operator intends to reach and decides, for every
//! connection attempt, which host is actually used and whether the one-shot
//! mismatch notice still has to be shown.

use crate::utils::config::ShimConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// What happens to a connection whose host does not match the expected one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectMode {
    /// Replace the requested host with the expected host
    Redirect,

    /// Keep the requested host
    Follow,
}

/// Outcome of resolving a requested host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Host the connection should be opened to
    pub effective_host: String,

    /// True for exactly one mismatching request per policy instance
    pub should_warn: bool,
}

/// Shared redirect policy
///
/// Construct once during setup and hand out through an `Arc`. The expected
/// host and mode are fixed at construction; only the notice flag changes
/// afterwards, and it only ever goes from unset to set.
#[derive(Debug)]
pub struct RedirectPolicy {
    expected_host: String,
    follow_redirect: bool,
    warning_emitted: AtomicBool,
}

impl RedirectPolicy {
    /// Create a policy that forces mismatching hosts back to `expected_host`
    pub fn new(expected_host: impl Into<String>) -> Self {
        Self::with_follow(expected_host, false)
    }

    /// Create a policy with an explicit follow-redirect setting
    pub fn with_follow(expected_host: impl Into<String>, follow_redirect: bool) -> Self {
        Self {
            expected_host: expected_host.into(),
            follow_redirect,
            warning_emitted: AtomicBool::new(false),
        }
    }

    /// Build a policy from loaded configuration
    pub fn from_config(config: &ShimConfig) -> Self {
        Self::with_follow(config.expected_host.clone(), config.follow_redirect)
    }

    pub fn expected_host(&self) -> &str {
        &self.expected_host
    }

    pub fn follow_redirect(&self) -> bool {
        self.follow_redirect
    }

    pub fn mode(&self) -> RedirectMode {
        if self.follow_redirect {
            RedirectMode::Follow
        } else {
            RedirectMode::Redirect
        }
    }

    /// Whether the mismatch notice has already been claimed by a caller
    pub fn warning_emitted(&self) -> bool {
        self.warning_emitted.load(Ordering::Acquire)
    }

    /// Decide which host to connect to
    ///
    /// A matching host is returned unchanged without touching the notice
    /// flag. On a mismatch the effective host depends on the mode, and the
    /// first caller to observe any mismatch wins the notice; every later
    /// caller, on any thread, sees `should_warn == false`.
    pub fn resolve(&self, requested_host: &str) -> Resolution {
        if requested_host == self.expected_host {
            return Resolution {
                effective_host: requested_host.to_string(),
                should_warn: false,
            };
        }

        let effective_host = match self.mode() {
            RedirectMode::Follow => requested_host.to_string(),
            RedirectMode::Redirect => self.expected_host.clone(),
        };

        let should_warn = self
            .warning_emitted
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();

        debug!(
            "Host mismatch: requested {}, using {} (first: {})",
            requested_host, effective_host, should_warn
        );

        Resolution {
            effective_host,
            should_warn,
        }
    }
}
