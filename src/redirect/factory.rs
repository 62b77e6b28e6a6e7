// src/redirect/factory.rs
//! Redirecting socket factory
//!
//! Decorates a [`SecureSocketProvider`] so that host/port connections are
//! checked against a shared [`RedirectPolicy`] before the wrapped provider
//! opens them. Every other entry point goes straight to the wrapped provider.

use crate::redirect::policy::{RedirectMode, RedirectPolicy};
use crate::redirect::provider::SecureSocketProvider;
use crate::redirect::sink::{TracingSink, WarningSink};
use std::io;
use std::net::{IpAddr, TcpStream};
use std::sync::Arc;
use tracing::{debug, info};

/// Build the lines of the one-shot mismatch notice
pub fn notice_lines(requested_host: &str, policy: &RedirectPolicy) -> [String; 3] {
    let action = match policy.mode() {
        RedirectMode::Follow => "\tFollowing ssl connection to new target... ".to_string(),
        RedirectMode::Redirect => format!(
            "\tRedirecting the ssl connection back to {}... ",
            policy.expected_host()
        ),
    };

    [
        format!(
            "Remote object tries to connect to different remote host: {}",
            requested_host
        ),
        action,
        "\tThis is done for all further requests. This message is not shown again. ".to_string(),
    ]
}

/// Socket provider that forces stray host/port connections back to the expected host
pub struct RedirectingSocketFactory<P> {
    delegate: P,
    policy: Arc<RedirectPolicy>,
    sink: Arc<dyn WarningSink>,
}

impl<P: SecureSocketProvider> RedirectingSocketFactory<P> {
    /// Wrap `delegate`, reporting the notice through `tracing`
    pub fn new(delegate: P, policy: Arc<RedirectPolicy>) -> Self {
        Self::with_sink(delegate, policy, Arc::new(TracingSink))
    }

    /// Wrap `delegate`, reporting the notice through `sink`
    pub fn with_sink(delegate: P, policy: Arc<RedirectPolicy>, sink: Arc<dyn WarningSink>) -> Self {
        info!(
            "Redirecting socket factory installed (expected host: {}, mode: {:?})",
            policy.expected_host(),
            policy.mode()
        );

        Self {
            delegate,
            policy,
            sink,
        }
    }

    pub fn policy(&self) -> &Arc<RedirectPolicy> {
        &self.policy
    }

    pub fn delegate(&self) -> &P {
        &self.delegate
    }

    fn emit_notice(&self, requested_host: &str) {
        for line in notice_lines(requested_host, &self.policy) {
            if let Err(e) = self.sink.emit(&line) {
                debug!("Failed to emit redirect notice: {}", e);
            }
        }
    }
}

impl<P: SecureSocketProvider> SecureSocketProvider for RedirectingSocketFactory<P> {
    type Socket = P::Socket;

    fn create_socket(&self, host: &str, port: u16) -> io::Result<Self::Socket> {
        metrics::counter!("loopback_redirect_connections_total").increment(1);

        let resolution = self.policy.resolve(host);

        if host != self.policy.expected_host() {
            let mode = match self.policy.mode() {
                RedirectMode::Follow => "follow",
                RedirectMode::Redirect => "redirect",
            };
            metrics::counter!("loopback_redirect_mismatches_total", "mode" => mode).increment(1);
        }

        if resolution.should_warn {
            self.emit_notice(host);
        }

        self.delegate.create_socket(&resolution.effective_host, port)
    }

    fn create_socket_to_addr(&self, addr: IpAddr, port: u16) -> io::Result<Self::Socket> {
        self.delegate.create_socket_to_addr(addr, port)
    }

    fn create_socket_bound(
        &self,
        host: &str,
        port: u16,
        local_addr: IpAddr,
        local_port: u16,
    ) -> io::Result<Self::Socket> {
        self.delegate.create_socket_bound(host, port, local_addr, local_port)
    }

    fn create_socket_to_addr_bound(
        &self,
        addr: IpAddr,
        port: u16,
        local_addr: IpAddr,
        local_port: u16,
    ) -> io::Result<Self::Socket> {
        self.delegate
            .create_socket_to_addr_bound(addr, port, local_addr, local_port)
    }

    fn upgrade_socket(&self, socket: TcpStream, host: &str, port: u16) -> io::Result<Self::Socket> {
        self.delegate.upgrade_socket(socket, host, port)
    }

    fn default_cipher_suites(&self) -> Vec<String> {
        self.delegate.default_cipher_suites()
    }

    fn supported_cipher_suites(&self) -> Vec<String> {
        self.delegate.supported_cipher_suites()
    }
}
