// src/redirect/provider.rs
//! Secure socket provider abstraction
//!
//! Every way the protocol layer can ask for a secure socket. Implemented by
//! the concrete rustls provider and by the redirecting decorator that wraps it.

use std::io;
use std::net::{IpAddr, TcpStream};
use std::sync::Arc;

/// Capability set of a secure socket provider
///
/// All creation calls block the calling thread until the connection (and,
/// for TLS providers, the handshake) finishes or fails. Errors are plain
/// `io::Error`s carrying the transport or name-resolution failure.
pub trait SecureSocketProvider: Send + Sync {
    /// Socket handed back to callers
    type Socket;

    /// Connect to `host:port`
    fn create_socket(&self, host: &str, port: u16) -> io::Result<Self::Socket>;

    /// Connect to `addr:port`
    fn create_socket_to_addr(&self, addr: IpAddr, port: u16) -> io::Result<Self::Socket>;

    /// Connect to `host:port` from `local_addr:local_port`
    fn create_socket_bound(
        &self,
        host: &str,
        port: u16,
        local_addr: IpAddr,
        local_port: u16,
    ) -> io::Result<Self::Socket>;

    /// Connect to `addr:port` from `local_addr:local_port`
    fn create_socket_to_addr_bound(
        &self,
        addr: IpAddr,
        port: u16,
        local_addr: IpAddr,
        local_port: u16,
    ) -> io::Result<Self::Socket>;

    /// Layer a secure session over an already connected plain socket
    ///
    /// `host` and `port` name the peer for session identification; no new
    /// connection is made.
    fn upgrade_socket(&self, socket: TcpStream, host: &str, port: u16) -> io::Result<Self::Socket>;

    /// Cipher suites enabled by default
    fn default_cipher_suites(&self) -> Vec<String>;

    /// Every cipher suite the provider could enable
    fn supported_cipher_suites(&self) -> Vec<String>;
}

macro_rules! forward_provider {
    ($($wrapper:ty),*) => {$(
        impl<P: SecureSocketProvider + ?Sized> SecureSocketProvider for $wrapper {
            type Socket = P::Socket;

            fn create_socket(&self, host: &str, port: u16) -> io::Result<Self::Socket> {
                (**self).create_socket(host, port)
            }

            fn create_socket_to_addr(&self, addr: IpAddr, port: u16) -> io::Result<Self::Socket> {
                (**self).create_socket_to_addr(addr, port)
            }

            fn create_socket_bound(
                &self,
                host: &str,
                port: u16,
                local_addr: IpAddr,
                local_port: u16,
            ) -> io::Result<Self::Socket> {
                (**self).create_socket_bound(host, port, local_addr, local_port)
            }

            fn create_socket_to_addr_bound(
                &self,
                addr: IpAddr,
                port: u16,
                local_addr: IpAddr,
                local_port: u16,
            ) -> io::Result<Self::Socket> {
                (**self).create_socket_to_addr_bound(addr, port, local_addr, local_port)
            }

            fn upgrade_socket(&self, socket: TcpStream, host: &str, port: u16) -> io::Result<Self::Socket> {
                (**self).upgrade_socket(socket, host, port)
            }

            fn default_cipher_suites(&self) -> Vec<String> {
                (**self).default_cipher_suites()
            }

            fn supported_cipher_suites(&self) -> Vec<String> {
                (**self).supported_cipher_suites()
            }
        }
    )*};
}

forward_provider!(Arc<P>, Box<P>);
