// src/redirect/tls.rs
//! rustls-backed secure socket provider
//!
//! Opens blocking TCP connections and completes the TLS handshake before
//! handing the socket back. Server certificates are accepted without
//! validation: enumeration targets routinely present self-signed or
//! mismatching certificates.

use crate::redirect::provider::SecureSocketProvider;
use crate::utils::config::ShimConfig;
use crate::utils::errors::Result;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, ClientConnection, DigitallySignedStruct, SignatureScheme, StreamOwned};
use std::fmt;
use std::io::{self, Read, Write};
use std::net::{IpAddr, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

#[derive(Debug)]
struct AcceptAnyServerCert {
    provider: Arc<CryptoProvider>,
}

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(message, cert, dss, &self.provider.signature_verification_algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.provider.signature_verification_algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

/// Established TLS client socket
pub struct SecureSocket {
    stream: StreamOwned<ClientConnection, TcpStream>,
}

impl SecureSocket {
    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.stream.sock.peer_addr()
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.stream.sock.local_addr()
    }

    /// Name of the cipher suite agreed during the handshake
    pub fn negotiated_cipher_suite(&self) -> Option<String> {
        self.stream
            .conn
            .negotiated_cipher_suite()
            .map(|suite| format!("{:?}", suite.suite()))
    }

    pub fn protocol_version(&self) -> Option<String> {
        self.stream
            .conn
            .protocol_version()
            .map(|version| format!("{:?}", version))
    }

    /// Underlying TCP stream
    pub fn get_ref(&self) -> &TcpStream {
        &self.stream.sock
    }
}

impl fmt::Debug for SecureSocket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureSocket")
            .field("peer", &self.peer_addr().ok())
            .field("cipher_suite", &self.negotiated_cipher_suite())
            .finish()
    }
}

impl Read for SecureSocket {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Write for SecureSocket {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

/// Concrete TLS provider
pub struct RustlsProvider {
    config: Arc<ClientConfig>,
    connect_timeout: Option<Duration>,
    tcp_nodelay: bool,
}

impl RustlsProvider {
    /// Create a provider with OS connect timeouts and Nagle enabled
    pub fn new() -> Result<Self> {
        let crypto = Arc::new(rustls::crypto::ring::default_provider());
        let config = ClientConfig::builder_with_provider(Arc::clone(&crypto))
            .with_safe_default_protocol_versions()?
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyServerCert { provider: crypto }))
            .with_no_client_auth();

        Ok(Self {
            config: Arc::new(config),
            connect_timeout: None,
            tcp_nodelay: false,
        })
    }

    /// Create a provider using the socket options from `config`
    pub fn from_config(config: &ShimConfig) -> Result<Self> {
        Ok(Self::new()?
            .with_connect_timeout(config.connect_timeout())
            .with_nodelay(config.tcp_nodelay))
    }

    /// Limit how long a TCP connect may take
    ///
    /// Applies to `create_socket` and `create_socket_to_addr` only. The
    /// local-bind variants connect through a raw socket and wait for the OS
    /// connect timeout regardless of this setting.
    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_nodelay(mut self, nodelay: bool) -> Self {
        self.tcp_nodelay = nodelay;
        self
    }

    fn connect_any(&self, addrs: &[SocketAddr]) -> io::Result<TcpStream> {
        let mut last_err = None;

        for addr in addrs {
            trace!("Connecting to {}", addr);
            let result = match self.connect_timeout {
                Some(timeout) => TcpStream::connect_timeout(addr, timeout),
                None => TcpStream::connect(addr),
            };

            match result {
                Ok(stream) => return Ok(stream),
                Err(e) => last_err = Some(e),
            }
        }

        Err(last_err.unwrap_or_else(no_addresses))
    }

    fn connect_any_bound(&self, addrs: &[SocketAddr], local: SocketAddr) -> io::Result<TcpStream> {
        let mut last_err = None;

        // Addresses of the local family go first; the rest only fail at bind time.
        let (same, other): (Vec<SocketAddr>, Vec<SocketAddr>) = addrs
            .iter()
            .copied()
            .partition(|addr| addr.is_ipv4() == local.is_ipv4());

        for addr in same.iter().chain(other.iter()) {
            trace!("Connecting to {} from {}", addr, local);
            match connect_bound(*addr, local) {
                Ok(stream) => return Ok(stream),
                Err(e) => last_err = Some(e),
            }
        }

        Err(last_err.unwrap_or_else(no_addresses))
    }

    fn handshake(&self, sock: TcpStream, server_name: ServerName<'static>) -> io::Result<SecureSocket> {
        if self.tcp_nodelay {
            sock.set_nodelay(true)?;
        }

        let conn = ClientConnection::new(Arc::clone(&self.config), server_name)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let mut stream = StreamOwned::new(conn, sock);

        while stream.conn.is_handshaking() {
            stream.conn.complete_io(&mut stream.sock)?;
        }

        let socket = SecureSocket { stream };
        debug!(
            "TLS session established with {:?} using {:?}",
            socket.peer_addr().ok(),
            socket.negotiated_cipher_suite()
        );
        Ok(socket)
    }
}

impl SecureSocketProvider for RustlsProvider {
    type Socket = SecureSocket;

    fn create_socket(&self, host: &str, port: u16) -> io::Result<SecureSocket> {
        let server_name = server_name(host)?;
        let addrs: Vec<SocketAddr> = (host, port).to_socket_addrs()?.collect();
        let sock = self.connect_any(&addrs)?;
        self.handshake(sock, server_name)
    }

    fn create_socket_to_addr(&self, addr: IpAddr, port: u16) -> io::Result<SecureSocket> {
        let sock = self.connect_any(&[SocketAddr::new(addr, port)])?;
        self.handshake(sock, ServerName::IpAddress(addr.into()))
    }

    fn create_socket_bound(
        &self,
        host: &str,
        port: u16,
        local_addr: IpAddr,
        local_port: u16,
    ) -> io::Result<SecureSocket> {
        let server_name = server_name(host)?;
        let addrs: Vec<SocketAddr> = (host, port).to_socket_addrs()?.collect();
        let sock = self.connect_any_bound(&addrs, SocketAddr::new(local_addr, local_port))?;
        self.handshake(sock, server_name)
    }

    fn create_socket_to_addr_bound(
        &self,
        addr: IpAddr,
        port: u16,
        local_addr: IpAddr,
        local_port: u16,
    ) -> io::Result<SecureSocket> {
        let sock = connect_bound(
            SocketAddr::new(addr, port),
            SocketAddr::new(local_addr, local_port),
        )?;
        self.handshake(sock, ServerName::IpAddress(addr.into()))
    }

    fn upgrade_socket(&self, socket: TcpStream, host: &str, _port: u16) -> io::Result<SecureSocket> {
        self.handshake(socket, server_name(host)?)
    }

    fn default_cipher_suites(&self) -> Vec<String> {
        self.config
            .crypto_provider()
            .cipher_suites
            .iter()
            .map(|suite| format!("{:?}", suite.suite()))
            .collect()
    }

    fn supported_cipher_suites(&self) -> Vec<String> {
        rustls::crypto::ring::ALL_CIPHER_SUITES
            .iter()
            .map(|suite| format!("{:?}", suite.suite()))
            .collect()
    }
}

fn server_name(host: &str) -> io::Result<ServerName<'static>> {
    ServerName::try_from(host.to_string())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
}

fn no_addresses() -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        "could not resolve to any addresses",
    )
}

/// Connect from a fixed local address
#[cfg(unix)]
pub(crate) fn connect_bound(remote: SocketAddr, local: SocketAddr) -> io::Result<TcpStream> {
    use nix::sys::socket::{bind, connect, socket, AddressFamily, SockFlag, SockType, SockaddrStorage};
    use std::os::fd::AsRawFd;

    let family = if remote.is_ipv4() {
        AddressFamily::Inet
    } else {
        AddressFamily::Inet6
    };

    #[cfg(any(target_os = "linux", target_os = "android"))]
    let fd = socket(family, SockType::Stream, SockFlag::SOCK_CLOEXEC, None)?;

    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    let fd = {
        use nix::fcntl::{fcntl, FcntlArg, FdFlag};

        let fd = socket(family, SockType::Stream, SockFlag::empty(), None)?;
        fcntl(fd.as_raw_fd(), FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC))?;
        fd
    };

    bind(fd.as_raw_fd(), &SockaddrStorage::from(local))?;
    connect(fd.as_raw_fd(), &SockaddrStorage::from(remote))?;

    Ok(TcpStream::from(fd))
}

#[cfg(not(unix))]
pub(crate) fn connect_bound(_remote: SocketAddr, _local: SocketAddr) -> io::Result<TcpStream> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "binding a local address is not supported on this platform",
    ))
}
