// tests/redirect_factory.rs
//! End-to-end tests for the redirecting socket factory through the public API

use loopback_redirect::{
    RedirectPolicy, RedirectingSocketFactory, RustlsProvider, SecureSocketProvider,
};
use parking_lot::Mutex;
use std::io;
use std::net::{IpAddr, Ipv4Addr, TcpListener, TcpStream};
use std::sync::Arc;
use std::time::Duration;

/// Delegate that records the endpoints it was asked for
#[derive(Default)]
struct EndpointLog {
    endpoints: Mutex<Vec<(String, u16)>>,
}

impl SecureSocketProvider for EndpointLog {
    type Socket = (String, u16);

    fn create_socket(&self, host: &str, port: u16) -> io::Result<Self::Socket> {
        let endpoint = (host.to_string(), port);
        self.endpoints.lock().push(endpoint.clone());
        Ok(endpoint)
    }

    fn create_socket_to_addr(&self, addr: IpAddr, port: u16) -> io::Result<Self::Socket> {
        Ok((addr.to_string(), port))
    }

    fn create_socket_bound(
        &self,
        host: &str,
        port: u16,
        _local_addr: IpAddr,
        _local_port: u16,
    ) -> io::Result<Self::Socket> {
        Ok((host.to_string(), port))
    }

    fn create_socket_to_addr_bound(
        &self,
        addr: IpAddr,
        port: u16,
        _local_addr: IpAddr,
        _local_port: u16,
    ) -> io::Result<Self::Socket> {
        Ok((addr.to_string(), port))
    }

    fn upgrade_socket(&self, _socket: TcpStream, host: &str, port: u16) -> io::Result<Self::Socket> {
        Ok((host.to_string(), port))
    }

    fn default_cipher_suites(&self) -> Vec<String> {
        Vec::new()
    }

    fn supported_cipher_suites(&self) -> Vec<String> {
        Vec::new()
    }
}

fn capturing_factory(
    policy: RedirectPolicy,
) -> (
    RedirectingSocketFactory<Arc<EndpointLog>>,
    Arc<EndpointLog>,
    Arc<Mutex<Vec<String>>>,
) {
    let delegate = Arc::new(EndpointLog::default());
    let lines = Arc::new(Mutex::new(Vec::new()));
    let captured = Arc::clone(&lines);
    let sink = move |line: &str| -> io::Result<()> {
        captured.lock().push(line.to_string());
        Ok(())
    };

    let factory = RedirectingSocketFactory::with_sink(
        Arc::clone(&delegate),
        Arc::new(policy),
        Arc::new(sink),
    );
    (factory, delegate, lines)
}

#[test]
fn redirects_loopback_back_to_expected_host() {
    let (factory, delegate, lines) = capturing_factory(RedirectPolicy::new("10.0.0.5"));

    factory.create_socket("127.0.0.1", 1099).unwrap();
    factory.create_socket("127.0.0.1", 1099).unwrap();

    assert_eq!(
        *delegate.endpoints.lock(),
        vec![
            ("10.0.0.5".to_string(), 1099),
            ("10.0.0.5".to_string(), 1099),
        ]
    );
    assert_eq!(lines.lock().len(), 3);
}

#[test]
fn follows_unexpected_host_when_asked() {
    let (factory, delegate, lines) =
        capturing_factory(RedirectPolicy::with_follow("10.0.0.5", true));

    factory.create_socket("192.168.1.1", 443).unwrap();

    assert_eq!(*delegate.endpoints.lock(), vec![("192.168.1.1".to_string(), 443)]);
    let lines = lines.lock();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].contains("Following"));
}

#[test]
fn one_notice_across_worker_threads() {
    let (factory, delegate, lines) = capturing_factory(RedirectPolicy::new("10.0.0.5"));

    std::thread::scope(|scope| {
        for worker in 0..8u16 {
            let factory = &factory;
            scope.spawn(move || {
                for attempt in 0..50u16 {
                    let socket = factory.create_socket("127.0.0.1", 1000 + worker * 50 + attempt);
                    assert_eq!(socket.unwrap().0, "10.0.0.5");
                }
            });
        }
    });

    assert_eq!(delegate.endpoints.lock().len(), 400);
    assert_eq!(lines.lock().len(), 3);
}

#[test]
fn policy_is_shared_between_factories() {
    let policy = Arc::new(RedirectPolicy::new("10.0.0.5"));
    let lines = Arc::new(Mutex::new(Vec::new()));

    let make = |lines: Arc<Mutex<Vec<String>>>| {
        let sink = move |line: &str| -> io::Result<()> {
            lines.lock().push(line.to_string());
            Ok(())
        };
        RedirectingSocketFactory::with_sink(
            EndpointLog::default(),
            Arc::clone(&policy),
            Arc::new(sink),
        )
    };
    let first = make(Arc::clone(&lines));
    let second = make(Arc::clone(&lines));

    first.create_socket("127.0.0.1", 1099).unwrap();
    second.create_socket("localhost", 1099).unwrap();

    assert_eq!(lines.lock().len(), 3);
}

#[test]
fn rustls_delegate_reports_refusal_at_expected_host() {
    let closed_port = {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        listener.local_addr().unwrap().port()
    };
    let provider = RustlsProvider::new()
        .unwrap()
        .with_connect_timeout(Some(Duration::from_secs(2)));
    let factory = RedirectingSocketFactory::new(provider, Arc::new(RedirectPolicy::new("127.0.0.1")));

    // 203.0.113.0/24 is reserved for documentation; only the redirect makes this refuse fast.
    let err = factory.create_socket("203.0.113.1", closed_port).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::ConnectionRefused);
    assert!(factory.policy().warning_emitted());
}

#[test]
fn cipher_suites_match_delegate() {
    let provider = RustlsProvider::new().unwrap();
    let expected_default = provider.default_cipher_suites();
    let expected_supported = provider.supported_cipher_suites();

    let factory = RedirectingSocketFactory::new(provider, Arc::new(RedirectPolicy::new("10.0.0.5")));
    assert_eq!(factory.default_cipher_suites(), expected_default);
    assert_eq!(factory.supported_cipher_suites(), expected_supported);
}

#[test]
fn pass_through_refusal_leaves_policy_untouched() {
    let closed_port = {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        listener.local_addr().unwrap().port()
    };
    let provider = RustlsProvider::new()
        .unwrap()
        .with_connect_timeout(Some(Duration::from_secs(2)));
    let factory = RedirectingSocketFactory::new(provider, Arc::new(RedirectPolicy::new("10.0.0.5")));
    let loopback = IpAddr::V4(Ipv4Addr::LOCALHOST);

    let err = factory.create_socket_to_addr(loopback, closed_port).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::ConnectionRefused);

    #[cfg(unix)]
    {
        let err = factory
            .create_socket_bound("127.0.0.1", closed_port, loopback, 0)
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionRefused);
    }

    assert!(!factory.policy().warning_emitted());
}
