//! A single bounded liveness probe.

use crate::peer::{Peer, ProbeTarget, Protocol};
use crate::probe::dialer::Dialer;
use crate::probe::resolver::{resolve, Resolver};
use crate::utils::{DialError, Result};
use rustls::pki_types::ServerName;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Resolves and dials peers, measuring connect latency
#[derive(Clone)]
pub struct Prober {
    resolver: Arc<dyn Resolver>,
    dialer: Arc<dyn Dialer>,
    connect_timeout: Duration,
}

impl Prober {
    /// Create a prober from its resolver and dialer
    pub fn new(resolver: Arc<dyn Resolver>, dialer: Arc<dyn Dialer>, connect_timeout: Duration) -> Self {
        Self {
            resolver,
            dialer,
            connect_timeout,
        }
    }

    /// Probe `peer` and record the outcome on it
    ///
    /// Never fails: any resolve or dial error leaves the peer down.
    pub async fn probe(&self, peer: &mut Peer) {
        if let Some(latency) = self.check(peer.target()).await {
            peer.mark_alive(latency);
        }
    }

    /// Probe a target, returning the connect latency if it is reachable
    pub async fn check(&self, target: &ProbeTarget) -> Option<Duration> {
        match self.try_check(target).await {
            Ok(Some(latency)) => {
                log::trace!("{}://{}:{} up in {:?}", target.protocol, target.host, target.port, latency);
                Some(latency)
            }
            Ok(None) => {
                log::debug!("Unsupported protocol {} for {}", target.protocol, target.host);
                None
            }
            Err(e) => {
                log::debug!("{} (type {})", e, e.category());
                None
            }
        }
    }

    /// Resolve and dial a target
    ///
    /// Returns `Ok(None)` for a transport that has no dial strategy.
    pub async fn try_check(&self, target: &ProbeTarget) -> Result<Option<Duration>> {
        let address = resolve(self.resolver.as_ref(), &target.host).await?;

        let (latency, conn) = match &target.protocol {
            Protocol::Tcp | Protocol::Tls => {
                let addr = socket_addr(&address, target.port)?;
                let start = Instant::now();
                let conn = self.dialer.dial_stream(addr, self.connect_timeout).await?;
                (start.elapsed(), conn)
            }
            Protocol::Quic => {
                let addr = socket_addr(&address, target.port)?;
                let server_name = quic_server_name(&target.host, &address);
                let start = Instant::now();
                let conn = self.dialer.dial_quic(addr, server_name).await?;
                (start.elapsed(), conn)
            }
            Protocol::Unsupported(_) => return Ok(None),
        };

        drop(conn);
        Ok(Some(latency))
    }
}

fn socket_addr(address: &str, port: u16) -> std::result::Result<SocketAddr, DialError> {
    address
        .parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, port))
        .map_err(|_| DialError::InvalidAddress {
            address: address.to_string(),
        })
}

/// TLS server name for a QUIC handshake
///
/// The DNS host when rustls accepts it as a server name, else the resolved
/// address, so an odd host name never fails the handshake on its own.
fn quic_server_name<'a>(host: &'a str, address: &'a str) -> &'a str {
    if !host.starts_with('[') && ServerName::try_from(host).is_ok() {
        host
    } else {
        address
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::dialer::Connection;
    use crate::utils::CheckerError;
    use async_trait::async_trait;
    use std::io;
    use std::sync::Mutex;

    struct StaticResolver;

    #[async_trait]
    impl Resolver for StaticResolver {
        async fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>> {
            match host {
                "example.com" => Ok(vec!["192.0.2.7".parse().unwrap()]),
                _ => Err(io::Error::new(io::ErrorKind::NotFound, "NXDOMAIN")),
            }
        }
    }

    /// Records every dial and succeeds unless the port is 0
    #[derive(Default)]
    struct RecordingDialer {
        dials: Mutex<Vec<(String, SocketAddr, String)>>,
    }

    #[async_trait]
    impl Dialer for RecordingDialer {
        async fn dial_stream(&self, addr: SocketAddr, timeout: Duration) -> std::result::Result<Connection, DialError> {
            self.dials
                .lock()
                .unwrap()
                .push(("stream".to_string(), addr, format!("{timeout:?}")));
            if addr.port() == 0 {
                return Err(DialError::Refused {
                    address: addr.to_string(),
                });
            }
            Ok(Connection::Detached)
        }

        async fn dial_quic(&self, addr: SocketAddr, server_name: &str) -> std::result::Result<Connection, DialError> {
            self.dials
                .lock()
                .unwrap()
                .push(("quic".to_string(), addr, server_name.to_string()));
            Ok(Connection::Detached)
        }
    }

    fn prober(dialer: Arc<RecordingDialer>) -> Prober {
        Prober::new(Arc::new(StaticResolver), dialer, Duration::from_secs(5))
    }

    fn peer(protocol: Protocol, host: &str, port: u16) -> Peer {
        let uri = format!("{protocol}://{host}:{port}");
        Peer::new(uri, protocol, host, port, "eu", "de.md")
    }

    #[tokio::test]
    async fn test_tcp_and_tls_use_stream_dial() {
        let dialer = Arc::new(RecordingDialer::default());
        let prober = prober(dialer.clone());

        let mut tcp = peer(Protocol::Tcp, "example.com", 80);
        let mut tls = peer(Protocol::Tls, "[::1]", 443);
        prober.probe(&mut tcp).await;
        prober.probe(&mut tls).await;

        assert!(tcp.is_up() && tls.is_up());
        assert!(tcp.latency().is_some() && tls.latency().is_some());

        let dials = dialer.dials.lock().unwrap();
        assert_eq!(dials.len(), 2);
        assert_eq!(dials[0].0, "stream");
        assert_eq!(dials[0].1, "192.0.2.7:80".parse::<SocketAddr>().unwrap());
        assert_eq!(dials[0].2, "5s");
        assert_eq!(dials[1].1, "[::1]:443".parse::<SocketAddr>().unwrap());
    }

    #[tokio::test]
    async fn test_quic_server_name() {
        let dialer = Arc::new(RecordingDialer::default());
        let prober = prober(dialer.clone());

        let mut named = peer(Protocol::Quic, "example.com", 9001);
        let mut literal = peer(Protocol::Quic, "[2001:db8::1]", 9001);
        prober.probe(&mut named).await;
        prober.probe(&mut literal).await;

        assert!(named.is_up() && literal.is_up());
        let dials = dialer.dials.lock().unwrap();
        assert_eq!(dials[0].2, "example.com");
        assert_eq!(dials[1].2, "2001:db8::1");
    }

    #[tokio::test]
    async fn test_failures_leave_peer_down() {
        let dialer = Arc::new(RecordingDialer::default());
        let prober = prober(dialer.clone());

        let mut unresolvable = peer(Protocol::Tcp, "nowhere.invalid", 80);
        let mut refused = peer(Protocol::Tcp, "example.com", 0);
        let mut malformed = peer(Protocol::Tcp, "[not-an-ip]", 80);
        let mut unsupported = peer(Protocol::Unsupported("ws".to_string()), "example.com", 80);

        for p in [&mut unresolvable, &mut refused, &mut malformed, &mut unsupported] {
            prober.probe(p).await;
            assert!(!p.is_up());
            assert_eq!(p.latency(), None);
        }

        // only the refused peer reached the dialer
        assert_eq!(dialer.dials.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_errors_surface_from_try_check() {
        let prober = prober(Arc::new(RecordingDialer::default()));

        let err = prober
            .try_check(peer(Protocol::Tcp, "nowhere.invalid", 80).target())
            .await
            .unwrap_err();
        assert!(matches!(err, CheckerError::Resolve(_)));
        assert_eq!(err.category(), "resolve");
        assert!(!err.is_fatal());

        let err = prober
            .try_check(peer(Protocol::Tcp, "example.com", 0).target())
            .await
            .unwrap_err();
        assert_eq!(err.category(), "refused");

        let unsupported = peer(Protocol::Unsupported("ws".to_string()), "example.com", 80);
        assert_eq!(prober.try_check(unsupported.target()).await.unwrap(), None);
    }

    #[test]
    fn test_quic_server_name_falls_back_to_address() {
        assert_eq!(quic_server_name("example.com", "192.0.2.7"), "example.com");
        assert_eq!(quic_server_name("[2001:db8::1]", "2001:db8::1"), "2001:db8::1");
        assert_eq!(quic_server_name("-peer.example.org", "192.0.2.7"), "192.0.2.7");
        assert_eq!(quic_server_name("peer..example.org", "192.0.2.7"), "192.0.2.7");
    }

    #[test]
    fn test_socket_addr() {
        assert_eq!(
            socket_addr("2001:db8::1", 8080).unwrap(),
            "[2001:db8::1]:8080".parse::<SocketAddr>().unwrap()
        );
        assert!(socket_addr("example", 1).is_err());
    }
}
