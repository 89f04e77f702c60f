//! Transport dial strategies.
//!
//! TCP and TLS peers share the same connection-oriented dial: only the TCP
//! connect is measured and no TLS handshake is attempted. A QUIC peer counts
//! as reachable only once its cryptographic handshake completes, because QUIC
//! has no transport-level connection underneath it.
//!
//! QUIC dials skip server certificate verification. That is fine for a
//! reachability check and wrong for anything that has to trust the peer.

use crate::utils::{CheckerError, ConfigError, DialError, ProbeConfig, Result};
use async_trait::async_trait;
use quinn::crypto::rustls::QuicClientConfig;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, SignatureScheme};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;

/// An established link, held only for as long as the measurement needs it
///
/// Dropping the value closes the underlying connection.
#[derive(Debug)]
pub enum Connection {
    /// Connected TCP socket
    Stream(TcpStream),
    /// Completed QUIC handshake and the endpoint that owns it
    Quic {
        /// The handshaken connection
        connection: quinn::Connection,
        /// Client endpoint bound for this probe
        endpoint: quinn::Endpoint,
    },
    /// No resource to release
    Detached,
}

impl Drop for Connection {
    fn drop(&mut self) {
        if let Self::Quic { connection, .. } = self {
            connection.close(0u32.into(), b"probe complete");
        }
    }
}

/// Dial strategies, one per transport family
#[async_trait]
pub trait Dialer: Send + Sync {
    /// Connection-oriented dial used for TCP and TLS peers
    async fn dial_stream(&self, addr: SocketAddr, timeout: Duration) -> std::result::Result<Connection, DialError>;

    /// QUIC handshake without certificate verification
    async fn dial_quic(&self, addr: SocketAddr, server_name: &str) -> std::result::Result<Connection, DialError>;
}

/// Dialer that opens real sockets
#[derive(Debug, Clone)]
pub struct TransportDialer {
    quic_config: quinn::ClientConfig,
    quic_idle_timeout: Duration,
}

impl TransportDialer {
    /// Build the dialer and its QUIC client configuration
    pub fn new(config: &ProbeConfig) -> Result<Self> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let crypto = rustls::ClientConfig::builder_with_provider(provider.clone())
            .with_protocol_versions(&[&rustls::version::TLS13])
            .map_err(|e| CheckerError::unexpected(format!("TLS setup failed: {e}")))?
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(SkipServerVerification(provider)))
            .with_no_client_auth();

        let quic_crypto = QuicClientConfig::try_from(crypto)
            .map_err(|e| CheckerError::unexpected(format!("QUIC TLS setup failed: {e}")))?;
        let mut quic_config = quinn::ClientConfig::new(Arc::new(quic_crypto));

        let quic_idle_timeout = match config.quic_idle_timeout() {
            Some(timeout) => {
                let idle = quinn::IdleTimeout::try_from(timeout).map_err(|_| ConfigError::InvalidValue {
                    field: "probe.quic_idle_timeout".to_string(),
                    value: timeout.as_secs().to_string(),
                })?;
                let mut transport = quinn::TransportConfig::default();
                transport.max_idle_timeout(Some(idle));
                quic_config.transport_config(Arc::new(transport));
                timeout
            }
            None => crate::defaults::QUIC_DEFAULT_IDLE_TIMEOUT,
        };

        Ok(Self {
            quic_config,
            quic_idle_timeout,
        })
    }
}

#[async_trait]
impl Dialer for TransportDialer {
    async fn dial_stream(&self, addr: SocketAddr, timeout: Duration) -> std::result::Result<Connection, DialError> {
        match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => Ok(Connection::Stream(stream)),
            Ok(Err(e)) => Err(DialError::from_io(addr.to_string(), &e)),
            Err(_) => Err(DialError::Timeout {
                address: addr.to_string(),
                after: timeout,
            }),
        }
    }

    async fn dial_quic(&self, addr: SocketAddr, server_name: &str) -> std::result::Result<Connection, DialError> {
        let bind: SocketAddr = if addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let endpoint = quinn::Endpoint::client(bind).map_err(|e| DialError::Endpoint {
            reason: e.to_string(),
        })?;

        let connecting = endpoint
            .connect_with(self.quic_config.clone(), addr, server_name)
            .map_err(|e| match e {
                quinn::ConnectError::InvalidServerName(name) => DialError::Tls {
                    address: addr.to_string(),
                    reason: format!("invalid server name {name}"),
                },
                other => DialError::Quic {
                    address: addr.to_string(),
                    reason: other.to_string(),
                },
            })?;

        match connecting.await {
            Ok(connection) => Ok(Connection::Quic { connection, endpoint }),
            Err(quinn::ConnectionError::TimedOut) => Err(DialError::Timeout {
                address: addr.to_string(),
                after: self.quic_idle_timeout,
            }),
            Err(e) => Err(DialError::Quic {
                address: addr.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

/// Accepts any server certificate
#[derive(Debug)]
struct SkipServerVerification(Arc<CryptoProvider>);

impl ServerCertVerifier for SkipServerVerification {
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
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}
