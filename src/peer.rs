//! Peer records: the unit of work and result of a probe run.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Transport a peer is reached over
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Plain TCP
    Tcp,
    /// TLS over TCP (probed at the TCP level only)
    Tls,
    /// QUIC over UDP
    Quic,
    /// Any other scheme; never probed
    Unsupported(String),
}

impl FromStr for Protocol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "tcp" => Self::Tcp,
            "tls" => Self::Tls,
            "quic" => Self::Quic,
            _ => Self::Unsupported(s.to_string()),
        })
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => f.write_str("tcp"),
            Self::Tls => f.write_str("tls"),
            Self::Quic => f.write_str("quic"),
            Self::Unsupported(scheme) => f.write_str(scheme),
        }
    }
}

/// Immutable part of a peer that a probe task needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    /// Transport to dial
    pub protocol: Protocol,
    /// Bracketed literal address or DNS name
    pub host: String,
    /// Remote port
    pub port: u16,
}

/// A discovered peer and, after probing, its liveness
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    uri: String,
    target: ProbeTarget,
    region: String,
    country: String,
    up: bool,
    latency: Option<Duration>,
}

impl Peer {
    /// Create a not-yet-probed peer
    pub fn new(
        uri: impl Into<String>,
        protocol: Protocol,
        host: impl Into<String>,
        port: u16,
        region: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            uri: uri.into(),
            target: ProbeTarget {
                protocol,
                host: host.into(),
                port,
            },
            region: region.into(),
            country: country.into(),
            up: false,
            latency: None,
        }
    }

    /// Original connection string as found in the peer list
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Transport of this peer
    pub fn protocol(&self) -> &Protocol {
        &self.target.protocol
    }

    /// Host part of the URI
    pub fn host(&self) -> &str {
        &self.target.host
    }

    /// Port part of the URI
    pub fn port(&self) -> u16 {
        self.target.port
    }

    /// Region directory the peer was listed under
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Country file the peer was listed in
    pub fn country(&self) -> &str {
        &self.country
    }

    /// `region/country` provenance string
    pub fn location(&self) -> String {
        format!("{}/{}", self.region, self.country)
    }

    /// What a probe needs to dial this peer
    pub fn target(&self) -> &ProbeTarget {
        &self.target
    }

    /// Whether the last probe connected
    pub fn is_up(&self) -> bool {
        self.up
    }

    /// Measured connect latency; `None` unless the peer is up
    pub fn latency(&self) -> Option<Duration> {
        self.latency
    }

    /// Record a successful probe
    pub(crate) fn mark_alive(&mut self, latency: Duration) {
        self.up = true;
        self.latency = Some(latency);
    }
}
