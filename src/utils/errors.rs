//! Error types and handling for the peer checker.
//!
//! Only [`CheckerError::DirectoryRead`] and configuration errors are fatal.
//! [`ResolveError`] and [`DialError`] describe a single peer's failed probe.
//! They surface from `Prober::try_check` and stop at `Prober::check`, which
//! logs them and marks that peer dead.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for the peer checker library
pub type Result<T> = std::result::Result<T, CheckerError>;

/// Top-level error type for all checker operations
#[derive(Error, Debug, Clone)]
pub enum CheckerError {
    /// The peer list directory tree could not be read
    #[error("Failed to read {path}: {reason}")]
    DirectoryRead { path: String, reason: String },

    /// Configuration and I/O errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Address resolution errors
    #[error("Resolve error: {0}")]
    Resolve(#[from] ResolveError),

    /// Transport dial errors
    #[error("Dial error: {0}")]
    Dial(#[from] DialError),

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic error for unexpected conditions
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Host to address resolution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// DNS lookup failed (NXDOMAIN, timeout, network error)
    #[error("Lookup of {host} failed: {reason}")]
    Lookup { host: String, reason: String },

    /// Lookup succeeded but returned no records
    #[error("No address found for {host}")]
    NoAddress { host: String },
}

/// Transport dial errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DialError {
    /// The dial did not complete in time
    #[error("Connection to {address} timed out after {after:?}")]
    Timeout { address: String, after: Duration },

    /// The remote actively refused the connection
    #[error("Connection to {address} refused")]
    Refused { address: String },

    /// No route to the remote host or network
    #[error("{address} is unreachable: {reason}")]
    Unreachable { address: String, reason: String },

    /// Resolved address could not be turned into a socket address
    #[error("Invalid address: {address}")]
    InvalidAddress { address: String },

    /// Any other socket-level failure
    #[error("I/O error dialing {address}: {reason}")]
    Io { address: String, reason: String },

    /// TLS configuration or server name failure
    #[error("TLS error for {address}: {reason}")]
    Tls { address: String, reason: String },

    /// QUIC handshake or connection failure
    #[error("QUIC handshake with {address} failed: {reason}")]
    Quic { address: String, reason: String },

    /// Local QUIC endpoint could not be created
    #[error("Failed to open local endpoint: {reason}")]
    Endpoint { reason: String },
}

/// Configuration and setup errors
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    /// Missing required configuration
    #[error("Missing configuration: {field}")]
    MissingField { field: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// Configuration parsing error
    #[error("Configuration parse error: {reason}")]
    ParseError { reason: String },

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl CheckerError {
    /// Creates a new unexpected error with a custom message
    pub fn unexpected<S: Into<String>>(msg: S) -> Self {
        Self::Unexpected(msg.into())
    }

    /// Creates a directory read error for `path`
    pub fn directory_read(path: &std::path::Path, err: &std::io::Error) -> Self {
        Self::DirectoryRead {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }

    /// Returns true if this error aborts the whole run
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Resolve(_) | Self::Dial(_))
    }

    /// Short category name used in debug logs
    pub fn category(&self) -> &'static str {
        match self {
            Self::DirectoryRead { .. } => "directory",
            Self::Config(_) => "config",
            Self::Resolve(_) => "resolve",
            Self::Dial(e) => e.category(),
            Self::Io(_) => "io",
            Self::Unexpected(_) => "unexpected",
        }
    }
}

impl DialError {
    /// Short category name used in debug logs
    pub fn category(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Refused { .. } => "refused",
            Self::Unreachable { .. } => "unreachable",
            Self::InvalidAddress { .. } => "invalid-address",
            Self::Io { .. } => "io",
            Self::Tls { .. } => "tls",
            Self::Quic { .. } => "quic",
            Self::Endpoint { .. } => "endpoint",
        }
    }

    /// Classifies a socket error from dialing `address`
    pub fn from_io(address: impl Into<String>, err: &std::io::Error) -> Self {
        use std::io::ErrorKind;

        let address = address.into();
        match err.kind() {
            ErrorKind::ConnectionRefused => Self::Refused { address },
            ErrorKind::TimedOut => Self::Timeout {
                address,
                after: Duration::ZERO,
            },
            ErrorKind::AddrNotAvailable | ErrorKind::NetworkUnreachable | ErrorKind::HostUnreachable => {
                Self::Unreachable {
                    address,
                    reason: err.to_string(),
                }
            }
            _ => Self::Io {
                address,
                reason: err.to_string(),
            },
        }
    }
}

impl From<std::io::Error> for CheckerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
