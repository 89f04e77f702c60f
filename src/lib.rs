//! # Peer Checker
//!
//! Finds public peers listed in a markdown peer list and checks which of them
//! are reachable, and how fast.
//!
//! ## Features
//!
//! - **Peer list scanning**: `region/country.md` trees with `tcp://`, `tls://`
//!   and `quic://` URIs embedded in the text
//! - **Concurrent probing**: one task per peer, each bounded by its own timeout
//! - **Error isolation**: a peer that fails to resolve or connect is reported
//!   dead and never affects the rest of the batch
//! - **Latency report**: dead peers, then alive peers sorted by latency
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use peer_checker::{CheckerConfig, PeerChecker};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let checker = PeerChecker::new(CheckerConfig::default())?;
//!     let report = checker.run(Path::new("public_peers")).await?;
//!     print!("{report}");
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`discovery`]: peer list scanning and URI extraction
//! - [`probe`]: resolver, dialers, the probe engine and the coordinator
//! - [`report`]: partitioning, sorting and table rendering
//! - [`utils`]: configuration and error handling

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod discovery;
pub mod peer;
pub mod probe;
pub mod report;
pub mod utils;

// Re-export commonly used types for convenience
pub use app::PeerChecker;
pub use peer::{Peer, ProbeTarget, Protocol};
pub use report::Report;
pub use utils::{CheckerConfig, CheckerError, Result};

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    /// Default TCP/TLS connect timeout in seconds
    pub const DEFAULT_CONNECT_TIMEOUT: u64 = 5;

    /// quinn's idle timeout when none is configured, which bounds a QUIC handshake
    pub const QUIC_DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

    /// Top-level directories that are not regions
    pub const EXCLUDED_DIRS: &[&str] = &[".git", "other"];

    /// Suffix of country files
    pub const COUNTRY_FILE_SUFFIX: &str = ".md";
}
