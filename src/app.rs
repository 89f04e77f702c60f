//! Batch run coordination.
//!
//! A run is discover, probe, report. Only discovery can fail, and it always
//! fails before any peer has been dialed.

use crate::{
    discovery::scan_peers,
    peer::Peer,
    probe::{probe_all, Dialer, Prober, Resolver, SystemResolver, TransportDialer},
    report::Report,
    utils::{CheckerConfig, Result},
};
use std::path::Path;
use std::sync::Arc;

/// One-shot peer checker
pub struct PeerChecker {
    /// Checker configuration
    config: CheckerConfig,
    /// Shared probe engine
    prober: Arc<Prober>,
}

impl PeerChecker {
    /// Create a checker that uses the system resolver and real sockets
    pub fn new(config: CheckerConfig) -> Result<Self> {
        let dialer = TransportDialer::new(&config.probe)?;
        Ok(Self::with_components(config, Arc::new(SystemResolver), Arc::new(dialer)))
    }

    /// Create a checker with a custom resolver and dialer
    pub fn with_components(
        config: CheckerConfig,
        resolver: Arc<dyn Resolver>,
        dialer: Arc<dyn Dialer>,
    ) -> Self {
        let prober = Arc::new(Prober::new(resolver, dialer, config.probe.connect_timeout()));
        Self { config, prober }
    }

    /// Scan the peer list rooted at `root`
    pub fn discover(&self, root: &Path) -> Result<Vec<Peer>> {
        scan_peers(root, &self.config.discovery)
    }

    /// Probe all peers concurrently
    pub async fn probe(&self, peers: Vec<Peer>) -> Vec<Peer> {
        probe_all(Arc::clone(&self.prober), peers).await
    }

    /// Discover, probe and build the report
    pub async fn run(&self, root: &Path) -> Result<Report> {
        let peers = self.discover(root)?;
        let generated_at = chrono::Local::now();
        let probed = self.probe(peers).await;
        Ok(Report::new(probed, generated_at))
    }
}
