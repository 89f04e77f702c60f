//! Fan-out of one probe task per peer.

use crate::peer::Peer;
use crate::probe::prober::Prober;
use futures::future::join_all;
use std::sync::Arc;

/// Probe every peer concurrently and return them once all probes finished
///
/// One task is spawned per peer with no concurrency cap and no cancellation.
/// Each task owns a copy of its peer's target and hands back only the
/// outcome, so slot `i` of the result is written once, here, from task `i`.
/// The returned peers keep the input order.
pub async fn probe_all(prober: Arc<Prober>, mut peers: Vec<Peer>) -> Vec<Peer> {
    log::info!("Probing {} peers", peers.len());

    let tasks = peers.iter().map(|peer| {
        let prober = Arc::clone(&prober);
        let target = peer.target().clone();
        tokio::spawn(async move { prober.check(&target).await })
    });
    let outcomes = join_all(tasks).await;

    for (peer, outcome) in peers.iter_mut().zip(outcomes) {
        match outcome {
            Ok(Some(latency)) => peer.mark_alive(latency),
            Ok(None) => {}
            Err(e) => log::warn!("Probe task for {} failed: {}", peer.uri(), e),
        }
    }

    let alive = peers.iter().filter(|p| p.is_up()).count();
    log::info!("Probe finished: {} alive, {} dead", alive, peers.len() - alive);
    peers
}
