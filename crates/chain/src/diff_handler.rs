//! `HandleDiffLayer` (distilled §6/§4.6): ingests an untrusted diff layer gossiped by a peer,
//! indexing it and immediately enforcing both the fork-distance/queue-distance prune and the
//! per-peer retention quota so a single noisy or malicious peer can't grow the untrusted index
//! unbounded.

use chain_db::Database;
use chain_interfaces::{Consensus, ExecutorFactory, Result};
use chain_primitives::BlockHash;
use chain_provider::StateProviderFactory;
use tracing::debug;

use crate::diff_layer::DiffLayer;
use crate::manager::ChainManager;

impl<DB, C, EF, SPF> ChainManager<DB, C, EF, SPF>
where
    DB: Database + 'static,
    C: Consensus,
    EF: ExecutorFactory,
    SPF: StateProviderFactory,
{
    /// Indexes `layer` as coming from `peer_id`, then prunes the untrusted index by distance from
    /// the current head and enforces `max_diff_limit` as the per-peer retention quota. Returns the
    /// layer's diff hash, the identifier peers reference it by afterward.
    pub fn handle_diff_layer(&self, peer_id: String, layer: DiffLayer) -> Result<BlockHash> {
        let layer = layer.normalize();
        let head = self.current_block().map(|b| b.number()).unwrap_or_default();

        let mut index = self.untrusted_diffs.write();
        let diff_hash = index.insert(peer_id.clone(), layer);
        index.prune_by_distance(head, self.config.max_diff_fork_dist, self.config.max_diff_queue_dist);
        index.enforce_peer_quota(&peer_id, self.config.max_diff_limit);

        debug!(%peer_id, %diff_hash, "indexed untrusted diff layer");
        Ok(diff_hash)
    }
}
