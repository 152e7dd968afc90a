//! Flushes matured trusted diff layers to the [`chain_db::DiffStore`] (distilled §4.6): a layer
//! is mature once `head - number >= TriesInMemory`, and anything older than
//! `diffLayerFreezerBlockLimit` is deleted instead of persisted, since the ancient store will
//! cover that range from the receipt chain directly.

use std::sync::Arc;
use std::time::Duration;

use chain_db::Database;
use chain_interfaces::{Consensus, ExecutorFactory};
use chain_provider::StateProviderFactory;
use tracing::{debug, warn};

use crate::manager::ChainManager;

const TICK: Duration = Duration::from_secs(3);

pub(super) async fn run<DB, C, EF, SPF>(manager: Arc<ChainManager<DB, C, EF, SPF>>)
where
    DB: Database + 'static,
    C: Consensus,
    EF: ExecutorFactory,
    SPF: StateProviderFactory,
{
    let mut ticker = tokio::time::interval(TICK);
    loop {
        ticker.tick().await;
        if manager.writer.is_closed() {
            return;
        }
        let Some(head) = manager.current_header() else { continue };
        let matured = {
            let mut queue = manager.trusted_diffs.lock();
            let mut out = Vec::new();
            while let Some(layer) = queue.pop_matured(head.number().saturating_sub(manager.config().tries_in_memory))
            {
                out.push(layer);
            }
            out
        };
        for layer in matured {
            if head.number().saturating_sub(layer.block_number) > manager.config().diff_layer_freezer_block_limit {
                debug!(block = layer.block_number, "diff layer aged past freezer limit, discarding");
                continue;
            }
            if let Err(err) = manager.persist_diff_layer(&layer) {
                warn!(?err, block = layer.block_number, "failed to persist diff layer");
            }
        }
    }
}
