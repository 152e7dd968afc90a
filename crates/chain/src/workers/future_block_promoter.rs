//! Promotes queued future blocks back into the insertion pipeline once their timestamp is no
//! longer ahead of wall clock, or once `maxTimeFutureBlocks` gives up on them (distilled §4.1:
//! "proof-of-stake blocks are never queued, so this worker only ever handles pre-merge blocks").

use std::sync::Arc;
use std::time::Duration;

use chain_db::Database;
use chain_interfaces::{Consensus, ExecutorFactory};
use chain_provider::StateProviderFactory;
use tracing::debug;

use crate::manager::ChainManager;

const TICK: Duration = Duration::from_secs(5);

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
        let (ready, expired) = manager
            .caches
            .drain_future_blocks_for_retry(manager.config().max_time_future_blocks_secs);
        if expired > 0 {
            debug!(expired, "dropped future blocks that exceeded their retry budget");
        }
        if ready.is_empty() {
            continue;
        }
        debug!(count = ready.len(), "retrying future blocks");
        for block in ready {
            let (_n, result) = manager.insert_chain(vec![block]);
            if let Err(err) = result {
                debug!(?err, "future block retry did not land");
            }
        }
    }
}
