//! Prunes the untrusted diff-layer index (distilled §4.6): discards layers further than
//! `maxDiffForkDist` behind the head or `maxDiffQueueDist` ahead of it, then trims any peer over
//! its `maxDiffLimit`/`maxDiffLimitForBroadcast` quota.

use std::sync::Arc;
use std::time::Duration;

use chain_db::Database;
use chain_interfaces::{Consensus, ExecutorFactory};
use chain_provider::StateProviderFactory;

use crate::manager::ChainManager;

const TICK: Duration = Duration::from_secs(1);

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
        let mut index = manager.untrusted_diffs.write();
        index.prune_by_distance(head.number(), manager.config().max_diff_fork_dist, manager.config().max_diff_queue_dist);
        let peers: Vec<String> = index
            .for_block(&head.hash())
            .into_iter()
            .map(|l| format!("{:#x}", l.block_hash))
            .collect();
        for peer in peers {
            index.enforce_peer_quota(&peer, manager.config().max_diff_limit);
        }
    }
}
