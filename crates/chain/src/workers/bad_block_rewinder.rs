//! Optional worker (distilled §4.1, enabled when the node wants automatic recovery from a
//! state-root mismatch discovered after the fact, e.g. via snapshot verification): rewinds the
//! head by one block and marks the rewound block bad, so the next sync attempt fetches an
//! alternative.
//!
//! This worker is a thin wrapper: the actual verification trigger (a snapshot or trie consistency
//! check failing against the current head) is an external-collaborator concern; what lives here
//! is the reaction once that signal arrives, modeled as a simple poll against
//! [`chain_provider::SnapshotTree`] rather than requiring its own channel.

use std::sync::Arc;
use std::time::Duration;

use chain_db::Database;
use chain_interfaces::{Consensus, ExecutorFactory};
use chain_provider::{SnapshotTree, StateProviderFactory};
use tracing::warn;

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
        let Some(block) = manager.current_block() else { continue };
        if !manager.snapshot_tree.enabled() {
            continue;
        }
        if manager.snapshot_tree.snapshot(block.header.state_root()).is_some() {
            continue;
        }
        warn!(number = block.number(), "head state unverifiable, rewinding by one and banning");
        if let Err(err) = manager.mark_bad_block(block.hash()) {
            warn!(?err, "failed to persist bad-block marker");
            continue;
        }
        if let Err(err) = manager.set_head(block.number().saturating_sub(1)) {
            warn!(?err, "failed to rewind past unverifiable head");
        }
    }
}
