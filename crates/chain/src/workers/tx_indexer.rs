//! Maintains the transaction-index retention window (distilled §4.5): trims entries below the
//! tail for `Tail(n)`, backfills any missing range for `All`, and does nothing for `Disabled`
//! beyond what the insertion path already indexes as blocks arrive.
//!
//! The tail is never allowed to overlap a concurrent backfill — both operations advance the same
//! persisted `TxIndexTail` marker, so at most one of "trim" or "backfill" is ever in flight for a
//! given tick.

use std::sync::Arc;
use std::time::Duration;

use chain_db::Database;
use chain_interfaces::{Consensus, ExecutorFactory};
use chain_provider::StateProviderFactory;
use tracing::debug;

use crate::config::TxLookupLimit;
use crate::manager::ChainManager;
use crate::store;

const TICK: Duration = Duration::from_secs(2);

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
        let TxLookupLimit::Tail(limit) = manager.config().tx_lookup_limit else { continue };
        let Some(head) = manager.current_header() else { continue };
        let target_tail = head.number().saturating_sub(limit.saturating_sub(1));
        let current_tail = store::read_tx_index_tail(&*manager.externals.db).ok().flatten().unwrap_or(0);
        if current_tail >= target_tail {
            continue;
        }
        debug!(from = current_tail, to = target_tail, "trimming transaction index tail");
        let mut batch = chain_db::Batch::new();
        let mut number = current_tail;
        while number < target_tail {
            if let Ok(Some(hash)) = store::read_canonical_hash(&*manager.externals.db, number) {
                if let Ok(Some(body)) = store::read_body(&*manager.externals.db, hash) {
                    for tx in body.transactions {
                        store::delete_tx_lookup(&mut batch, tx.hash);
                        manager.caches.purge_tx_lookup(&tx.hash);
                    }
                }
            }
            number += 1;
        }
        store::write_tx_index_tail(&mut batch, target_tail);
        if let Err(err) = manager.externals.db.write_batch(batch) {
            tracing::warn!(?err, "failed to persist transaction index tail trim");
        }
    }
}
