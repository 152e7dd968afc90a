//! Background workers (distilled §1 item 7, ~15% of the manager's surface): periodic tasks that
//! run alongside the manager on its own `tokio` runtime, each taking the writer lock only for a
//! short critical section per tick.
//!
//! Grounded on the teacher's `tokio::spawn` usage pattern for long-lived background tasks
//! (payload-builder service loop in `bin/reth`), generalized to five independent tickers instead
//! of one.

mod bad_block_rewinder;
mod diff_persister;
mod diff_pruner;
mod future_block_promoter;
mod tx_indexer;

use std::sync::Arc;

use chain_db::Database;
use chain_interfaces::{Consensus, ExecutorFactory};
use chain_provider::StateProviderFactory;
use tokio::task::JoinHandle;

use crate::manager::ChainManager;

/// Handles to every spawned background worker; dropping this does not stop the workers — call
/// [`ChainManager::stop`] first so each worker's next tick observes the closed writer lock and
/// exits on its own.
pub struct Workers {
    pub handles: Vec<JoinHandle<()>>,
}

impl Workers {
    /// Spawns all five workers against `manager`, per the `ChainConfig` it was built with.
    pub fn spawn<DB, C, EF, SPF>(manager: Arc<ChainManager<DB, C, EF, SPF>>) -> Self
    where
        DB: Database + 'static,
        C: Consensus + 'static,
        EF: ExecutorFactory + 'static,
        SPF: StateProviderFactory + 'static,
    {
        let handles = vec![
            tokio::spawn(future_block_promoter::run(manager.clone())),
            tokio::spawn(diff_persister::run(manager.clone())),
            tokio::spawn(diff_pruner::run(manager.clone())),
            tokio::spawn(tx_indexer::run(manager.clone())),
            tokio::spawn(bad_block_rewinder::run(manager)),
        ];
        Self { handles }
    }
}
