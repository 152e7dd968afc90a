//! `SnapSyncCommitHead` (distilled §6): commits a snap-sync pivot block as the fast-sync frontier
//! without requiring its state to be locally verifiable yet — the frontier trails the verified
//! head until execution (or a trust-the-pivot policy) catches up to it.
//!
//! Grounded on `receipt_chain.rs`'s `write_live_receipt_block`, which already stages
//! `HeadMarker::FastBlock` alongside body/receipts for exactly this reason.

use chain_db::Database;
use chain_interfaces::{Consensus, Error, ExecutorFactory, Result};
use chain_primitives::SealedBlock;
use chain_provider::StateProviderFactory;
use tracing::info;

use crate::manager::ChainManager;
use crate::store::{self, HeadMarker};

impl<DB, C, EF, SPF> ChainManager<DB, C, EF, SPF>
where
    DB: Database + 'static,
    C: Consensus,
    EF: ExecutorFactory,
    SPF: StateProviderFactory,
{
    /// Records `block` as the fast-sync frontier: body and `HeadFastBlockHash` are written, but
    /// `HeadBlockHash`/`HeadHeaderHash` are left untouched since the block's state has not been
    /// verified by this manager.
    pub fn snap_sync_commit_head(&self, block: SealedBlock) -> Result<()> {
        let Some(_guard) = self.writer.lock() else { return Err(Error::ChainStopped) };

        let mut batch = chain_db::Batch::new();
        store::write_body(&mut batch, block.hash(), &block.body).map_err(Error::from)?;
        store::write_head_marker(&mut batch, HeadMarker::FastBlock, block.hash());
        self.externals.db.write_batch(batch).map_err(Error::from)?;

        self.caches.put_body(block.hash(), block.body.clone());
        self.head.set_fast_block(block.clone());

        info!(hash = %block.hash(), number = block.number(), "snap-sync frontier committed");
        Ok(())
    }
}
