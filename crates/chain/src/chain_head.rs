//! `SetChainHead` (distilled §6): forcibly points the canonical head at a block that is already
//! durable (header, body, and — unlike `SetCanonical`'s reorg-driven cousins in `reorg.rs` — no
//! replay), used by an external consensus client issuing a trusted fork-choice update.
//!
//! Grounded on `set_head.rs`'s head-marker-write shape, run forward instead of backward.

use chain_db::Database;
use chain_interfaces::{BlockRef, Consensus, Error, ExecutorFactory, Result};
use chain_primitives::{BlockHash, SealedBlock};
use chain_provider::{HeaderProvider, StateProviderFactory};
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
    /// Moves the canonical head to `hash` without re-executing it: the caller attests the block
    /// (and its full ancestry) is already durable and state-verified, typically because it arrived
    /// via `InsertBlockWithoutSetHead` ahead of the engine API's fork-choice update.
    pub fn set_chain_head(&self, hash: BlockHash) -> Result<()> {
        let Some(_guard) = self.writer.lock() else { return Err(Error::ChainStopped) };

        let header = self
            .header_chain
            .header(&hash)
            .ok_or(Error::UnknownAncestor(BlockRef { number: 0, hash }))?;
        let block_ref = BlockRef { number: header.number(), hash };
        let body = store::read_body(&*self.externals.db, hash)
            .map_err(Error::from)?
            .ok_or(Error::UnknownAncestor(block_ref))?;

        let mut batch = chain_db::Batch::new();
        store::write_canonical_hash(&mut batch, header.number(), hash);
        store::write_head_marker(&mut batch, HeadMarker::Block, hash);
        store::write_head_marker(&mut batch, HeadMarker::Header, hash);
        self.externals.db.write_batch(batch).map_err(Error::from)?;

        let block = SealedBlock { header, body };
        self.caches.put_block(block.clone());
        self.head.commit_block_head(block);

        info!(%block_ref, "chain head set directly");
        Ok(())
    }
}
