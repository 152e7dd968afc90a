//! Side-chain handling (distilled §4.1): a block whose parent is known but which does not extend
//! the current canonical head is stored as header+body+total-difficulty, without state, pending
//! either a future reorg onto it or abandonment.
//!
//! Grounded on `other_examples/58fa2380_lambdaclass-ethrex__crates-blockchain-blockchain.rs.rs`'s
//! fork-handling branch (store the block, compare total difficulty, reorg only on a strict
//! improvement) and `other_examples/b39f23b0_tari-project-tari__base_layer-core-src-chain_storage-blockchain_backend.rs.rs`'s
//! ghost-state guard.

use chain_db::Database;
use chain_interfaces::{BlockRef, Consensus, Error, ExecutorFactory, Result};
use chain_primitives::{SealedBlockWithSenders, TotalDifficulty};
use chain_provider::{HeaderProvider, StateProviderFactory};
use tracing::{info, warn};

use crate::events::{ChainEvent, ChainSideEvent};
use crate::manager::ChainManager;
use crate::store;

impl<DB, C, EF, SPF> ChainManager<DB, C, EF, SPF>
where
    DB: Database + 'static,
    C: Consensus,
    EF: ExecutorFactory,
    SPF: StateProviderFactory,
{
    /// Accepts `block` onto a side chain, then checks whether fork-choice now prefers it to the
    /// current head.
    pub(crate) fn insert_side_chain_block(
        &self,
        block: SealedBlockWithSenders,
    ) -> Result<crate::insert::InsertOutcome> {
        let block_ref = BlockRef { number: block.number(), hash: block.hash() };

        // Ghost-state attack guard (distilled §8 scenario 5): a side-chain block claiming the same
        // number and state root as the canonical block at that height, but a different hash, is
        // rejected outright rather than accepted as an equally-valid fork.
        if let Some(canonical_hash) = store::read_canonical_hash(&*self.externals.db, block.number())
            .map_err(Error::from)?
        {
            if canonical_hash != block.hash() {
                if let Some(canonical_header) = self.header_chain.header(&canonical_hash) {
                    if canonical_header.state_root() == block.block.header.state_root() {
                        warn!(%block_ref, "rejecting ghost-state side-chain block");
                        return Err(Error::GhostStateAttack(block_ref));
                    }
                }
            }
        }

        if let Err(reason) = self.externals.consensus.validate_header(block.header()) {
            return Err(Error::InvalidBlock { block: block_ref, reason });
        }

        let parent_td = self
            .header_chain
            .total_difficulty(&block.parent_hash())
            .unwrap_or_default();
        let total_difficulty: TotalDifficulty = parent_td + block.block.header.header().difficulty;

        let mut batch = chain_db::Batch::new();
        self.header_chain
            .insert(vec![block.header().clone()])
            .map_err(|e| Error::Database(chain_interfaces::error::chain_db_error::DbError(e.to_string())))?;
        store::write_body(&mut batch, block.hash(), &block.block.body).map_err(Error::from)?;
        self.externals.db.write_batch(batch).map_err(Error::from)?;
        self.caches.put_body(block.hash(), block.block.body.clone());

        info!(%block_ref, %total_difficulty, "accepted side-chain block");
        self.events.publish(ChainEvent::Side(ChainSideEvent { block: block.block.clone() }));

        let current = self.current_block();
        let current_td = current
            .as_ref()
            .map(|b| self.header_chain.total_difficulty(&b.hash()).unwrap_or_default())
            .unwrap_or_default();

        let should_reorg = match &current {
            None => true,
            Some(current_block) => chain_consensus::should_reorg(
                &self.externals.consensus,
                &current_block.header,
                current_td,
                &block.block.header,
                total_difficulty,
                self.should_preserve.as_ref(),
            ),
        };

        if should_reorg {
            self.reorg_to(block)?;
        }

        Ok(crate::insert::InsertOutcome::Inserted)
    }

    /// Re-executes a side chain's blocks from the common ancestor forward, in batches bounded by
    /// both block count and estimated byte size (distilled §4.1: "2048 blocks / 64 MiB batches"),
    /// so a deep side chain never holds the writer lock across one unbounded pass.
    pub(crate) fn replay_side_chain_from_ancestor(
        &self,
        ancestor_number: chain_primitives::BlockNumber,
        chain: &[SealedBlockWithSenders],
    ) -> Result<()> {
        let mut batch_blocks = Vec::new();
        let mut batch_bytes: u64 = 0;
        for block in chain {
            let approx_size = block.block.body.transactions.len() as u64 * 256 + 512;
            if batch_blocks.len() as u64 >= self.config.side_chain_batch_block_limit
                || batch_bytes + approx_size > self.config.side_chain_batch_byte_limit
            {
                self.execute_replay_batch(std::mem::take(&mut batch_blocks))?;
                batch_bytes = 0;
            }
            batch_bytes += approx_size;
            batch_blocks.push(block.clone());
        }
        if !batch_blocks.is_empty() {
            self.execute_replay_batch(batch_blocks)?;
        }
        info!(ancestor_number, replayed = chain.len(), "side chain replay complete");
        Ok(())
    }

    fn execute_replay_batch(&self, blocks: Vec<SealedBlockWithSenders>) -> Result<()> {
        for block in blocks {
            self.extend_head(block)?;
        }
        Ok(())
    }
}
