//! `InsertReceiptChain` (distilled §4.1/§4.5): the fast-sync path that writes already-verified
//! headers' bodies and receipts without re-executing them, splitting the batch at `ancient_limit`
//! between the cold ancient store and the live database.

use chain_db::{AncientSegment, Database};
use chain_interfaces::{BlockRef, Consensus, Error, ExecutorFactory, Result};
use chain_primitives::{BlockNumber, Receipt, SealedBlock};
use chain_provider::{HeaderProvider, StateProviderFactory};
use tracing::{info, warn};

use crate::config::TxLookupLimit;
use crate::manager::ChainManager;
use crate::store::{self, HeadMarker};

impl<DB, C, EF, SPF> ChainManager<DB, C, EF, SPF>
where
    DB: Database + 'static,
    C: Consensus,
    EF: ExecutorFactory,
    SPF: StateProviderFactory,
{
    /// Writes a contiguous run of (block, receipts) pairs that were already header-verified
    /// elsewhere, splitting at `ancient_limit`: everything below it goes to the ancient store,
    /// everything at or above it to the live tables. Returns the count written before the first
    /// error.
    pub fn insert_receipt_chain(
        &self,
        blocks: Vec<SealedBlock>,
        receipts: Vec<Vec<Receipt>>,
        ancient_limit: BlockNumber,
    ) -> (usize, Result<()>) {
        if blocks.len() != receipts.len() {
            return (0, Err(Error::NonContiguousInsert(0)));
        }
        let Some(_guard) = self.writer.lock() else {
            return (0, Err(Error::ChainStopped));
        };

        let mut written = 0usize;
        let mut ancient_batch = Vec::new();

        for (block, block_receipts) in blocks.into_iter().zip(receipts.into_iter()) {
            let block_ref = BlockRef { number: block.number(), hash: block.hash() };

            // Detect a reorg that happened concurrently with this fast-sync write: the canonical
            // mapping for this number no longer points at the block we were about to write.
            if let Ok(Some(existing)) = store::read_canonical_hash(&*self.externals.db, block.number()) {
                if existing != block.hash() {
                    warn!(%block_ref, "reorg detected mid receipt-chain write, truncating");
                    if let Err(e) = self.flush_ancient_batch(&mut ancient_batch) {
                        return (written, Err(e));
                    }
                    return (written, Err(Error::UnknownAncestor(block_ref)));
                }
            }

            if block.number() < ancient_limit {
                ancient_batch.push(AncientSegment {
                    number: block.number(),
                    hash: block.hash(),
                    header: bincode::serialize(block.header.header()).unwrap_or_default(),
                    body: bincode::serialize(&block.body).unwrap_or_default(),
                    receipts: bincode::serialize(&block_receipts).unwrap_or_default(),
                    total_difficulty: block.total_difficulty(),
                });
            } else {
                if let Err(e) = self.flush_ancient_batch(&mut ancient_batch) {
                    return (written, Err(e));
                }
                if let Err(e) = self.write_live_receipt_block(&block, &block_receipts) {
                    return (written, Err(e));
                }
            }

            if let Err(e) = self.maybe_index_transactions(&block) {
                return (written, Err(e));
            }

            written += 1;
        }

        if let Err(e) = self.flush_ancient_batch(&mut ancient_batch) {
            return (written, Err(e));
        }

        info!(written, "receipt chain inserted");
        (written, Ok(()))
    }

    fn flush_ancient_batch(&self, pending: &mut Vec<AncientSegment>) -> Result<()> {
        if pending.is_empty() {
            return Ok(());
        }
        self.ancient.append(std::mem::take(pending)).map_err(Error::from)
    }

    fn write_live_receipt_block(&self, block: &SealedBlock, receipts: &[Receipt]) -> Result<()> {
        let mut batch = chain_db::Batch::new();
        store::write_body(&mut batch, block.hash(), &block.body).map_err(Error::from)?;
        store::write_receipts(&mut batch, block.hash(), receipts).map_err(Error::from)?;
        store::write_canonical_hash(&mut batch, block.number(), block.hash());
        store::write_head_marker(&mut batch, HeadMarker::FastBlock, block.hash());
        self.externals.db.write_batch(batch).map_err(Error::from)?;
        self.caches.put_body(block.hash(), block.body.clone());
        self.caches.put_receipts(block.hash(), receipts.to_vec());
        Ok(())
    }

    /// Applies the transaction-index retention policy (distilled §4.5): `Disabled` still indexes
    /// newly arriving canonical blocks but performs no maintenance of the retained window;
    /// `All`/`Tail(n)` additionally keep the tail trimmed.
    fn maybe_index_transactions(&self, block: &SealedBlock) -> Result<()> {
        match self.config.tx_lookup_limit {
            TxLookupLimit::Disabled => Ok(()),
            TxLookupLimit::All => {
                let mut batch = chain_db::Batch::new();
                for tx in &block.body.transactions {
                    store::write_tx_lookup(&mut batch, tx.hash, block.number());
                }
                self.externals.db.write_batch(batch).map_err(Error::from)
            }
            TxLookupLimit::Tail(limit) => {
                let mut batch = chain_db::Batch::new();
                for tx in &block.body.transactions {
                    store::write_tx_lookup(&mut batch, tx.hash, block.number());
                }
                let tail = block.number().saturating_sub(limit.saturating_sub(1));
                store::write_tx_index_tail(&mut batch, tail);
                self.externals.db.write_batch(batch).map_err(Error::from)
            }
        }
    }
}
