//! The insertion pipeline (distilled §4.1 core algorithm): contiguity check, writer-lock
//! acquisition, per-block classification and handling, culminating in either a plain append, a
//! reorg, or delegation to the side-chain path.

use chain_db::Database;
use chain_interfaces::{BlockRef, Consensus, Error, ExecutorFactory, Result};
use chain_primitives::{Address, Log, SealedBlock, SealedBlockWithSenders, TotalDifficulty};
use chain_provider::{HeaderProvider, StateProviderFactory};
use tracing::{debug, info, warn};

use crate::diff_layer::DiffLayer;
use crate::events::{ChainBlockEvent, ChainEvent, ChainHeadEvent, LogsEvent};
use crate::manager::ChainManager;
use crate::store;

/// Outcome of classifying one block against current chain state before attempting to process it.
enum Classification {
    /// Already canonical with state present; not an error, just skip it.
    Known,
    /// Parent is the current canonical head: the common, fast path.
    ExtendsHead,
    /// Parent is known (in the db) but isn't the current head: this block starts or continues a
    /// side chain.
    SideChain,
    /// Parent is nowhere to be found and the block's timestamp is in the future: queue it.
    Future,
    /// Parent is nowhere to be found and the timestamp is not in the future: a real gap.
    UnknownAncestor,
}

impl<DB, C, EF, SPF> ChainManager<DB, C, EF, SPF>
where
    DB: Database + 'static,
    C: Consensus,
    EF: ExecutorFactory,
    SPF: StateProviderFactory,
{
    /// Inserts a contiguous batch of blocks, returning the number successfully made canonical
    /// before the first error (distilled §8: `InsertChain` returns `(n, err)`).
    pub fn insert_chain(&self, blocks: Vec<SealedBlockWithSenders>) -> (usize, Result<()>) {
        if blocks.is_empty() {
            return (0, Ok(()));
        }
        if let Err(e) = validate_contiguous(&blocks) {
            return (0, Err(e));
        }

        let Some(_guard) = self.writer.lock() else {
            return (0, Err(Error::ChainStopped));
        };

        let head_before = self.current_block().map(|b| b.hash());

        self.events.publish(ChainEvent::Proc(crate::events::BlockProcEvent::Started));
        let mut inserted = 0usize;
        for block in blocks {
            if self.writer.is_closed() {
                self.publish_head_event_if_changed(head_before);
                return (inserted, Err(Error::ChainStopped));
            }
            match self.insert_one(block) {
                Ok(InsertOutcome::Inserted) => inserted += 1,
                Ok(InsertOutcome::Skipped) => inserted += 1,
                Err(e) => {
                    self.publish_head_event_if_changed(head_before);
                    self.events.publish(ChainEvent::Proc(crate::events::BlockProcEvent::Finished));
                    return (inserted, Err(e));
                }
            }
        }
        self.publish_head_event_if_changed(head_before);
        self.events.publish(ChainEvent::Proc(crate::events::BlockProcEvent::Finished));
        (inserted, Ok(()))
    }

    /// Publishes one `ChainHeadEvent` for the whole batch (distilled §4.1: "the head event fires
    /// once per batch, not once per block"), including reorgs nested inside it, and only if the
    /// head actually moved — a no-op re-insertion of the current head must not re-fire it.
    fn publish_head_event_if_changed(&self, head_before: Option<chain_primitives::BlockHash>) {
        if let Some(block) = self.current_block() {
            if Some(block.hash()) != head_before {
                self.events.publish(ChainEvent::Head(ChainHeadEvent { block }));
            }
        }
    }

    fn classify(&self, block: &SealedBlockWithSenders) -> Classification {
        let hash = block.hash();
        let number = block.number();

        if let Some(current) = self.current_block() {
            if current.hash() == hash {
                return Classification::Known;
            }
            if block.parent_hash() == current.hash() {
                return Classification::ExtendsHead;
            }
        } else if number == chain_primitives::GENESIS_NUMBER {
            // Bootstrapping: the very first block ever inserted has no predecessor to extend.
            return Classification::ExtendsHead;
        }

        let parent_known = self.header_chain.header(&block.parent_hash()).is_some()
            || self.caches.get_block(&block.parent_hash()).is_some()
            || number > 0 && store::read_canonical_hash(&*self.externals.db, number - 1)
                .ok()
                .flatten()
                .map(|h| h == block.parent_hash())
                .unwrap_or(false);

        if parent_known {
            return Classification::SideChain;
        }

        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        if block.block.header.header().timestamp > now && !block.block.header.is_post_merge() {
            Classification::Future
        } else {
            Classification::UnknownAncestor
        }
    }

    fn insert_one(&self, block: SealedBlockWithSenders) -> Result<InsertOutcome> {
        let block_ref = BlockRef { number: block.number(), hash: block.hash() };

        if self.is_bad_block(&block.hash()) {
            return Err(Error::BannedHash(block_ref));
        }

        match self.classify(&block) {
            Classification::Known => {
                debug!(%block_ref, "already known, skipping");
                Ok(InsertOutcome::Skipped)
            }
            Classification::Future => {
                debug!(%block_ref, "future block, queueing");
                self.caches.queue_future_block(block);
                Err(Error::FutureBlock(block_ref))
            }
            Classification::UnknownAncestor => {
                warn!(%block_ref, "unknown ancestor, reporting and stopping");
                Err(Error::UnknownAncestor(block_ref))
            }
            Classification::SideChain => self.insert_side_chain_block(block),
            Classification::ExtendsHead => match self.extend_head(block.clone()) {
                Err(Error::PrunedAncestor(_)) => self.recover_pruned_ancestor(block, block_ref),
                other => other,
            },
        }
    }

    pub(crate) fn extend_head(&self, block: SealedBlockWithSenders) -> Result<InsertOutcome> {
        let block_ref = BlockRef { number: block.number(), hash: block.hash() };
        let (sealed, logs) = self.execute_and_write(&block, true)?;

        self.head.commit_block_head(sealed.clone());
        self.run_trie_gc(sealed.number(), sealed.header.state_root())?;

        self.events.publish(ChainEvent::Block(ChainBlockEvent { block: sealed }));
        if !logs.is_empty() {
            self.events.publish(ChainEvent::Logs(LogsEvent { logs }));
        }

        info!(%block_ref, "inserted block, new head");
        Ok(InsertOutcome::Inserted)
    }

    /// Writes `block` durably without moving the canonical head (distilled §6
    /// `InsertBlockWithoutSetHead`): same execute-and-persist path as [`Self::extend_head`], minus
    /// the head-marker write, minus the head/trie-GC follow-up. Does not take the writer lock —
    /// callers that aren't already inside one must go through [`Self::insert_block_without_set_head`].
    pub(crate) fn write_block_without_head(&self, block: SealedBlockWithSenders) -> Result<()> {
        let (sealed, logs) = self.execute_and_write(&block, false)?;
        self.events.publish(ChainEvent::Block(ChainBlockEvent { block: sealed }));
        if !logs.is_empty() {
            self.events.publish(ChainEvent::Logs(LogsEvent { logs }));
        }
        Ok(())
    }

    /// Public entry point for `InsertBlockWithoutSetHead` (distilled §6): durably writes a single
    /// block — header, body, receipts, canonical mapping, trusted diff layer — without touching the
    /// head markers. Used by snap-sync to commit bodies/receipts ahead of the verified frontier.
    pub fn insert_block_without_set_head(&self, block: SealedBlockWithSenders) -> Result<()> {
        let Some(_guard) = self.writer.lock() else { return Err(Error::ChainStopped) };
        self.write_block_without_head(block)
    }

    /// Executes `block` against its parent state, verifies and patches the receipts, and writes
    /// header/body/receipts/canonical-hash/tx-lookups/diff-layer in one atomic batch. Optionally
    /// stages the head markers into the same batch (`set_head = true`, the common linear-append
    /// case); the caller is responsible for everything downstream of the write (head commit, trie
    /// GC, the head event) since those differ between `extend_head` and `write_block_without_head`.
    fn execute_and_write(
        &self,
        block: &SealedBlockWithSenders,
        set_head: bool,
    ) -> Result<(SealedBlock, Vec<Log>)> {
        let block_ref = BlockRef { number: block.number(), hash: block.hash() };
        let parent_td = self
            .header_chain
            .total_difficulty(&block.parent_hash())
            .unwrap_or_default();
        let total_difficulty: TotalDifficulty = parent_td + block.block.header.header().difficulty;

        if let Err(reason) = self.externals.consensus.validate_header(block.header()) {
            return Err(Error::InvalidBlock { block: block_ref, reason });
        }

        let parent_root = self
            .header_chain
            .header(&block.parent_hash())
            .map(|h| h.state_root())
            .unwrap_or_default();

        let state = self
            .state_factory
            .history_by_block_number(block.number().saturating_sub(1))
            .or_else(|_| self.state_factory.latest())
            .map_err(|_| Error::PrunedAncestor(block_ref))?;

        let mut executor = self.externals.executor_factory.executor::<SPF::Provider>();
        let mut receipts = executor
            .execute_and_verify_receipt(block, total_difficulty, &state)
            .map_err(|e| Error::InvalidBlock { block: block_ref, reason: e.to_string() })?;

        for receipt in &mut receipts {
            receipt.patch_block_info(block.hash(), block.number());
        }
        if self.config.legacy_receipt_hash_patch {
            // Historical hot-fix (§9 open-question decision): the last three receipts of certain
            // legacy blocks were persisted with a stale block hash; opt-in re-patch corrects them
            // on the way in rather than requiring an offline migration.
            for receipt in receipts.iter_mut().rev().take(3) {
                receipt.patch_block_info(block.hash(), block.number());
            }
        }

        let logs: Vec<_> = receipts.iter().flat_map(|r| r.logs.clone()).collect();

        let mut batch = chain_db::Batch::new();
        self.header_chain
            .insert(vec![block.header().clone()])
            .map_err(|e| Error::Database(chain_interfaces::error::chain_db_error::DbError(e.to_string())))?;
        store::write_body(&mut batch, block.hash(), &block.block.body)
            .map_err(Error::from)?;
        store::write_receipts(&mut batch, block.hash(), &receipts).map_err(Error::from)?;
        store::write_canonical_hash(&mut batch, block.number(), block.hash());
        for tx in &block.block.body.transactions {
            store::write_tx_lookup(&mut batch, tx.hash, block.number());
        }
        if set_head {
            self.head.stage_block_head(&mut batch, &block.block);
        }
        self.externals.db.write_batch(batch).map_err(Error::from)?;

        self.caches.put_body(block.hash(), block.block.body.clone());
        self.caches.put_receipts(block.hash(), receipts.clone());
        for tx in &block.block.body.transactions {
            self.caches.put_tx_lookup(tx.hash, block.number());
        }
        self.caches.put_block(block.block.clone());
        self.state_db.record_dirty(block.block.header.state_root(), self.config.ideal_batch_size_bytes / 64);
        self.state_db.reference(block.block.header.state_root());
        self.state_db.cap(self.config.ideal_batch_size_bytes);

        let layer = DiffLayer {
            block_hash: block.hash(),
            block_number: block.number(),
            parent_root,
            root: block.block.header.state_root(),
            codes: Vec::new(),
            destructs: Vec::new(),
            accounts: Vec::new(),
            storages: Vec::new(),
        }
        .normalize();
        self.trusted_diffs.lock().push(layer);

        Ok((block.block.clone(), logs))
    }

    /// Ancestor recovery (distilled §4.1 error classification): `extend_head` failed because the
    /// parent's state isn't available. Pre-merge, this is handled the same as any other fork — fall
    /// back to side-chain storage. Post-merge, gather canonical ancestors backward from the current
    /// head until one with available state is found, replay them forward without moving the head,
    /// then retry `block`.
    ///
    /// Must not call [`Self::insert_block_without_set_head`]: that re-acquires the writer lock, and
    /// this runs from inside `insert_one`, already under `insert_chain`'s held lock.
    fn recover_pruned_ancestor(
        &self,
        block: SealedBlockWithSenders,
        block_ref: BlockRef,
    ) -> Result<InsertOutcome> {
        if !block.header().is_post_merge() {
            return self.insert_side_chain_block(block);
        }

        let Some(current) = self.current_header() else {
            return Err(Error::PrunedAncestor(block_ref));
        };

        let mut ancestors = Vec::new();
        let mut cursor = current;
        loop {
            if self.state_factory.history_by_block_number(cursor.number()).is_ok() {
                break;
            }
            if cursor.number() == chain_primitives::GENESIS_NUMBER {
                return Err(Error::PrunedAncestor(block_ref));
            }
            let Some(parent) = self.header_chain.header(&cursor.parent_hash()) else {
                return Err(Error::PrunedAncestor(block_ref));
            };
            ancestors.push(cursor);
            cursor = parent;
        }
        ancestors.reverse();

        warn!(%block_ref, recovering = ancestors.len(), "replaying ancestors to recover pruned state");
        for header in ancestors {
            let Some(body) = store::read_body(&*self.externals.db, header.hash()).map_err(Error::from)? else {
                return Err(Error::PrunedAncestor(block_ref));
            };
            let senders = vec![Address::default(); body.transactions.len()];
            let sealed = SealedBlock { header, body };
            let with_senders = sealed
                .with_senders(senders)
                .expect("sender count matches transaction count by construction");
            self.write_block_without_head(with_senders)?;
        }

        self.extend_head(block)
    }
}

pub(crate) enum InsertOutcome {
    Inserted,
    Skipped,
}

fn validate_contiguous(blocks: &[SealedBlockWithSenders]) -> Result<()> {
    for (i, pair) in blocks.windows(2).enumerate() {
        let (a, b) = (&pair[0], &pair[1]);
        if b.parent_hash() != a.hash() || b.number() != a.number() + 1 {
            return Err(Error::NonContiguousInsert(i + 1));
        }
    }
    Ok(())
}
