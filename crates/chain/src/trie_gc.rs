//! Trie garbage collection (distilled §4.1): decides which state roots have aged out of the
//! `TriesInMemory` window and are safe to commit to disk, deferring when a PoSA-capable consensus
//! engine hasn't yet finalized enough distance, or when a reorg is in flight.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use chain_db::Database;
use chain_interfaces::{Consensus, ExecutorFactory, Result};
use chain_primitives::{BlockNumber, StateRoot};
use chain_provider::{HeaderProvider, StateProviderFactory};
use tracing::debug;

use crate::manager::ChainManager;

/// Pending state roots awaiting their turn to be committed to disk, ordered oldest-block-number
/// first via a min-heap (`Reverse`) exactly like the trusted diff queue.
#[derive(Default)]
pub struct TrieGcQueue {
    heap: BinaryHeap<Reverse<BlockNumber>>,
    roots: HashMap<BlockNumber, StateRoot>,
}

impl TrieGcQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, number: BlockNumber, root: StateRoot) {
        if self.roots.insert(number, root).is_none() {
            self.heap.push(Reverse(number));
        }
    }

    pub fn peek_oldest(&self) -> Option<BlockNumber> {
        self.heap.peek().map(|Reverse(n)| *n)
    }

    pub fn pop_if_at_most(&mut self, chosen: BlockNumber) -> Option<(BlockNumber, StateRoot)> {
        loop {
            let Reverse(number) = *self.heap.peek()?;
            if number > chosen {
                return None;
            }
            self.heap.pop();
            if let Some(root) = self.roots.remove(&number) {
                return Some((number, root));
            }
        }
    }

    pub fn get(&self, number: BlockNumber) -> Option<StateRoot> {
        self.roots.get(&number).copied()
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }
}

impl<DB, C, EF, SPF> ChainManager<DB, C, EF, SPF>
where
    DB: Database + 'static,
    C: Consensus,
    EF: ExecutorFactory,
    SPF: StateProviderFactory,
{
    /// Called after every new canonical block; flushes whatever has aged past
    /// `TriesInMemory` unless the consensus engine signals insufficient finality distance, or
    /// flushes unconditionally when `TrieDirtyDisabled` (archive mode).
    pub(crate) fn run_trie_gc(&self, head_number: BlockNumber, root: StateRoot) -> Result<()> {
        let mut queue = self.trie_queue.lock();
        queue.push(head_number, root);

        if self.config.trie_dirty_disabled {
            while let Some((number, root)) = queue.pop_if_at_most(head_number) {
                self.flush_root(number, root)?;
            }
            return Ok(());
        }

        if head_number < self.config.tries_in_memory {
            return Ok(());
        }
        let chosen = head_number - self.config.tries_in_memory;

        if let Some(capability) = self.externals.consensus.posa_capability() {
            if !capability.enough_distance(head_number, chosen) {
                debug!(head_number, chosen, "deferring trie flush: insufficient finality distance");
                return Ok(());
            }
        }

        if let Some((number, root)) = queue.pop_if_at_most(chosen) {
            drop(queue);
            self.flush_root(number, root)?;
            self.state_db.cap(self.config.ideal_batch_size_bytes);
        }
        Ok(())
    }

    fn flush_root(&self, number: BlockNumber, root: StateRoot) -> Result<()> {
        debug!(number, root = ?root, "flushing trie root to disk");
        self.state_db.commit(root, || Ok(()))?;
        self.state_db.dereference(root);
        Ok(())
    }

    /// Stop-time policy (distilled §4.1): commit head, head-1, and head-(TriesInMemory-1) so a
    /// restart never has to replay more than a `TriesInMemory`-sized gap.
    pub(crate) fn flush_trie_on_stop(&self) {
        let Some(head) = self.current_header() else { return };
        let targets = [
            head.number(),
            head.number().saturating_sub(1),
            head.number().saturating_sub(self.config.tries_in_memory.saturating_sub(1)),
        ];
        let mut queue = self.trie_queue.lock();
        for number in targets {
            if let Some(root) = queue.get(number).or_else(|| self.header_chain.header_by_number(number).map(|h| h.state_root())) {
                drop(queue);
                if let Err(err) = self.flush_root(number, root) {
                    tracing::warn!(?err, number, "failed to flush trie root on stop");
                }
                queue = self.trie_queue.lock();
            }
        }
    }
}
