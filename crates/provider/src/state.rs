use chain_primitives::{BlockNumber, StateRoot};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Opaque handle to a readable world-state snapshot at some root.
///
/// Trie internals (node encoding, account/storage proofs) are an external-collaborator concern
/// (Non-goals); the manager and the executor only ever hold this as a capability token to pass
/// to [`chain_interfaces::BlockExecutor`].
pub trait StateProvider: Send + Sync {
    fn root(&self) -> StateRoot;
}

/// Opaque handle to a writable state transition produced by executing a block; `commit` is the
/// only operation the manager calls on it directly.
pub trait StateWriter: Send + Sync {
    fn root(&self) -> StateRoot;
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("state root {0:#x} is not available (pruned or never committed)")]
    Unavailable(StateRoot),
    #[error("no state recorded for block {0}")]
    NoHistoryAt(BlockNumber),
}

/// External collaborator: maps a state root (or a block position) to a readable state provider.
/// Mirrors the teacher's `StateProviderFactory` (`db.latest()`, `db.history_by_block_number(n)`).
pub trait StateProviderFactory: Send + Sync {
    type Provider: StateProvider;

    fn latest(&self) -> Result<Self::Provider, StateError>;
    fn history_by_block_number(&self, number: BlockNumber) -> Result<Self::Provider, StateError>;
    fn state_by_root(&self, root: StateRoot) -> Result<Self::Provider, StateError>;
}

/// Bookkeeping for one state root the manager is tracking between execution and disk commit.
#[derive(Debug, Clone, Copy, Default)]
struct DirtyEntry {
    /// Number of in-memory referrers (distilled §3: "reference-counted in the trie cache").
    refs: u32,
    /// Estimated heap footprint of this root's dirty nodes, counted against the dirty-memory cap.
    size: usize,
    committed_to_disk: bool,
}

/// The state database facade (distilled §1 item 3): reference counting, a capped dirty-memory
/// budget, and periodic commit-to-disk. The *scheduling* of which root to flush when
/// (`TriesInMemory`, consensus-engine safety distance, in-flight reorgs) belongs to the chain
/// manager's trie-GC worker (`crates/chain::trie_gc`); this facade only exposes the primitives it
/// needs: reference, dereference, record, commit, and cap.
pub struct StateDb {
    dirty: RwLock<HashMap<StateRoot, DirtyEntry>>,
    dirty_memory_used: AtomicUsize,
    dirty_memory_limit: usize,
}

impl StateDb {
    pub fn new(dirty_memory_limit_bytes: usize) -> Self {
        Self {
            dirty: RwLock::new(HashMap::new()),
            dirty_memory_used: AtomicUsize::new(0),
            dirty_memory_limit: dirty_memory_limit_bytes,
        }
    }

    /// Registers a freshly-executed state root as dirty (not yet on disk), with an estimated
    /// memory footprint.
    pub fn record_dirty(&self, root: StateRoot, size: usize) {
        let mut guard = self.dirty.write();
        let entry = guard.entry(root).or_default();
        entry.size = size;
        self.dirty_memory_used.fetch_add(size, Ordering::SeqCst);
    }

    /// Increments the reference count on `root` (distilled §3 invariant: a referenced root is
    /// either on disk or ref-counted in the trie cache).
    pub fn reference(&self, root: StateRoot) {
        self.dirty.write().entry(root).or_default().refs += 1;
    }

    /// Decrements the reference count on `root`; does not evict immediately — eviction happens
    /// under memory pressure via [`StateDb::cap`].
    pub fn dereference(&self, root: StateRoot) {
        if let Some(entry) = self.dirty.write().get_mut(&root) {
            entry.refs = entry.refs.saturating_sub(1);
        }
    }

    /// Marks `root` as committed to disk, via the supplied closure (which performs the actual
    /// trie-node writes — an external-collaborator concern).
    pub fn commit(&self, root: StateRoot, writer: impl FnOnce() -> Result<(), StateError>) -> Result<(), StateError> {
        writer()?;
        let mut guard = self.dirty.write();
        if let Some(entry) = guard.get_mut(&root) {
            entry.committed_to_disk = true;
        }
        Ok(())
    }

    pub fn dirty_memory(&self) -> usize {
        self.dirty_memory_used.load(Ordering::SeqCst)
    }

    /// Caps dirty memory to `limit − ideal_batch_size` by evicting already-committed,
    /// zero-reference roots, oldest first (distilled §4.1: "When dirty memory exceeds the
    /// configured limit, cap to `limit − idealBatchSize`").
    pub fn cap(&self, ideal_batch_size: usize) {
        if self.dirty_memory() <= self.dirty_memory_limit {
            return;
        }
        let target = self.dirty_memory_limit.saturating_sub(ideal_batch_size);
        let mut guard = self.dirty.write();
        let mut evictable: Vec<_> = guard
            .iter()
            .filter(|(_, e)| e.committed_to_disk && e.refs == 0)
            .map(|(root, e)| (*root, e.size))
            .collect();
        // No ordering information beyond insertion is kept here; a production implementation
        // would evict oldest-committed-first using the same priority queue the trie-GC worker
        // already maintains over block number.
        evictable.sort_by_key(|(_, size)| *size);
        let mut used = self.dirty_memory();
        for (root, size) in evictable {
            if used <= target {
                break;
            }
            guard.remove(&root);
            used = used.saturating_sub(size);
        }
        self.dirty_memory_used.store(used, Ordering::SeqCst);
    }

    pub fn is_dirty(&self, root: &StateRoot) -> bool {
        self.dirty.read().contains_key(root)
    }
}

/// Minimal in-memory [`StateProvider`]/[`StateProviderFactory`] pair for tests: every root maps
/// to an opaque token, and "history by block number" is modeled by a side table the test harness
/// populates as it inserts blocks.
pub struct InMemoryStateDb {
    roots: RwLock<HashMap<StateRoot, ()>>,
    by_number: RwLock<HashMap<BlockNumber, StateRoot>>,
}

impl Default for InMemoryStateDb {
    fn default() -> Self {
        Self { roots: RwLock::new(HashMap::new()), by_number: RwLock::new(HashMap::new()) }
    }
}

#[derive(Clone, Copy)]
pub struct InMemoryState(pub StateRoot);

impl StateProvider for InMemoryState {
    fn root(&self) -> StateRoot {
        self.0
    }
}

impl InMemoryStateDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_root_at(&self, number: BlockNumber, root: StateRoot) {
        self.roots.write().insert(root, ());
        self.by_number.write().insert(number, root);
    }

    pub fn remove_root_at(&self, number: BlockNumber) {
        if let Some(root) = self.by_number.write().remove(&number) {
            self.roots.write().remove(&root);
        }
    }

    pub fn has_root(&self, root: &StateRoot) -> bool {
        self.roots.read().contains_key(root)
    }

    pub fn latest_number(&self) -> Option<BlockNumber> {
        self.by_number.read().keys().max().copied()
    }
}

impl StateProviderFactory for InMemoryStateDb {
    type Provider = InMemoryState;

    fn latest(&self) -> Result<Self::Provider, StateError> {
        let number = self.latest_number().ok_or(StateError::NoHistoryAt(0))?;
        self.history_by_block_number(number)
    }

    fn history_by_block_number(&self, number: BlockNumber) -> Result<Self::Provider, StateError> {
        self.by_number
            .read()
            .get(&number)
            .map(|r| InMemoryState(*r))
            .ok_or(StateError::NoHistoryAt(number))
    }

    fn state_by_root(&self, root: StateRoot) -> Result<Self::Provider, StateError> {
        if self.has_root(&root) {
            Ok(InMemoryState(root))
        } else {
            Err(StateError::Unavailable(root))
        }
    }
}
