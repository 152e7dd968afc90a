//! Diff layers (distilled §1 item 4's companion structure, §4.4 glossary "Diff layer"): the
//! account/storage/code delta a block's execution produces, kept separately from the snapshot
//! tree proper so it can be gossiped, queued, and pruned on its own schedule.
//!
//! Grounded on `other_examples/427363bc_wookielnx-parity__ethcore-src-snapshot-mod.rs.rs`'s
//! sorted-manifest-before-hashing idiom and
//! `other_examples/b39f23b0_tari-project-tari__base_layer-core-src-chain_storage-blockchain_backend.rs.rs`'s
//! backend-trait shape for a chain-indexed auxiliary store.

use chain_primitives::{Address, BlockHash, BlockNumber, StateRoot};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// A single account's balance/nonce/code-hash delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDiff {
    pub address: Address,
    pub nonce: u64,
    pub balance: ethereum_types::U256,
    pub code_hash: BlockHash,
}

/// One block's full world-state delta.
///
/// Fields are kept pre-sorted by [`DiffLayer::normalize`] (codes by hash, destructs by address,
/// accounts by address, storages by address then key) so two independently constructed layers for
/// the same block hash serialize identically — required for the diff hash to be reproducible
/// across peers (distilled §4.4: "the diff layer's hash must be deterministic regardless of
/// construction order").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLayer {
    pub block_hash: BlockHash,
    pub block_number: BlockNumber,
    pub parent_root: StateRoot,
    pub root: StateRoot,
    pub codes: Vec<(BlockHash, Vec<u8>)>,
    pub destructs: Vec<Address>,
    pub accounts: Vec<AccountDiff>,
    pub storages: Vec<(Address, Vec<(BlockHash, Vec<u8>)>)>,
}

impl DiffLayer {
    pub fn normalize(mut self) -> Self {
        self.codes.sort_by_key(|(hash, _)| *hash);
        self.destructs.sort();
        self.accounts.sort_by_key(|a| a.address);
        self.storages.sort_by_key(|(addr, _)| *addr);
        for (_, slots) in &mut self.storages {
            slots.sort_by_key(|(key, _)| *key);
        }
        self
    }

    /// Content hash over the normalized layer, standing in for the real RLP/keccak digest used to
    /// identify a diff layer independent of its containing block hash.
    pub fn diff_hash(&self) -> BlockHash {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.block_hash.hash(&mut hasher);
        self.root.hash(&mut hasher);
        for (hash, _) in &self.codes {
            hash.hash(&mut hasher);
        }
        for addr in &self.destructs {
            addr.hash(&mut hasher);
        }
        for account in &self.accounts {
            account.address.hash(&mut hasher);
            account.nonce.hash(&mut hasher);
        }
        let lo = hasher.finish();
        let mut bytes = [0u8; 32];
        bytes[0..8].copy_from_slice(&lo.to_be_bytes());
        BlockHash::from(bytes)
    }
}

/// Trusted diff layers are ones produced locally by executing a block the manager itself
/// inserted; they queue for persistence in number order, oldest first, via a max-heap keyed on
/// negative block number (distilled §4.6: "the trusted diff queue orders by block number so the
/// persister always flushes the oldest maturing layer first").
#[derive(Default)]
pub struct TrustedDiffQueue {
    heap: BinaryHeap<Reverse<BlockNumber>>,
    by_number: HashMap<BlockNumber, DiffLayer>,
}

impl TrustedDiffQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, layer: DiffLayer) {
        let number = layer.block_number;
        if self.by_number.insert(number, layer).is_none() {
            self.heap.push(Reverse(number));
        }
    }

    /// Pops the oldest queued layer whose number is `<= matured_before` (distilled §4.6 maturity
    /// rule: `head - number >= triesInMemory`).
    pub fn pop_matured(&mut self, matured_before: BlockNumber) -> Option<DiffLayer> {
        loop {
            let Reverse(number) = *self.heap.peek()?;
            if number > matured_before {
                return None;
            }
            self.heap.pop();
            if let Some(layer) = self.by_number.remove(&number) {
                return Some(layer);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.by_number.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_number.is_empty()
    }

    /// Drains every queued layer regardless of maturity, used on shutdown (distilled §4.6:
    /// "flush-all on stop").
    pub fn drain_all(&mut self) -> Vec<DiffLayer> {
        let mut out: Vec<DiffLayer> = self.by_number.drain().collect::<HashMap<_, _>>().into_values().collect();
        self.heap.clear();
        out.sort_by_key(|l| l.block_number);
        out
    }
}

/// Untrusted diff layers arrive from peers and are indexed three ways simultaneously (distilled
/// §4.6): by the block hash they claim to extend, by their own diff hash (dedup), and by the peer
/// that sent them (per-peer quota enforcement). A plain `HashMap`-based index is used here,
/// deliberately distinct from the trusted queue's heap, since untrusted layers are pruned by
/// distance-from-fork and per-peer count rather than strict maturity order.
#[derive(Default)]
pub struct UntrustedDiffIndex {
    by_diff_hash: HashMap<BlockHash, DiffLayer>,
    by_block_hash: HashMap<BlockHash, Vec<BlockHash>>,
    by_peer: HashMap<String, Vec<BlockHash>>,
}

impl UntrustedDiffIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, peer_id: String, layer: DiffLayer) -> BlockHash {
        let diff_hash = layer.diff_hash();
        let block_hash = layer.block_hash;
        self.by_block_hash.entry(block_hash).or_default().push(diff_hash);
        self.by_peer.entry(peer_id).or_default().push(diff_hash);
        self.by_diff_hash.insert(diff_hash, layer);
        diff_hash
    }

    pub fn get(&self, diff_hash: &BlockHash) -> Option<&DiffLayer> {
        self.by_diff_hash.get(diff_hash)
    }

    pub fn for_block(&self, block_hash: &BlockHash) -> Vec<&DiffLayer> {
        self.by_block_hash
            .get(block_hash)
            .into_iter()
            .flatten()
            .filter_map(|h| self.by_diff_hash.get(h))
            .collect()
    }

    pub fn peer_count(&self, peer_id: &str) -> usize {
        self.by_peer.get(peer_id).map(Vec::len).unwrap_or(0)
    }

    pub fn remove(&mut self, diff_hash: &BlockHash) {
        if let Some(layer) = self.by_diff_hash.remove(diff_hash) {
            if let Some(v) = self.by_block_hash.get_mut(&layer.block_hash) {
                v.retain(|h| h != diff_hash);
            }
        }
        for v in self.by_peer.values_mut() {
            v.retain(|h| h != diff_hash);
        }
    }

    /// Drops every layer further than `max_fork_dist` behind `head`, or further than
    /// `max_queue_dist` ahead of it (distilled §4.6 pruning rule).
    pub fn prune_by_distance(&mut self, head: BlockNumber, max_fork_dist: u64, max_queue_dist: u64) {
        let stale: Vec<BlockHash> = self
            .by_diff_hash
            .iter()
            .filter(|(_, layer)| {
                let too_old = head.saturating_sub(layer.block_number) > max_fork_dist;
                let too_new = layer.block_number.saturating_sub(head) > max_queue_dist;
                too_old || too_new
            })
            .map(|(hash, _)| *hash)
            .collect();
        for hash in stale {
            self.remove(&hash);
        }
    }

    /// Enforces a per-peer retention quota, dropping the peer's oldest-inserted layers first.
    pub fn enforce_peer_quota(&mut self, peer_id: &str, max_for_peer: usize) {
        let excess = self.by_peer.get(peer_id).map(Vec::len).unwrap_or(0).saturating_sub(max_for_peer);
        if excess == 0 {
            return;
        }
        let victims: Vec<BlockHash> = self.by_peer[peer_id][..excess].to_vec();
        for hash in victims {
            self.remove(&hash);
        }
    }
}
