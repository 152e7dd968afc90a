use crate::{Address, BlockHash, BlockNumber, StateRoot, TotalDifficulty, TxHash};
use ethereum_types::{H256, U256};

/// A block header.
///
/// Total difficulty is *not* a header field on the wire in most chains this lineage targets, but
/// the manager always stores it alongside the header (distilled §3: "total difficulty stored
/// alongside"), so callers that already know it can attach it at construction time via
/// [`Header::seal_with_td`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Header {
    pub number: BlockNumber,
    pub parent_hash: BlockHash,
    pub state_root: StateRoot,
    pub transactions_root: TxHash,
    pub receipts_root: H256,
    pub logs_bloom: crate::receipt::Bloom,
    pub difficulty: U256,
    pub timestamp: u64,
    pub extra_data: bytes::Bytes,
    pub beneficiary: Address,
    pub gas_limit: u64,
    pub gas_used: u64,
}

impl Header {
    /// A proof-of-stake block reports zero difficulty; used throughout the manager to decide
    /// whether post-merge handling applies (distilled §4.1 "proof-of-stake blocks (difficulty =
    /// 0) are never queued").
    pub fn is_post_merge(&self) -> bool {
        self.difficulty.is_zero()
    }

    /// Computes a content hash over the fields that make a header unique.
    ///
    /// Real RLP/keccak hashing is an external-collaborator concern (Non-goals: trie internals,
    /// wire encoding); this is a deterministic stand-in used for identity and equality within the
    /// manager and is stable for a given set of field values.
    pub fn compute_hash(&self) -> BlockHash {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.number.hash(&mut hasher);
        self.parent_hash.hash(&mut hasher);
        self.state_root.hash(&mut hasher);
        self.transactions_root.hash(&mut hasher);
        self.timestamp.hash(&mut hasher);
        self.extra_data.as_ref().hash(&mut hasher);
        self.beneficiary.hash(&mut hasher);
        let lo = hasher.finish();
        let mut hasher2 = std::collections::hash_map::DefaultHasher::new();
        self.difficulty.hash(&mut hasher2);
        self.gas_limit.hash(&mut hasher2);
        self.gas_used.hash(&mut hasher2);
        lo.hash(&mut hasher2);
        let hi = hasher2.finish();
        let mut bytes = [0u8; 32];
        bytes[0..8].copy_from_slice(&lo.to_be_bytes());
        bytes[8..16].copy_from_slice(&hi.to_be_bytes());
        H256::from(bytes)
    }

    /// Seals the header with its content hash and an externally supplied total difficulty.
    pub fn seal_with_td(self, total_difficulty: TotalDifficulty) -> SealedHeader {
        let hash = self.compute_hash();
        SealedHeader { header: self, hash, total_difficulty }
    }
}

/// A [`Header`] whose hash and total difficulty have already been computed and pinned.
///
/// Headers are never mutated once sealed (distilled §3 invariant); the only way to change one is
/// to remove it via rewind and reinsert a different header at that slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedHeader {
    header: Header,
    hash: BlockHash,
    total_difficulty: TotalDifficulty,
}

impl SealedHeader {
    pub fn new(header: Header, hash: BlockHash, total_difficulty: TotalDifficulty) -> Self {
        Self { header, hash, total_difficulty }
    }

    pub fn hash(&self) -> BlockHash {
        self.hash
    }

    pub fn number(&self) -> BlockNumber {
        self.header.number
    }

    pub fn parent_hash(&self) -> BlockHash {
        self.header.parent_hash
    }

    pub fn total_difficulty(&self) -> TotalDifficulty {
        self.total_difficulty
    }

    pub fn state_root(&self) -> StateRoot {
        self.header.state_root
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn is_post_merge(&self) -> bool {
        self.header.is_post_merge()
    }

    /// Total difficulty of a direct child given its own difficulty (distilled §3 invariant:
    /// "Total difficulty of a child equals parent's TD plus child difficulty").
    pub fn child_total_difficulty(&self, child_difficulty: U256) -> TotalDifficulty {
        self.total_difficulty + child_difficulty
    }
}
