use crate::DbError;
use chain_primitives::{BlockHash, BlockNumber, TotalDifficulty};
use parking_lot::RwLock;

/// One frozen block's worth of cold-storage data (distilled §6: "The ancient segment holds
/// headers, bodies, receipts, TDs, and hash-by-number for the frozen prefix").
///
/// Bodies/receipts are kept pre-encoded (`Vec<u8>`) since the ancient store never needs to
/// interpret them, only serve them back out or append new ones.
#[derive(Debug, Clone)]
pub struct AncientSegment {
    pub number: BlockNumber,
    pub hash: BlockHash,
    pub header: Vec<u8>,
    pub body: Vec<u8>,
    pub receipts: Vec<u8>,
    pub total_difficulty: TotalDifficulty,
}

/// Append-only cold segment for finalized history (distilled §1 item 1, §3 "Any block in the
/// ancient segment has number ≤ ancients-1 and is canonical").
///
/// Invariant maintained by every implementation: `frozen_count()` is always the number of the
/// first *non*-ancient block, i.e. ancient data exists for every number in `0..frozen_count()`
/// with no gaps.
pub trait AncientStore: Send + Sync {
    /// Appends segments in increasing, contiguous order starting at `frozen_count()`.
    fn append(&self, segments: Vec<AncientSegment>) -> Result<(), DbError>;

    /// Number of the first block *not* in the ancient segment.
    fn frozen_count(&self) -> BlockNumber;

    fn get(&self, number: BlockNumber) -> Result<Option<AncientSegment>, DbError>;

    fn contains(&self, number: BlockNumber) -> bool {
        number < self.frozen_count()
    }

    /// Truncates the ancient tail back to `new_count` frozen blocks (distilled §4.1: "If the
    /// ancient segment extends beyond the rewound head, truncate the ancient tail to match", and
    /// §7: "A failed ancient write triggers a compensating truncate of the ancient tail to the
    /// previous fast-block").
    fn truncate(&self, new_count: BlockNumber) -> Result<(), DbError>;
}

/// Simple `Vec`-backed ancient store, used directly by the `sled`/in-memory database pairing in
/// tests and by the CLI's local-import path. A production deployment would back this with its own
/// append-only flat-file segment the way reth's freezer does; that on-disk format is an
/// implementation detail the spec does not fix, so a vector suffices to satisfy the trait's
/// contract.
#[derive(Default)]
pub struct InMemoryAncientStore {
    segments: RwLock<Vec<AncientSegment>>,
}

impl InMemoryAncientStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AncientStore for InMemoryAncientStore {
    fn append(&self, mut new_segments: Vec<AncientSegment>) -> Result<(), DbError> {
        new_segments.sort_by_key(|s| s.number);
        let mut guard = self.segments.write();
        for segment in new_segments {
            let expected = guard.len() as BlockNumber;
            if segment.number != expected {
                return Err(DbError::Ancient(format!(
                    "non-contiguous ancient append: expected {expected}, got {}",
                    segment.number
                )));
            }
            guard.push(segment);
        }
        Ok(())
    }

    fn frozen_count(&self) -> BlockNumber {
        self.segments.read().len() as BlockNumber
    }

    fn get(&self, number: BlockNumber) -> Result<Option<AncientSegment>, DbError> {
        Ok(self.segments.read().get(number as usize).cloned())
    }

    fn truncate(&self, new_count: BlockNumber) -> Result<(), DbError> {
        let mut guard = self.segments.write();
        guard.truncate(new_count as usize);
        Ok(())
    }
}
