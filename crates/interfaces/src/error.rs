use chain_primitives::{BlockHash, BlockNumber};
use std::fmt;

/// Alias used at every boundary function in the manager, matching the teacher's `RethResult`
/// convention.
pub type Result<T> = std::result::Result<T, Error>;

/// A hash paired with the number of the block it was diagnosed at, used to give every error
/// variant below enough context to log without a second lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRef {
    pub number: BlockNumber,
    pub hash: BlockHash,
}

impl fmt::Display for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ({:#x})", self.number, self.hash)
    }
}

/// Every error kind surfaced at the chain-manager boundary (distilled §7).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The writer lock has been closed by `Stop`; no further writers are admitted.
    #[error("chain is stopped")]
    ChainStopped,

    /// A cooperative cancellation checkpoint observed the stop flag mid-insert.
    #[error("insertion interrupted")]
    InsertionInterrupted,

    /// State root computed during execution did not match the header's declared root.
    #[error("state root verification failed at {0}")]
    StateRootVerificationFailed(BlockRef),

    /// No genesis block could be found or constructed.
    #[error("no genesis block")]
    NoGenesis,

    /// A block's parent could not be located anywhere (db, side chains, future cache).
    #[error("unknown ancestor for {0}")]
    UnknownAncestor(BlockRef),

    /// A block's ancestor chain is missing state needed to execute it.
    #[error("pruned ancestor for {0}")]
    PrunedAncestor(BlockRef),

    /// Block's timestamp is far enough ahead of wall clock to be held in the future cache.
    #[error("future block {0}")]
    FutureBlock(BlockRef),

    /// Non-fatal: the block is already present with sufficient state; not an error condition for
    /// the caller, but modeled as a variant so classification (§4.1) can match on it uniformly.
    #[error("already known block {0}")]
    KnownBlock(BlockRef),

    /// Block hash is present in the bad-block list.
    #[error("banned hash {0}")]
    BannedHash(BlockRef),

    /// A side-chain block was asked to produce receipts through a path reserved for canonical
    /// blocks.
    #[error("receipts requested for side-chain block {0}")]
    SideChainReceipts(BlockRef),

    /// A referenced diff layer (trusted or untrusted) is not present.
    #[error("diff layer not found for {0}")]
    DiffLayerNotFound(BlockRef),

    /// Input batch to an insertion call was not contiguous by parent hash / number.
    #[error("non-contiguous insert at index {0}")]
    NonContiguousInsert(usize),

    /// A side-chain block shares a canonical block's number and state root but not its hash
    /// (distilled §8 scenario 5: "ghost-state attack").
    #[error("sidechain ghost-state attack at {0}")]
    GhostStateAttack(BlockRef),

    /// Database-version marker on disk does not match this build's expected version.
    #[error("database version mismatch: on-disk {on_disk}, expected {expected}")]
    DatabaseVersionMismatch { on_disk: u32, expected: u32 },

    /// Opaque I/O failure from the persistent store facade.
    #[error("database error: {0}")]
    Database(#[from] chain_db_error::DbError),

    /// Block failed consensus/validator checks; wraps the reported reason.
    #[error("invalid block {block}: {reason}")]
    InvalidBlock { block: BlockRef, reason: String },
}

impl Error {
    pub fn block_ref(&self) -> Option<BlockRef> {
        match self {
            Error::StateRootVerificationFailed(b)
            | Error::UnknownAncestor(b)
            | Error::PrunedAncestor(b)
            | Error::FutureBlock(b)
            | Error::KnownBlock(b)
            | Error::BannedHash(b)
            | Error::SideChainReceipts(b)
            | Error::DiffLayerNotFound(b)
            | Error::GhostStateAttack(b)
            | Error::InvalidBlock { block: b, .. } => Some(*b),
            _ => None,
        }
    }

    /// Transient, cooperative-cancellation errors return `(0, Ok(()))` to the caller once
    /// in-flight work drains (distilled §7 propagation policy), rather than bubbling up.
    pub fn is_transient_cancellation(&self) -> bool {
        matches!(self, Error::ChainStopped | Error::InsertionInterrupted)
    }
}

/// A tiny indirection so [`Error`] doesn't force every crate to depend on `chain-db` just to name
/// its error type; `chain-db` implements this trait's single inherent type via a type alias.
pub mod chain_db_error {
    use std::fmt;

    #[derive(Debug)]
    pub struct DbError(pub String);

    impl fmt::Display for DbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl std::error::Error for DbError {}
}
