//! Core data model shared by every crate in the workspace.
//!
//! Types here are intentionally thin: trie internals, RLP/wire encoding, and signature recovery
//! are external collaborators (see the crate-level Non-goals), so [`Header`] and [`Block`] carry
//! only the fields the chain manager itself reasons about.

mod block;
mod header;
mod receipt;

pub use block::{Block, BlockBody, BlockWithSenders, SealedBlock, SealedBlockWithSenders};
pub use header::{Header, SealedHeader};
pub use receipt::{Log, Receipt};

use ethereum_types::{H256, U256};

/// Hash of a block header.
pub type BlockHash = H256;
/// Monotonic block height.
pub type BlockNumber = u64;
/// Address of an externally-owned or contract account.
pub type Address = ethereum_types::H160;
/// Cumulative chain difficulty.
pub type TotalDifficulty = U256;
/// World-state commitment.
pub type StateRoot = H256;
/// Hash of a transaction.
pub type TxHash = H256;

/// Canonical genesis number; nothing below this is ever reorged.
pub const GENESIS_NUMBER: BlockNumber = 0;
