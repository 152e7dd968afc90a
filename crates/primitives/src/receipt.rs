use crate::{Address, BlockHash, BlockNumber, TxHash};
use ethereum_types::{H256, U256};

/// A 2048-bit logs bloom filter. Trie/consensus bit-packing rules are an external concern; this
/// is a plain byte array sized to match the real thing.
pub type Bloom = [u8; 256];

/// A single EVM log entry.
///
/// `block_hash` and `block_number` are patched in after the containing block is written
/// (distilled §3: "logs carry block-hash patched after write").
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Log {
    pub address: Address,
    pub topics: Vec<H256>,
    pub data: bytes::Bytes,
    pub block_hash: Option<BlockHash>,
    pub block_number: Option<BlockNumber>,
    pub transaction_hash: TxHash,
    pub transaction_index: u64,
    pub log_index: u64,
    /// Set when this log is being re-emitted because its originating block was reorged out
    /// (distilled §8: `RemovedLogsEvent`).
    pub removed: bool,
}

/// Per-transaction execution receipt.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Receipt {
    pub transaction_hash: TxHash,
    pub success: bool,
    pub cumulative_gas_used: u64,
    pub logs: Vec<Log>,
    pub bloom: Bloom,
}

impl Receipt {
    /// Patches `block_hash`/`block_number` onto every log, as the block-write path must after
    /// persisting header+body+receipts (distilled §3).
    pub fn patch_block_info(&mut self, hash: BlockHash, number: BlockNumber) {
        for log in &mut self.logs {
            log.block_hash = Some(hash);
            log.block_number = Some(number);
        }
    }

    /// Marks every log in this receipt as removed, for emission on a `RemovedLogsEvent` when the
    /// containing block is reorged out (distilled §4.1 reorg procedure).
    pub fn mark_removed(&self) -> Vec<Log> {
        self.logs
            .iter()
            .cloned()
            .map(|mut l| {
                l.removed = true;
                l
            })
            .collect()
    }
}

/// Total accumulated difficulty is carried alongside a block in some call sites; re-exported here
/// for convenience so downstream crates don't need to depend on `ethereum_types` directly just to
/// name the type.
pub type Difficulty = U256;
