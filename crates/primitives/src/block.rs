use crate::{Address, BlockHash, BlockNumber, Header, SealedHeader, TotalDifficulty, TxHash};

/// A minimal transaction stand-in.
///
/// Signature recovery and EVM semantics are external-collaborator concerns (Non-goals); the
/// manager only needs a transaction's hash and its already-recovered sender to build receipts,
/// tx-lookups, and reorg diff sets.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Transaction {
    pub hash: TxHash,
    pub nonce: u64,
    pub gas_limit: u64,
}

/// Body of a block: transactions plus uncle headers.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct BlockBody {
    pub transactions: Vec<Transaction>,
    pub uncles: Vec<Header>,
}

/// An unsealed block: header plus body, no hash pinned yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub header: Header,
    pub body: BlockBody,
}

impl Block {
    pub fn number(&self) -> BlockNumber {
        self.header.number
    }

    pub fn parent_hash(&self) -> BlockHash {
        self.header.parent_hash
    }

    /// Seals the block: hashes the header and pins a total difficulty.
    pub fn seal(self, total_difficulty: TotalDifficulty) -> SealedBlock {
        let Block { header, body } = self;
        let sealed_header = header.seal_with_td(total_difficulty);
        SealedBlock { header: sealed_header, body }
    }
}

/// A block whose header hash and total difficulty are pinned; the unit the chain manager works
/// with everywhere past header verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedBlock {
    pub header: SealedHeader,
    pub body: BlockBody,
}

impl SealedBlock {
    pub fn hash(&self) -> BlockHash {
        self.header.hash()
    }

    pub fn number(&self) -> BlockNumber {
        self.header.number()
    }

    pub fn parent_hash(&self) -> BlockHash {
        self.header.parent_hash()
    }

    pub fn total_difficulty(&self) -> TotalDifficulty {
        self.header.total_difficulty()
    }

    pub fn is_post_merge(&self) -> bool {
        self.header.is_post_merge()
    }

    /// Attaches pre-recovered senders, yielding the unit the executor actually consumes.
    pub fn with_senders(self, senders: Vec<Address>) -> Option<SealedBlockWithSenders> {
        if senders.len() != self.body.transactions.len() {
            return None;
        }
        Some(SealedBlockWithSenders { block: self, senders })
    }
}

/// A [`SealedBlock`] with transaction senders already recovered.
///
/// Recovery itself is an external-collaborator concern; the manager only ever consumes the
/// result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedBlockWithSenders {
    pub block: SealedBlock,
    pub senders: Vec<Address>,
}

impl SealedBlockWithSenders {
    pub fn hash(&self) -> BlockHash {
        self.block.hash()
    }

    pub fn number(&self) -> BlockNumber {
        self.block.number()
    }

    pub fn parent_hash(&self) -> BlockHash {
        self.block.parent_hash()
    }

    pub fn total_difficulty(&self) -> TotalDifficulty {
        self.block.total_difficulty()
    }

    pub fn header(&self) -> &SealedHeader {
        &self.block.header
    }
}

/// A block paired with its recovered senders but no pinned hash, used by call sites that build a
/// block programmatically (e.g. the test genesis/import helpers) before sealing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockWithSenders {
    pub block: Block,
    pub senders: Vec<Address>,
}
