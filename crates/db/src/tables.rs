/// Single-byte table prefixes, exactly as distilled §6 describes the on-disk schema.
///
/// Each variant owns one logical column; [`Table::prefix`] is the byte every key in that column
/// is prefixed with inside the merged sled keyspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Headers,
    Bodies,
    Receipts,
    TotalDifficulty,
    CanonicalHashes,
    TxLookup,
    HeadBlockHash,
    HeadHeaderHash,
    HeadFastBlockHash,
    SnapshotRoot,
    SnapshotRecoveryNumber,
    SafePointBlockNumber,
    LastPivotNumber,
    TxIndexTail,
    BadBlockList,
    DatabaseVersion,
    /// hash → number, a secondary index over `Headers` (keyed `number||hash`) so headers can be
    /// looked up by hash in O(1) instead of scanning.
    HeaderHashIndex,
}

impl Table {
    pub const ALL: [Table; 17] = [
        Table::Headers,
        Table::Bodies,
        Table::Receipts,
        Table::TotalDifficulty,
        Table::CanonicalHashes,
        Table::TxLookup,
        Table::HeadBlockHash,
        Table::HeadHeaderHash,
        Table::HeadFastBlockHash,
        Table::SnapshotRoot,
        Table::SnapshotRecoveryNumber,
        Table::SafePointBlockNumber,
        Table::LastPivotNumber,
        Table::TxIndexTail,
        Table::BadBlockList,
        Table::DatabaseVersion,
        Table::HeaderHashIndex,
    ];

    pub fn prefix(self) -> u8 {
        match self {
            Table::Headers => 0x00,
            Table::Bodies => 0x01,
            Table::Receipts => 0x02,
            Table::TotalDifficulty => 0x03,
            Table::CanonicalHashes => 0x04,
            Table::TxLookup => 0x05,
            Table::HeadBlockHash => 0x06,
            Table::HeadHeaderHash => 0x07,
            Table::HeadFastBlockHash => 0x08,
            Table::SnapshotRoot => 0x09,
            Table::SnapshotRecoveryNumber => 0x0a,
            Table::SafePointBlockNumber => 0x0b,
            Table::LastPivotNumber => 0x0c,
            Table::TxIndexTail => 0x0d,
            Table::BadBlockList => 0x0e,
            Table::DatabaseVersion => 0x0f,
            Table::HeaderHashIndex => 0x10,
        }
    }

    /// Builds the merged-keyspace key for a record in this table.
    pub fn key(self, key: &[u8]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(1 + key.len());
        buf.push(self.prefix());
        buf.extend_from_slice(key);
        buf
    }

    /// Lower/upper bound of this table's slice of the merged keyspace, for ordered range scans.
    pub fn range(self) -> (Vec<u8>, Vec<u8>) {
        (vec![self.prefix()], vec![self.prefix() + 1])
    }
}

/// Big-endian encoding of a block number, chosen so that lexicographic key order in the merged
/// sled keyspace equals numeric order (needed for canonical-hash walk-back and ordered scans).
pub fn number_key(number: chain_primitives::BlockNumber) -> [u8; 8] {
    number.to_be_bytes()
}

pub fn decode_number_key(bytes: &[u8]) -> chain_primitives::BlockNumber {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[..8]);
    u64::from_be_bytes(buf)
}
