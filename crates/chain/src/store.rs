//! Low-level table helpers layered on [`chain_db::Database`] for the records the header chain
//! facade doesn't already own: bodies, receipts, tx lookups, canonical number→hash mappings, head
//! markers, and the bad-block list (distilled §3 data model, §6 schema).

use chain_db::{Batch, Database, Table};
use chain_primitives::{BlockBody, BlockHash, BlockNumber, Receipt};

pub fn write_body(batch: &mut Batch, hash: BlockHash, body: &BlockBody) -> Result<(), chain_db::DbError> {
    batch.put_encoded(Table::Bodies, hash.as_bytes(), body)
}

pub fn read_body<DB: Database + ?Sized>(db: &DB, hash: BlockHash) -> Result<Option<BlockBody>, chain_db::DbError> {
    db.get_decoded(Table::Bodies, hash.as_bytes())
}

pub fn delete_body(batch: &mut Batch, hash: BlockHash) {
    batch.delete(Table::Bodies, hash.as_bytes());
}

pub fn write_receipts(
    batch: &mut Batch,
    hash: BlockHash,
    receipts: &[Receipt],
) -> Result<(), chain_db::DbError> {
    batch.put_encoded(Table::Receipts, hash.as_bytes(), &receipts.to_vec())
}

pub fn read_receipts<DB: Database + ?Sized>(
    db: &DB,
    hash: BlockHash,
) -> Result<Option<Vec<Receipt>>, chain_db::DbError> {
    db.get_decoded(Table::Receipts, hash.as_bytes())
}

pub fn delete_receipts(batch: &mut Batch, hash: BlockHash) {
    batch.delete(Table::Receipts, hash.as_bytes());
}

pub fn write_canonical_hash(batch: &mut Batch, number: BlockNumber, hash: BlockHash) {
    batch.put(Table::CanonicalHashes, chain_db::number_key(number), hash.as_bytes().to_vec());
}

pub fn read_canonical_hash<DB: Database + ?Sized>(
    db: &DB,
    number: BlockNumber,
) -> Result<Option<BlockHash>, chain_db::DbError> {
    Ok(db
        .get(Table::CanonicalHashes, &chain_db::number_key(number))?
        .map(|b| BlockHash::from_slice(&b)))
}

pub fn delete_canonical_hash(batch: &mut Batch, number: BlockNumber) {
    batch.delete(Table::CanonicalHashes, chain_db::number_key(number));
}

pub fn write_tx_lookup(batch: &mut Batch, tx_hash: chain_primitives::TxHash, block_number: BlockNumber) {
    batch.put(Table::TxLookup, tx_hash.as_bytes(), chain_db::number_key(block_number).to_vec());
}

pub fn read_tx_lookup<DB: Database + ?Sized>(
    db: &DB,
    tx_hash: chain_primitives::TxHash,
) -> Result<Option<BlockNumber>, chain_db::DbError> {
    Ok(db
        .get(Table::TxLookup, tx_hash.as_bytes())?
        .map(|b| chain_db::decode_number_key(&b)))
}

pub fn delete_tx_lookup(batch: &mut Batch, tx_hash: chain_primitives::TxHash) {
    batch.delete(Table::TxLookup, tx_hash.as_bytes());
}

/// The three head markers the teacher's `blockchain.go` keeps alongside the trie cache:
/// `HeadBlockHash` (latest full block), `HeadHeaderHash` (latest verified header, may lead during
/// header-first sync), `HeadFastBlockHash` (latest block with receipts but unverified state,
/// fast-sync only).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadMarker {
    Block,
    Header,
    FastBlock,
}

fn head_marker_table(marker: HeadMarker) -> Table {
    match marker {
        HeadMarker::Block => Table::HeadBlockHash,
        HeadMarker::Header => Table::HeadHeaderHash,
        HeadMarker::FastBlock => Table::HeadFastBlockHash,
    }
}

pub fn write_head_marker(batch: &mut Batch, marker: HeadMarker, hash: BlockHash) {
    batch.put(head_marker_table(marker), [], hash.as_bytes().to_vec());
}

pub fn read_head_marker<DB: Database + ?Sized>(
    db: &DB,
    marker: HeadMarker,
) -> Result<Option<BlockHash>, chain_db::DbError> {
    Ok(db.get(head_marker_table(marker), &[])?.map(|b| BlockHash::from_slice(&b)))
}

/// The persisted database-version marker (distilled §6 "database-version invariant").
pub fn read_database_version<DB: Database + ?Sized>(db: &DB) -> Result<Option<u32>, chain_db::DbError> {
    Ok(db
        .get(Table::DatabaseVersion, &[])?
        .and_then(|b| b.as_slice().try_into().ok())
        .map(u32::from_be_bytes))
}

pub fn write_database_version(batch: &mut Batch, version: u32) {
    batch.put(Table::DatabaseVersion, [], version.to_be_bytes().to_vec());
}

/// Bad-block list: a small bounded set, persisted as one encoded vector behind a fixed key
/// (distilled §4.1: "the manager never re-inserts a hash already present in the persisted
/// bad-block list").
pub fn read_bad_blocks<DB: Database + ?Sized>(
    db: &DB,
) -> Result<Vec<BlockHash>, chain_db::DbError> {
    Ok(db.get_decoded(Table::BadBlockList, &[])?.unwrap_or_default())
}

pub fn write_bad_blocks(batch: &mut Batch, hashes: &[BlockHash]) -> Result<(), chain_db::DbError> {
    batch.put_encoded(Table::BadBlockList, [], &hashes.to_vec())
}

pub fn read_tx_index_tail<DB: Database + ?Sized>(
    db: &DB,
) -> Result<Option<BlockNumber>, chain_db::DbError> {
    Ok(db.get(Table::TxIndexTail, &[])?.map(|b| chain_db::decode_number_key(&b)))
}

pub fn write_tx_index_tail(batch: &mut Batch, number: BlockNumber) {
    batch.put(Table::TxIndexTail, [], chain_db::number_key(number).to_vec());
}
