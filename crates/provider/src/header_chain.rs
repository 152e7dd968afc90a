use chain_db::{Batch, Database, Table};
use chain_primitives::{BlockHash, BlockNumber, Header, SealedHeader, TotalDifficulty};
use parking_lot::RwLock;
use std::sync::Arc;

/// Read-only facade a consumer needs to look a header up by hash, by number, or ask for the
/// header chain's own progress marker.
#[auto_impl::auto_impl(&, Arc)]
pub trait HeaderProvider {
    fn header(&self, hash: &BlockHash) -> Option<SealedHeader>;
    fn header_by_number(&self, number: BlockNumber) -> Option<SealedHeader>;
    fn total_difficulty(&self, hash: &BlockHash) -> Option<TotalDifficulty>;
    fn current_header(&self) -> Option<SealedHeader>;
}

/// Errors the header chain itself can raise validating an inbound batch.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HeaderChainError {
    #[error("non-contiguous header batch at index {0}")]
    NonContiguous(usize),
    #[error("database error: {0}")]
    Database(String),
}

impl From<chain_db::DbError> for HeaderChainError {
    fn from(e: chain_db::DbError) -> Self {
        HeaderChainError::Database(e.to_string())
    }
}

/// The header chain (distilled §4.2): headers, total difficulty, hash↔number mapping, and its own
/// current-header marker (the highest header inserted so far — a sync-progress pointer, distinct
/// from the chain manager's canonical head marker over in `crates/chain`).
pub struct HeaderChain<DB> {
    db: Arc<DB>,
    current: RwLock<Option<SealedHeader>>,
}

impl<DB: Database> HeaderChain<DB> {
    /// Opens the header chain, restoring `current` from the highest header on disk if any.
    pub fn new(db: Arc<DB>) -> Result<Self, HeaderChainError> {
        let mut highest: Option<SealedHeader> = None;
        for (key, value) in db.iter_rev(Table::Headers, None)? {
            let header: Header = bincode::deserialize(&value)
                .map_err(|e| HeaderChainError::Database(e.to_string()))?;
            let hash = BlockHash::from_slice(&key[8..]);
            let td = db
                .get_decoded::<TotalDifficulty>(Table::TotalDifficulty, hash.as_bytes())?
                .unwrap_or_default();
            highest = Some(SealedHeader::new(header, hash, td));
            break;
        }
        Ok(Self { db, current: RwLock::new(highest) })
    }

    /// Validates that `headers` form one contiguous run (distilled §8: "Non-contiguous input at
    /// index i returns `(0, NonContiguousInsert)` and performs no writes").
    pub fn validate_chain(&self, headers: &[SealedHeader]) -> Result<(), HeaderChainError> {
        for (i, pair) in headers.windows(2).enumerate() {
            let (a, b) = (&pair[0], &pair[1]);
            if b.parent_hash() != a.hash() || b.number() != a.number() + 1 {
                return Err(HeaderChainError::NonContiguous(i + 1));
            }
        }
        Ok(())
    }

    /// Appends a contiguous, already-validated header batch, writing the canonical number→hash
    /// mapping alongside (header-only sync treats every inserted header as canonical until a
    /// competing chain proves otherwise — the chain manager is responsible for correcting this on
    /// reorg).
    pub fn insert(&self, headers: Vec<SealedHeader>) -> Result<(), HeaderChainError> {
        self.validate_chain(&headers)?;
        let mut batch = Batch::new();
        let mut new_current = self.current.read().clone();
        for header in &headers {
            let key = number_hash_key(header.number(), header.hash());
            batch
                .put_encoded(Table::Headers, &key, header.header())
                .map_err(HeaderChainError::from)?;
            batch
                .put_encoded(Table::TotalDifficulty, header.hash().as_bytes(), &header.total_difficulty())
                .map_err(HeaderChainError::from)?;
            batch.put(
                Table::CanonicalHashes,
                chain_db::number_key(header.number()),
                header.hash().as_bytes().to_vec(),
            );
            batch.put(
                Table::HeaderHashIndex,
                header.hash().as_bytes(),
                chain_db::number_key(header.number()).to_vec(),
            );
            if new_current.as_ref().map(|c| header.number() > c.number()).unwrap_or(true) {
                new_current = Some(header.clone());
            }
        }
        self.db.write_batch(batch)?;
        *self.current.write() = new_current;
        Ok(())
    }

    /// Rewinds the header chain to `number`, invoking `update_fn` for every header removed (the
    /// caller may use this to also truncate the ancient segment) and `del_fn` for every hash
    /// removed (distilled §4.2: "these split responsibilities between header store and block
    /// store while keeping the rewind in one backward pass").
    pub fn set_head(
        &self,
        number: BlockNumber,
        mut update_fn: impl FnMut(&SealedHeader),
        mut del_fn: impl FnMut(BlockHash),
    ) -> Result<(), HeaderChainError> {
        let Some(current) = self.current.read().clone() else { return Ok(()) };
        if current.number() <= number {
            return Ok(());
        }
        let mut batch = Batch::new();
        let mut cursor = current;
        loop {
            update_fn(&cursor);
            del_fn(cursor.hash());
            batch.delete(Table::Headers, number_hash_key(cursor.number(), cursor.hash()));
            batch.delete(Table::TotalDifficulty, cursor.hash().as_bytes());
            batch.delete(Table::CanonicalHashes, chain_db::number_key(cursor.number()));
            batch.delete(Table::HeaderHashIndex, cursor.hash().as_bytes());
            if cursor.number() <= number + 1 {
                break;
            }
            let Some(parent) = self.header(&cursor.parent_hash()) else { break };
            cursor = parent;
        }
        self.db.write_batch(batch)?;
        *self.current.write() = self.header_by_number(number);
        Ok(())
    }

    /// Drops the in-memory progress marker without touching the database (distilled §6 `Reset`):
    /// the caller is responsible for wiping the underlying tables this marker was derived from.
    pub fn reset_marker(&self) {
        *self.current.write() = None;
    }
}

impl<DB: Database> HeaderProvider for HeaderChain<DB> {
    fn header(&self, hash: &BlockHash) -> Option<SealedHeader> {
        let number_bytes = self.db.get(Table::HeaderHashIndex, hash.as_bytes()).ok()??;
        let number = chain_db::decode_number_key(&number_bytes);
        let raw = self
            .db
            .get(Table::Headers, &number_hash_key(number, *hash))
            .ok()??;
        let header: Header = bincode::deserialize(&raw).ok()?;
        let td = self
            .db
            .get_decoded::<TotalDifficulty>(Table::TotalDifficulty, hash.as_bytes())
            .ok()??;
        Some(SealedHeader::new(header, *hash, td))
    }

    fn header_by_number(&self, number: BlockNumber) -> Option<SealedHeader> {
        let hash_bytes = self
            .db
            .get(Table::CanonicalHashes, &chain_db::number_key(number))
            .ok()??;
        let hash = BlockHash::from_slice(&hash_bytes);
        self.header(&hash)
    }

    fn total_difficulty(&self, hash: &BlockHash) -> Option<TotalDifficulty> {
        self.db.get_decoded(Table::TotalDifficulty, hash.as_bytes()).ok()?
    }

    fn current_header(&self) -> Option<SealedHeader> {
        self.current.read().clone()
    }
}

fn number_hash_key(number: BlockNumber, hash: BlockHash) -> Vec<u8> {
    let mut key = chain_db::number_key(number).to_vec();
    key.extend_from_slice(hash.as_bytes());
    key
}
