use crate::DbError;
use chain_primitives::BlockHash;

/// Secondary store for persisted trusted diff layers, keyed by block hash (distilled §6: "Diff
/// layers live in a separate store keyed by block hash").
///
/// Kept as its own small trait (rather than folded into [`crate::Database`]) because it has a
/// simpler access pattern — point get/put/delete by hash, no ordered scans, no table
/// multiplexing — matching how distinctly the teacher's lineage treats snapshot/diff storage from
/// the main chain database.
pub trait DiffStore: Send + Sync {
    fn put(&self, hash: BlockHash, encoded_diff: Vec<u8>) -> Result<(), DbError>;
    fn get(&self, hash: BlockHash) -> Result<Option<Vec<u8>>, DbError>;
    fn delete(&self, hash: BlockHash) -> Result<(), DbError>;
}

/// `sled`-backed [`DiffStore`] using its own tree, independent of the main chain database so the
/// untrusted/trusted diff pruning workers never contend with block-insertion writes.
pub struct SledDiffStore {
    tree: sled::Tree,
}

impl SledDiffStore {
    pub fn new(db: &sled::Db) -> Result<Self, DbError> {
        let tree = db.open_tree("diff_layers")?;
        Ok(Self { tree })
    }
}

impl DiffStore for SledDiffStore {
    fn put(&self, hash: BlockHash, encoded_diff: Vec<u8>) -> Result<(), DbError> {
        self.tree.insert(hash.as_bytes(), encoded_diff)?;
        Ok(())
    }

    fn get(&self, hash: BlockHash) -> Result<Option<Vec<u8>>, DbError> {
        Ok(self.tree.get(hash.as_bytes())?.map(|v| v.to_vec()))
    }

    fn delete(&self, hash: BlockHash) -> Result<(), DbError> {
        self.tree.remove(hash.as_bytes())?;
        Ok(())
    }
}

/// In-memory [`DiffStore`] for tests.
#[derive(Default)]
pub struct MemoryDiffStore {
    inner: parking_lot::RwLock<std::collections::HashMap<BlockHash, Vec<u8>>>,
}

impl MemoryDiffStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DiffStore for MemoryDiffStore {
    fn put(&self, hash: BlockHash, encoded_diff: Vec<u8>) -> Result<(), DbError> {
        self.inner.write().insert(hash, encoded_diff);
        Ok(())
    }

    fn get(&self, hash: BlockHash) -> Result<Option<Vec<u8>>, DbError> {
        Ok(self.inner.read().get(&hash).cloned())
    }

    fn delete(&self, hash: BlockHash) -> Result<(), DbError> {
        self.inner.write().remove(&hash);
        Ok(())
    }
}
