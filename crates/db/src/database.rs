use crate::{DbError, Table};

/// One write queued into a [`Batch`].
#[derive(Debug, Clone)]
pub enum WriteOp {
    Put { table: Table, key: Vec<u8>, value: Vec<u8> },
    Delete { table: Table, key: Vec<u8> },
}

/// An atomic multi-table write.
///
/// Grounded on the teacher's `Transaction::new(&db)` / `tx.commit()` pattern in
/// `blockchain_tree/mod.rs` (`commit_canonical`, `revert_canonical`): callers stage an arbitrary
/// number of puts/deletes across tables, then commit them in one atomic unit, matching distilled
/// §5's ordering guarantee ("the atomic batch containing its header, body, receipts, TD, and head
/// marker is durable before any event referencing it is published").
#[derive(Debug, Clone, Default)]
pub struct Batch {
    ops: Vec<WriteOp>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, table: Table, key: impl AsRef<[u8]>, value: impl Into<Vec<u8>>) {
        self.ops.push(WriteOp::Put {
            table,
            key: key.as_ref().to_vec(),
            value: value.into(),
        });
    }

    pub fn put_encoded<T: serde::Serialize>(
        &mut self,
        table: Table,
        key: impl AsRef<[u8]>,
        value: &T,
    ) -> Result<(), DbError> {
        let bytes = bincode::serialize(value)?;
        self.put(table, key, bytes);
        Ok(())
    }

    pub fn delete(&mut self, table: Table, key: impl AsRef<[u8]>) {
        self.ops.push(WriteOp::Delete { table, key: key.as_ref().to_vec() });
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn extend(&mut self, other: Batch) {
        self.ops.extend(other.ops);
    }
}

/// The persistent store facade itself.
///
/// Readers never take the chain manager's writer lock (distilled §5); they rely entirely on this
/// trait's own read consistency, which for the sled backend means "whatever was last committed".
pub trait Database: Send + Sync {
    fn get(&self, table: Table, key: &[u8]) -> Result<Option<Vec<u8>>, DbError>;

    fn get_decoded<T: serde::de::DeserializeOwned>(
        &self,
        table: Table,
        key: &[u8],
    ) -> Result<Option<T>, DbError> {
        match self.get(table, key)? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn contains(&self, table: Table, key: &[u8]) -> Result<bool, DbError> {
        Ok(self.get(table, key)?.is_some())
    }

    /// Applies every queued op in `batch` atomically.
    fn write_batch(&self, batch: Batch) -> Result<(), DbError>;

    /// Walks a table in ascending key order starting at `from` (inclusive) if given.
    fn iter(
        &self,
        table: Table,
        from: Option<&[u8]>,
    ) -> Result<Box<dyn Iterator<Item = (Vec<u8>, Vec<u8>)>>, DbError>;

    /// Walks a table in descending key order, optionally capped by a starting key (inclusive).
    ///
    /// Used for the header chain's "current header" walk-back and for scanning stale canonical
    /// mappings above a new head (distilled §4.1 reorg procedure: "delete stale canonical mappings
    /// above the new head; scan until no mapping exists").
    fn iter_rev(
        &self,
        table: Table,
        from: Option<&[u8]>,
    ) -> Result<Box<dyn Iterator<Item = (Vec<u8>, Vec<u8>)>>, DbError>;
}

/// Convenience helper: a single put/delete applied through its own one-entry batch. Used by
/// background workers taking the writer lock only for a short critical section (distilled §5).
pub fn put_single<D: Database + ?Sized>(
    db: &D,
    table: Table,
    key: impl AsRef<[u8]>,
    value: impl Into<Vec<u8>>,
) -> Result<(), DbError> {
    let mut batch = Batch::new();
    batch.put(table, key, value);
    db.write_batch(batch)
}
