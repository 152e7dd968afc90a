use crate::{Batch, Database, DbError, Table, WriteOp};
use std::path::Path;

/// `sled`-backed [`Database`] implementation.
///
/// A single sled `Tree` holds every table, keyed by `[table.prefix(), ...key]`, so
/// [`Database::write_batch`] maps directly onto one `sled::Batch::apply_batch` call and is
/// atomic across tables for free.
pub struct SledDatabase {
    tree: sled::Db,
}

impl SledDatabase {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let tree = sled::open(path)?;
        Ok(Self { tree })
    }

    pub fn open_temporary() -> Result<Self, DbError> {
        let tree = sled::Config::new().temporary(true).open()?;
        Ok(Self { tree })
    }

    pub fn flush(&self) -> Result<(), DbError> {
        self.tree.flush()?;
        Ok(())
    }

    /// Exposes the underlying `sled::Db` so collaborators that want their own tree (e.g.
    /// [`crate::SledDiffStore`]) can open one without a second on-disk database.
    pub fn inner(&self) -> &sled::Db {
        &self.tree
    }
}

impl Database for SledDatabase {
    fn get(&self, table: Table, key: &[u8]) -> Result<Option<Vec<u8>>, DbError> {
        let merged = table.key(key);
        Ok(self.tree.get(merged)?.map(|v| v.to_vec()))
    }

    fn write_batch(&self, batch: Batch) -> Result<(), DbError> {
        let mut sled_batch = sled::Batch::default();
        for op in batch.ops() {
            match op {
                WriteOp::Put { table, key, value } => {
                    sled_batch.insert(table.key(key), value.as_slice());
                }
                WriteOp::Delete { table, key } => {
                    sled_batch.remove(table.key(key));
                }
            }
        }
        self.tree.apply_batch(sled_batch)?;
        Ok(())
    }

    fn iter(
        &self,
        table: Table,
        from: Option<&[u8]>,
    ) -> Result<Box<dyn Iterator<Item = (Vec<u8>, Vec<u8>)>>, DbError> {
        let (lower, upper) = table.range();
        let start = match from {
            Some(k) => table.key(k),
            None => lower,
        };
        let iter = self.tree.range(start..upper).filter_map(|r| r.ok()).map(strip_prefix);
        Ok(Box::new(iter))
    }

    fn iter_rev(
        &self,
        table: Table,
        from: Option<&[u8]>,
    ) -> Result<Box<dyn Iterator<Item = (Vec<u8>, Vec<u8>)>>, DbError> {
        let (lower, upper) = table.range();
        let end = match from {
            // inclusive upper bound: bump the last byte of the key by one to include it in the
            // exclusive-upper `range`.
            Some(k) => {
                let mut key = table.key(k);
                key.push(0xff);
                key
            }
            None => upper,
        };
        let iter = self.tree.range(lower..end).rev().filter_map(|r| r.ok()).map(strip_prefix);
        Ok(Box::new(iter))
    }
}

fn strip_prefix((k, v): (sled::IVec, sled::IVec)) -> (Vec<u8>, Vec<u8>) {
    (k[1..].to_vec(), v.to_vec())
}
