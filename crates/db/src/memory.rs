use crate::{Batch, Database, DbError, Table, WriteOp};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Pure in-memory [`Database`], used by the chain crate's test suite (mirrors the teacher's
/// `create_test_rw_db()` test helper) and by short-lived CLI subcommands that don't need
/// persistence.
#[derive(Default)]
pub struct MemoryDatabase {
    inner: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Database for MemoryDatabase {
    fn get(&self, table: Table, key: &[u8]) -> Result<Option<Vec<u8>>, DbError> {
        Ok(self.inner.read().get(&table.key(key)).cloned())
    }

    fn write_batch(&self, batch: Batch) -> Result<(), DbError> {
        let mut guard = self.inner.write();
        for op in batch.ops() {
            match op {
                WriteOp::Put { table, key, value } => {
                    guard.insert(table.key(key), value.clone());
                }
                WriteOp::Delete { table, key } => {
                    guard.remove(&table.key(key));
                }
            }
        }
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
        let guard = self.inner.read();
        let items: Vec<_> = guard
            .range(start..upper)
            .map(|(k, v)| (k[1..].to_vec(), v.clone()))
            .collect();
        Ok(Box::new(items.into_iter()))
    }

    fn iter_rev(
        &self,
        table: Table,
        from: Option<&[u8]>,
    ) -> Result<Box<dyn Iterator<Item = (Vec<u8>, Vec<u8>)>>, DbError> {
        let (lower, upper) = table.range();
        let end = match from {
            Some(k) => {
                let mut key = table.key(k);
                key.push(0xff);
                key
            }
            None => upper,
        };
        let guard = self.inner.read();
        let mut items: Vec<_> = guard
            .range(lower..end)
            .map(|(k, v)| (k[1..].to_vec(), v.clone()))
            .collect();
        items.reverse();
        Ok(Box::new(items.into_iter()))
    }
}
