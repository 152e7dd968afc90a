//! The persistent store facade (distilled §1 item 1, §6 "Database schema").
//!
//! Grounded on the teacher's `reth_db::{cursor::DbCursorRO, database::Database, tables,
//! transaction::DbTx}` usage in `blockchain_tree/mod.rs` and `trie/mod.rs`: a table-oriented
//! key-value database with ordered cursors and an atomic batch-write primitive. The concrete
//! backend is `sled` rather than reth's custom mdbx binding (real mdbx FFI bindings are out of
//! scope for this exercise); a single sled `Tree` is used with single-byte table prefixes exactly
//! as distilled §6 specifies, which also gives every write within one call to
//! [`Database::write_batch`] true cross-table atomicity for free via `sled::Batch`.

mod ancient;
mod database;
mod diff_store;
mod error;
mod memory;
mod sled_db;
mod tables;

pub use ancient::{AncientSegment, AncientStore, InMemoryAncientStore};
pub use database::{Batch, Database, WriteOp};
pub use diff_store::{DiffStore, MemoryDiffStore, SledDiffStore};
pub use error::DbError;
pub use memory::MemoryDatabase;
pub use sled_db::SledDatabase;
pub use tables::{decode_number_key, number_key, Table};

/// Written once at construction and checked on open (distilled §6 "Database-version invariant").
/// Bump whenever the on-disk layout changes incompatibly.
pub const BLOCK_CHAIN_VERSION: u32 = 9;
