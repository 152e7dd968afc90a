//! Facades the chain manager is built on top of: the header chain (§4.2), the state database
//! (§1 item 3), and the snapshot tree (§1 item 4).
//!
//! Grounded on the teacher's `ShareableDatabase`, `StateProvider`, `StateProviderFactory`, and
//! `HeaderProvider` traits (`blockchain_tree/mod.rs`), and on
//! `other_examples/400836e2_WallexDefiTrade-reth__crates-blockchain-tree-src-externals.rs.rs`'s
//! `fetch_latest_canonical_hashes` for the header walk-back idiom.

pub mod header_chain;
pub mod snapshot;
pub mod state;

pub use header_chain::{HeaderChain, HeaderProvider};
pub use snapshot::{DisabledSnapshotTree, LayeredSnapshotTree, Snapshot, SnapshotTree};
pub use state::{InMemoryStateDb, StateDb, StateProvider, StateProviderFactory, StateWriter};
