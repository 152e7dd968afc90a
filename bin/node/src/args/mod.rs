//! One `#[derive(Args)]` struct per concern, assembled into [`crate::config::NodeConfig`] the same
//! way `PayloadBuilderArgs` is one concern among several feeding the teacher's node config.

mod cache_args;
mod snapshot_args;
mod trie_args;
mod tx_index_args;

pub use cache_args::CacheArgs;
pub use snapshot_args::SnapshotArgs;
pub use trie_args::TrieArgs;
pub use tx_index_args::TxIndexArgs;
