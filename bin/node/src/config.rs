use crate::args::{CacheArgs, SnapshotArgs, TrieArgs, TxIndexArgs};
use chain_core::ChainConfig;
use std::path::PathBuf;

/// Assembled node configuration: where data lives plus every `ChainConfig` knob, mirroring how
/// the teacher's several `*Args` structs feed one overall node config struct.
#[derive(Debug)]
pub struct NodeConfig {
    pub datadir: PathBuf,
    pub cache: CacheArgs,
    pub trie: TrieArgs,
    pub snapshot: SnapshotArgs,
    pub tx_index: TxIndexArgs,
}

impl NodeConfig {
    pub fn chain_config(&self) -> ChainConfig {
        let mut config = ChainConfig::default();
        self.cache.apply(&mut config);
        self.trie.apply(&mut config);
        self.snapshot.apply(&mut config);
        self.tx_index.apply(&mut config);
        config
    }
}
