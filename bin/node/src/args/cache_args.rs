use chain_core::ChainConfig;
use clap::Args;

/// In-memory LRU cache sizes fronting the persistent store.
#[derive(Debug, Args, PartialEq, Eq)]
pub struct CacheArgs {
    /// Number of block bodies kept in the read-through cache.
    #[arg(long = "cache.bodies", help_heading = "Cache", default_value = "2048")]
    pub body_cache_size: usize,

    /// Number of receipt lists kept in the read-through cache.
    #[arg(long = "cache.receipts", help_heading = "Cache", default_value = "2048")]
    pub receipt_cache_size: usize,

    /// Number of full sealed blocks kept in the read-through cache.
    #[arg(long = "cache.blocks", help_heading = "Cache", default_value = "1024")]
    pub block_cache_size: usize,

    /// Number of transaction-hash-to-block-number lookups kept in the read-through cache.
    #[arg(long = "cache.tx-lookups", help_heading = "Cache", default_value = "4096")]
    pub tx_lookup_cache_size: usize,
}

impl Default for CacheArgs {
    fn default() -> Self {
        let default = ChainConfig::default();
        Self {
            body_cache_size: default.body_cache_size,
            receipt_cache_size: default.receipt_cache_size,
            block_cache_size: default.block_cache_size,
            tx_lookup_cache_size: default.tx_lookup_cache_size,
        }
    }
}

impl CacheArgs {
    pub fn apply(&self, config: &mut ChainConfig) {
        config.body_cache_size = self.body_cache_size;
        config.receipt_cache_size = self.receipt_cache_size;
        config.block_cache_size = self.block_cache_size;
        config.tx_lookup_cache_size = self.tx_lookup_cache_size;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct CommandParser<T: Args> {
        #[clap(flatten)]
        args: T,
    }

    #[test]
    fn defaults_match_chain_config() {
        let args = CommandParser::<CacheArgs>::parse_from(["chain-node"]).args;
        assert_eq!(args, CacheArgs::default());
    }

    #[test]
    fn overrides_the_body_cache_size() {
        let args =
            CommandParser::<CacheArgs>::parse_from(["chain-node", "--cache.bodies", "16"]).args;
        assert_eq!(args.body_cache_size, 16);
    }
}
