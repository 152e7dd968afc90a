use crate::utils::parse_duration_from_secs;
use chain_core::ChainConfig;
use clap::Args;
use std::time::Duration;

/// Trie cache and garbage-collection policy (distilled §6: `TrieCleanLimit`, `TrieDirtyLimit`,
/// `TrieTimeLimit`, `TriesInMemory`, `NoTries`).
#[derive(Debug, Args, PartialEq)]
pub struct TrieArgs {
    /// Megabytes of clean (read-only) trie nodes to cache in memory.
    #[arg(long = "trie.clean-cache", help_heading = "Trie", default_value = "256")]
    pub trie_clean_limit_mb: u64,

    /// Megabytes of dirty (unflushed) trie nodes to retain before a forced flush.
    #[arg(long = "trie.dirty-cache", help_heading = "Trie", default_value = "256")]
    pub trie_dirty_limit_mb: u64,

    /// Disables the dirty-cache size bound entirely, flushing every committed root (archive
    /// mode).
    #[arg(long = "trie.dirty-disabled", help_heading = "Trie")]
    pub trie_dirty_disabled: bool,

    /// Maximum accumulated canonical-processing time, in seconds, before a dirty-cache flush is
    /// forced regardless of size.
    #[arg(
        long = "trie.time-limit",
        help_heading = "Trie",
        value_parser = parse_duration_from_secs,
        default_value = "300",
        value_name = "SECONDS"
    )]
    pub trie_time_limit: Duration,

    /// Number of recent, unflushed state roots kept resident before the oldest is committed.
    #[arg(long = "trie.tries-in-memory", help_heading = "Trie", default_value = "128")]
    pub tries_in_memory: u64,

    /// Skips trie storage entirely; only the flat account/storage state is kept.
    #[arg(long = "trie.no-tries", help_heading = "Trie")]
    pub no_tries: bool,
}

impl Default for TrieArgs {
    fn default() -> Self {
        let default = ChainConfig::default();
        Self {
            trie_clean_limit_mb: default.trie_clean_limit_mb,
            trie_dirty_limit_mb: default.trie_dirty_limit_mb,
            trie_dirty_disabled: default.trie_dirty_disabled,
            trie_time_limit: default.trie_time_limit,
            tries_in_memory: default.tries_in_memory,
            no_tries: default.no_tries,
        }
    }
}

impl TrieArgs {
    pub fn apply(&self, config: &mut ChainConfig) {
        config.trie_clean_limit_mb = self.trie_clean_limit_mb;
        config.trie_dirty_limit_mb = self.trie_dirty_limit_mb;
        config.trie_dirty_disabled = self.trie_dirty_disabled;
        config.trie_time_limit = self.trie_time_limit;
        config.tries_in_memory = self.tries_in_memory;
        config.no_tries = self.no_tries;
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
        let args = CommandParser::<TrieArgs>::parse_from(["chain-node"]).args;
        assert_eq!(args, TrieArgs::default());
    }

    #[test]
    fn archive_mode_disables_the_dirty_cache() {
        let args =
            CommandParser::<TrieArgs>::parse_from(["chain-node", "--trie.dirty-disabled"]).args;
        assert!(args.trie_dirty_disabled);
    }
}
