use chain_core::ChainConfig;
use clap::Args;

/// Snapshot-layer policy (distilled §6: `SnapshotLimit`, `Preimages`, `SnapshotWait`).
#[derive(Debug, Args, PartialEq, Eq)]
pub struct SnapshotArgs {
    /// Megabytes of snapshot cache to retain; 0 disables snapshots entirely.
    #[arg(long = "snapshot.cache", help_heading = "Snapshot", default_value = "256")]
    pub snapshot_limit_mb: u64,

    /// Persists trie-key preimages alongside snapshot layers.
    #[arg(long = "snapshot.preimages", help_heading = "Snapshot")]
    pub preimages: bool,

    /// Blocks node startup until the snapshot layer chain is fully rebuilt.
    #[arg(long = "snapshot.wait-rebuild", help_heading = "Snapshot")]
    pub snapshot_wait: bool,
}

impl Default for SnapshotArgs {
    fn default() -> Self {
        let default = ChainConfig::default();
        Self {
            snapshot_limit_mb: default.snapshot_limit_mb,
            preimages: default.preimages,
            snapshot_wait: default.snapshot_wait,
        }
    }
}

impl SnapshotArgs {
    pub fn apply(&self, config: &mut ChainConfig) {
        config.snapshot_limit_mb = self.snapshot_limit_mb;
        config.preimages = self.preimages;
        config.snapshot_wait = self.snapshot_wait;
    }

    pub fn enabled(&self) -> bool {
        self.snapshot_limit_mb > 0
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
        let args = CommandParser::<SnapshotArgs>::parse_from(["chain-node"]).args;
        assert_eq!(args, SnapshotArgs::default());
    }

    #[test]
    fn zero_cache_disables_snapshots() {
        let args =
            CommandParser::<SnapshotArgs>::parse_from(["chain-node", "--snapshot.cache", "0"]).args;
        assert!(!args.enabled());
    }
}
