//! CLI entry point, grounded on the teacher's `bin/reth` layout: one `clap::Parser` top-level
//! `Cli` with subcommands, each assembling a `NodeConfig` out of several `#[derive(Args)]` groups
//! (distilled §4.7 ADDED).

mod args;
mod config;
mod error;
mod import;
mod utils;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use args::{CacheArgs, SnapshotArgs, TrieArgs, TxIndexArgs};
use chain_consensus::TrustingConsensus;
use chain_core::{ChainManager, Externals, Workers};
use chain_db::{InMemoryAncientStore, SledDatabase, SledDiffStore};
use chain_executor::NoopExecutorFactory;
use chain_interfaces::NeverPreserve;
use chain_provider::{DisabledSnapshotTree, InMemoryStateDb, LayeredSnapshotTree, SnapshotTree};
use config::NodeConfig;
use error::CliError;
use import::NodeManager;

#[derive(Parser)]
#[command(name = "chain-node", about = "Canonical-chain manager node")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs the chain manager against a database path, accepting blocks via the local import
    /// path until interrupted.
    Node {
        /// Directory holding the sled-backed database.
        #[arg(long, value_name = "PATH")]
        datadir: PathBuf,

        #[command(flatten)]
        cache: CacheArgs,
        #[command(flatten)]
        trie: TrieArgs,
        #[command(flatten)]
        snapshot: SnapshotArgs,
        #[command(flatten)]
        tx_index: TxIndexArgs,
    },
    /// Imports a file of bincode-encoded blocks into an existing (or fresh) database, then exits.
    Import {
        /// Directory holding the sled-backed database.
        #[arg(long, value_name = "PATH")]
        datadir: PathBuf,

        /// Path to the file of bincode-encoded blocks to import.
        #[arg(long, value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        cache: CacheArgs,
        #[command(flatten)]
        trie: TrieArgs,
        #[command(flatten)]
        snapshot: SnapshotArgs,
        #[command(flatten)]
        tx_index: TxIndexArgs,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Node { datadir, cache, trie, snapshot, tx_index } => {
            let config = NodeConfig { datadir, cache, trie, snapshot, tx_index };
            let manager = build_manager(&config)?;
            let workers = Workers::spawn(manager.clone());
            info!("chain-node running, press ctrl-c to stop");
            tokio::signal::ctrl_c().await.map_err(CliError::Io)?;
            manager.stop();
            for handle in workers.handles {
                let _ = handle.await;
            }
            Ok(())
        }
        Commands::Import { datadir, file, cache, trie, snapshot, tx_index } => {
            let config = NodeConfig { datadir, cache, trie, snapshot, tx_index };
            let manager = build_manager(&config)?;
            let imported = import::run_import(&manager, &file)?;
            info!(imported, "import finished");
            manager.stop();
            Ok(())
        }
    }
}

fn build_manager(config: &NodeConfig) -> Result<Arc<NodeManager>, CliError> {
    std::fs::create_dir_all(&config.datadir)?;
    let db = Arc::new(
        SledDatabase::open(&config.datadir)
            .map_err(|source| CliError::OpenDatabase { path: config.datadir.clone(), source })?,
    );
    let diff_store = SledDiffStore::new(db.inner())
        .map_err(|source| CliError::OpenDatabase { path: config.datadir.clone(), source })?;

    let chain_config = config.chain_config();
    let snapshot_tree: Arc<dyn SnapshotTree> = if config.snapshot.enabled() {
        Arc::new(LayeredSnapshotTree::new())
    } else {
        Arc::new(DisabledSnapshotTree)
    };

    let externals = Externals::new(db, TrustingConsensus, NoopExecutorFactory);
    let manager = ChainManager::new(
        externals,
        Arc::new(InMemoryStateDb::new()),
        snapshot_tree,
        Arc::new(InMemoryAncientStore::new()),
        Arc::new(diff_store),
        Arc::new(NeverPreserve),
        chain_config,
    )?;
    Ok(Arc::new(manager))
}
