//! Local import path (distilled §4.7 ADDED): drives `InsertChain` over a file of bincode-encoded
//! blocks, for exercising the manager without a network stack. RLP/wire framing and P2P itself
//! are Non-goals; this is the "every node of this lineage ships a local import" exception the
//! spec carves out.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use chain_consensus::TrustingConsensus;
use chain_core::ChainManager;
use chain_db::SledDatabase;
use chain_executor::NoopExecutorFactory;
use chain_primitives::{Address, Block, BlockBody, Header};
use chain_provider::InMemoryStateDb;
use serde::{Deserialize, Serialize};

use crate::error::CliError;

pub type NodeManager = ChainManager<SledDatabase, TrustingConsensus, NoopExecutorFactory, InMemoryStateDb>;

/// On-disk shape of one imported block. Header and body already carry `serde` impls; senders are
/// stored alongside since signature recovery is an external-collaborator concern this binary
/// does not implement.
#[derive(Debug, Serialize, Deserialize)]
struct ImportBlock {
    header: Header,
    body: BlockBody,
    senders: Vec<Address>,
}

/// Reads a file of consecutive bincode-encoded [`ImportBlock`]s and feeds them through
/// `InsertChain` one at a time, seeding the in-memory state stand-in with each header's declared
/// root as it goes — the same "trust the header" stance [`chain_executor::NoopExecutor`] takes at
/// the receipt level, just applied one layer up.
pub fn run_import(manager: &Arc<NodeManager>, path: &Path) -> Result<usize, CliError> {
    let mut file = File::open(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    let mut cursor = std::io::Cursor::new(bytes);

    let mut total_difficulty =
        manager.current_block().map(|b| b.total_difficulty()).unwrap_or_default();
    let mut imported = 0usize;

    loop {
        let decoded: ImportBlock = match bincode::deserialize_from(&mut cursor) {
            Ok(block) => block,
            Err(err) => match *err {
                bincode::ErrorKind::Io(ref io_err)
                    if io_err.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                other => return Err(CliError::Decode(other.to_string())),
            },
        };

        let state_root = decoded.header.state_root;
        let number = decoded.header.number;
        total_difficulty += decoded.header.difficulty;

        let sealed = Block { header: decoded.header, body: decoded.body }
            .seal(total_difficulty)
            .with_senders(decoded.senders)
            .ok_or_else(|| {
                CliError::Decode("sender count does not match transaction count".to_string())
            })?;

        manager.state_factory().insert_root_at(number, state_root);
        let (n, result) = manager.insert_chain(vec![sealed]);
        imported += n;
        result.map_err(|e| CliError::Insert(e.to_string()))?;
    }

    Ok(imported)
}
