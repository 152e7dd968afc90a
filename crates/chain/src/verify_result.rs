//! `GetVerifyResult` (distilled §6): reports what the manager currently knows about a block's
//! validity without inserting it — used by a consensus client probing a hash it received out of
//! band before deciding whether to build on it.

use chain_db::Database;
use chain_interfaces::{BlockRef, Consensus, ExecutorFactory};
use chain_provider::{HeaderProvider, StateProviderFactory};

use crate::manager::ChainManager;

/// What the manager knows about a block hash, independent of insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyResult {
    /// The header is stored and its number matches what the caller expects.
    Valid,
    /// The hash is in the bad-block list, or its stored header disagrees with the caller.
    Invalid(String),
    /// Nothing is known about this hash yet.
    Unknown,
}

impl<DB, C, EF, SPF> ChainManager<DB, C, EF, SPF>
where
    DB: Database + 'static,
    C: Consensus,
    EF: ExecutorFactory,
    SPF: StateProviderFactory,
{
    pub fn get_verify_result(&self, block_ref: BlockRef) -> VerifyResult {
        if self.is_bad_block(&block_ref.hash) {
            return VerifyResult::Invalid("hash is in the bad-block list".to_string());
        }
        match self.header_chain.header(&block_ref.hash) {
            Some(header) if header.number() == block_ref.number => VerifyResult::Valid,
            Some(_) => VerifyResult::Invalid("number mismatch with stored header".to_string()),
            None => VerifyResult::Unknown,
        }
    }
}
