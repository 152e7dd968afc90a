//! `InsertHeaderChain` (distilled §6): header-only sync's entry point, writing a contiguous batch
//! of already-verified headers without bodies, receipts, or execution.
//!
//! Grounded on `receipt_chain.rs`'s writer-lock-plus-counted-return shape, delegating the actual
//! contiguity check and storage to [`chain_provider::HeaderChain::insert`].

use chain_db::Database;
use chain_interfaces::{Consensus, Error, ExecutorFactory, Result};
use chain_primitives::SealedHeader;
use chain_provider::StateProviderFactory;
use tracing::info;

use crate::manager::ChainManager;

impl<DB, C, EF, SPF> ChainManager<DB, C, EF, SPF>
where
    DB: Database + 'static,
    C: Consensus,
    EF: ExecutorFactory,
    SPF: StateProviderFactory,
{
    /// Appends `headers` to the header chain, treating every one of them as canonical until a
    /// later full-block insert or reorg corrects that (distilled §4.2). Returns the count accepted
    /// before the first error.
    pub fn insert_header_chain(&self, headers: Vec<SealedHeader>) -> (usize, Result<()>) {
        if headers.is_empty() {
            return (0, Ok(()));
        }
        let Some(_guard) = self.writer.lock() else {
            return (0, Err(Error::ChainStopped));
        };

        let count = headers.len();
        match self.header_chain.insert(headers) {
            Ok(()) => {
                info!(count, "header chain extended");
                (count, Ok(()))
            }
            Err(e) => (
                0,
                Err(Error::Database(chain_interfaces::error::chain_db_error::DbError(e.to_string()))),
            ),
        }
    }
}
