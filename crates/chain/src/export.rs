//! `Export` (distilled §6): streams a contiguous canonical range out as bincode-encoded records,
//! mirroring the shape `bin/node/src/import.rs`'s local import path reads back in. Read-only — it
//! never takes the writer lock, matching the facade's "readers never block on writers" posture.

use chain_db::Database;
use chain_interfaces::{Consensus, Error, ExecutorFactory, Result};
use chain_primitives::{BlockBody, BlockNumber, Header};
use chain_provider::{HeaderProvider, StateProviderFactory};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::manager::ChainManager;
use crate::store;

/// On-disk shape of one exported block: the same (header, body) pair
/// `bin/node/src/import.rs::ImportBlock` expects, minus the senders a re-import must recover
/// itself.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExportedBlock {
    pub header: Header,
    pub body: BlockBody,
}

impl<DB, C, EF, SPF> ChainManager<DB, C, EF, SPF>
where
    DB: Database + 'static,
    C: Consensus,
    EF: ExecutorFactory,
    SPF: StateProviderFactory,
{
    /// Writes every canonical block in `first..=last` to `out` as consecutive bincode records,
    /// stopping early (without error) the first time a number in the range has no canonical
    /// mapping. Returns the count written.
    pub fn export(
        &self,
        out: &mut dyn std::io::Write,
        first: BlockNumber,
        last: BlockNumber,
    ) -> Result<usize> {
        let mut written = 0usize;
        for number in first..=last {
            let Some(hash) = store::read_canonical_hash(&*self.externals.db, number).map_err(Error::from)? else {
                break;
            };
            let Some(header) = self.header_chain.header(&hash) else { break };
            let Some(body) = store::read_body(&*self.externals.db, hash).map_err(Error::from)? else {
                break;
            };
            let record = ExportedBlock { header: header.header().clone(), body };
            bincode::serialize_into(&mut *out, &record).map_err(|e| {
                Error::Database(chain_interfaces::error::chain_db_error::DbError(e.to_string()))
            })?;
            written += 1;
        }
        info!(written, first, last, "exported canonical range");
        Ok(written)
    }
}
