//! `SetHead` (distilled §4.1): rewinds every head marker down to `number`, truncating the ancient
//! tail and purging caches for every block walked past, then reloads the head markers from
//! whatever remains.

use chain_db::Database;
use chain_interfaces::{Consensus, Error, ExecutorFactory, Result};
use chain_primitives::BlockNumber;
use chain_provider::{HeaderProvider, StateProviderFactory};
use tracing::info;

use crate::manager::{read_sealed_block, ChainManager};
use crate::store::{self, HeadMarker};

impl<DB, C, EF, SPF> ChainManager<DB, C, EF, SPF>
where
    DB: Database + 'static,
    C: Consensus,
    EF: ExecutorFactory,
    SPF: StateProviderFactory,
{
    /// Rewinds the canonical chain to `number`, inclusive. A no-op if the current head is already
    /// at or below `number`.
    pub fn set_head(&self, number: BlockNumber) -> Result<()> {
        let Some(guard) = self.writer.lock() else { return Err(Error::ChainStopped) };

        // State-availability probe (distilled §4.1: "SetHead must not settle on a block whose state
        // isn't actually retrievable"): walk backward from the requested target until the state
        // provider confirms it has that block's state, mirroring `HeaderChain::set_head`'s own
        // backward-walk idiom one layer up, against `state_factory` instead of the header store.
        let mut target = number;
        while self.state_factory.history_by_block_number(target).is_err() {
            let Some(prev) = target.checked_sub(1) else {
                break;
            };
            target = prev;
        }
        if target != number {
            info!(requested = number, resolved = target, "rewinding further than requested, no state available above this point");
        }
        let number = target;

        let mut batch = chain_db::Batch::new();
        let frozen_before = self.ancient.frozen_count();

        self.header_chain
            .set_head(
                number,
                |header| {
                    // Nothing extra to do per removed header beyond what del_fn already covers;
                    // kept as a separate callback to mirror the header-chain facade's split
                    // responsibility between header store and block store.
                    let _ = header;
                },
                |hash| {
                    self.caches.purge_block(&hash);
                    self.caches.purge_body(&hash);
                    self.caches.purge_receipts(&hash);
                },
            )
            .map_err(|e| Error::Database(chain_interfaces::error::chain_db_error::DbError(e.to_string())))?;

        // Truncate the ancient tail if it now extends past the rewound head (distilled §4.1: "If
        // the ancient segment extends beyond the rewound head, truncate the ancient tail to
        // match").
        if frozen_before > number + 1 {
            self.ancient.truncate(number + 1).map_err(Error::from)?;
        }

        // Drop canonical mappings, bodies, and receipts for every number above the new head; the
        // header chain facade already cleared `Headers`/`TotalDifficulty`/`CanonicalHashes`
        // within its own rewind, so this only needs to cover the records this crate owns.
        let mut cursor = number + 1;
        loop {
            let Some(hash) = store::read_canonical_hash(&*self.externals.db, cursor).map_err(Error::from)? else {
                break;
            };
            store::delete_canonical_hash(&mut batch, cursor);
            store::delete_body(&mut batch, hash);
            store::delete_receipts(&mut batch, hash);
            cursor += 1;
        }

        let new_head_hash = self.header_chain.header_by_number(number).map(|h| h.hash());
        if let Some(hash) = new_head_hash {
            store::write_head_marker(&mut batch, HeadMarker::Block, hash);
            store::write_head_marker(&mut batch, HeadMarker::Header, hash);
        }
        self.externals.db.write_batch(batch).map_err(Error::from)?;

        let new_header = self.header_chain.header_by_number(number);
        let new_block =
            new_header.as_ref().and_then(|h| read_sealed_block(&*self.externals.db, &self.header_chain, h.hash()));
        self.head.rewind_to(new_header, new_block);

        info!(number, "set head complete");
        drop(guard);
        Ok(())
    }
}
