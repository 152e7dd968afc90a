//! `Reset` and `ResetWithGenesisBlock` (distilled §6): wipe every table this crate owns plus the
//! header chain's own tables, used by the CLI's `init`/`db reset` path and by tests that need a
//! clean store between scenarios without reconstructing the whole manager.

use chain_db::{Database, Table};
use chain_interfaces::{Consensus, Error, ExecutorFactory, Result};
use chain_primitives::BlockWithSenders;
use chain_provider::StateProviderFactory;
use tracing::info;

use crate::diff_layer::{TrustedDiffQueue, UntrustedDiffIndex};
use crate::manager::ChainManager;
use crate::store;

impl<DB, C, EF, SPF> ChainManager<DB, C, EF, SPF>
where
    DB: Database + 'static,
    C: Consensus,
    EF: ExecutorFactory,
    SPF: StateProviderFactory,
{
    /// Wipes every table this crate and the header chain own, every cache, every queued diff
    /// layer, the bad-block list, and the ancient tail, leaving an empty store with no head.
    pub fn reset(&self) -> Result<()> {
        let Some(_guard) = self.writer.lock() else { return Err(Error::ChainStopped) };

        for table in Table::ALL {
            let keys: Vec<Vec<u8>> = self
                .externals
                .db
                .iter(table, None)
                .map_err(Error::from)?
                .map(|(key, _)| key)
                .collect();
            if keys.is_empty() {
                continue;
            }
            let mut batch = chain_db::Batch::new();
            for key in keys {
                batch.delete(table, key);
            }
            self.externals.db.write_batch(batch).map_err(Error::from)?;
        }
        self.header_chain.reset_marker();
        self.ancient.truncate(0).map_err(Error::from)?;
        self.caches.clear_all();
        *self.trusted_diffs.lock() = TrustedDiffQueue::new();
        *self.untrusted_diffs.write() = UntrustedDiffIndex::new();
        self.bad_blocks.write().clear();
        self.head.rewind_to(None, None);

        info!("chain reset to empty state");
        Ok(())
    }

    /// Resets the chain, then installs `genesis` as block zero and the new canonical head.
    pub fn reset_with_genesis_block(&self, genesis: BlockWithSenders) -> Result<()> {
        self.reset()?;

        let Some(_guard) = self.writer.lock() else { return Err(Error::ChainStopped) };

        let total_difficulty = genesis.block.header.difficulty;
        let sealed = genesis.block.seal(total_difficulty);
        let with_senders = sealed.with_senders(genesis.senders).ok_or(Error::NoGenesis)?;

        self.header_chain
            .insert(vec![with_senders.block.header.clone()])
            .map_err(|e| Error::Database(chain_interfaces::error::chain_db_error::DbError(e.to_string())))?;

        let mut batch = chain_db::Batch::new();
        store::write_body(&mut batch, with_senders.hash(), &with_senders.block.body).map_err(Error::from)?;
        store::write_canonical_hash(&mut batch, 0, with_senders.hash());
        self.head.stage_block_head(&mut batch, &with_senders.block);
        self.externals.db.write_batch(batch).map_err(Error::from)?;

        self.caches.put_body(with_senders.hash(), with_senders.block.body.clone());
        self.caches.put_block(with_senders.block.clone());
        self.head.commit_block_head(with_senders.block.clone());

        info!(hash = %with_senders.hash(), "genesis block installed");
        Ok(())
    }
}
