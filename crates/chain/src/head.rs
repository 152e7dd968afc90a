use chain_db::{Batch, Database};
use chain_primitives::{SealedBlock, SealedHeader};
use parking_lot::RwLock;

use crate::store::{self, HeadMarker};

/// The chain manager's four head pointers (distilled §3 data model): `current_block` (latest
/// full, state-verified block — the canonical head proper), `current_fast_block` (fast-sync
/// frontier, state unverified), `current_header` (latest verified header, may lead
/// `current_block` during header-first sync), and `highest_verified_header` (a monotonically
/// non-decreasing watermark distinct from `current_header`, which can move backward on
/// `SetHead`).
#[derive(Default)]
pub struct HeadMarkers {
    current_block: RwLock<Option<SealedBlock>>,
    current_fast_block: RwLock<Option<SealedBlock>>,
    current_header: RwLock<Option<SealedHeader>>,
    highest_verified_header: RwLock<Option<SealedHeader>>,
}

impl HeadMarkers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores all four markers from their persisted hashes plus the header chain / block store,
    /// used by the manager's construction procedure (distilled §4.1 step 2).
    pub fn restore<DB: Database>(
        &self,
        db: &DB,
        header_chain: &impl chain_provider::HeaderProvider,
        read_block: impl Fn(chain_primitives::BlockHash) -> Option<SealedBlock>,
    ) -> Result<(), chain_db::DbError> {
        if let Some(hash) = store::read_head_marker(db, HeadMarker::Header)? {
            *self.current_header.write() = header_chain.header(&hash);
        } else {
            *self.current_header.write() = header_chain.current_header();
        }
        if let Some(hash) = store::read_head_marker(db, HeadMarker::Block)? {
            let block = read_block(hash);
            if block.is_some() {
                *self.highest_verified_header.write() =
                    block.as_ref().map(|b| b.header.clone());
            }
            *self.current_block.write() = block;
        }
        if let Some(hash) = store::read_head_marker(db, HeadMarker::FastBlock)? {
            *self.current_fast_block.write() = read_block(hash);
        }
        Ok(())
    }

    pub fn current_block(&self) -> Option<SealedBlock> {
        self.current_block.read().clone()
    }

    pub fn current_header(&self) -> Option<SealedHeader> {
        self.current_header.read().clone()
    }

    pub fn current_fast_block(&self) -> Option<SealedBlock> {
        self.current_fast_block.read().clone()
    }

    pub fn highest_verified_header(&self) -> Option<SealedHeader> {
        self.highest_verified_header.read().clone()
    }

    pub fn set_current_header(&self, header: SealedHeader) {
        let mut watermark = self.highest_verified_header.write();
        if watermark.as_ref().map(|h| header.number() > h.number()).unwrap_or(true) {
            *watermark = Some(header.clone());
        }
        *self.current_header.write() = Some(header);
    }

    /// Sets the canonical block head, queuing its persisted marker into `batch` (distilled §4.1:
    /// "writeBlockAndSetHead persists header/body/receipts/TD together with the new head marker
    /// in one atomic batch").
    pub fn stage_block_head(&self, batch: &mut Batch, block: &SealedBlock) {
        store::write_head_marker(batch, HeadMarker::Block, block.hash());
        store::write_head_marker(batch, HeadMarker::Header, block.hash());
    }

    pub fn commit_block_head(&self, block: SealedBlock) {
        let mut watermark = self.highest_verified_header.write();
        if watermark.as_ref().map(|h| block.number() > h.number()).unwrap_or(true) {
            *watermark = Some(block.header.clone());
        }
        drop(watermark);
        *self.current_header.write() = Some(block.header.clone());
        *self.current_block.write() = Some(block);
    }

    pub fn rewind_to(&self, header: Option<SealedHeader>, block: Option<SealedBlock>) {
        *self.current_header.write() = header;
        *self.current_block.write() = block;
    }

    /// Sets the fast-sync frontier marker directly, without touching `current_block`/
    /// `current_header` (distilled §6 `SnapSyncCommitHead`: the fast block trails the verified
    /// head until state verification catches up to it).
    pub fn set_fast_block(&self, block: SealedBlock) {
        *self.current_fast_block.write() = Some(block);
    }
}
