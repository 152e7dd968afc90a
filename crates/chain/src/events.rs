//! The event bus (distilled §1 item 5, ~5% of the manager's surface): broadcasts chain-head,
//! chain-block, chain-side, removed-logs, logs, block-processing, and finalized-header
//! notifications to any number of subscribers.
//!
//! Grounded on `tokio::sync::broadcast`, the idiomatic multi-consumer fan-out primitive in the
//! async ecosystem the teacher already depends on (`tokio` is a workspace dependency used
//! throughout reth); a lagging subscriber drops the oldest unread events rather than stalling
//! publication, matching distilled §4.1's "a slow subscriber never blocks canonical insertion."

use chain_primitives::{BlockHash, BlockNumber, Log, SealedBlock, SealedHeader};
use tokio::sync::broadcast;

/// A new block became the canonical head.
#[derive(Debug, Clone)]
pub struct ChainHeadEvent {
    pub block: SealedBlock,
}

/// A block was appended to the canonical chain (emitted for every block written, head-change or
/// not — e.g. each block of a multi-block reorg's new segment).
#[derive(Debug, Clone)]
pub struct ChainBlockEvent {
    pub block: SealedBlock,
}

/// A block was accepted onto a non-canonical side chain.
#[derive(Debug, Clone)]
pub struct ChainSideEvent {
    pub block: SealedBlock,
}

/// Logs from blocks that were reorged out of the canonical chain, each with `removed = true`.
#[derive(Debug, Clone)]
pub struct RemovedLogsEvent {
    pub logs: Vec<Log>,
}

/// Logs from newly canonical blocks.
#[derive(Debug, Clone)]
pub struct LogsEvent {
    pub logs: Vec<Log>,
}

/// Emitted around a block's insertion, used by subscribers tracking sync progress rather than
/// canonical-chain state.
#[derive(Debug, Clone)]
pub enum BlockProcEvent {
    Started,
    Finished,
}

/// A PoSA-capable consensus engine advanced its finalized header.
#[derive(Debug, Clone)]
pub struct FinalizedHeaderEvent {
    pub header: SealedHeader,
}

/// The sum of every event kind the bus carries, so a single broadcast channel can serve all of
/// them without requiring one channel per kind.
#[derive(Debug, Clone)]
pub enum ChainEvent {
    Head(ChainHeadEvent),
    Block(ChainBlockEvent),
    Side(ChainSideEvent),
    RemovedLogs(RemovedLogsEvent),
    Logs(LogsEvent),
    Proc(BlockProcEvent),
    Finalized(FinalizedHeaderEvent),
}

impl ChainEvent {
    pub fn head_number(&self) -> Option<BlockNumber> {
        match self {
            ChainEvent::Head(e) => Some(e.block.number()),
            ChainEvent::Block(e) => Some(e.block.number()),
            ChainEvent::Side(e) => Some(e.block.number()),
            _ => None,
        }
    }

    pub fn head_hash(&self) -> Option<BlockHash> {
        match self {
            ChainEvent::Head(e) => Some(e.block.hash()),
            ChainEvent::Block(e) => Some(e.block.hash()),
            ChainEvent::Side(e) => Some(e.block.hash()),
            _ => None,
        }
    }
}

/// Bounded, drop-oldest fan-out bus. `subscribe` is idempotent to unsubscribe: dropping the
/// returned receiver is the only "unsubscribe" operation there is, matching distilled §4.1's
/// event-bus description.
pub struct EventBus {
    sender: broadcast::Sender<ChainEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChainEvent> {
        self.sender.subscribe()
    }

    /// Publishes an event. A channel with zero subscribers is not an error (distilled §4.1: the
    /// bus never blocks insertion on the presence of a listener).
    pub fn publish(&self, event: ChainEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
