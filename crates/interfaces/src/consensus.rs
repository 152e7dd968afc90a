use chain_primitives::{BlockNumber, SealedBlock, SealedHeader, TotalDifficulty};

/// External collaborator: header/body validation rules.
///
/// Grounded on the `C: Consensus` bound threaded through the teacher's
/// `BlockchainTree<DB, C, EF>` and `Externals<DB, C, EF>`. The manager never implements consensus
/// rules itself (Non-goals); it only calls through this trait.
#[auto_impl::auto_impl(&, Arc)]
pub trait Consensus: Send + Sync {
    /// Validates a header in isolation (difficulty, gas limit bounds, timestamp monotonicity,
    /// extra-data length, etc. — concrete rules are chain-specific and out of scope here).
    fn validate_header(&self, header: &SealedHeader) -> Result<(), String>;

    /// Validates a header against its already-validated parent.
    fn validate_header_against_parent(
        &self,
        header: &SealedHeader,
        parent: &SealedHeader,
    ) -> Result<(), String>;

    /// Validates a sealed block's body against its header (transactions root, uncle rules).
    fn validate_block(&self, block: &SealedBlock) -> Result<(), String>;

    /// Reports whether this consensus engine implements the PoSA fast-finality capability set
    /// described in §9 ("Consensus-engine capability discovery"): `getJustifiedNumberAndHash`,
    /// `getFinalizedHeader`, `enoughDistance`. Modeled as a capability query returning an
    /// optional view, not as an inheritance hierarchy.
    fn posa_capability(&self) -> Option<&dyn PosaCapability> {
        None
    }
}

/// Optional fast-finality capability a [`Consensus`] engine may expose.
pub trait PosaCapability: Send + Sync {
    /// Highest justified (number, hash) pair known to the engine.
    fn justified(&self) -> Option<(BlockNumber, chain_primitives::BlockHash)>;

    /// Highest finalized header known to the engine.
    fn finalized(&self) -> Option<SealedHeader>;

    /// Whether `distance` blocks of separation between `candidate` and `current` is enough for
    /// the engine's safety margin before the trie GC may flush `candidate`'s state (distilled
    /// §4.1 trie garbage collection: "flush is deferred if the consensus engine signals
    /// insufficient distance").
    fn enough_distance(&self, current: BlockNumber, candidate: BlockNumber) -> bool;
}

/// Used by [`crate::error::Error::is_transient_cancellation`] callers and the fork-choice
/// tie-breaker (distilled §4.3): a caller-supplied predicate expressing local-miner bias, i.e.
/// "keep my own block on equal total difficulty."
pub trait ShouldPreserve: Send + Sync {
    fn should_preserve(&self, local: &SealedHeader, remote: &SealedHeader) -> bool;
}

impl<F> ShouldPreserve for F
where
    F: Fn(&SealedHeader, &SealedHeader) -> bool + Send + Sync,
{
    fn should_preserve(&self, local: &SealedHeader, remote: &SealedHeader) -> bool {
        (self)(local, remote)
    }
}

/// A trivial `ShouldPreserve` that never prefers the local branch; the right default absent a
/// miner.
pub struct NeverPreserve;

impl ShouldPreserve for NeverPreserve {
    fn should_preserve(&self, _local: &SealedHeader, _remote: &SealedHeader) -> bool {
        false
    }
}

/// Convenience used by fork-choice: total difficulty lookup over already-known headers.
pub trait TotalDifficultyLookup {
    fn total_difficulty(&self, hash: chain_primitives::BlockHash) -> Option<TotalDifficulty>;
}
