//! Fork-choice (distilled §4.3): a pure function of two headers plus a total-difficulty lookup.
//!
//! Grounded on the `C: Consensus` bound in the teacher's `BlockchainTree`/`Externals`, and on §9's
//! design note to model consensus-engine capability discovery "as a sum type / capability query,
//! not as deep inheritance" — [`chain_interfaces::consensus::Consensus::posa_capability`] is
//! exactly that query.

use chain_interfaces::consensus::{Consensus, ShouldPreserve};
use chain_primitives::{SealedBlock, SealedHeader, TotalDifficulty};
use std::cmp::Ordering;

/// A [`Consensus`] engine that accepts every header and block unconditionally.
///
/// Real header/body validation (difficulty checks, PoW/PoSA signature recovery, gas-limit drift
/// bounds) is an external-collaborator concern the spec only describes through the `Consensus`
/// trait; this stand-in plays the same role for the CLI's local-import path that
/// `chain_executor::NoopExecutor` plays for execution.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrustingConsensus;

impl Consensus for TrustingConsensus {
    fn validate_header(&self, _header: &SealedHeader) -> Result<(), String> {
        Ok(())
    }

    fn validate_header_against_parent(
        &self,
        _header: &SealedHeader,
        _parent: &SealedHeader,
    ) -> Result<(), String> {
        Ok(())
    }

    fn validate_block(&self, _block: &SealedBlock) -> Result<(), String> {
        Ok(())
    }
}

/// Decides whether `candidate` should replace `current` as the chain's head.
///
/// Policy (distilled §4.3): if the engine supports fast-finality (PoSA), prefer the branch whose
/// tip is farther past the justified checkpoint; otherwise prefer higher total difficulty,
/// breaking ties with the caller-supplied `should_preserve` predicate (local miner bias).
pub fn should_reorg<C: Consensus + ?Sized>(
    consensus: &C,
    current: &SealedHeader,
    current_td: TotalDifficulty,
    candidate: &SealedHeader,
    candidate_td: TotalDifficulty,
    should_preserve: &dyn ShouldPreserve,
) -> bool {
    if let Some(posa) = consensus.posa_capability() {
        if let Some((justified_number, _justified_hash)) = posa.justified() {
            if candidate.number() != current.number() {
                tracing::debug!(
                    candidate = candidate.number(),
                    current = current.number(),
                    justified = justified_number,
                    "fork-choice: using PoSA fast-finality branch"
                );
                return candidate.number() > current.number() && candidate.number() >= justified_number;
            }
        }
    }

    match candidate_td.cmp(&current_td) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => !should_preserve.should_preserve(current, candidate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_interfaces::consensus::{NeverPreserve, PosaCapability};
    use chain_primitives::{Address, BlockHash, Header};
    use ethereum_types::{H256, U256};

    struct PlainConsensus;

    impl Consensus for PlainConsensus {
        fn validate_header(&self, _header: &SealedHeader) -> Result<(), String> {
            Ok(())
        }
        fn validate_header_against_parent(
            &self,
            _header: &SealedHeader,
            _parent: &SealedHeader,
        ) -> Result<(), String> {
            Ok(())
        }
        fn validate_block(&self, _block: &chain_primitives::SealedBlock) -> Result<(), String> {
            Ok(())
        }
    }

    fn header(number: u64, difficulty: u64, extra: u8) -> SealedHeader {
        let h = Header {
            number,
            parent_hash: H256::zero(),
            state_root: H256::zero(),
            transactions_root: H256::zero(),
            receipts_root: H256::zero(),
            logs_bloom: [0u8; 256],
            difficulty: U256::from(difficulty),
            timestamp: number,
            extra_data: bytes::Bytes::new(),
            beneficiary: Address::zero(),
            gas_limit: 30_000_000,
            gas_used: 0,
        };
        h.seal_with_td(U256::from(extra))
    }

    #[test]
    fn higher_total_difficulty_wins() {
        let consensus = PlainConsensus;
        let current = header(5, 2, 5);
        let candidate = header(5, 2, 10);
        assert!(should_reorg(
            &consensus,
            &current,
            U256::from(5u64),
            &candidate,
            U256::from(10u64),
            &NeverPreserve
        ));
    }

    #[test]
    fn lower_total_difficulty_loses() {
        let consensus = PlainConsensus;
        let current = header(5, 2, 10);
        let candidate = header(5, 2, 5);
        assert!(!should_reorg(
            &consensus,
            &current,
            U256::from(10u64),
            &candidate,
            U256::from(5u64),
            &NeverPreserve
        ));
    }

    #[test]
    fn equal_td_defers_to_should_preserve() {
        let consensus = PlainConsensus;
        let current = header(5, 2, 5);
        let candidate = header(5, 2, 5);
        assert!(!should_reorg(
            &consensus,
            &current,
            U256::from(5u64),
            &candidate,
            U256::from(5u64),
            &chain_interfaces::consensus::NeverPreserve
        ));

        struct AlwaysPreserve;
        impl ShouldPreserve for AlwaysPreserve {
            fn should_preserve(&self, _local: &SealedHeader, _remote: &SealedHeader) -> bool {
                true
            }
        }
        assert!(!should_reorg(
            &consensus,
            &current,
            U256::from(5u64),
            &candidate,
            U256::from(5u64),
            &AlwaysPreserve
        ));
    }

    struct FastFinality {
        justified: u64,
    }

    impl Consensus for FastFinality {
        fn validate_header(&self, _header: &SealedHeader) -> Result<(), String> {
            Ok(())
        }
        fn validate_header_against_parent(
            &self,
            _header: &SealedHeader,
            _parent: &SealedHeader,
        ) -> Result<(), String> {
            Ok(())
        }
        fn validate_block(&self, _block: &chain_primitives::SealedBlock) -> Result<(), String> {
            Ok(())
        }
        fn posa_capability(&self) -> Option<&dyn PosaCapability> {
            Some(self)
        }
    }

    impl PosaCapability for FastFinality {
        fn justified(&self) -> Option<(u64, BlockHash)> {
            Some((self.justified, H256::zero()))
        }
        fn finalized(&self) -> Option<SealedHeader> {
            None
        }
        fn enough_distance(&self, current: u64, candidate: u64) -> bool {
            current.saturating_sub(candidate) >= 2
        }
    }

    #[test]
    fn fast_finality_prefers_higher_justified_branch() {
        let consensus = FastFinality { justified: 7 };
        let current = header(6, 2, 1);
        let candidate = header(8, 2, 1);
        assert!(should_reorg(
            &consensus,
            &current,
            U256::from(1u64),
            &candidate,
            U256::from(1u64),
            &NeverPreserve
        ));
    }
}
