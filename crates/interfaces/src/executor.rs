use chain_primitives::{Receipt, SealedBlockWithSenders, TotalDifficulty};

/// Errors a [`BlockExecutor`] can report, kept distinct from the crate-root [`crate::Error`] the
/// same way the teacher splits `reth_interfaces::executor::Error` from `reth_interfaces::Error`.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ExecError {
    #[error("sender recovery failed")]
    SenderRecoveryError,
    #[error("block verification failed")]
    VerificationFailed,
    #[error("gas limit exceeded: used {used}, limit {limit}")]
    GasLimitExceeded { used: u64, limit: u64 },
    #[error("receipts root mismatch")]
    ReceiptsRootMismatch,
    #[error("state root mismatch")]
    StateRootMismatch,
}

/// External collaborator: executes a sealed block's transactions against a parent state and
/// returns receipts plus (conceptually) a post-state. The state write itself goes through
/// `chain_provider::state::StateWriter`, which this trait is generic over so the manager never
/// has to know execution's state-backend concretely (mirrors the teacher's
/// `BlockExecutor<SP: StateProvider>`).
pub trait BlockExecutor<SP>: Send {
    /// Executes the block, returning one receipt per transaction.
    fn execute(
        &mut self,
        block: &SealedBlockWithSenders,
        total_difficulty: TotalDifficulty,
        state: &SP,
    ) -> Result<Vec<Receipt>, ExecError>;

    /// Executes and additionally verifies the result against the header's declared receipts root
    /// and gas used (the teacher's `execute_and_verify_receipt`).
    fn execute_and_verify_receipt(
        &mut self,
        block: &SealedBlockWithSenders,
        total_difficulty: TotalDifficulty,
        state: &SP,
    ) -> Result<Vec<Receipt>, ExecError>;
}

/// Builds a [`BlockExecutor`] bound to a particular state-provider type, mirroring the teacher's
/// `ExecutorFactory` (`type Executor<T: StateProvider>`).
pub trait ExecutorFactory: Send + Sync {
    type Executor<SP>: BlockExecutor<SP>
    where
        SP: 'static;

    fn executor<SP: 'static>(&self) -> Self::Executor<SP>;
}
