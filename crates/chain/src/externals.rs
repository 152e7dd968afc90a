//! `Externals`: the bundle of collaborators the manager is generic over, threaded through every
//! module in this crate instead of re-parameterizing each function individually.
//!
//! Grounded directly on the teacher's own `Externals<DB, C, EF>` in `blockchain_tree/mod.rs`
//! (`db`, `consensus`, `executor_factory` fields) — the one piece of the teacher's architecture
//! this transformation keeps almost verbatim, since the container pattern itself is orthogonal to
//! the fork-graph-vs-linear-chain redesign.

use chain_interfaces::{Consensus, ExecutorFactory};
use std::sync::Arc;

pub struct Externals<DB, C, EF> {
    pub db: Arc<DB>,
    pub consensus: C,
    pub executor_factory: EF,
}

impl<DB, C, EF> Externals<DB, C, EF>
where
    C: Consensus,
    EF: ExecutorFactory,
{
    pub fn new(db: Arc<DB>, consensus: C, executor_factory: EF) -> Self {
        Self { db, consensus, executor_factory }
    }
}
