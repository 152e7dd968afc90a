//! Cross-cutting traits and the error model the chain manager is built against.
//!
//! Mirrors the teacher's split between `reth_interfaces::{consensus, executor}` and a crate-root
//! [`Error`]/[`Result`] pair (`blockchain_tree/mod.rs` imports
//! `reth_interfaces::{consensus::Consensus, executor::Error as ExecError, Error}`).

pub mod consensus;
pub mod error;
pub mod executor;

pub use consensus::{Consensus, NeverPreserve, PosaCapability, ShouldPreserve, TotalDifficultyLookup};
pub use error::{BlockRef, Error, Result};
pub use executor::{BlockExecutor, ExecError, ExecutorFactory};
