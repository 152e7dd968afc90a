//! Reference `BlockExecutor`/`ExecutorFactory` implementations.
//!
//! EVM execution itself is a Non-goal (it is an external collaborator the spec only describes
//! through `chain_interfaces::{BlockExecutor, ExecutorFactory}`); what lives here is a
//! deterministic stand-in used by the CLI's local-import path and by the chain crate's test
//! suite, grounded on the teacher's own `TestExecutor`/`TestFactory` doubles in
//! `blockchain_tree/mod.rs`'s test module — the same "executor that trusts a supplied result"
//! shape, just computed from the block instead of popped off a fixture queue.

mod noop;

pub use noop::{NoopExecutor, NoopExecutorFactory};
