//! btkb-engine library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the `btkb` binary share the same module tree.

pub mod application;
pub mod infrastructure;

pub use application::engine::{EngineConfig, EngineError, EnginePorts, KeyboardEngine};
