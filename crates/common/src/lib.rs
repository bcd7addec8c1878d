//! Shared types for the unreal-apigen workspace.
//!
//! This crate holds the two pieces of state that cross crate boundaries:
//! the generator configuration read by the CLI and threaded through the core,
//! and the generation-pass memo persisted between runs.

pub mod config;
pub mod memo;

pub use config::{GenerationMode, GeneratorConfig};
pub use memo::GenerationPassMemo;
