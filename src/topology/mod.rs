//! Topology generation module.
//!
//! This module turns validated role declarations into the final topology
//! document: node and link assembly, per-node service synthesis, and the
//! umbrella error type for a compilation run.

pub mod assembler;
pub mod services;
pub mod types;

use thiserror::Error;

use crate::binding::BindingError;
use crate::config::ValidationError;
use crate::ip::AllocationError;

// Re-export commonly used items
pub use assembler::{compile, compile_with_salt, Compilation};
pub use types::TopologyGraph;

/// Any fatal error during a compilation run.
///
/// All variants are terminal: the run aborts without emitting a partial
/// topology, since a partial topology is unsafe to provision.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Allocation(#[from] AllocationError),
    #[error(transparent)]
    Binding(#[from] BindingError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
