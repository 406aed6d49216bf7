//! Swap simulation over cloned pool state.
//!
//! This crate chains single-hop constant-product swaps across a path:
//! - Pool sets cloned from a replica snapshot
//! - Per-path output, price impact and intermediate amounts
//! - Projected endpoint prices after a simulated swap

/// Prelude module for convenient imports.
pub mod prelude;

/// Projected prices after a swap.
pub mod after_swap;
/// Multi-hop path simulation.
pub mod path_simulator;
/// Mutable pool sets.
pub mod state;
