//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use runesx_simulation::prelude::*;
//! ```

// After-swap pricing
pub use crate::after_swap::{AfterSwapPrice, AfterSwapPrices, project_after_swap_prices};

// Path simulation
pub use crate::path_simulator::{
    IntermediateAmount, PathError, PathSimulation, simulate_path, simulate_path_units,
};

// State management
pub use crate::state::PoolSet;
