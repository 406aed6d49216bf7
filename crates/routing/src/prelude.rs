//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use runesx_routing::prelude::*;
//! ```

// Configuration
pub use crate::config::RoutingConfig;

// Errors
pub use crate::error::{EstimateError, ValidationError};

// Estimation
pub use crate::estimator::{
    EstimateRequest, MarketSnapshot, Slippage, SwapEstimate, TokenQuote, estimate_swap,
};

// Objectives
pub use crate::objective::{MaximizeOutput, ObjectiveFunction, select_best};

// Path search
pub use crate::path_finder::{Algorithm, Route, find_paths, find_paths_bfs, find_paths_dfs};
