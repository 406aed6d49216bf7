//! Route discovery and swap estimation.
//!
//! This crate turns a market snapshot into a swap estimate:
//! - Path search over compliant pools (exhaustive or bounded)
//! - Candidate selection by objective
//! - Input validation and estimate assembly

/// Prelude module for convenient imports.
pub mod prelude;

/// Routing configuration.
pub mod config;
/// Estimation errors.
pub mod error;
/// Estimation orchestrator.
pub mod estimator;
/// Candidate selection objectives.
pub mod objective;
/// Path search.
pub mod path_finder;
