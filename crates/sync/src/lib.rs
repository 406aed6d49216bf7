//! Replicated market state and the asynchronous swap client.
//!
//! This crate keeps a local replica of the exchange state fed by a push stream:
//! - Keyed replica stores with buffered updates and last-writer-wins merging
//! - A dispatcher mapping stream events onto the stores
//! - A background worker running swap estimates off the async runtime
//! - A client facade answering estimate, compliance, liquidity and price queries

/// Prelude module for convenient imports.
pub mod prelude;

/// Client facade.
pub mod client;
/// Error types.
pub mod error;
/// Replica stores.
pub mod store;
/// Stream event dispatch.
pub mod sync;
/// Background estimation worker.
pub mod worker;
