//! Stream event dispatch onto the replica.
//!
//! Provides:
//! - The event vocabulary of the exchange push stream
//! - A dispatcher applying snapshots, updates and transport resets
//! - Waiting for the initial data with transport-failure and timeout handling

mod events;
mod store_sync;

pub use events::*;
pub use store_sync::*;
