//! Keyed replica stores.
//!
//! Provides:
//! - The `Replicated` contract tying an entity to its key, patch type and merge rule
//! - A generic store with pre-snapshot buffering and last-writer-wins updates
//! - The replica holding one store per entity kind

mod replica;
mod replica_store;
mod replicated;

pub use replica::*;
pub use replica_store::*;
pub use replicated::*;
