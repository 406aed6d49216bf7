//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types from the crate.
//!
//! # Example
//!
//! ```rust
//! use runesx_sync::prelude::*;
//! ```

// Client
pub use crate::client::{ClientConfig, SwapClient};

// Errors
pub use crate::error::{ClientError, SyncError};

// Stores
pub use crate::store::{Replica, ReplicaStore, Replicated, SnapshotSummary, UpdateOutcome};

// Sync
pub use crate::sync::{
    InitialData, LinkState, StoreEventSink, StoreSync, StreamEvent, SyncConfig, pump_events,
    spawn_event_loop,
};

// Worker
pub use crate::worker::{EstimateJob, EstimationWorker, WorkerConfig};
