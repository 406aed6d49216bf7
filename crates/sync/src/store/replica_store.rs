//! Generic keyed store with buffered, last-writer-wins updates.

use super::Replicated;
use std::collections::{HashMap, VecDeque};
use tokio::sync::{RwLock, RwLockReadGuard, watch};
use tracing::{debug, info, warn};

/// What an update did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateOutcome {
    /// Queued until the initial snapshot arrives.
    Buffered,
    /// Stored under a key not seen before.
    Inserted,
    /// Merged into the stored entity.
    Updated,
    /// The entity became void and was removed.
    Evicted,
    /// Not newer than the stored entity; dropped.
    Stale,
    /// Unknown key and not enough fields to build the entity; dropped.
    Incomplete,
}

/// Result of applying an initial snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotSummary {
    /// Entities stored from the snapshot itself.
    pub stored: usize,
    /// Snapshot items dropped as incomplete or void.
    pub dropped: usize,
    /// Buffered updates replayed afterwards.
    pub replayed: usize,
}

struct StoreState<E: Replicated> {
    entries: HashMap<String, E>,
    initial_received: bool,
    pending: VecDeque<E::Patch>,
}

impl<E: Replicated> Default for StoreState<E> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            initial_received: false,
            pending: VecDeque::new(),
        }
    }
}

impl<E: Replicated> StoreState<E> {
    fn apply(&mut self, patch: E::Patch) -> UpdateOutcome {
        let incoming = E::patch_updated_at(&patch);
        let key = E::patch_key(&patch).to_string();

        let Some(existing) = self.entries.get_mut(&key) else {
            return match E::from_patch(patch) {
                Some(entity) if entity.is_void() => UpdateOutcome::Incomplete,
                Some(entity) => {
                    self.entries.insert(key, entity);
                    UpdateOutcome::Inserted
                }
                None => UpdateOutcome::Incomplete,
            };
        };

        if incoming <= existing.updated_at() {
            return UpdateOutcome::Stale;
        }
        existing.merge(patch);
        if existing.is_void() {
            self.entries.remove(&key);
            return UpdateOutcome::Evicted;
        }
        UpdateOutcome::Updated
    }
}

/// Shared read access to a store. Writers wait until it is dropped.
pub struct StoreReadGuard<'a, E: Replicated> {
    state: RwLockReadGuard<'a, StoreState<E>>,
}

impl<E: Replicated> StoreReadGuard<'_, E> {
    /// Clones every stored entity, in no particular order.
    pub fn to_vec(&self) -> Vec<E> {
        self.state.entries.values().cloned().collect()
    }
}

/// Replicated collection of one entity kind.
pub struct ReplicaStore<E: Replicated> {
    /// Entries, readiness flag and pre-snapshot buffer, guarded together.
    state: RwLock<StoreState<E>>,
    /// Flips to true once the initial snapshot is applied.
    ready: watch::Sender<bool>,
}

impl<E: Replicated> Default for ReplicaStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Replicated> ReplicaStore<E> {
    /// Creates an empty store awaiting its initial snapshot.
    pub fn new() -> Self {
        let (ready, _) = watch::channel(false);
        Self {
            state: RwLock::new(StoreState::default()),
            ready,
        }
    }

    /// Replaces the contents with `items` and replays updates buffered before it.
    pub async fn apply_snapshot(&self, items: Vec<E::Patch>) -> SnapshotSummary {
        let mut state = self.state.write().await;
        let mut summary = SnapshotSummary::default();

        let mut entries = HashMap::with_capacity(items.len());
        for patch in items {
            match E::from_patch(patch) {
                Some(entity) if !entity.is_void() => {
                    entries.insert(entity.key().to_string(), entity);
                    summary.stored += 1;
                }
                Some(_) => summary.dropped += 1,
                None => {
                    warn!(kind = E::KIND, "Dropping incomplete snapshot item");
                    summary.dropped += 1;
                }
            }
        }
        state.entries = entries;
        state.initial_received = true;

        while let Some(patch) = state.pending.pop_front() {
            let outcome = state.apply(patch);
            debug!(kind = E::KIND, outcome = ?outcome, "Replayed buffered update");
            summary.replayed += 1;
        }
        drop(state);

        self.ready.send_replace(true);
        info!(
            kind = E::KIND,
            stored = summary.stored,
            dropped = summary.dropped,
            replayed = summary.replayed,
            "Applied initial snapshot"
        );
        summary
    }

    /// Applies one incremental update.
    pub async fn apply_update(&self, patch: E::Patch) -> UpdateOutcome {
        let mut state = self.state.write().await;
        if !state.initial_received {
            state.pending.push_back(patch);
            debug!(kind = E::KIND, pending = state.pending.len(), "Buffered update");
            return UpdateOutcome::Buffered;
        }

        let key = E::patch_key(&patch).to_string();
        let outcome = state.apply(patch);
        match outcome {
            UpdateOutcome::Incomplete => {
                warn!(kind = E::KIND, key = %key, "Ignoring update for unknown entity")
            }
            _ => debug!(kind = E::KIND, key = %key, outcome = ?outcome, "Applied update"),
        }
        outcome
    }

    /// All stored entities, in no particular order.
    pub async fn get_all(&self) -> Vec<E> {
        self.read().await.to_vec()
    }

    /// Holds the store for reading, so several stores can be read at one point in time.
    pub async fn read(&self) -> StoreReadGuard<'_, E> {
        StoreReadGuard {
            state: self.state.read().await,
        }
    }

    pub async fn get(&self, key: &str) -> Option<E> {
        self.state.read().await.entries.get(key).cloned()
    }

    /// First stored entity matching `predicate`.
    pub async fn find(&self, predicate: impl Fn(&E) -> bool) -> Option<E> {
        self.state
            .read()
            .await
            .entries
            .values()
            .find(|e| predicate(e))
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.entries.is_empty()
    }

    pub async fn is_initial_received(&self) -> bool {
        self.state.read().await.initial_received
    }

    /// Updates still waiting for the initial snapshot.
    pub async fn pending_len(&self) -> usize {
        self.state.read().await.pending.len()
    }

    /// Clears entries, readiness and the pending buffer.
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        *state = StoreState::default();
        drop(state);
        self.ready.send_replace(false);
        info!(kind = E::KIND, "Store reset");
    }

    /// Receiver observing whether the initial snapshot has been applied.
    pub fn subscribe_ready(&self) -> watch::Receiver<bool> {
        self.ready.subscribe()
    }
}
