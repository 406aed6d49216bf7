//! Dispatcher from stream events to the replica stores.

use super::{LinkState, StreamEvent};
use crate::error::SyncError;
use crate::store::{Replica, ReplicaStore, Replicated};
use async_trait::async_trait;
use runesx_domain::entities::coin::Coin;
use runesx_domain::entities::pool::Pool;
use runesx_domain::entities::wallet::Wallet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Configuration for store synchronization.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Consecutive connection failures tolerated before the replica is reset.
    pub max_connect_errors: u32,
    /// How long to wait for the initial pools, coins and wallets.
    pub initial_wait: Duration,
    /// Capacity of the event channel fed by the transport.
    pub event_buffer: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_connect_errors: 3,
            initial_wait: Duration::from_secs(30),
            event_buffer: 1000,
        }
    }
}

impl SyncConfig {
    #[must_use]
    pub fn with_max_connect_errors(mut self, max: u32) -> Self {
        self.max_connect_errors = max;
        self
    }

    #[must_use]
    pub fn with_initial_wait(mut self, wait: Duration) -> Self {
        self.initial_wait = wait;
        self
    }

    #[must_use]
    pub fn with_event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = capacity;
        self
    }
}

/// Initial data available once every waited-on store has its snapshot.
#[derive(Debug, Clone)]
pub struct InitialData {
    pub pools: Vec<Pool>,
    pub coins: Vec<Coin>,
    pub wallets: Vec<Wallet>,
}

/// Receiver of stream events.
#[async_trait]
pub trait StoreEventSink: Send + Sync {
    /// Handles one event. Never fails: bad items are dropped and logged.
    async fn on_event(&self, event: StreamEvent);
}

/// Applies stream events to a [`Replica`].
pub struct StoreSync {
    /// Configuration.
    config: SyncConfig,
    /// Stores being fed.
    replica: Replica,
    /// Consecutive connection failures since the last successful connect.
    connect_errors: AtomicU32,
    /// Last transport state.
    link: watch::Sender<LinkState>,
}

impl StoreSync {
    /// Creates a dispatcher feeding `replica`.
    pub fn new(replica: Replica, config: SyncConfig) -> Self {
        let (link, _) = watch::channel(LinkState::default());
        Self {
            config,
            replica,
            connect_errors: AtomicU32::new(0),
            link,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn replica(&self) -> &Replica {
        &self.replica
    }

    /// Consecutive connection failures since the last successful connect.
    pub fn connect_errors(&self) -> u32 {
        self.connect_errors.load(Ordering::SeqCst)
    }

    pub fn link_state(&self) -> LinkState {
        self.link.borrow().clone()
    }

    /// Applies one event.
    pub async fn handle(&self, event: StreamEvent) {
        debug!(event = event.name(), "Handling stream event");
        match event {
            StreamEvent::PoolsUpdated { pools, is_initial } => {
                dispatch(&self.replica.pools, pools, is_initial).await;
            }
            StreamEvent::CoinsUpdated { coins, is_initial } => {
                dispatch(&self.replica.coins, coins, is_initial).await;
            }
            StreamEvent::WalletsUpdated {
                wallets,
                is_initial,
            } => {
                dispatch(&self.replica.wallets, wallets, is_initial).await;
            }
            StreamEvent::UserSharesUpdated {
                user_shares,
                is_initial,
            } => {
                dispatch(&self.replica.user_shares, user_shares, is_initial).await;
            }
            StreamEvent::Connect => {
                self.connect_errors.store(0, Ordering::SeqCst);
                self.link.send_replace(LinkState::Connected);
                info!("Connected to stream");
            }
            StreamEvent::Disconnect { reason } => {
                warn!(reason = %reason, "Disconnected from stream");
                self.link.send_replace(LinkState::Failed(reason));
                self.replica.reset_all().await;
            }
            StreamEvent::ConnectError { message } | StreamEvent::ReconnectError { message } => {
                self.record_connect_error(message).await;
            }
            StreamEvent::ReconnectAttempt { attempt } => {
                info!(attempt, "Reconnect attempt");
            }
            StreamEvent::Reconnect => {
                // fresh snapshots follow a reconnect
                info!("Reconnected to stream");
                self.link.send_replace(LinkState::Connected);
                self.replica.reset_all().await;
            }
            StreamEvent::Error { message } => {
                warn!(error = %message, "Stream error");
            }
        }
    }

    async fn record_connect_error(&self, message: String) {
        let failures = self.connect_errors.fetch_add(1, Ordering::SeqCst) + 1;
        warn!(
            failures,
            max = self.config.max_connect_errors,
            error = %message,
            "Stream connection failed"
        );
        self.link.send_replace(LinkState::Failed(message));

        if failures >= self.config.max_connect_errors {
            warn!(failures, "Too many connection failures, resetting replica");
            self.replica.reset_all().await;
        }
    }

    /// Waits up to the configured time for the initial pools, coins and wallets.
    pub async fn wait_for_stores(&self) -> Result<InitialData, SyncError> {
        self.wait_for_stores_within(self.config.initial_wait).await
    }

    /// Waits for the initial pools, coins and wallets.
    ///
    /// Fails on timeout, or when the transport reports a failure while waiting.
    pub async fn wait_for_stores_within(&self, timeout: Duration) -> Result<InitialData, SyncError> {
        let mut link = self.link.subscribe();

        let ready = async {
            let mut pools = self.replica.pools.subscribe_ready();
            let mut coins = self.replica.coins.subscribe_ready();
            let mut wallets = self.replica.wallets.subscribe_ready();
            pools.wait_for(|r| *r).await.map_err(|_| SyncError::Closed)?;
            coins.wait_for(|r| *r).await.map_err(|_| SyncError::Closed)?;
            wallets.wait_for(|r| *r).await.map_err(|_| SyncError::Closed)?;
            Ok::<(), SyncError>(())
        };
        let failed = async {
            loop {
                if link.changed().await.is_err() {
                    return SyncError::Closed;
                }
                if let LinkState::Failed(reason) = &*link.borrow_and_update() {
                    return SyncError::Transport(reason.clone());
                }
            }
        };

        let waited = tokio::time::timeout(timeout, async {
            tokio::select! {
                biased;
                r = ready => r,
                e = failed => Err(e),
            }
        })
        .await;

        match waited {
            Err(_) => {
                warn!(timeout = ?timeout, "Timed out waiting for initial store data");
                Err(SyncError::Timeout(timeout))
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Stopped waiting for initial store data");
                Err(e)
            }
            Ok(Ok(())) => {
                let data = InitialData {
                    pools: self.replica.pools.get_all().await,
                    coins: self.replica.coins.get_all().await,
                    wallets: self.replica.wallets.get_all().await,
                };
                info!(
                    pools = data.pools.len(),
                    coins = data.coins.len(),
                    wallets = data.wallets.len(),
                    "Initial store data received"
                );
                Ok(data)
            }
        }
    }
}

async fn dispatch<E: Replicated>(store: &ReplicaStore<E>, items: Vec<E::Patch>, is_initial: bool) {
    if is_initial {
        store.apply_snapshot(items).await;
    } else {
        for patch in items {
            store.apply_update(patch).await;
        }
    }
}

#[async_trait]
impl StoreEventSink for StoreSync {
    async fn on_event(&self, event: StreamEvent) {
        self.handle(event).await;
    }
}

/// Drains `events` into `sink` until every sender is dropped. Returns the number of events handled.
pub async fn pump_events<S>(sink: &S, mut events: mpsc::Receiver<StreamEvent>) -> usize
where
    S: StoreEventSink + ?Sized,
{
    let mut handled = 0;
    while let Some(event) = events.recv().await {
        sink.on_event(event).await;
        handled += 1;
    }
    debug!(handled, "Event stream closed");
    handled
}

/// Spawns a task pumping events into `sink`; the transport feeds the returned sender.
pub fn spawn_event_loop(
    sink: Arc<dyn StoreEventSink>,
    buffer: usize,
) -> (mpsc::Sender<StreamEvent>, JoinHandle<usize>) {
    let (tx, rx) = mpsc::channel(buffer);
    let handle = tokio::spawn(async move { pump_events(sink.as_ref(), rx).await });
    (tx, handle)
}
