//! The full local replica: one store per entity kind.

use super::ReplicaStore;
use runesx_domain::entities::coin::Coin;
use runesx_domain::entities::pool::Pool;
use runesx_domain::entities::user_share::UserShare;
use runesx_domain::entities::wallet::Wallet;
use runesx_routing::estimator::MarketSnapshot;
use std::sync::Arc;
use tracing::info;

/// Pools, coins, wallets and user shares replicated from the exchange.
///
/// Cloning is cheap and every clone shares the same stores.
#[derive(Clone, Default)]
pub struct Replica {
    /// Pools keyed by id.
    pub pools: Arc<ReplicaStore<Pool>>,
    /// Coins keyed by id.
    pub coins: Arc<ReplicaStore<Coin>>,
    /// Wallets keyed by ticker.
    pub wallets: Arc<ReplicaStore<Wallet>>,
    /// User shares keyed by pool id.
    pub user_shares: Arc<ReplicaStore<UserShare>>,
}

impl Replica {
    /// Creates an empty replica.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears every store.
    pub async fn reset_all(&self) {
        self.pools.reset().await;
        self.coins.reset().await;
        self.wallets.reset().await;
        self.user_shares.reset().await;
        info!("Replica reset");
    }

    /// Copies the current pools and coins for a pure computation.
    ///
    /// Both stores are held for reading while copying, so no update lands between the two reads.
    /// Writers only ever hold one store, so taking pools then coins cannot deadlock.
    pub async fn market_snapshot(&self) -> MarketSnapshot {
        let pools = self.pools.read().await;
        let coins = self.coins.read().await;
        MarketSnapshot {
            pools: pools.to_vec(),
            coins: coins.to_vec(),
        }
    }

    /// Looks a coin up by ticker; coins are stored by id.
    pub async fn coin_by_ticker(&self, ticker: &str) -> Option<Coin> {
        self.coins.find(|c| c.ticker == ticker).await
    }
}
