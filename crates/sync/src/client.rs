//! Client facade over the replica and the estimation worker.

use crate::error::{ClientError, SyncError};
use crate::store::Replica;
use crate::sync::{InitialData, StoreSync, StreamEvent, SyncConfig, spawn_event_loop};
use crate::worker::{EstimationWorker, WorkerConfig};
use runesx_domain::compliance::{ComplianceReport, check_compliance};
use runesx_domain::math::liquidity::{
    DepositAmount, DepositEstimate, ShareAmounts, calculate_share_amounts,
    estimate_liquidity_deposit,
};
use runesx_domain::pricing::{PoolLiquidity, PriceOracle};
use runesx_routing::config::RoutingConfig;
use runesx_routing::error::EstimateError;
use runesx_routing::estimator::{EstimateRequest, SwapEstimate};
use runesx_routing::path_finder::Algorithm;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

const DEFAULT_ENDPOINT: &str = "http://localhost:3010";

/// Connection settings for the exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// REST base URL.
    pub api_url: String,
    /// Push stream URL.
    pub socket_url: String,
    /// Bearer token; empty when unset.
    pub api_key: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_ENDPOINT.to_string(),
            socket_url: DEFAULT_ENDPOINT.to_string(),
            api_key: String::new(),
        }
    }
}

impl ClientConfig {
    /// Reads `API_URL`, `SOCKET_URL` and `API_KEY`, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let read = |name: &str, fallback: String| {
            lookup(name).filter(|v| !v.is_empty()).unwrap_or(fallback)
        };
        Self {
            api_url: read("API_URL", defaults.api_url),
            socket_url: read("SOCKET_URL", defaults.socket_url),
            api_key: read("API_KEY", defaults.api_key),
        }
    }

    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    #[must_use]
    pub fn with_socket_url(mut self, url: impl Into<String>) -> Self {
        self.socket_url = url.into();
        self
    }

    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    /// The API key, required for the private stream and wallet data.
    pub fn require_api_key(&self) -> Result<&str, SyncError> {
        if self.api_key.is_empty() {
            return Err(SyncError::MissingEnv("API_KEY"));
        }
        Ok(&self.api_key)
    }
}

/// Answers swap, liquidity and price queries against the live replica.
pub struct SwapClient {
    config: ClientConfig,
    routing: RoutingConfig,
    replica: Replica,
    sync: Arc<StoreSync>,
    worker: EstimationWorker,
}

impl SwapClient {
    /// Creates a client with an empty replica and starts its estimation worker.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        config: ClientConfig,
        routing: RoutingConfig,
        sync_config: SyncConfig,
        worker_config: WorkerConfig,
    ) -> Self {
        let replica = Replica::new();
        let sync = Arc::new(StoreSync::new(replica.clone(), sync_config));
        let worker = EstimationWorker::spawn(routing.clone(), worker_config);
        info!(socket_url = %config.socket_url, "Swap client created");
        Self {
            config,
            routing,
            replica,
            sync,
            worker,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn routing(&self) -> &RoutingConfig {
        &self.routing
    }

    pub fn replica(&self) -> &Replica {
        &self.replica
    }

    pub fn sync(&self) -> &Arc<StoreSync> {
        &self.sync
    }

    /// Starts consuming stream events; the transport feeds the returned sender.
    pub fn start_event_loop(&self) -> (mpsc::Sender<StreamEvent>, JoinHandle<usize>) {
        spawn_event_loop(self.sync.clone(), self.sync.config().event_buffer)
    }

    /// Waits for the initial pools, coins and wallets.
    pub async fn wait_for_stores(&self) -> Result<InitialData, SyncError> {
        self.sync.wait_for_stores().await
    }

    /// Estimates the best route from `input_coin` to `output_coin` for a display `amount_in`.
    pub async fn estimate_swap(
        &self,
        input_coin: &str,
        output_coin: &str,
        amount_in: &str,
        max_hops: Option<u32>,
        algorithm: Algorithm,
    ) -> Result<SwapEstimate, EstimateError> {
        let request = EstimateRequest::new(input_coin, output_coin, amount_in)
            .with_max_hops(max_hops.unwrap_or(self.routing.default_max_hops))
            .with_algorithm(algorithm);
        let snapshot = self.replica.market_snapshot().await;
        debug!(
            input = %input_coin,
            output = %output_coin,
            pools = snapshot.pools.len(),
            "Submitting estimate"
        );
        self.worker.estimate(request, snapshot).await
    }

    /// Whether a pool between the two tickers satisfies the quote-liquidity requirement.
    pub async fn check_compliance(&self, ticker_a: &str, ticker_b: &str) -> ComplianceReport {
        let snapshot = self.replica.market_snapshot().await;
        check_compliance(
            &self.routing.pricing.quote_ticker,
            ticker_a,
            ticker_b,
            &snapshot.pools,
            &snapshot.coins,
        )
    }

    /// Counterpart amount for a proportional deposit into the pool between two tickers.
    pub async fn estimate_liquidity_deposit(
        &self,
        ticker_a: &str,
        ticker_b: &str,
        amount: DepositAmount,
    ) -> Result<DepositEstimate, ClientError> {
        let snapshot = self.replica.market_snapshot().await;
        let find = |ticker: &str| {
            snapshot
                .coins
                .iter()
                .find(|c| c.ticker == ticker)
                .ok_or_else(|| ClientError::UnknownCoin(ticker.to_string()))
        };
        let coin_a = find(ticker_a)?;
        let coin_b = find(ticker_b)?;
        Ok(estimate_liquidity_deposit(
            &self.routing.pricing.quote_ticker,
            coin_a,
            coin_b,
            amount,
            &snapshot.pools,
        )?)
    }

    /// Underlying amounts of every share record the user holds.
    pub async fn calculate_share_amounts(&self) -> Vec<ShareAmounts> {
        let shares = self.replica.user_shares.get_all().await;
        let pools = self.replica.pools.get_all().await;
        calculate_share_amounts(&shares, &pools)
    }

    /// USD prices of `tickers`.
    pub async fn prices(&self, tickers: &[&str]) -> BTreeMap<String, Decimal> {
        let snapshot = self.replica.market_snapshot().await;
        PriceOracle::new(&self.routing.pricing, &snapshot.pools, &snapshot.coins)
            .prices(tickers.iter().copied())
    }

    /// USD value of a stored pool's reserves; `None` for an unknown pool.
    pub async fn pool_liquidity_usd(&self, pool_id: &str) -> Option<PoolLiquidity> {
        let snapshot = self.replica.market_snapshot().await;
        let pool = snapshot.pools.iter().find(|p| p.id == pool_id)?;
        let oracle = PriceOracle::new(&self.routing.pricing, &snapshot.pools, &snapshot.coins);
        Some(oracle.pool_liquidity_usd(pool))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use runesx_domain::entities::coin::{CoinPatch, CoinRef};
    use runesx_domain::entities::pool::PoolPatch;
    use runesx_domain::entities::user_share::UserShare;
    use runesx_domain::token::TokenAmount;
    use rust_decimal_macros::dec;

    fn coin_patch(ticker: &str) -> CoinPatch {
        CoinPatch {
            id: format!("id-{ticker}"),
            ticker: Some(ticker.to_string()),
            dp: Some(8),
            project_name: None,
            status: Some("active".to_string()),
            compliance_requirement: None,
            chains: None,
            updated_at: Utc::now(),
        }
    }

    fn pool_patch(id: &str, a: &str, b: &str, reserve_a: u64, reserve_b: u64) -> PoolPatch {
        PoolPatch {
            id: id.to_string(),
            coin_a: Some(CoinRef::new(a, 8)),
            coin_b: Some(CoinRef::new(b, 8)),
            reserve_a: Some(TokenAmount::from(reserve_a)),
            reserve_b: Some(TokenAmount::from(reserve_b)),
            total_shares: Some(TokenAmount::from(1_000u64)),
            lp_fee_rate: Some(30),
            treasury_fee_rate: Some(5),
            compliant: Some(true),
            active_liquidity_providers: Some(1),
            liquidity_shares: None,
            updated_at: Utc::now(),
        }
    }

    async fn client() -> SwapClient {
        let client = SwapClient::new(
            ClientConfig::default(),
            RoutingConfig::default(),
            SyncConfig::default(),
            WorkerConfig::default(),
        );
        let events = vec![
            StreamEvent::CoinsUpdated {
                coins: vec![coin_patch("RUNES"), coin_patch("USDC"), coin_patch("XLM")],
                is_initial: true,
            },
            StreamEvent::PoolsUpdated {
                pools: vec![
                    pool_patch("ru", "RUNES", "USDC", 100_000_000_000, 2_000_000_000),
                    pool_patch("rx", "RUNES", "XLM", 1_000_000_000, 2_000_000_000),
                ],
                is_initial: true,
            },
            StreamEvent::WalletsUpdated {
                wallets: Vec::new(),
                is_initial: true,
            },
            StreamEvent::UserSharesUpdated {
                user_shares: vec![UserShare {
                    pool_id: "rx".to_string(),
                    shares: TokenAmount::from(100u64),
                    updated_at: Utc::now(),
                }],
                is_initial: true,
            },
        ];
        for event in events {
            client.sync().handle(event).await;
        }
        client
    }

    #[test]
    fn test_config_from_lookup() {
        let config = ClientConfig::from_lookup(|name| match name {
            "API_URL" => Some("https://api.example".to_string()),
            "API_KEY" => Some("secret".to_string()),
            _ => None,
        });
        assert_eq!(config.api_url, "https://api.example");
        assert_eq!(config.socket_url, DEFAULT_ENDPOINT);
        assert_eq!(config.require_api_key(), Ok("secret"));
        assert_eq!(
            ClientConfig::default().require_api_key(),
            Err(SyncError::MissingEnv("API_KEY"))
        );
    }

    #[tokio::test]
    async fn test_estimate_through_worker() {
        let client = client().await;
        client.wait_for_stores().await.unwrap();

        let estimate = client
            .estimate_swap("RUNES", "XLM", "0.1", None, Algorithm::Bfs)
            .await
            .unwrap();
        assert_eq!(
            estimate.output.amount_units,
            TokenAmount::from(19_733_357u64)
        );
        assert_eq!(estimate.input.price_usd, dec!(0.02));
    }

    #[tokio::test]
    async fn test_compliance_and_prices() {
        let client = client().await;
        let report = client.check_compliance("XLM", "USDC").await;
        assert!(!report.is_compliant);

        let prices = client.prices(&["RUNES", "USDC", "XLM"]).await;
        assert_eq!(prices["USDC"], Decimal::ONE);
        assert_eq!(prices["RUNES"], dec!(0.02));
        assert_eq!(prices["XLM"], dec!(0.01));
    }

    #[tokio::test]
    async fn test_deposit_needs_known_coins() {
        let client = client().await;
        let estimate = client
            .estimate_liquidity_deposit("RUNES", "XLM", DepositAmount::A(dec!(1)))
            .await
            .unwrap();
        assert_eq!(estimate.amount_b, Some(dec!(2)));

        let err = client
            .estimate_liquidity_deposit("RUNES", "POL", DepositAmount::A(dec!(1)))
            .await
            .unwrap_err();
        assert_eq!(err, ClientError::UnknownCoin("POL".to_string()));
    }

    #[tokio::test]
    async fn test_share_amounts_follow_replica() {
        let client = client().await;
        let amounts = client.calculate_share_amounts().await;
        assert_eq!(amounts.len(), 1);
        // 100 of 1000 shares
        assert_eq!(amounts[0].amount_a, TokenAmount::from(100_000_000u64));
        assert_eq!(amounts[0].amount_b, TokenAmount::from(200_000_000u64));

        assert!(client.pool_liquidity_usd("rx").await.is_some());
        assert!(client.pool_liquidity_usd("missing").await.is_none());
    }
}
