//! Prices derived from pool reserves.
//!
//! Every coin is priced against a single quote asset through its direct quote pool, and the
//! quote asset is priced in USD through its pool with a USD-stable coin. There is no
//! multi-hop price inference.

use crate::entities::coin::Coin;
use crate::entities::pool::Pool;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Tickers and fallbacks used by the price oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingConfig {
    /// Asset every coin is priced against.
    pub quote_ticker: String,
    /// USD-stable coin paired with the quote asset.
    pub usd_ticker: String,
    /// Quote asset USD price used when no usable quote/USD pool exists.
    pub fallback_quote_price_usd: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            quote_ticker: "RUNES".to_string(),
            usd_ticker: "USDC".to_string(),
            fallback_quote_price_usd: Decimal::new(1, 2), // $0.01
        }
    }
}

impl PricingConfig {
    /// Sets the quote asset ticker.
    #[must_use]
    pub fn with_quote_ticker(mut self, ticker: impl Into<String>) -> Self {
        self.quote_ticker = ticker.into();
        self
    }

    /// Sets the USD-stable ticker.
    #[must_use]
    pub fn with_usd_ticker(mut self, ticker: impl Into<String>) -> Self {
        self.usd_ticker = ticker.into();
        self
    }

    /// Sets the fallback quote price.
    #[must_use]
    pub fn with_fallback_quote_price(mut self, price: Decimal) -> Self {
        self.fallback_quote_price_usd = price;
        self
    }
}

/// USD value of a pool's reserves. `error` explains a zero value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolLiquidity {
    pub value: Decimal,
    pub error: Option<String>,
}

impl PoolLiquidity {
    fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            value: Decimal::ZERO,
            error: Some(reason.into()),
        }
    }
}

/// Read-only price view over one snapshot of pools and coins.
#[derive(Debug, Clone, Copy)]
pub struct PriceOracle<'a> {
    config: &'a PricingConfig,
    pools: &'a [Pool],
    coins: &'a [Coin],
}

impl<'a> PriceOracle<'a> {
    pub fn new(config: &'a PricingConfig, pools: &'a [Pool], coins: &'a [Coin]) -> Self {
        Self {
            config,
            pools,
            coins,
        }
    }

    /// Same coins and config, priced against a different pool set.
    pub fn with_pools<'b>(&self, pools: &'b [Pool]) -> PriceOracle<'b>
    where
        'a: 'b,
    {
        PriceOracle {
            config: self.config,
            pools,
            coins: self.coins,
        }
    }

    pub fn config(&self) -> &PricingConfig {
        self.config
    }

    /// The direct pool between the quote asset and `ticker`, in either orientation.
    pub fn quote_pool(&self, ticker: &str) -> Option<&'a Pool> {
        self.pools
            .iter()
            .find(|p| p.connects(&self.config.quote_ticker, ticker))
    }

    /// USD price of the quote asset, or the configured fallback.
    pub fn quote_price_usd(&self) -> Decimal {
        let fallback = self.config.fallback_quote_price_usd;
        let quote = self.config.quote_ticker.as_str();
        let usd = self.config.usd_ticker.as_str();

        let Some(pool) = self.quote_pool(usd) else {
            warn!(quote = %quote, usd = %usd, fallback = %fallback, "Quote/USD pool not found, using fallback price");
            return fallback;
        };

        match reserve_ratio(pool, usd, quote) {
            Some(price) if price > Decimal::ZERO => price,
            _ => {
                warn!(pool = %pool.id, fallback = %fallback, "Quote/USD pool unusable, using fallback price");
                fallback
            }
        }
    }

    /// Price of one `ticker` in quote asset units; zero without a usable direct quote pool.
    pub fn price_in_quote(&self, ticker: &str) -> Decimal {
        if ticker == self.config.quote_ticker {
            return Decimal::ONE;
        }
        self.quote_pool(ticker)
            .and_then(|pool| reserve_ratio(pool, &self.config.quote_ticker, ticker))
            .unwrap_or(Decimal::ZERO)
    }

    /// USD price of `ticker`; zero for unknown or unpriced coins.
    pub fn token_price_usd(&self, ticker: &str) -> Decimal {
        if ticker == self.config.usd_ticker {
            return Decimal::ONE;
        }
        if !self.coins.iter().any(|c| c.ticker == ticker) {
            warn!(ticker = %ticker, "Coin not found for price lookup");
            return Decimal::ZERO;
        }

        let in_quote = self.price_in_quote(ticker);
        if in_quote.is_zero() {
            return Decimal::ZERO;
        }
        in_quote
            .checked_mul(self.quote_price_usd())
            .unwrap_or(Decimal::ZERO)
    }

    /// USD prices keyed by ticker.
    pub fn prices<'t>(&self, tickers: impl IntoIterator<Item = &'t str>) -> BTreeMap<String, Decimal> {
        tickers
            .into_iter()
            .map(|t| (t.to_string(), self.token_price_usd(t)))
            .collect()
    }

    /// USD value of a display `amount` of `ticker`, optionally truncated to `decimals` places.
    pub fn usd_value(&self, amount: Decimal, ticker: &str, decimals: Option<u32>) -> Decimal {
        let price = self.token_price_usd(ticker);
        if price.is_zero() {
            return Decimal::ZERO;
        }
        let value = amount.checked_mul(price).unwrap_or(Decimal::ZERO);
        match decimals {
            Some(dp) => value.round_dp_with_strategy(dp, RoundingStrategy::ToZero),
            None => value,
        }
    }

    /// USD value of both reserves of `pool`.
    pub fn pool_liquidity_usd(&self, pool: &Pool) -> PoolLiquidity {
        if !pool.compliant {
            return PoolLiquidity::unavailable("Pool is not compliant");
        }

        let known = |ticker: &str| self.coins.iter().any(|c| c.ticker == ticker);
        if !known(&pool.coin_a.ticker) || !known(&pool.coin_b.ticker) {
            return PoolLiquidity::unavailable(format!("Coins not found: {}", pool.pair_label()));
        }

        let reserve_a = pool.reserve_a.to_decimal(pool.coin_a.dp).unwrap_or_default();
        let reserve_b = pool.reserve_b.to_decimal(pool.coin_b.dp).unwrap_or_default();
        if reserve_a.is_zero() || reserve_b.is_zero() {
            return PoolLiquidity::unavailable("Zero reserves in pool");
        }

        let quote_usd = self.quote_price_usd();
        let price_a = self.price_in_quote(&pool.coin_a.ticker);
        let price_b = self.price_in_quote(&pool.coin_b.ticker);
        if price_a.is_zero() || price_b.is_zero() {
            return PoolLiquidity::unavailable("Unpriced pool side");
        }

        let value = price_a
            .checked_mul(quote_usd)
            .and_then(|p| p.checked_mul(reserve_a))
            .zip(
                price_b
                    .checked_mul(quote_usd)
                    .and_then(|p| p.checked_mul(reserve_b)),
            )
            .and_then(|(a, b)| a.checked_add(b));

        match value {
            Some(value) => {
                debug!(pool = %pool.id, value = %value, "Computed pool liquidity");
                PoolLiquidity { value, error: None }
            }
            None => PoolLiquidity::unavailable("Liquidity value overflow"),
        }
    }
}

/// Decimal-adjusted `reserve(numerator) / reserve(denominator)` within one pool.
fn reserve_ratio(pool: &Pool, numerator: &str, denominator: &str) -> Option<Decimal> {
    let (num_coin, num_reserve) = pool.side(numerator)?;
    let (den_coin, den_reserve) = pool.side(denominator)?;
    if num_reserve.is_zero() || den_reserve.is_zero() {
        return None;
    }
    let num = num_reserve.to_decimal(num_coin.dp)?;
    let den = den_reserve.to_decimal(den_coin.dp)?;
    num.checked_div(den)
}
