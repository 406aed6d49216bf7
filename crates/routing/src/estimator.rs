//! Swap estimation orchestrator.
//!
//! An estimate runs through validation, path search, per-path simulation, best-path selection
//! and price annotation. Any stage may fail; a failing candidate path is dropped and only
//! fails the estimate when no candidate survives.

use crate::config::{MAX_HOPS_LIMIT, RoutingConfig};
use crate::error::{EstimateError, ValidationError};
use crate::objective::{MaximizeOutput, select_best};
use crate::path_finder::{Algorithm, Route, find_paths};
use runesx_domain::entities::coin::Coin;
use runesx_domain::entities::pool::Pool;
use runesx_domain::pricing::PriceOracle;
use runesx_domain::token::{AmountError, TokenAmount, format_units, parse_units};
use runesx_simulation::after_swap::{AfterSwapPrices, project_after_swap_prices};
use runesx_simulation::path_simulator::{IntermediateAmount, PathSimulation, simulate_path_units};
use runesx_simulation::state::PoolSet;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// What the caller wants to swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateRequest {
    pub input_coin: String,
    pub output_coin: String,
    /// Human-readable amount of the input coin.
    pub amount_in: String,
    pub max_hops: u32,
    pub algorithm: Algorithm,
}

impl EstimateRequest {
    /// Creates a request with a 6-hop bound and exhaustive search.
    #[must_use]
    pub fn new(
        input_coin: impl Into<String>,
        output_coin: impl Into<String>,
        amount_in: impl Into<String>,
    ) -> Self {
        Self {
            input_coin: input_coin.into(),
            output_coin: output_coin.into(),
            amount_in: amount_in.into(),
            max_hops: 6,
            algorithm: Algorithm::Dfs,
        }
    }

    /// Sets the hop bound.
    #[must_use]
    pub fn with_max_hops(mut self, max_hops: u32) -> Self {
        self.max_hops = max_hops;
        self
    }

    /// Sets the search algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }
}

/// Pools and coins an estimate is computed against.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub pools: Vec<Pool>,
    pub coins: Vec<Coin>,
}

/// One side of a swap, priced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenQuote {
    pub token: String,
    /// Human-readable amount.
    pub amount: String,
    /// Smallest units.
    pub amount_units: TokenAmount,
    pub price_usd: Decimal,
    pub value_usd: Decimal,
    pub price_in_quote: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slippage {
    /// Mean per-hop price impact, in percent.
    pub price_impact: Decimal,
    pub intermediate_amounts: Vec<IntermediateAmount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapEstimate {
    pub input: TokenQuote,
    pub output: TokenQuote,
    pub slippage: Slippage,
    pub after_swap_prices: AfterSwapPrices,
    pub path: Route,
    pub algorithm: Algorithm,
}

struct Validated<'a> {
    input: &'a Coin,
    output: &'a Coin,
    amount_in: TokenAmount,
}

fn validate<'a>(
    request: &EstimateRequest,
    coins: &'a [Coin],
) -> Result<Validated<'a>, ValidationError> {
    let find = |ticker: &str| {
        coins
            .iter()
            .find(|c| c.ticker == ticker)
            .ok_or_else(|| ValidationError::UnknownCoin(ticker.to_string()))
    };
    let input = find(&request.input_coin)?;
    let output = find(&request.output_coin)?;
    if input.ticker == output.ticker {
        return Err(ValidationError::IdenticalCoins(input.ticker.clone()));
    }

    if !(1..=MAX_HOPS_LIMIT).contains(&request.max_hops) {
        return Err(ValidationError::InvalidMaxHops {
            got: request.max_hops,
            max: MAX_HOPS_LIMIT,
        });
    }

    let amount_in = parse_units(&request.amount_in, input.dp)?;
    if amount_in.is_zero() {
        return Err(AmountError::NotPositive(request.amount_in.clone()).into());
    }

    Ok(Validated {
        input,
        output,
        amount_in,
    })
}

/// Estimates the best route for `request` over `snapshot`.
pub fn estimate_swap(
    config: &RoutingConfig,
    snapshot: &MarketSnapshot,
    request: &EstimateRequest,
) -> Result<SwapEstimate, EstimateError> {
    let MarketSnapshot { pools, coins } = snapshot;
    let Validated {
        input,
        output,
        amount_in,
    } = validate(request, coins)?;

    let paths = find_paths(
        config,
        &input.ticker,
        &output.ticker,
        pools,
        request.max_hops,
        request.algorithm,
    );
    if paths.is_empty() {
        return Err(EstimateError::NoPathFound {
            from: input.ticker.clone(),
            to: output.ticker.clone(),
        });
    }

    let mut routes = Vec::with_capacity(paths.len());
    let mut candidates: Vec<PathSimulation> = Vec::with_capacity(paths.len());
    for path in &paths {
        match simulate_path_units(PoolSet::from_snapshot(pools), path, input, amount_in, coins) {
            Ok(sim) => {
                routes.push(path);
                candidates.push(sim);
            }
            Err(e) => debug!(error = %e, hops = path.len(), "Dropping candidate path"),
        }
    }

    let best = select_best(&MaximizeOutput, &candidates).ok_or_else(|| {
        EstimateError::NoProfitablePath {
            from: input.ticker.clone(),
            to: output.ticker.clone(),
            candidates: paths.len(),
        }
    })?;
    let route = routes[best].clone();
    let winner = candidates.swap_remove(best);

    let oracle = PriceOracle::new(&config.pricing, pools, coins);
    let input_quote = quote(&oracle, input, amount_in);
    let output_quote = quote(&oracle, output, winner.amount_out);
    let after_swap_prices =
        project_after_swap_prices(&oracle, &winner.pools, &input.ticker, &output.ticker);

    info!(
        input = %input.ticker,
        output = %output.ticker,
        amount_in = %input_quote.amount,
        amount_out = %output_quote.amount,
        hops = route.len(),
        candidates = paths.len(),
        algorithm = %request.algorithm,
        "Swap estimated"
    );

    Ok(SwapEstimate {
        input: input_quote,
        output: output_quote,
        slippage: Slippage {
            price_impact: winner.price_impact * Decimal::ONE_HUNDRED,
            intermediate_amounts: winner.intermediate_amounts,
        },
        after_swap_prices,
        path: route,
        algorithm: request.algorithm,
    })
}

fn quote(oracle: &PriceOracle<'_>, coin: &Coin, units: TokenAmount) -> TokenQuote {
    let price_usd = oracle.token_price_usd(&coin.ticker);
    let value_usd = units
        .to_decimal(coin.dp)
        .and_then(|amount| amount.checked_mul(price_usd))
        .unwrap_or(Decimal::ZERO);
    TokenQuote {
        token: coin.ticker.clone(),
        amount: format_units(units, coin.dp),
        amount_units: units,
        price_usd,
        value_usd,
        price_in_quote: oracle.price_in_quote(&coin.ticker),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use runesx_domain::entities::coin::CoinRef;
    use rust_decimal_macros::dec;

    fn coin(ticker: &str, dp: u8) -> Coin {
        Coin {
            id: format!("id-{ticker}"),
            ticker: ticker.to_string(),
            dp,
            project_name: ticker.to_string(),
            status: "active".to_string(),
            compliance_requirement: TokenAmount::from(100_000_000_000u64),
            chains: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    fn pool(id: &str, a: &str, b: &str, reserve_a: u64, reserve_b: u64) -> Pool {
        Pool {
            id: id.to_string(),
            coin_a: CoinRef::new(a, 8),
            coin_b: CoinRef::new(b, 8),
            reserve_a: TokenAmount::from(reserve_a),
            reserve_b: TokenAmount::from(reserve_b),
            total_shares: TokenAmount::from(1u64),
            lp_fee_rate: 30,
            treasury_fee_rate: 5,
            compliant: true,
            active_liquidity_providers: 1,
            liquidity_shares: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    fn snapshot() -> MarketSnapshot {
        MarketSnapshot {
            pools: vec![
                pool("ru", "RUNES", "USDC", 100_000_000_000, 2_000_000_000),
                pool("rx", "RUNES", "XLM", 1_000_000_000, 2_000_000_000),
                // a thin direct pool and a deep two-hop alternative
                pool("xp", "XLM", "POL", 10_000_000, 10_000_000),
                pool("rp", "RUNES", "POL", 50_000_000_000, 50_000_000_000),
            ],
            coins: vec![
                coin("RUNES", 8),
                coin("USDC", 8),
                coin("XLM", 8),
                coin("POL", 8),
            ],
        }
    }

    #[test]
    fn test_single_hop_estimate() {
        let config = RoutingConfig::default();
        let request = EstimateRequest::new("RUNES", "XLM", "0.1").with_max_hops(1);
        let estimate = estimate_swap(&config, &snapshot(), &request).unwrap();

        assert_eq!(estimate.output.amount_units, TokenAmount::from(19_733_357u64));
        assert_eq!(estimate.output.amount, "0.19733357");
        assert_eq!(estimate.path, vec![runesx_domain::value_objects::Hop::new("RUNES", "XLM", "rx")]);
        assert_eq!(estimate.algorithm, Algorithm::Dfs);
        // 1000 RUNES : 20 USDC
        assert_eq!(estimate.input.price_usd, dec!(0.02));
        assert_eq!(estimate.input.value_usd, dec!(0.002));
        assert!(estimate.slippage.price_impact > Decimal::ZERO);
        assert!(estimate.after_swap_prices.output.affected);
    }

    #[test]
    fn test_picks_deeper_route() {
        let config = RoutingConfig::default();
        let request = EstimateRequest::new("XLM", "POL", "1");
        let estimate = estimate_swap(&config, &snapshot(), &request).unwrap();

        let ids: Vec<&str> = estimate.path.iter().map(|h| h.pool_id.as_str()).collect();
        assert_eq!(ids, vec!["rx", "rp"]);
        assert_eq!(estimate.slippage.intermediate_amounts.len(), 1);
        assert_eq!(estimate.slippage.intermediate_amounts[0].ticker, "RUNES");
    }

    #[test]
    fn test_bfs_and_dfs_agree_on_best() {
        let config = RoutingConfig::default();
        let dfs = estimate_swap(&config, &snapshot(), &EstimateRequest::new("XLM", "POL", "1")).unwrap();
        let bfs = estimate_swap(
            &config,
            &snapshot(),
            &EstimateRequest::new("XLM", "POL", "1").with_algorithm(Algorithm::Bfs),
        )
        .unwrap();
        assert_eq!(dfs.path, bfs.path);
        assert_eq!(dfs.output.amount_units, bfs.output.amount_units);
    }

    #[test]
    fn test_validation_errors() {
        let config = RoutingConfig::default();
        let snap = snapshot();

        let err = estimate_swap(&config, &snap, &EstimateRequest::new("RUNES", "XLM", "0.123456789"))
            .unwrap_err();
        assert!(matches!(
            err,
            EstimateError::Validation(ValidationError::Amount(AmountError::TooManyDecimals { .. }))
        ));

        let err = estimate_swap(&config, &snap, &EstimateRequest::new("RUNES", "XLM", "0")).unwrap_err();
        assert!(matches!(
            err,
            EstimateError::Validation(ValidationError::Amount(AmountError::NotPositive(_)))
        ));

        let err = estimate_swap(&config, &snap, &EstimateRequest::new("RUNES", "RUNES", "1")).unwrap_err();
        assert_eq!(
            err,
            EstimateError::Validation(ValidationError::IdenticalCoins("RUNES".to_string()))
        );

        let err = estimate_swap(&config, &snap, &EstimateRequest::new("RUNES", "DOGE", "1")).unwrap_err();
        assert_eq!(
            err,
            EstimateError::Validation(ValidationError::UnknownCoin("DOGE".to_string()))
        );

        for hops in [0, 15] {
            let request = EstimateRequest::new("RUNES", "XLM", "1").with_max_hops(hops);
            assert!(matches!(
                estimate_swap(&config, &snap, &request),
                Err(EstimateError::Validation(ValidationError::InvalidMaxHops { .. }))
            ));
        }
    }

    #[test]
    fn test_trailing_zeros_do_not_count_as_decimals() {
        let config = RoutingConfig::default();
        let request = EstimateRequest::new("RUNES", "XLM", "0.1000000000");
        assert!(estimate_swap(&config, &snapshot(), &request).is_ok());
    }

    #[test]
    fn test_no_path_found() {
        let config = RoutingConfig::default();
        let mut snap = snapshot();
        snap.coins.push(coin("DOGE", 8));
        let err = estimate_swap(&config, &snap, &EstimateRequest::new("RUNES", "DOGE", "1")).unwrap_err();
        assert!(matches!(err, EstimateError::NoPathFound { .. }));
    }

    #[test]
    fn test_no_profitable_path() {
        let config = RoutingConfig::default();
        let snap = snapshot();
        // one smallest unit is consumed by rounding on every route
        let request = EstimateRequest::new("XLM", "POL", "0.00000001");
        let err = estimate_swap(&config, &snap, &request).unwrap_err();
        assert!(matches!(err, EstimateError::NoProfitablePath { .. }));
    }

    #[test]
    fn test_request_wire_format() {
        let json = r#"{"inputCoin":"RUNES","outputCoin":"XLM","amountIn":"1","maxHops":3,"algorithm":"bfs"}"#;
        let request: EstimateRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.algorithm, Algorithm::Bfs);
        assert_eq!(request.max_hops, 3);
    }
}
