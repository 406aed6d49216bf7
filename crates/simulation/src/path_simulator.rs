//! Multi-hop path simulator.
//!
//! Chains [`simulate_one_hop`] across a path. Each hop sees the reserves left behind by the
//! previous ones, so a path through the same pool twice is priced the way the server would
//! execute it.

use crate::state::PoolSet;
use runesx_domain::entities::coin::Coin;
use runesx_domain::entities::pool::Pool;
use runesx_domain::math::constant_product::{SwapError, product_ratio, simulate_one_hop};
use runesx_domain::token::{AmountError, TokenAmount, format_units, parse_units};
use runesx_domain::value_objects::{Hop, Percentage};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Reasons a single candidate path cannot be simulated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error(transparent)]
    Amount(#[from] AmountError),
    #[error("path has no hops")]
    EmptyPath,
    #[error("pool {0} not found")]
    PoolNotFound(String),
    #[error("coin {0} not found")]
    UnknownCoin(String),
    #[error("hop {hop} does not continue from {expected}")]
    Disconnected { hop: String, expected: String },
    #[error("swap through pool {pool_id} failed: {source}")]
    Swap {
        pool_id: String,
        #[source]
        source: SwapError,
    },
    #[error("amount fell below one smallest unit of {0}")]
    BelowSmallestUnit(String),
}

/// Human-readable amount held between two hops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntermediateAmount {
    pub ticker: String,
    pub amount: String,
}

/// Result of simulating one path.
#[derive(Debug, Clone)]
pub struct PathSimulation {
    /// Output in smallest units of the final coin.
    pub amount_out: TokenAmount,
    /// Mean per-hop price impact as a fraction.
    pub price_impact: Decimal,
    /// Amounts after every hop but the last.
    pub intermediate_amounts: Vec<IntermediateAmount>,
    /// Pool state after the swap.
    pub pools: PoolSet,
}

/// Simulates a path for a human-readable `amount_in` of `input_coin`.
pub fn simulate_path(
    pools: &[Pool],
    hops: &[Hop],
    input_coin: &Coin,
    amount_in: &str,
    coins: &[Coin],
) -> Result<PathSimulation, PathError> {
    let units = parse_units(amount_in, input_coin.dp)?;
    simulate_path_units(PoolSet::from_snapshot(pools), hops, input_coin, units, coins)
}

/// Simulates a path for `amount_in` smallest units, consuming `pools` as scratch state.
pub fn simulate_path_units(
    mut pools: PoolSet,
    hops: &[Hop],
    input_coin: &Coin,
    amount_in: TokenAmount,
    coins: &[Coin],
) -> Result<PathSimulation, PathError> {
    if hops.is_empty() {
        return Err(PathError::EmptyPath);
    }

    let mut current_amount = amount_in;
    let mut current_ticker = input_coin.ticker.as_str();
    let mut impact_sum = Decimal::ZERO;
    let mut intermediate_amounts = Vec::with_capacity(hops.len().saturating_sub(1));

    for (i, hop) in hops.iter().enumerate() {
        if hop.from != current_ticker {
            return Err(PathError::Disconnected {
                hop: hop.to_string(),
                expected: current_ticker.to_string(),
            });
        }
        if current_amount < TokenAmount::one() {
            return Err(PathError::BelowSmallestUnit(current_ticker.to_string()));
        }

        let output_coin = coins
            .iter()
            .find(|c| c.ticker == hop.to)
            .ok_or_else(|| PathError::UnknownCoin(hop.to.clone()))?;

        let pool = pools
            .get(&hop.pool_id)
            .ok_or_else(|| PathError::PoolNotFound(hop.pool_id.clone()))?;
        if !pool.connects(&hop.from, &hop.to) {
            return Err(PathError::Disconnected {
                hop: hop.to_string(),
                expected: pool.pair_label(),
            });
        }

        let is_coin_a_input = pool.coin_a.ticker == hop.from;
        let outcome = simulate_one_hop(pool, current_amount, is_coin_a_input).map_err(|source| {
            PathError::Swap {
                pool_id: hop.pool_id.clone(),
                source,
            }
        })?;

        let (reserve_in, reserve_out) = if is_coin_a_input {
            (pool.reserve_a, pool.reserve_b)
        } else {
            (pool.reserve_b, pool.reserve_a)
        };
        let sample = price_impact(
            reserve_in,
            reserve_out,
            current_amount,
            outcome.amount_out,
            pool.total_fee_rate(),
        )
        .unwrap_or_else(|| {
            warn!(pool = %hop.pool_id, "Price impact out of range, counted as zero");
            Decimal::ZERO
        });
        impact_sum += sample;

        if let Some(pool) = pools.get_mut(&hop.pool_id) {
            outcome.apply(pool);
        }

        debug!(
            pool = %hop.pool_id,
            hop = %hop,
            amount_in = %current_amount,
            amount_out = %outcome.amount_out,
            impact = %sample,
            "Simulated hop"
        );

        current_amount = outcome.amount_out;
        current_ticker = hop.to.as_str();
        if i + 1 < hops.len() {
            intermediate_amounts.push(IntermediateAmount {
                ticker: hop.to.clone(),
                amount: format_units(current_amount, output_coin.dp),
            });
        }
    }

    if current_amount < TokenAmount::one() {
        return Err(PathError::BelowSmallestUnit(current_ticker.to_string()));
    }

    Ok(PathSimulation {
        amount_out: current_amount,
        price_impact: impact_sum / Decimal::from(hops.len()),
        intermediate_amounts,
        pools,
    })
}

/// `|spot - effective| / spot` where `spot = reserve_out / reserve_in` and
/// `effective = amount_out / (amount_in * (1 - fee))`, all in smallest units.
///
/// Reduces to `|1 - (amount_out * reserve_in) / (amount_in * reserve_out * (1 - fee))|` so the
/// reserves never have to fit a decimal on their own.
fn price_impact(
    reserve_in: TokenAmount,
    reserve_out: TokenAmount,
    amount_in: TokenAmount,
    amount_out: TokenAmount,
    fee: Percentage,
) -> Option<Decimal> {
    let ratio = product_ratio(amount_out, reserve_in, amount_in, reserve_out)?
        .checked_div(fee.complement().0)?;
    Some((Decimal::ONE - ratio).abs())
}
