use crate::entities::coin::{Coin, CoinRef};
use crate::entities::pool::Pool;
use crate::entities::user_share::UserShare;
use crate::token::{TokenAmount, format_units};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiquidityError {
    #[error("{0} amount must be positive")]
    NotPositive(String),
    #[error("invalid pool ratio for {0}")]
    InvalidPoolRatio(String),
    #[error("arithmetic overflow")]
    Overflow,
}

/// Decimal-adjusted `reserveA / reserveB`, `None` when either reserve is zero.
pub fn pool_ratio(pool: &Pool) -> Option<Decimal> {
    if pool.has_empty_reserve() {
        return None;
    }
    let reserve_a = pool.reserve_a.to_decimal(pool.coin_a.dp)?;
    let reserve_b = pool.reserve_b.to_decimal(pool.coin_b.dp)?;
    reserve_a.checked_div(reserve_b)
}

/// A coin pair put into pool orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedPair<'a> {
    pub token_a: &'a Coin,
    pub token_b: &'a Coin,
    /// True when the pair was swapped relative to the caller's order.
    pub flipped: bool,
}

/// Orders a pair the way the server would store it: the quote coin first, otherwise the
/// orientation of an existing pool, otherwise as given.
pub fn normalize_token_pair<'a>(
    quote_ticker: &str,
    coin_a: &'a Coin,
    coin_b: &'a Coin,
    pools: &[Pool],
) -> NormalizedPair<'a> {
    let as_given = NormalizedPair {
        token_a: coin_a,
        token_b: coin_b,
        flipped: false,
    };
    let swapped = NormalizedPair {
        token_a: coin_b,
        token_b: coin_a,
        flipped: true,
    };

    if coin_a.ticker == quote_ticker {
        return as_given;
    }
    if coin_b.ticker == quote_ticker {
        return swapped;
    }

    match pools
        .iter()
        .find(|p| p.connects(&coin_a.ticker, &coin_b.ticker))
    {
        Some(pool) if pool.coin_a.ticker == coin_b.ticker => swapped,
        _ => as_given,
    }
}

/// The side of a deposit the caller fixed; the other side is derived from the pool ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepositAmount {
    A(Decimal),
    B(Decimal),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositEstimate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_a: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_b: Option<Decimal>,
    pub coin_a: CoinRef,
    pub coin_b: CoinRef,
    pub is_pool_empty: bool,
    pub flipped: bool,
}

fn truncate(amount: Decimal, dp: u8) -> Decimal {
    amount.round_dp_with_strategy(u32::from(dp), RoundingStrategy::ToZero)
}

/// Proportional counterpart for a liquidity deposit.
///
/// `amount` refers to the caller's `coin_a`/`coin_b`; the estimate is reported in pool
/// orientation. An empty pool accepts any ratio, so no counterpart is derived for it.
pub fn estimate_liquidity_deposit(
    quote_ticker: &str,
    coin_a: &Coin,
    coin_b: &Coin,
    amount: DepositAmount,
    pools: &[Pool],
) -> Result<DepositEstimate, LiquidityError> {
    match amount {
        DepositAmount::A(v) if v <= Decimal::ZERO => {
            return Err(LiquidityError::NotPositive(coin_a.ticker.clone()));
        }
        DepositAmount::B(v) if v <= Decimal::ZERO => {
            return Err(LiquidityError::NotPositive(coin_b.ticker.clone()));
        }
        _ => {}
    }

    let pair = normalize_token_pair(quote_ticker, coin_a, coin_b, pools);
    let amount = match (pair.flipped, amount) {
        (false, a) => a,
        (true, DepositAmount::A(v)) => DepositAmount::B(v),
        (true, DepositAmount::B(v)) => DepositAmount::A(v),
    };

    let (token_a, token_b) = (pair.token_a, pair.token_b);
    let mut estimate = DepositEstimate {
        amount_a: None,
        amount_b: None,
        coin_a: token_a.to_coin_ref(),
        coin_b: token_b.to_coin_ref(),
        is_pool_empty: true,
        flipped: pair.flipped,
    };

    let pool = pools
        .iter()
        .find(|p| p.connects(&token_a.ticker, &token_b.ticker));
    let pool = match pool {
        Some(p) if !(p.reserve_a.is_zero() && p.reserve_b.is_zero()) => p,
        _ => return Ok(estimate),
    };

    let ratio = oriented_ratio(pool, &token_a.ticker, &token_b.ticker)
        .ok_or_else(|| LiquidityError::InvalidPoolRatio(pool.pair_label()))?;

    let (amount_a, amount_b) = match amount {
        DepositAmount::A(v) => {
            let a = truncate(v, token_a.dp);
            let b = a.checked_div(ratio).ok_or(LiquidityError::Overflow)?;
            (a, truncate(b, token_b.dp))
        }
        DepositAmount::B(v) => {
            let b = truncate(v, token_b.dp);
            let a = b.checked_mul(ratio).ok_or(LiquidityError::Overflow)?;
            (truncate(a, token_a.dp), b)
        }
    };

    estimate.amount_a = Some(amount_a);
    estimate.amount_b = Some(amount_b);
    estimate.is_pool_empty = false;
    Ok(estimate)
}

/// Decimal-adjusted reserve of `x` over reserve of `y`.
fn oriented_ratio(pool: &Pool, x: &str, y: &str) -> Option<Decimal> {
    let (coin_x, reserve_x) = pool.side(x)?;
    let (coin_y, reserve_y) = pool.side(y)?;
    if reserve_x.is_zero() || reserve_y.is_zero() {
        return None;
    }
    let rx = reserve_x.to_decimal(coin_x.dp)?;
    let ry = reserve_y.to_decimal(coin_y.dp)?;
    rx.checked_div(ry).filter(|r| !r.is_zero())
}

/// Underlying assets backing one of the user's pool positions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareAmounts {
    pub pool_id: String,
    pub shares: TokenAmount,
    /// Smallest units of `coin_a`.
    pub amount_a: TokenAmount,
    /// Smallest units of `coin_b`.
    pub amount_b: TokenAmount,
    pub display_amount_a: String,
    pub display_amount_b: String,
    pub total_shares: TokenAmount,
    pub reserve_a: TokenAmount,
    pub reserve_b: TokenAmount,
    pub coin_a: CoinRef,
    pub coin_b: CoinRef,
    pub pair: String,
}

/// Withdrawable amounts for each share record: `floor(shares * reserve / totalShares)`.
pub fn calculate_share_amounts(shares: &[UserShare], pools: &[Pool]) -> Vec<ShareAmounts> {
    shares
        .iter()
        .map(|share| {
            let pool = pools
                .iter()
                .find(|p| p.id == share.pool_id)
                .filter(|p| !p.is_void());

            let Some(pool) = pool else {
                return ShareAmounts {
                    pool_id: share.pool_id.clone(),
                    shares: share.shares,
                    amount_a: TokenAmount::zero(),
                    amount_b: TokenAmount::zero(),
                    display_amount_a: "0".to_string(),
                    display_amount_b: "0".to_string(),
                    total_shares: TokenAmount::zero(),
                    reserve_a: TokenAmount::zero(),
                    reserve_b: TokenAmount::zero(),
                    coin_a: CoinRef::unknown(),
                    coin_b: CoinRef::unknown(),
                    pair: "Unknown/Unknown".to_string(),
                };
            };

            let amount_a = share
                .shares
                .mul_div_floor(pool.reserve_a, pool.total_shares)
                .unwrap_or_default();
            let amount_b = share
                .shares
                .mul_div_floor(pool.reserve_b, pool.total_shares)
                .unwrap_or_default();

            ShareAmounts {
                pool_id: share.pool_id.clone(),
                shares: share.shares,
                amount_a,
                amount_b,
                display_amount_a: format_units(amount_a, pool.coin_a.dp),
                display_amount_b: format_units(amount_b, pool.coin_b.dp),
                total_shares: pool.total_shares,
                reserve_a: pool.reserve_a,
                reserve_b: pool.reserve_b,
                coin_a: pool.coin_a.clone(),
                coin_b: pool.coin_b.clone(),
                pair: pool.pair_label(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
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

    fn pool(id: &str, a: (&str, u8, u64), b: (&str, u8, u64), total_shares: u64) -> Pool {
        Pool {
            id: id.to_string(),
            coin_a: CoinRef::new(a.0, a.1),
            coin_b: CoinRef::new(b.0, b.1),
            reserve_a: TokenAmount::from(a.2),
            reserve_b: TokenAmount::from(b.2),
            total_shares: TokenAmount::from(total_shares),
            lp_fee_rate: 30,
            treasury_fee_rate: 5,
            compliant: true,
            active_liquidity_providers: 1,
            liquidity_shares: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_pool_ratio() {
        // 10 RUNES against 5 XLM
        let p = pool("p", ("RUNES", 8, 1_000_000_000), ("XLM", 7, 50_000_000), 1);
        assert_eq!(pool_ratio(&p), Some(dec!(2)));

        let empty = pool("p", ("RUNES", 8, 0), ("XLM", 7, 50_000_000), 1);
        assert_eq!(pool_ratio(&empty), None);
    }

    #[test]
    fn test_normalize_token_pair() {
        let runes = coin("RUNES", 8);
        let xlm = coin("XLM", 7);
        let pol = coin("POL", 18);

        let pair = normalize_token_pair("RUNES", &xlm, &runes, &[]);
        assert!(pair.flipped);
        assert_eq!(pair.token_a.ticker, "RUNES");

        let pools = vec![pool("p", ("POL", 18, 1), ("XLM", 7, 1), 1)];
        let pair = normalize_token_pair("RUNES", &xlm, &pol, &pools);
        assert!(pair.flipped);
        assert_eq!(pair.token_a.ticker, "POL");

        let pair = normalize_token_pair("RUNES", &xlm, &pol, &[]);
        assert!(!pair.flipped);
    }

    #[test]
    fn test_deposit_from_either_side() {
        let runes = coin("RUNES", 8);
        let xlm = coin("XLM", 7);
        let pools = vec![pool(
            "p",
            ("RUNES", 8, 1_000_000_000),
            ("XLM", 7, 50_000_000),
            1,
        )];

        let est =
            estimate_liquidity_deposit("RUNES", &runes, &xlm, DepositAmount::A(dec!(3)), &pools)
                .unwrap();
        assert_eq!(est.amount_a, Some(dec!(3)));
        assert_eq!(est.amount_b, Some(dec!(1.5)));
        assert!(!est.is_pool_empty);

        // Caller lists XLM first; the estimate comes back in pool orientation.
        let est =
            estimate_liquidity_deposit("RUNES", &xlm, &runes, DepositAmount::A(dec!(1)), &pools)
                .unwrap();
        assert!(est.flipped);
        assert_eq!(est.coin_a.ticker, "RUNES");
        assert_eq!(est.amount_a, Some(dec!(2)));
        assert_eq!(est.amount_b, Some(dec!(1)));
    }

    #[test]
    fn test_deposit_truncates_to_coin_precision() {
        let runes = coin("RUNES", 8);
        let usd = coin("USD", 2);
        // 3 RUNES per USD
        let pools = vec![pool("p", ("RUNES", 8, 300_000_000), ("USD", 2, 100), 1)];

        let est =
            estimate_liquidity_deposit("RUNES", &runes, &usd, DepositAmount::A(dec!(1)), &pools)
                .unwrap();
        assert_eq!(est.amount_b, Some(dec!(0.33)));
    }

    #[test]
    fn test_deposit_into_empty_pool() {
        let runes = coin("RUNES", 8);
        let xlm = coin("XLM", 7);

        let est = estimate_liquidity_deposit("RUNES", &runes, &xlm, DepositAmount::B(dec!(5)), &[])
            .unwrap();
        assert!(est.is_pool_empty);
        assert_eq!(est.amount_a, None);
        assert_eq!(est.amount_b, None);
    }

    #[test]
    fn test_deposit_rejects_non_positive() {
        let runes = coin("RUNES", 8);
        let xlm = coin("XLM", 7);
        let err = estimate_liquidity_deposit("RUNES", &runes, &xlm, DepositAmount::B(dec!(0)), &[])
            .unwrap_err();
        assert_eq!(err, LiquidityError::NotPositive("XLM".to_string()));
    }

    #[test]
    fn test_deposit_one_sided_pool_is_invalid() {
        let runes = coin("RUNES", 8);
        let xlm = coin("XLM", 7);
        let pools = vec![pool("p", ("RUNES", 8, 1_000), ("XLM", 7, 0), 1)];
        let err =
            estimate_liquidity_deposit("RUNES", &runes, &xlm, DepositAmount::A(dec!(1)), &pools)
                .unwrap_err();
        assert_eq!(err, LiquidityError::InvalidPoolRatio("RUNES/XLM".to_string()));
    }

    #[test]
    fn test_calculate_share_amounts() {
        let pools = vec![pool(
            "p1",
            ("RUNES", 8, 1_000_000_000),
            ("XLM", 7, 333_333_333),
            1_000,
        )];
        let shares = vec![
            UserShare {
                pool_id: "p1".to_string(),
                shares: TokenAmount::from(250u64),
                updated_at: Utc::now(),
            },
            UserShare {
                pool_id: "gone".to_string(),
                shares: TokenAmount::from(10u64),
                updated_at: Utc::now(),
            },
        ];

        let amounts = calculate_share_amounts(&shares, &pools);
        assert_eq!(amounts[0].amount_a, TokenAmount::from(250_000_000u64));
        assert_eq!(amounts[0].amount_b, TokenAmount::from(83_333_333u64));
        assert_eq!(amounts[0].display_amount_a, "2.5");
        assert_eq!(amounts[0].display_amount_b, "8.3333333");
        assert_eq!(amounts[0].pair, "RUNES/XLM");

        assert_eq!(amounts[1].pair, "Unknown/Unknown");
        assert_eq!(amounts[1].coin_a.ticker, "Unknown");
        assert!(amounts[1].amount_a.is_zero());
    }
}
