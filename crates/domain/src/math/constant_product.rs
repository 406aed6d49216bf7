use crate::entities::pool::Pool;
use crate::token::TokenAmount;
use primitive_types::U256;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use thiserror::Error;

/// Fee rates are basis points of this denominator.
pub const FEE_DENOMINATOR: u32 = 10_000;

const DECIMAL_MANTISSA_BITS: usize = 96;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SwapError {
    #[error("pool is not compliant")]
    PoolNotCompliant,
    #[error("input amount is below one smallest unit")]
    AmountTooSmall,
    #[error("pool has an empty reserve")]
    EmptyReserve,
    #[error("input amount after fees is below one smallest unit")]
    NetAmountTooSmall,
    #[error("swap yields no output")]
    ZeroOutput,
    #[error("arithmetic overflow")]
    Overflow,
}

/// How a swap's input fee is split between liquidity providers and the treasury.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSplit {
    pub total: TokenAmount,
    pub lp: TokenAmount,
    pub treasury: TokenAmount,
}

/// Result of a single-hop swap, with the pool reserves it leaves behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapOutcome {
    pub amount_out: TokenAmount,
    pub amount_in_net: TokenAmount,
    pub fees: FeeSplit,
    pub reserve_a: TokenAmount,
    pub reserve_b: TokenAmount,
}

impl SwapOutcome {
    /// Writes the post-swap reserves into `pool`.
    pub fn apply(&self, pool: &mut Pool) {
        pool.reserve_a = self.reserve_a;
        pool.reserve_b = self.reserve_b;
    }
}

/// Splits the fee charged on `amount_in`.
///
/// total = floor(amount_in * (lp + treasury) / 10_000)
/// treasury = floor(total * treasury / (lp + treasury)), lp takes the remainder
pub fn split_fee(
    amount_in: TokenAmount,
    lp_fee_bps: u32,
    treasury_fee_bps: u32,
) -> Result<FeeSplit, SwapError> {
    let total_bps = lp_fee_bps
        .checked_add(treasury_fee_bps)
        .ok_or(SwapError::Overflow)?;
    if total_bps == 0 {
        return Ok(FeeSplit {
            total: TokenAmount::zero(),
            lp: TokenAmount::zero(),
            treasury: TokenAmount::zero(),
        });
    }

    let total = amount_in
        .mul_div_floor(
            TokenAmount::from(u64::from(total_bps)),
            TokenAmount::from(u64::from(FEE_DENOMINATOR)),
        )
        .ok_or(SwapError::Overflow)?;
    let treasury = total
        .mul_div_floor(
            TokenAmount::from(u64::from(treasury_fee_bps)),
            TokenAmount::from(u64::from(total_bps)),
        )
        .ok_or(SwapError::Overflow)?;
    let lp = total.checked_sub(treasury).ok_or(SwapError::Overflow)?;

    Ok(FeeSplit { total, lp, treasury })
}

/// Calculates the output amount for a net input in a constant product pool (x * y = k).
///
/// formula: dy = floor(y * dx / (x + dx)), fees already deducted from dx
pub fn calculate_out_amount(
    amount_in_net: TokenAmount,
    reserve_in: TokenAmount,
    reserve_out: TokenAmount,
) -> Result<TokenAmount, SwapError> {
    if reserve_in.is_zero() || reserve_out.is_zero() {
        return Err(SwapError::EmptyReserve);
    }

    let numerator = amount_in_net
        .0
        .checked_mul(reserve_out.0)
        .ok_or(SwapError::Overflow)?;
    let denominator = reserve_in
        .0
        .checked_add(amount_in_net.0)
        .ok_or(SwapError::Overflow)?;

    Ok(TokenAmount(numerator / denominator))
}

/// Simulates one swap through `pool`, reproducing the server's fee split and rounding.
///
/// The input reserve grows by the net input plus the LP fee; the treasury fee leaves the pool.
pub fn simulate_one_hop(
    pool: &Pool,
    amount_in: TokenAmount,
    is_coin_a_input: bool,
) -> Result<SwapOutcome, SwapError> {
    if !pool.compliant {
        return Err(SwapError::PoolNotCompliant);
    }
    if amount_in < TokenAmount::one() {
        return Err(SwapError::AmountTooSmall);
    }
    if pool.has_empty_reserve() {
        return Err(SwapError::EmptyReserve);
    }

    let fees = split_fee(amount_in, pool.lp_fee_rate, pool.treasury_fee_rate)?;
    let amount_in_net = amount_in
        .checked_sub(fees.total)
        .ok_or(SwapError::NetAmountTooSmall)?;
    if amount_in_net < TokenAmount::one() {
        return Err(SwapError::NetAmountTooSmall);
    }

    let (reserve_in, reserve_out) = if is_coin_a_input {
        (pool.reserve_a, pool.reserve_b)
    } else {
        (pool.reserve_b, pool.reserve_a)
    };

    let amount_out = calculate_out_amount(amount_in_net, reserve_in, reserve_out)?;
    if amount_out < TokenAmount::one() {
        return Err(SwapError::ZeroOutput);
    }

    let new_reserve_in = reserve_in
        .checked_add(amount_in_net)
        .and_then(|r| r.checked_add(fees.lp))
        .ok_or(SwapError::Overflow)?;
    let new_reserve_out = reserve_out
        .checked_sub(amount_out)
        .ok_or(SwapError::Overflow)?;

    let (reserve_a, reserve_b) = if is_coin_a_input {
        (new_reserve_in, new_reserve_out)
    } else {
        (new_reserve_out, new_reserve_in)
    };

    Ok(SwapOutcome {
        amount_out,
        amount_in_net,
        fees,
        reserve_a,
        reserve_b,
    })
}

/// Calculates the spot price of token_in in terms of token_out, in raw units.
/// Price = reserve_out / reserve_in
pub fn calculate_spot_price(
    reserve_in: TokenAmount,
    reserve_out: TokenAmount,
) -> Result<Decimal, SwapError> {
    if reserve_in.is_zero() {
        return Err(SwapError::EmptyReserve);
    }
    product_ratio(reserve_out, TokenAmount::one(), reserve_in, TokenAmount::one())
        .ok_or(SwapError::Overflow)
}

/// `(a * b) / (c * d)` as a decimal.
///
/// The products are taken in 512 bits and both scaled down by the same power of two until they
/// fit a decimal mantissa, so the ratio is never lost to overflow whatever the reserve sizes.
/// `None` when `c * d` is zero or the ratio itself exceeds the decimal range.
pub fn product_ratio(
    a: TokenAmount,
    b: TokenAmount,
    c: TokenAmount,
    d: TokenAmount,
) -> Option<Decimal> {
    let numerator = a.0.full_mul(b.0);
    let denominator = c.0.full_mul(d.0);
    if denominator.is_zero() {
        return None;
    }
    let shift = numerator
        .bits()
        .max(denominator.bits())
        .saturating_sub(DECIMAL_MANTISSA_BITS);
    let numerator = Decimal::from_u128((numerator >> shift).low_u128())?;
    let denominator = Decimal::from_u128((denominator >> shift).low_u128())?;
    numerator.checked_div(denominator)
}

/// Calculates the constant product K
pub fn calculate_k(reserve_a: TokenAmount, reserve_b: TokenAmount) -> U256 {
    reserve_a.0.saturating_mul(reserve_b.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::coin::CoinRef;
    use chrono::Utc;
    use std::str::FromStr;

    fn pool(reserve_a: u64, reserve_b: u64, lp: u32, treasury: u32) -> Pool {
        Pool {
            id: "p".to_string(),
            coin_a: CoinRef::new("A", 8),
            coin_b: CoinRef::new("B", 8),
            reserve_a: TokenAmount::from(reserve_a),
            reserve_b: TokenAmount::from(reserve_b),
            total_shares: TokenAmount::from(1u64),
            lp_fee_rate: lp,
            treasury_fee_rate: treasury,
            compliant: true,
            active_liquidity_providers: 1,
            liquidity_shares: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_simulate_one_hop_reference_values() {
        // 10_000_000 in, 0.35% fee:
        // total fee = floor(10_000_000 * 35 / 10_000) = 35_000
        // treasury = floor(35_000 * 5 / 35) = 5_000, lp = 30_000
        // net = 9_965_000
        // out = floor(9_965_000 * 2_000_000_000 / 1_009_965_000) = 19_733_357
        let pool = pool(1_000_000_000, 2_000_000_000, 30, 5);
        let outcome = simulate_one_hop(&pool, TokenAmount::from(10_000_000u64), true).unwrap();

        assert_eq!(outcome.fees.total, TokenAmount::from(35_000u64));
        assert_eq!(outcome.fees.treasury, TokenAmount::from(5_000u64));
        assert_eq!(outcome.fees.lp, TokenAmount::from(30_000u64));
        assert_eq!(outcome.amount_in_net, TokenAmount::from(9_965_000u64));
        assert_eq!(outcome.amount_out, TokenAmount::from(19_733_357u64));
        assert_eq!(outcome.reserve_a, TokenAmount::from(1_009_995_000u64));
        assert_eq!(outcome.reserve_b, TokenAmount::from(1_980_266_643u64));
    }

    #[test]
    fn test_simulate_one_hop_b_side() {
        let pool = pool(1_000_000_000, 2_000_000_000, 30, 5);
        let outcome = simulate_one_hop(&pool, TokenAmount::from(10_000_000u64), false).unwrap();
        // floor(9_965_000 * 1_000_000_000 / 2_009_965_000) = 4_957_797
        assert_eq!(outcome.amount_out, TokenAmount::from(4_957_797u64));
        assert_eq!(outcome.reserve_a, TokenAmount::from(995_042_203u64));
        assert_eq!(outcome.reserve_b, TokenAmount::from(2_009_995_000u64));
    }

    #[test]
    fn test_simulate_one_hop_guards() {
        let mut p = pool(1_000, 1_000, 30, 5);
        assert_eq!(
            simulate_one_hop(&p, TokenAmount::zero(), true),
            Err(SwapError::AmountTooSmall)
        );

        p.compliant = false;
        assert_eq!(
            simulate_one_hop(&p, TokenAmount::from(10u64), true),
            Err(SwapError::PoolNotCompliant)
        );

        let empty = pool(0, 1_000, 30, 5);
        assert_eq!(
            simulate_one_hop(&empty, TokenAmount::from(10u64), true),
            Err(SwapError::EmptyReserve)
        );

        // 1 unit of input into a pool where 1 * 999 / 1_000_001 rounds to zero
        let deep = pool(1_000_000, 999, 0, 0);
        assert_eq!(
            simulate_one_hop(&deep, TokenAmount::from(1u64), true),
            Err(SwapError::ZeroOutput)
        );
    }

    #[test]
    fn test_fee_consumes_whole_input() {
        // 100% fee leaves nothing for the pool
        let p = pool(1_000, 1_000, 9_000, 1_000);
        assert_eq!(
            simulate_one_hop(&p, TokenAmount::from(50u64), true),
            Err(SwapError::NetAmountTooSmall)
        );
    }

    #[test]
    fn test_zero_fee_split() {
        let split = split_fee(TokenAmount::from(1_000u64), 0, 0).unwrap();
        assert!(split.total.is_zero() && split.lp.is_zero() && split.treasury.is_zero());
    }

    #[test]
    fn test_output_decreases_as_fee_increases() {
        let amount = TokenAmount::from(5_000_000u64);
        let mut previous = None;
        for fee in [0u32, 5, 30, 100, 300, 1_000] {
            let p = pool(1_000_000_000, 3_000_000_000, fee, 5);
            let out = simulate_one_hop(&p, amount, true).unwrap().amount_out;
            if let Some(prev) = previous {
                assert!(out < prev, "fee {fee} should lower output");
            }
            previous = Some(out);
        }
    }

    #[test]
    fn test_round_trip_never_profits() {
        let mut p = pool(5_000_000_000, 7_000_000_000, 30, 5);
        let amount_in = TokenAmount::from(123_456_789u64);

        let forward = simulate_one_hop(&p, amount_in, true).unwrap();
        forward.apply(&mut p);
        let back = simulate_one_hop(&p, forward.amount_out, false).unwrap();

        assert!(back.amount_out < amount_in);
    }

    #[test]
    fn test_k_never_decreases() {
        let mut p = pool(1_000_000_000, 2_000_000_000, 30, 5);
        let before = calculate_k(p.reserve_a, p.reserve_b);
        simulate_one_hop(&p, TokenAmount::from(77_777_777u64), false)
            .unwrap()
            .apply(&mut p);
        assert!(calculate_k(p.reserve_a, p.reserve_b) >= before);
    }

    #[test]
    fn test_calculate_spot_price() {
        let r0 = TokenAmount::from(2000u64);
        let r1 = TokenAmount::from(1000u64);

        let price = calculate_spot_price(r0, r1).unwrap();
        // price = 1000 / 2000 = 0.5
        assert_eq!(price, Decimal::from_str("0.5").unwrap());
    }

    #[test]
    fn test_product_ratio_beyond_decimal_range() {
        let big = TokenAmount::from_str("1000000000000000000000000000000").unwrap();
        let half = TokenAmount::from_str("500000000000000000000000000000").unwrap();

        let ratio = product_ratio(half, big, big, big).unwrap();
        assert_eq!(ratio, Decimal::from_str("0.5").unwrap());
        assert!(product_ratio(big, big, TokenAmount::zero(), big).is_none());

        let price = calculate_spot_price(big, half).unwrap();
        assert_eq!(price, Decimal::from_str("0.5").unwrap());
    }
}
