use primitive_types::U256;
use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while converting between display amounts and smallest units.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("invalid amount `{0}`: expected a plain decimal number")]
    InvalidFormat(String),
    #[error("amount `{0}` must be a positive number")]
    NotPositive(String),
    #[error("amount `{amount}` has {found} decimal places, exceeding allowed {allowed}")]
    TooManyDecimals {
        amount: String,
        found: usize,
        allowed: u8,
    },
    #[error("amount `{0}` does not fit in 256 bits")]
    Overflow(String),
}

/// An integer amount expressed in a coin's smallest unit.
///
/// Carried on the wire as a decimal string, so that reserves beyond the
/// range of a JSON number survive the round trip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenAmount(pub U256);

impl TokenAmount {
    pub fn new(amount: impl Into<U256>) -> Self {
        Self(amount.into())
    }

    pub fn zero() -> Self {
        Self(U256::zero())
    }

    pub fn one() -> Self {
        Self(U256::one())
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// `floor(self * numerator / denominator)`, `None` on overflow or a zero denominator.
    pub fn mul_div_floor(self, numerator: Self, denominator: Self) -> Option<Self> {
        if denominator.is_zero() {
            return None;
        }
        self.0
            .checked_mul(numerator.0)
            .map(|product| Self(product / denominator.0))
    }

    /// Exact conversion to a `Decimal` in display units, if it fits.
    pub fn to_decimal(&self, dp: u8) -> Option<Decimal> {
        Decimal::from_str(&format_units(*self, dp)).ok()
    }
}

impl From<u64> for TokenAmount {
    fn from(v: u64) -> Self {
        Self(U256::from(v))
    }
}

impl From<u128> for TokenAmount {
    fn from(v: u128) -> Self {
        Self(U256::from(v))
    }
}

impl FromStr for TokenAmount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountError::InvalidFormat(s.to_string()));
        }
        U256::from_dec_str(trimmed)
            .map(Self)
            .map_err(|_| AmountError::Overflow(s.to_string()))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

struct TokenAmountVisitor;

impl Visitor<'_> for TokenAmountVisitor {
    type Value = TokenAmount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative integer or a decimal string of one")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(TokenAmount::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        u64::try_from(v)
            .map(TokenAmount::from)
            .map_err(|_| E::custom(format!("negative amount {v}")))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Self::Value, E> {
        Ok(TokenAmount::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 {
            Ok(TokenAmount::from(v as u64))
        } else {
            Err(E::custom(format!("amount {v} is not a non-negative integer")))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(TokenAmountVisitor)
    }
}

/// Number of significant decimal places in a plain decimal string, ignoring trailing zeros.
pub fn decimal_places(amount: &str) -> usize {
    match amount.trim().split_once('.') {
        Some((_, frac)) => frac.trim_end_matches('0').len(),
        None => 0,
    }
}

/// Parses a human-readable amount such as `"1.25"` into smallest units.
///
/// Never truncates: more significant decimals than `dp` is an error.
pub fn parse_units(amount: &str, dp: u8) -> Result<TokenAmount, AmountError> {
    let trimmed = amount.trim();
    let (int_part, frac_part) = trimmed.split_once('.').unwrap_or((trimmed, ""));

    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !is_digits(int_part) || !is_digits(frac_part)
    {
        return Err(AmountError::InvalidFormat(amount.to_string()));
    }

    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.len() > dp as usize {
        return Err(AmountError::TooManyDecimals {
            amount: amount.to_string(),
            found: frac_part.len(),
            allowed: dp,
        });
    }

    let mut digits = String::with_capacity(int_part.len() + dp as usize);
    digits.push_str(int_part);
    digits.push_str(frac_part);
    digits.extend(std::iter::repeat_n('0', dp as usize - frac_part.len()));

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(TokenAmount::zero());
    }
    U256::from_dec_str(digits)
        .map(TokenAmount)
        .map_err(|_| AmountError::Overflow(amount.to_string()))
}

/// Formats smallest units as a human-readable amount without trailing zeros.
pub fn format_units(amount: TokenAmount, dp: u8) -> String {
    let raw = amount.0.to_string();
    let dp = dp as usize;
    if dp == 0 {
        return raw;
    }

    let padded = if raw.len() <= dp {
        format!("{}{}", "0".repeat(dp + 1 - raw.len()), raw)
    } else {
        raw
    };
    let (int_part, frac_part) = padded.split_at(padded.len() - dp);
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{int_part}.{frac_part}")
    }
}
