use crate::entities::coin::CoinRef;
use crate::token::TokenAmount;
use crate::value_objects::Percentage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_LP_FEE_RATE: u32 = 30;
pub const DEFAULT_TREASURY_FEE_RATE: u32 = 5;

/// One liquidity provider's stake in a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityShare {
    pub id: String,
    pub shares: TokenAmount,
}

/// A two-asset constant-product pool. `coin_a`/`coin_b` orientation is assigned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    pub id: String,
    pub coin_a: CoinRef,
    pub coin_b: CoinRef,
    pub reserve_a: TokenAmount,
    pub reserve_b: TokenAmount,
    pub total_shares: TokenAmount,
    /// Basis points.
    pub lp_fee_rate: u32,
    /// Basis points.
    pub treasury_fee_rate: u32,
    #[serde(rename = "runesCompliant")]
    pub compliant: bool,
    pub active_liquidity_providers: u32,
    pub liquidity_shares: Vec<LiquidityShare>,
    pub updated_at: DateTime<Utc>,
}

/// Partial pool update. Reserves, when present, replace the stored ones wholesale;
/// `liquidity_shares` entries are upserted by id and removed when their shares are zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolPatch {
    pub id: String,
    #[serde(default)]
    pub coin_a: Option<CoinRef>,
    #[serde(default)]
    pub coin_b: Option<CoinRef>,
    #[serde(default)]
    pub reserve_a: Option<TokenAmount>,
    #[serde(default)]
    pub reserve_b: Option<TokenAmount>,
    #[serde(default)]
    pub total_shares: Option<TokenAmount>,
    #[serde(default)]
    pub lp_fee_rate: Option<u32>,
    #[serde(default)]
    pub treasury_fee_rate: Option<u32>,
    #[serde(rename = "runesCompliant", default)]
    pub compliant: Option<bool>,
    #[serde(default)]
    pub active_liquidity_providers: Option<u32>,
    #[serde(default)]
    pub liquidity_shares: Option<Vec<LiquidityShare>>,
    pub updated_at: DateTime<Utc>,
}

impl Pool {
    /// Builds a pool from a patch. Requires both coins and strictly positive total shares.
    pub fn from_patch(patch: PoolPatch) -> Option<Self> {
        let coin_a = patch.coin_a?;
        let coin_b = patch.coin_b?;
        let total_shares = patch.total_shares.filter(|s| !s.is_zero())?;

        Some(Self {
            id: patch.id,
            coin_a,
            coin_b,
            reserve_a: patch.reserve_a.unwrap_or_default(),
            reserve_b: patch.reserve_b.unwrap_or_default(),
            total_shares,
            lp_fee_rate: patch.lp_fee_rate.unwrap_or(DEFAULT_LP_FEE_RATE),
            treasury_fee_rate: patch.treasury_fee_rate.unwrap_or(DEFAULT_TREASURY_FEE_RATE),
            compliant: patch.compliant.unwrap_or(false),
            active_liquidity_providers: patch.active_liquidity_providers.unwrap_or(0),
            liquidity_shares: patch
                .liquidity_shares
                .unwrap_or_default()
                .into_iter()
                .filter(|s| !s.shares.is_zero())
                .collect(),
            updated_at: patch.updated_at,
        })
    }

    pub fn merge(&mut self, patch: PoolPatch) {
        if let Some(reserve_a) = patch.reserve_a {
            self.reserve_a = reserve_a;
        }
        if let Some(reserve_b) = patch.reserve_b {
            self.reserve_b = reserve_b;
        }
        if let Some(total_shares) = patch.total_shares {
            self.total_shares = total_shares;
        }
        if let Some(providers) = patch.active_liquidity_providers {
            self.active_liquidity_providers = providers;
        }
        if let Some(compliant) = patch.compliant {
            self.compliant = compliant;
        }
        if let Some(rate) = patch.lp_fee_rate {
            self.lp_fee_rate = rate;
        }
        if let Some(rate) = patch.treasury_fee_rate {
            self.treasury_fee_rate = rate;
        }
        if let Some(coin_a) = patch.coin_a {
            self.coin_a = coin_a;
        }
        if let Some(coin_b) = patch.coin_b {
            self.coin_b = coin_b;
        }
        if let Some(shares) = patch.liquidity_shares {
            for share in shares {
                let existing = self.liquidity_shares.iter().position(|s| s.id == share.id);
                match (existing, share.shares.is_zero()) {
                    (Some(idx), true) => {
                        self.liquidity_shares.remove(idx);
                    }
                    (Some(idx), false) => self.liquidity_shares[idx] = share,
                    (None, false) => self.liquidity_shares.push(share),
                    (None, true) => {}
                }
            }
        }
        self.updated_at = patch.updated_at;
    }

    /// A pool without shares no longer exists on the server.
    pub fn is_void(&self) -> bool {
        self.total_shares.is_zero()
    }

    pub fn has_empty_reserve(&self) -> bool {
        self.reserve_a.is_zero() || self.reserve_b.is_zero()
    }

    pub fn total_fee_rate_bps(&self) -> u32 {
        self.lp_fee_rate + self.treasury_fee_rate
    }

    pub fn total_fee_rate(&self) -> Percentage {
        Percentage::from_bps(self.total_fee_rate_bps())
    }

    pub fn involves(&self, ticker: &str) -> bool {
        self.coin_a.ticker == ticker || self.coin_b.ticker == ticker
    }

    /// True when the pool pairs `x` with `y`, in either orientation.
    pub fn connects(&self, x: &str, y: &str) -> bool {
        (self.coin_a.ticker == x && self.coin_b.ticker == y)
            || (self.coin_a.ticker == y && self.coin_b.ticker == x)
    }

    /// The coin on the other side from `ticker`.
    pub fn counterpart(&self, ticker: &str) -> Option<&CoinRef> {
        if self.coin_a.ticker == ticker {
            Some(&self.coin_b)
        } else if self.coin_b.ticker == ticker {
            Some(&self.coin_a)
        } else {
            None
        }
    }

    /// Reserve and coin held on `ticker`'s side.
    pub fn side(&self, ticker: &str) -> Option<(&CoinRef, TokenAmount)> {
        if self.coin_a.ticker == ticker {
            Some((&self.coin_a, self.reserve_a))
        } else if self.coin_b.ticker == ticker {
            Some((&self.coin_b, self.reserve_b))
        } else {
            None
        }
    }

    pub fn pair_label(&self) -> String {
        format!("{}/{}", self.coin_a.ticker, self.coin_b.ticker)
    }
}
