//! Projected endpoint prices once a simulated swap has settled.

use crate::state::PoolSet;
use runesx_domain::pricing::PriceOracle;
use rust_decimal::Decimal;
use serde::Serialize;

/// Price of one coin against the post-swap pool set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AfterSwapPrice {
    pub ticker: String,
    pub price_in_quote: Decimal,
    pub price_usd: Decimal,
    /// True when the swap moved a pool this coin's price is read from.
    pub affected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AfterSwapPrices {
    pub input: AfterSwapPrice,
    pub output: AfterSwapPrice,
}

/// Re-prices `input` and `output` over `after`, the pool set left behind by a simulated swap.
///
/// `oracle` supplies the coins and pricing config; its pools are ignored.
pub fn project_after_swap_prices(
    oracle: &PriceOracle<'_>,
    after: &PoolSet,
    input: &str,
    output: &str,
) -> AfterSwapPrices {
    let projected = oracle.with_pools(after.pools());
    AfterSwapPrices {
        input: price_after(&projected, after, input),
        output: price_after(&projected, after, output),
    }
}

fn price_after(oracle: &PriceOracle<'_>, after: &PoolSet, ticker: &str) -> AfterSwapPrice {
    let config = oracle.config();
    let mut sources = Vec::with_capacity(2);
    if ticker != config.usd_ticker {
        sources.extend(oracle.quote_pool(&config.usd_ticker));
        if ticker != config.quote_ticker {
            sources.extend(oracle.quote_pool(ticker));
        }
    }
    let affected = sources.iter().any(|p| after.touched().contains(&p.id));

    AfterSwapPrice {
        ticker: ticker.to_string(),
        price_in_quote: oracle.price_in_quote(ticker),
        price_usd: oracle.token_price_usd(ticker),
        affected,
    }
}
