use crate::entities::coin::Coin;
use crate::entities::pool::Pool;
use crate::token::format_units;
use serde::Serialize;

pub const PERIODIC_CHECK_NOTICE: &str =
    "Pools are periodically checked, and non-compliant pools will be disabled for trading.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceWarning {
    pub message: String,
    pub is_list_item: bool,
}

impl ComplianceWarning {
    fn item(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_list_item: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    pub is_compliant: bool,
    pub warnings: Vec<ComplianceWarning>,
}

impl ComplianceReport {
    fn compliant() -> Self {
        Self {
            is_compliant: true,
            warnings: Vec::new(),
        }
    }
}

/// Checks whether a pool between `ticker_a` and `ticker_b` may be created and traded.
///
/// A pair containing the quote asset always passes. Otherwise each side needs a direct quote
/// pool holding at least the coin's compliance requirement on the quote side.
pub fn check_compliance(
    quote_ticker: &str,
    ticker_a: &str,
    ticker_b: &str,
    pools: &[Pool],
    coins: &[Coin],
) -> ComplianceReport {
    if ticker_a == quote_ticker || ticker_b == quote_ticker {
        return ComplianceReport::compliant();
    }

    let Some(quote_coin) = coins.iter().find(|c| c.ticker == quote_ticker) else {
        return ComplianceReport {
            is_compliant: false,
            warnings: vec![ComplianceWarning::item(format!(
                "{quote_ticker} coin not found"
            ))],
        };
    };

    let mut warnings = Vec::new();
    for ticker in [ticker_a, ticker_b] {
        let Some(coin) = coins.iter().find(|c| c.ticker == ticker) else {
            warnings.push(ComplianceWarning::item(format!("Token {ticker} not found")));
            continue;
        };

        let required = coin.compliance_requirement;
        let quote_reserve = pools
            .iter()
            .find(|p| p.connects(quote_ticker, ticker))
            .and_then(|p| p.side(quote_ticker))
            .map(|(_, reserve)| reserve)
            .filter(|reserve| !reserve.is_zero());

        match quote_reserve {
            Some(reserve) if reserve >= required => {}
            _ => warnings.push(ComplianceWarning::item(format!(
                "A {quote_ticker}/{ticker} pool with at least {} {quote_ticker} liquidity is required",
                format_units(required, quote_coin.dp)
            ))),
        }
    }

    if warnings.is_empty() {
        return ComplianceReport::compliant();
    }

    warnings.push(ComplianceWarning {
        message: PERIODIC_CHECK_NOTICE.to_string(),
        is_list_item: false,
    });
    ComplianceReport {
        is_compliant: false,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::coin::CoinRef;
    use crate::token::TokenAmount;
    use chrono::Utc;

    fn coin(ticker: &str, requirement: u64) -> Coin {
        Coin {
            id: format!("id-{ticker}"),
            ticker: ticker.to_string(),
            dp: 8,
            project_name: ticker.to_string(),
            status: "active".to_string(),
            compliance_requirement: TokenAmount::from(requirement),
            chains: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    fn quote_pool(ticker: &str, quote_reserve: u64) -> Pool {
        Pool {
            id: format!("RUNES-{ticker}"),
            coin_a: CoinRef::new("RUNES", 8),
            coin_b: CoinRef::new(ticker, 8),
            reserve_a: TokenAmount::from(quote_reserve),
            reserve_b: TokenAmount::from(1_000u64),
            total_shares: TokenAmount::from(1u64),
            lp_fee_rate: 30,
            treasury_fee_rate: 5,
            compliant: true,
            active_liquidity_providers: 1,
            liquidity_shares: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    fn coins() -> Vec<Coin> {
        vec![
            coin("RUNES", 0),
            coin("XLM", 100_000_000_000),
            coin("POL", 50_000_000_000),
        ]
    }

    #[test]
    fn test_pair_with_quote_is_compliant() {
        let report = check_compliance("RUNES", "XLM", "RUNES", &[], &[]);
        assert!(report.is_compliant);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_both_sides_meet_requirement() {
        let pools = vec![
            quote_pool("XLM", 100_000_000_000),
            quote_pool("POL", 60_000_000_000),
        ];
        let report = check_compliance("RUNES", "XLM", "POL", &pools, &coins());
        assert!(report.is_compliant);
    }

    #[test]
    fn test_insufficient_liquidity_warns() {
        let pools = vec![quote_pool("XLM", 99_999_999_999)];
        let report = check_compliance("RUNES", "XLM", "POL", &pools, &coins());

        assert!(!report.is_compliant);
        assert_eq!(report.warnings.len(), 3);
        assert_eq!(
            report.warnings[0].message,
            "A RUNES/XLM pool with at least 1000 RUNES liquidity is required"
        );
        assert_eq!(
            report.warnings[1].message,
            "A RUNES/POL pool with at least 500 RUNES liquidity is required"
        );
        assert!(!report.warnings[2].is_list_item);
        assert_eq!(report.warnings[2].message, PERIODIC_CHECK_NOTICE);
    }

    #[test]
    fn test_unknown_coins() {
        let report = check_compliance("RUNES", "XLM", "DOGE", &[], &[]);
        assert_eq!(report.warnings[0].message, "RUNES coin not found");

        let pools = vec![quote_pool("XLM", 100_000_000_000)];
        let report = check_compliance("RUNES", "XLM", "DOGE", &pools, &coins());
        assert_eq!(report.warnings[0].message, "Token DOGE not found");
        assert_eq!(report.warnings.len(), 2);
    }
}
