use crate::token::TokenAmount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default minimum quote-asset reserve a coin's quote pool must hold, in quote smallest units.
pub const DEFAULT_COMPLIANCE_REQUIREMENT: u64 = 100_000_000_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coin {
    pub id: String,
    pub ticker: String,
    pub dp: u8,
    #[serde(default)]
    pub project_name: String,
    pub status: String,
    #[serde(rename = "runesComplianceRequirement", default = "default_requirement")]
    pub compliance_requirement: TokenAmount,
    #[serde(rename = "CoinChains", default)]
    pub chains: Vec<serde_json::Value>,
    pub updated_at: DateTime<Utc>,
}

fn default_requirement() -> TokenAmount {
    TokenAmount::from(DEFAULT_COMPLIANCE_REQUIREMENT)
}

/// Partial coin update as delivered by the stream. Absent fields keep their stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinPatch {
    pub id: String,
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub dp: Option<u8>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "runesComplianceRequirement", default)]
    pub compliance_requirement: Option<TokenAmount>,
    #[serde(rename = "CoinChains", default)]
    pub chains: Option<Vec<serde_json::Value>>,
    pub updated_at: DateTime<Utc>,
}

impl Coin {
    /// Builds a coin from a patch carrying at least a ticker and a status.
    pub fn from_patch(patch: CoinPatch) -> Option<Self> {
        let ticker = patch.ticker.filter(|t| !t.is_empty())?;
        let status = patch.status.filter(|s| !s.is_empty())?;
        Some(Self {
            id: patch.id,
            ticker,
            dp: patch.dp.unwrap_or(0),
            project_name: patch.project_name.unwrap_or_default(),
            status,
            compliance_requirement: patch
                .compliance_requirement
                .unwrap_or_else(default_requirement),
            chains: patch.chains.unwrap_or_default(),
            updated_at: patch.updated_at,
        })
    }

    pub fn merge(&mut self, patch: CoinPatch) {
        if let Some(ticker) = patch.ticker {
            self.ticker = ticker;
        }
        if let Some(dp) = patch.dp {
            self.dp = dp;
        }
        if let Some(name) = patch.project_name {
            self.project_name = name;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(requirement) = patch.compliance_requirement {
            self.compliance_requirement = requirement;
        }
        if let Some(chains) = patch.chains {
            self.chains = chains;
        }
        self.updated_at = patch.updated_at;
    }

    /// Reference embedded in pools and estimates.
    pub fn to_coin_ref(&self) -> CoinRef {
        CoinRef {
            id: Some(self.id.clone()),
            ticker: self.ticker.clone(),
            dp: self.dp,
            project_name: Some(self.project_name.clone()),
        }
    }
}

/// The coin summary a pool carries for each of its sides.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub ticker: String,
    pub dp: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
}

impl CoinRef {
    pub fn new(ticker: impl Into<String>, dp: u8) -> Self {
        Self {
            id: None,
            ticker: ticker.into(),
            dp,
            project_name: None,
        }
    }

    pub(crate) fn unknown() -> Self {
        Self {
            id: None,
            ticker: "Unknown".to_string(),
            dp: 0,
            project_name: Some("Unknown".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn patch(ticker: Option<&str>, status: Option<&str>) -> CoinPatch {
        CoinPatch {
            id: "c1".to_string(),
            ticker: ticker.map(str::to_string),
            dp: Some(8),
            project_name: None,
            status: status.map(str::to_string),
            compliance_requirement: None,
            chains: None,
            updated_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn test_from_patch_requires_ticker_and_status() {
        assert!(Coin::from_patch(patch(None, Some("active"))).is_none());
        assert!(Coin::from_patch(patch(Some("XLM"), None)).is_none());

        let coin = Coin::from_patch(patch(Some("XLM"), Some("active"))).unwrap();
        assert_eq!(coin.ticker, "XLM");
        assert_eq!(
            coin.compliance_requirement,
            TokenAmount::from(DEFAULT_COMPLIANCE_REQUIREMENT)
        );
    }

    #[test]
    fn test_merge_keeps_absent_fields() {
        let mut coin = Coin::from_patch(patch(Some("XLM"), Some("active"))).unwrap();
        coin.chains = vec![serde_json::json!({ "chain": "stellar" })];

        let mut update = patch(None, Some("paused"));
        update.dp = None;
        update.updated_at = Utc.timestamp_opt(1_700_000_100, 0).unwrap();
        coin.merge(update);

        assert_eq!(coin.ticker, "XLM");
        assert_eq!(coin.dp, 8);
        assert_eq!(coin.status, "paused");
        assert_eq!(coin.chains.len(), 1);
    }

    #[test]
    fn test_wire_names() {
        let json = r#"{
            "id": "c9",
            "ticker": "RUNES",
            "dp": 8,
            "projectName": "Runes",
            "status": "active",
            "runesComplianceRequirement": "5000",
            "CoinChains": [],
            "updatedAt": "2024-05-01T00:00:00Z"
        }"#;
        let coin: Coin = serde_json::from_str(json).unwrap();
        assert_eq!(coin.compliance_requirement, TokenAmount::from(5000u64));
        assert_eq!(coin.project_name, "Runes");
    }
}
