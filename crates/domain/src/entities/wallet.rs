use crate::token::TokenAmount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The local user's balance of one coin, keyed by ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    #[serde(default)]
    pub id: Option<String>,
    pub ticker: String,
    pub available: TokenAmount,
    pub locked: TokenAmount,
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    /// A wallet update always carries both balances; the only completeness rule is a ticker.
    pub fn from_patch(patch: Wallet) -> Option<Self> {
        if patch.ticker.is_empty() {
            return None;
        }
        Some(patch)
    }

    pub fn merge(&mut self, patch: Wallet) {
        if patch.id.is_some() {
            self.id = patch.id;
        }
        self.available = patch.available;
        self.locked = patch.locked;
        self.updated_at = patch.updated_at;
    }

    pub fn total(&self) -> Option<TokenAmount> {
        self.available.checked_add(self.locked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_merge_replaces_balances() {
        let json = r#"{"id":"w1","ticker":"XLM","available":"100","locked":"5","updatedAt":"2024-01-01T00:00:00Z"}"#;
        let mut wallet = Wallet::from_patch(serde_json::from_str(json).unwrap()).unwrap();

        let update: Wallet = serde_json::from_str(
            r#"{"ticker":"XLM","available":"80","locked":"0","updatedAt":"2024-01-01T00:01:00Z"}"#,
        )
        .unwrap();
        wallet.merge(update);

        assert_eq!(wallet.id.as_deref(), Some("w1"));
        assert_eq!(wallet.available, TokenAmount::from(80u64));
        assert_eq!(wallet.total(), Some(TokenAmount::from(80u64)));
    }
}
