use crate::token::TokenAmount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pool shares owned by the local user, keyed by pool id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserShare {
    pub pool_id: String,
    pub shares: TokenAmount,
    pub updated_at: DateTime<Utc>,
}

impl UserShare {
    /// Only positive holdings are ever stored.
    pub fn from_patch(patch: UserShare) -> Option<Self> {
        if patch.pool_id.is_empty() || patch.shares.is_zero() {
            return None;
        }
        Some(patch)
    }

    pub fn merge(&mut self, patch: UserShare) {
        self.shares = patch.shares;
        self.updated_at = patch.updated_at;
    }

    pub fn is_void(&self) -> bool {
        self.shares.is_zero()
    }
}
