use serde::{Deserialize, Serialize};
use std::fmt;

/// One traversal of a pool, from one coin to its counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hop {
    pub from: String,
    pub to: String,
    pub pool_id: String,
}

impl Hop {
    pub fn new(from: impl Into<String>, to: impl Into<String>, pool_id: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            pool_id: pool_id.into(),
        }
    }
}

impl fmt::Display for Hop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}
