//! Push stream vocabulary.

use runesx_domain::entities::coin::CoinPatch;
use runesx_domain::entities::pool::PoolPatch;
use runesx_domain::entities::user_share::UserShare;
use runesx_domain::entities::wallet::Wallet;
use serde::{Deserialize, Serialize};

/// An event received from the exchange stream, in its wire shape
/// (`{"event": "pools_updated", "data": {"pools": [...], "isInitial": true}}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Pool snapshot or deltas.
    #[serde(rename_all = "camelCase")]
    PoolsUpdated {
        pools: Vec<PoolPatch>,
        #[serde(default)]
        is_initial: bool,
    },
    /// Coin snapshot or deltas.
    #[serde(rename_all = "camelCase")]
    CoinsUpdated {
        coins: Vec<CoinPatch>,
        #[serde(default)]
        is_initial: bool,
    },
    /// Wallet snapshot or deltas for the authenticated user.
    #[serde(rename_all = "camelCase")]
    WalletsUpdated {
        wallets: Vec<Wallet>,
        #[serde(default)]
        is_initial: bool,
    },
    /// User share snapshot or deltas for the authenticated user.
    #[serde(rename_all = "camelCase")]
    UserSharesUpdated {
        user_shares: Vec<UserShare>,
        #[serde(default)]
        is_initial: bool,
    },
    /// Transport connected.
    Connect,
    /// Transport lost.
    Disconnect {
        #[serde(default)]
        reason: String,
    },
    /// A connection attempt failed.
    ConnectError {
        #[serde(default)]
        message: String,
    },
    /// The transport is retrying.
    ReconnectAttempt { attempt: u32 },
    /// Connection re-established after a loss.
    Reconnect,
    /// A reconnection attempt failed.
    ReconnectError {
        #[serde(default)]
        message: String,
    },
    /// Non-fatal transport error.
    Error {
        #[serde(default)]
        message: String,
    },
}

impl StreamEvent {
    /// Wire name of the event, for log fields.
    pub fn name(&self) -> &'static str {
        match self {
            Self::PoolsUpdated { .. } => "pools_updated",
            Self::CoinsUpdated { .. } => "coins_updated",
            Self::WalletsUpdated { .. } => "wallets_updated",
            Self::UserSharesUpdated { .. } => "user_shares_updated",
            Self::Connect => "connect",
            Self::Disconnect { .. } => "disconnect",
            Self::ConnectError { .. } => "connect_error",
            Self::ReconnectAttempt { .. } => "reconnect_attempt",
            Self::Reconnect => "reconnect",
            Self::ReconnectError { .. } => "reconnect_error",
            Self::Error { .. } => "error",
        }
    }
}

/// Transport state as last reported by the stream.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LinkState {
    /// No transport event seen yet.
    #[default]
    Idle,
    Connected,
    /// The last transport event was a failure.
    Failed(String),
}
