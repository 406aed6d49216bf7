use runesx_domain::math::liquidity::LiquidityError;
use std::time::Duration;
use thiserror::Error;

/// Failures of the replicated state or its transport.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("Timed out after {0:?} waiting for initial store data")]
    Timeout(Duration),

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Event stream closed")]
    Closed,

    #[error("Missing environment variable {0}")]
    MissingEnv(&'static str),
}

/// Failures of client queries that resolve coins by ticker.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClientError {
    #[error("Unknown coin {0}")]
    UnknownCoin(String),

    #[error(transparent)]
    Liquidity(#[from] LiquidityError),
}
