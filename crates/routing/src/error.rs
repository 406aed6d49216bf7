use runesx_domain::token::AmountError;
use std::time::Duration;
use thiserror::Error;

/// Rejected estimation input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("coin not found: {0}")]
    UnknownCoin(String),
    #[error("input and output coin are both {0}")]
    IdenticalCoins(String),
    #[error("max hops must be between 1 and {max}, got {got}")]
    InvalidMaxHops { got: u32, max: u32 },
    #[error("invalid algorithm `{0}`: must be \"dfs\" or \"bfs\"")]
    UnknownAlgorithm(String),
    #[error(transparent)]
    Amount(#[from] AmountError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EstimateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("no swap path from {from} to {to} through compliant pools")]
    NoPathFound { from: String, to: String },
    #[error("none of {candidates} paths from {from} to {to} yields a positive output")]
    NoProfitablePath {
        from: String,
        to: String,
        candidates: usize,
    },
    #[error("estimation timed out after {0:?}")]
    Timeout(Duration),
    #[error("estimation worker unavailable")]
    WorkerUnavailable,
}
