pub mod coin;
pub mod pool;
pub mod user_share;
pub mod wallet;

// Re-export for easier access
pub use coin::{Coin, CoinPatch, CoinRef};
pub use pool::{LiquidityShare, Pool, PoolPatch};
pub use user_share::UserShare;
pub use wallet::Wallet;
