//! Entity contract for the replica stores.

use chrono::{DateTime, Utc};
use runesx_domain::entities::coin::{Coin, CoinPatch};
use runesx_domain::entities::pool::{Pool, PoolPatch};
use runesx_domain::entities::user_share::UserShare;
use runesx_domain::entities::wallet::Wallet;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// An entity kept in a replica store.
pub trait Replicated: Clone + Send + Sync + 'static {
    /// Partial update as delivered by the stream.
    type Patch: Clone + Send + Sync + Serialize + DeserializeOwned + 'static;

    /// Entity kind, used in log fields.
    const KIND: &'static str;

    /// Store key of a stored entity.
    fn key(&self) -> &str;

    /// Store key a patch applies to.
    fn patch_key(patch: &Self::Patch) -> &str;

    fn updated_at(&self) -> DateTime<Utc>;

    fn patch_updated_at(patch: &Self::Patch) -> DateTime<Utc>;

    /// Materializes a patch for a key not yet stored. `None` when the patch lacks a required field.
    fn from_patch(patch: Self::Patch) -> Option<Self>;

    /// Applies a newer patch in place.
    fn merge(&mut self, patch: Self::Patch);

    /// Whether the entity must be evicted rather than stored.
    fn is_void(&self) -> bool {
        false
    }
}

impl Replicated for Pool {
    type Patch = PoolPatch;
    const KIND: &'static str = "pool";

    fn key(&self) -> &str {
        &self.id
    }

    fn patch_key(patch: &PoolPatch) -> &str {
        &patch.id
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn patch_updated_at(patch: &PoolPatch) -> DateTime<Utc> {
        patch.updated_at
    }

    fn from_patch(patch: PoolPatch) -> Option<Self> {
        Pool::from_patch(patch)
    }

    fn merge(&mut self, patch: PoolPatch) {
        Pool::merge(self, patch);
    }

    fn is_void(&self) -> bool {
        Pool::is_void(self)
    }
}

impl Replicated for Coin {
    type Patch = CoinPatch;
    const KIND: &'static str = "coin";

    fn key(&self) -> &str {
        &self.id
    }

    fn patch_key(patch: &CoinPatch) -> &str {
        &patch.id
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn patch_updated_at(patch: &CoinPatch) -> DateTime<Utc> {
        patch.updated_at
    }

    fn from_patch(patch: CoinPatch) -> Option<Self> {
        Coin::from_patch(patch)
    }

    fn merge(&mut self, patch: CoinPatch) {
        Coin::merge(self, patch);
    }
}

// Wallets are keyed by ticker: the stream does not always carry a wallet id.
impl Replicated for Wallet {
    type Patch = Wallet;
    const KIND: &'static str = "wallet";

    fn key(&self) -> &str {
        &self.ticker
    }

    fn patch_key(patch: &Wallet) -> &str {
        &patch.ticker
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn patch_updated_at(patch: &Wallet) -> DateTime<Utc> {
        patch.updated_at
    }

    fn from_patch(patch: Wallet) -> Option<Self> {
        Wallet::from_patch(patch)
    }

    fn merge(&mut self, patch: Wallet) {
        Wallet::merge(self, patch);
    }
}

impl Replicated for UserShare {
    type Patch = UserShare;
    const KIND: &'static str = "user_share";

    fn key(&self) -> &str {
        &self.pool_id
    }

    fn patch_key(patch: &UserShare) -> &str {
        &patch.pool_id
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn patch_updated_at(patch: &UserShare) -> DateTime<Utc> {
        patch.updated_at
    }

    fn from_patch(patch: UserShare) -> Option<Self> {
        UserShare::from_patch(patch)
    }

    fn merge(&mut self, patch: UserShare) {
        UserShare::merge(self, patch);
    }

    fn is_void(&self) -> bool {
        UserShare::is_void(self)
    }
}
