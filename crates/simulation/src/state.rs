//! Simulation state management.
//!
//! A [`PoolSet`] is a private copy of the pool snapshot that a simulation is free to mutate.
//! Every candidate path gets its own set, so one path's reserve changes never leak into
//! another's estimate.

use runesx_domain::entities::pool::Pool;
use std::collections::{BTreeSet, HashMap};

/// Owned, id-indexed pool collection.
#[derive(Debug, Clone, Default)]
pub struct PoolSet {
    pools: Vec<Pool>,
    index: HashMap<String, usize>,
    /// Ids of pools changed since the set was created.
    touched: BTreeSet<String>,
}

impl PoolSet {
    /// Creates a pool set by cloning the given snapshot.
    #[must_use]
    pub fn from_snapshot(pools: &[Pool]) -> Self {
        Self::from_pools(pools.to_vec())
    }

    /// Creates a pool set taking ownership of the pools.
    #[must_use]
    pub fn from_pools(pools: Vec<Pool>) -> Self {
        let index = pools
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.clone(), i))
            .collect();
        Self {
            pools,
            index,
            touched: BTreeSet::new(),
        }
    }

    /// Looks up a pool by id.
    #[must_use]
    pub fn get(&self, pool_id: &str) -> Option<&Pool> {
        self.index.get(pool_id).map(|&i| &self.pools[i])
    }

    /// Looks up a pool for modification and records it as touched.
    pub fn get_mut(&mut self, pool_id: &str) -> Option<&mut Pool> {
        let i = *self.index.get(pool_id)?;
        self.touched.insert(pool_id.to_string());
        Some(&mut self.pools[i])
    }

    /// Pools in snapshot order.
    #[must_use]
    pub fn pools(&self) -> &[Pool] {
        &self.pools
    }

    /// Ids of the pools modified through [`PoolSet::get_mut`].
    #[must_use]
    pub fn touched(&self) -> &BTreeSet<String> {
        &self.touched
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Consumes the set, returning the pools.
    #[must_use]
    pub fn into_pools(self) -> Vec<Pool> {
        self.pools
    }
}
