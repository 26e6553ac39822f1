//! Pool Registry
//!
//! Owns one lockable [`PoolState`] per canonical [`PoolKey`]. The map itself is
//! sharded (`DashMap`) and only ever held long enough to clone the pool's
//! `Arc`; all arithmetic happens under the pool's own `RwLock`, so different
//! pools never contend and readers always copy a consistent snapshot.

use crate::error::{AmmError, AmmResult};
use crate::pool::{Pool, PoolState};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use dex_config::{EngineConfig, BPS_DENOMINATOR};
use dex_types::{AccountId, Amount, AssetId, PoolKey};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Shared handle to one pool's lock
pub(crate) type PoolHandle = Arc<RwLock<PoolState>>;

/// Counters for committed and rejected operations
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub total_pools: usize,
    pub initialized_pools: usize,
    pub swaps: u64,
    pub deposits: u64,
    pub withdrawals: u64,
    pub rejected: u64,
}

/// Kind of committed operation, for stats bookkeeping
#[derive(Debug, Clone, Copy)]
pub(crate) enum Operation {
    Swap,
    Deposit,
    Withdrawal,
}

/// Operation counters, bumped without touching any pool lock
#[derive(Debug, Default)]
struct Counters {
    swaps: AtomicU64,
    deposits: AtomicU64,
    withdrawals: AtomicU64,
    rejected: AtomicU64,
}

/// Registry of constant-product pools
pub struct PoolRegistry {
    pools: DashMap<PoolKey, PoolHandle>,
    config: EngineConfig,
    counters: Counters,
}

impl Default for PoolRegistry {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl PoolRegistry {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            pools: DashMap::new(),
            config,
            counters: Counters::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Register a pool for the unordered pair using the configured default fee
    pub fn create_pool(&self, asset_x: AssetId, asset_y: AssetId) -> AmmResult<PoolKey> {
        self.create_pool_with_fee(asset_x, asset_y, self.config.default_fee_bps)
    }

    /// Register a pool for the unordered pair with an explicit fee
    pub fn create_pool_with_fee(
        &self,
        asset_x: AssetId,
        asset_y: AssetId,
        fee_bps: u32,
    ) -> AmmResult<PoolKey> {
        let key = PoolKey::new(asset_x, asset_y)?;
        if fee_bps >= BPS_DENOMINATOR {
            return Err(AmmError::InvalidFee(fee_bps));
        }

        match self.pools.entry(key) {
            Entry::Occupied(_) => {
                debug!(pool = %key, "Rejected duplicate pool creation");
                return Err(AmmError::PoolAlreadyExists(key));
            }
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(RwLock::new(PoolState::new(key, fee_bps))));
            }
        }

        info!(pool = %key, fee_bps, "Created pool");
        Ok(key)
    }

    /// Consistent snapshot of the pool for an unordered pair
    pub fn get_pool(&self, asset_x: AssetId, asset_y: AssetId) -> AmmResult<Pool> {
        let key = PoolKey::new(asset_x, asset_y)?;
        self.snapshot(&key)
    }

    /// Consistent snapshot of the pool for a canonical key
    pub fn snapshot(&self, key: &PoolKey) -> AmmResult<Pool> {
        Ok(self.handle(key)?.read().snapshot())
    }

    pub fn contains(&self, key: &PoolKey) -> bool {
        self.pools.contains_key(key)
    }

    /// Registered keys in canonical order
    pub fn pools(&self) -> Vec<PoolKey> {
        let mut keys: Vec<PoolKey> = self.pools.iter().map(|entry| *entry.key()).collect();
        keys.sort_unstable();
        keys
    }

    /// Shares held by `provider`, zero when it has no position
    pub fn position(&self, key: &PoolKey, provider: &AccountId) -> AmmResult<Amount> {
        Ok(self.handle(key)?.read().position(provider))
    }

    /// All provider positions of a pool, read under the same lock as the reserves
    pub fn positions(&self, key: &PoolKey) -> AmmResult<(Pool, Vec<(AccountId, Amount)>)> {
        let handle = self.handle(key)?;
        let state = handle.read();
        Ok((state.snapshot(), state.positions()))
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            total_pools: self.pools.len(),
            initialized_pools: self
                .pools
                .iter()
                .filter(|entry| entry.value().read().pool().is_initialized())
                .count(),
            swaps: self.counters.swaps.load(Ordering::Relaxed),
            deposits: self.counters.deposits.load(Ordering::Relaxed),
            withdrawals: self.counters.withdrawals.load(Ordering::Relaxed),
            rejected: self.counters.rejected.load(Ordering::Relaxed),
        }
    }

    /// Clone the pool's lock handle; the map shard is released on return
    pub(crate) fn handle(&self, key: &PoolKey) -> AmmResult<PoolHandle> {
        self.pools
            .get(key)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(AmmError::PoolNotFound(*key))
    }

    pub(crate) fn record<T>(&self, operation: Operation, result: &AmmResult<T>) {
        let counter = match (operation, result.is_ok()) {
            (Operation::Swap, true) => &self.counters.swaps,
            (Operation::Deposit, true) => &self.counters.deposits,
            (Operation::Withdrawal, true) => &self.counters.withdrawals,
            (_, false) => &self.counters.rejected,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assets() -> (AssetId, AssetId) {
        (AssetId::from_low_byte(1), AssetId::from_low_byte(2))
    }

    #[test]
    fn test_create_pool_uses_default_fee() {
        let registry = PoolRegistry::new(EngineConfig::default().with_default_fee(25));
        let (x, y) = assets();

        let key = registry.create_pool(x, y).unwrap();
        let pool = registry.get_pool(y, x).unwrap();

        assert_eq!(pool.key, key);
        assert_eq!(pool.fee_bps, 25);
        assert_eq!((pool.reserve_a, pool.reserve_b, pool.total_shares), (0, 0, 0));
    }

    #[test]
    fn test_duplicate_pair_rejected_in_either_order() {
        let registry = PoolRegistry::default();
        let (x, y) = assets();
        let key = registry.create_pool(x, y).unwrap();

        assert_eq!(registry.create_pool(y, x), Err(AmmError::PoolAlreadyExists(key)));
        assert_eq!(registry.create_pool(x, y), Err(AmmError::PoolAlreadyExists(key)));
        assert_eq!(registry.pools(), vec![key]);
    }

    #[test]
    fn test_identical_assets_rejected() {
        let registry = PoolRegistry::default();
        let (x, _) = assets();

        assert_eq!(registry.create_pool(x, x), Err(AmmError::IdenticalAssets(x)));
        assert_eq!(registry.get_pool(x, x), Err(AmmError::IdenticalAssets(x)));
    }

    #[test]
    fn test_invalid_fee_rejected() {
        let registry = PoolRegistry::default();
        let (x, y) = assets();

        assert_eq!(
            registry.create_pool_with_fee(x, y, 10_000),
            Err(AmmError::InvalidFee(10_000))
        );
        assert!(registry.pools().is_empty());
        assert!(registry.create_pool_with_fee(x, y, 0).is_ok());
    }

    #[test]
    fn test_missing_pool() {
        let registry = PoolRegistry::default();
        let (x, y) = assets();
        let key = PoolKey::new(x, y).unwrap();

        assert_eq!(registry.get_pool(x, y), Err(AmmError::PoolNotFound(key)));
        assert!(!registry.contains(&key));
    }

    #[test]
    fn test_stats_count_pools() {
        let registry = PoolRegistry::default();
        let (x, y) = assets();
        registry.create_pool(x, y).unwrap();
        registry
            .create_pool(x, AssetId::from_low_byte(3))
            .unwrap();

        let stats = registry.stats();
        assert_eq!(stats.total_pools, 2);
        assert_eq!(stats.initialized_pools, 0);
    }

    #[test]
    fn test_stats_count_operations_across_pools() {
        let registry = PoolRegistry::default();
        let (x, y) = assets();
        let first = registry.create_pool(x, y).unwrap();
        let second = registry.create_pool(x, AssetId::from_low_byte(3)).unwrap();

        registry.add_liquidity(&first, AccountId::from_low_byte(9), 1_000, 200_000).unwrap();
        registry.execute_swap(&first, x, 10, 1).unwrap();
        registry.remove_liquidity(&first, AccountId::from_low_byte(9), 100).unwrap();
        assert!(registry.execute_swap(&second, x, 10, 1).is_err());
        assert!(registry.execute_swap(&first, x, 10, Amount::MAX).is_err());

        let stats = registry.stats();
        assert_eq!(stats.total_pools, 2);
        assert_eq!(stats.initialized_pools, 1);
        assert_eq!((stats.swaps, stats.deposits, stats.withdrawals), (1, 1, 1));
        assert_eq!(stats.rejected, 2);
    }
}
