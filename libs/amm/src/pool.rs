//! Pool state
//!
//! [`Pool`] is the copyable snapshot handed to readers. [`PoolState`] is the
//! lock-protected record the registry mutates; it also owns the per-provider
//! share positions so that share conservation is maintained under the same
//! lock as the reserves.
//!
//! Every `commit_*` method computes the complete successor state first and
//! assigns it only once all checks pass.

use crate::error::{AmmError, AmmResult};
use crate::math;
use dex_types::{AccountId, Amount, AssetId, PoolKey, Side};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Point-in-time view of a pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub key: PoolKey,
    /// Reserve of `key.asset_a()`
    pub reserve_a: Amount,
    /// Reserve of `key.asset_b()`
    pub reserve_b: Amount,
    /// Outstanding liquidity-provider shares
    pub total_shares: Amount,
    /// Swap fee in basis points, fixed at creation
    pub fee_bps: u32,
    /// Number of committed mutations
    pub version: u64,
}

impl Pool {
    pub fn new(key: PoolKey, fee_bps: u32) -> Self {
        Self {
            key,
            reserve_a: 0,
            reserve_b: 0,
            total_shares: 0,
            fee_bps,
            version: 0,
        }
    }

    /// True once the first deposit has landed and not been fully withdrawn
    pub fn is_initialized(&self) -> bool {
        self.total_shares > 0
    }

    pub fn reserve(&self, side: Side) -> Amount {
        match side {
            Side::A => self.reserve_a,
            Side::B => self.reserve_b,
        }
    }

    /// Side of `asset`, or `InvalidAsset` if the pool does not hold it
    pub fn side_of(&self, asset: AssetId) -> AmmResult<Side> {
        self.key.side_of(asset).ok_or(AmmError::InvalidAsset {
            asset,
            pool: self.key,
        })
    }

    /// `(reserve_in, reserve_out)` for a swap paying in `token_in`
    pub fn reserves_for(&self, token_in: AssetId) -> AmmResult<(Amount, Amount)> {
        let side = self.side_of(token_in)?;
        Ok((self.reserve(side), self.reserve(side.opposite())))
    }
}

/// Mutable pool record guarded by the registry's per-pool lock
#[derive(Debug, Clone)]
pub struct PoolState {
    pool: Pool,
    positions: HashMap<AccountId, Amount>,
}

impl PoolState {
    pub fn new(key: PoolKey, fee_bps: u32) -> Self {
        Self {
            pool: Pool::new(key, fee_bps),
            positions: HashMap::new(),
        }
    }

    #[inline]
    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    pub fn snapshot(&self) -> Pool {
        self.pool.clone()
    }

    pub fn position(&self, provider: &AccountId) -> Amount {
        self.positions.get(provider).copied().unwrap_or(0)
    }

    /// All non-empty positions, sorted by provider
    pub fn positions(&self) -> Vec<(AccountId, Amount)> {
        let mut positions: Vec<_> = self.positions.iter().map(|(k, v)| (*k, *v)).collect();
        positions.sort_unstable();
        positions
    }

    /// Sum of position shares equals `total_shares`
    pub fn shares_conserved(&self) -> bool {
        let sum = self
            .positions
            .values()
            .try_fold(0u128, |acc, shares| acc.checked_add(*shares));
        sum == Some(self.pool.total_shares)
    }

    /// Apply a validated swap: `reserve_in += amount_in`, `reserve_out -= amount_out`
    pub fn commit_swap(
        &mut self,
        side_in: Side,
        amount_in: Amount,
        amount_out: Amount,
    ) -> AmmResult<()> {
        let reserve_in = self.pool.reserve(side_in);
        let reserve_out = self.pool.reserve(side_in.opposite());

        let next_in = reserve_in
            .checked_add(amount_in)
            .ok_or(AmmError::ArithmeticOverflow)?;
        let next_out = reserve_out
            .checked_sub(amount_out)
            .filter(|r| *r > 0)
            .ok_or(AmmError::InsufficientLiquidity)?;

        math::check_invariant(reserve_in, reserve_out, next_in, next_out)?;

        match side_in {
            Side::A => {
                self.pool.reserve_a = next_in;
                self.pool.reserve_b = next_out;
            }
            Side::B => {
                self.pool.reserve_b = next_in;
                self.pool.reserve_a = next_out;
            }
        }
        self.pool.version += 1;
        Ok(())
    }

    /// Credit a deposit and mint shares to `provider`
    pub fn commit_deposit(
        &mut self,
        provider: AccountId,
        amount_a: Amount,
        amount_b: Amount,
        shares: Amount,
    ) -> AmmResult<()> {
        let overflow = || AmmError::ArithmeticOverflow;
        let reserve_a = self.pool.reserve_a.checked_add(amount_a).ok_or_else(overflow)?;
        let reserve_b = self.pool.reserve_b.checked_add(amount_b).ok_or_else(overflow)?;
        let total_shares = self.pool.total_shares.checked_add(shares).ok_or_else(overflow)?;
        let position = self.position(&provider).checked_add(shares).ok_or_else(overflow)?;

        self.pool.reserve_a = reserve_a;
        self.pool.reserve_b = reserve_b;
        self.pool.total_shares = total_shares;
        self.positions.insert(provider, position);
        self.pool.version += 1;
        Ok(())
    }

    /// Burn `shares` from `provider` and release the given reserves
    pub fn commit_withdrawal(
        &mut self,
        provider: AccountId,
        shares: Amount,
        amount_a: Amount,
        amount_b: Amount,
    ) -> AmmResult<()> {
        let available = self.position(&provider);
        let position = available
            .checked_sub(shares)
            .ok_or(AmmError::InsufficientShares {
                requested: shares,
                available,
            })?;
        let total_shares = self
            .pool
            .total_shares
            .checked_sub(shares)
            .ok_or(AmmError::InvariantViolation)?;
        let reserve_a = self
            .pool
            .reserve_a
            .checked_sub(amount_a)
            .ok_or(AmmError::InvariantViolation)?;
        let reserve_b = self
            .pool
            .reserve_b
            .checked_sub(amount_b)
            .ok_or(AmmError::InvariantViolation)?;

        // Reserves and shares reach zero together or not at all
        if (total_shares == 0) != (reserve_a == 0 && reserve_b == 0)
            || (total_shares > 0 && (reserve_a == 0 || reserve_b == 0))
        {
            return Err(AmmError::InvariantViolation);
        }

        self.pool.reserve_a = reserve_a;
        self.pool.reserve_b = reserve_b;
        self.pool.total_shares = total_shares;
        if position == 0 {
            self.positions.remove(&provider);
        } else {
            self.positions.insert(provider, position);
        }
        self.pool.version += 1;
        Ok(())
    }
}
