//! Liquidity accounting
//!
//! Shares are minted proportional to contribution. The first deposit mints
//! `isqrt(amount_a * amount_b)` and fixes the starting price; later deposits
//! are trimmed to the current reserve ratio and mint the smaller of the two
//! proportional share counts. Withdrawals floor every payout so rounding never
//! drains the pool below its invariant.

use crate::error::{AmmError, AmmResult};
use crate::math;
use crate::pool::{Pool, PoolState};
use crate::registry::{Operation, PoolRegistry};
use dex_config::BPS_DENOMINATOR;
use dex_types::{AccountId, Amount, AssetId, PoolKey, Side};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Result of a deposit, in canonical A/B order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityReceipt {
    pub key: PoolKey,
    pub shares_minted: Amount,
    pub amount_a_used: Amount,
    pub amount_b_used: Amount,
    /// Supplied but unused excess of asset A
    pub refund_a: Amount,
    /// Supplied but unused excess of asset B
    pub refund_b: Amount,
}

impl LiquidityReceipt {
    /// Amount of `asset` actually credited to the reserves
    pub fn amount_used(&self, asset: AssetId) -> Amount {
        match self.key.side_of(asset) {
            Some(Side::A) => self.amount_a_used,
            Some(Side::B) => self.amount_b_used,
            None => 0,
        }
    }

    /// Amount of `asset` supplied but left unused
    pub fn refund(&self, asset: AssetId) -> Amount {
        match self.key.side_of(asset) {
            Some(Side::A) => self.refund_a,
            Some(Side::B) => self.refund_b,
            None => 0,
        }
    }
}

/// Result of burning shares, in canonical A/B order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub key: PoolKey,
    pub shares_burned: Amount,
    pub amount_a: Amount,
    pub amount_b: Amount,
}

impl Withdrawal {
    pub fn amount(&self, asset: AssetId) -> Amount {
        match self.key.side_of(asset) {
            Some(Side::A) => self.amount_a,
            Some(Side::B) => self.amount_b,
            None => 0,
        }
    }
}

/// Work out shares and used amounts for a deposit against `pool`
pub fn plan_deposit(
    pool: &Pool,
    amount_a: Amount,
    amount_b: Amount,
    tolerance_bps: u32,
) -> AmmResult<LiquidityReceipt> {
    if amount_a == 0 || amount_b == 0 {
        return Err(AmmError::ZeroLiquidity);
    }

    if pool.total_shares == 0 {
        let shares = math::sqrt_product(amount_a, amount_b)?;
        if shares == 0 {
            return Err(AmmError::ZeroLiquidity);
        }
        return Ok(LiquidityReceipt {
            key: pool.key,
            shares_minted: shares,
            amount_a_used: amount_a,
            amount_b_used: amount_b,
            refund_a: 0,
            refund_b: 0,
        });
    }

    let (reserve_a, reserve_b) = (pool.reserve_a, pool.reserve_b);
    let b_optimal = math::mul_div(amount_a, reserve_b, reserve_a)?;

    let (a_used, b_used) = if b_optimal <= amount_b {
        (amount_a, b_optimal)
    } else {
        (math::mul_div(amount_b, reserve_a, reserve_b)?, amount_b)
    };

    let refund_a = amount_a - a_used;
    let refund_b = amount_b - b_used;

    let deviation_bps = if refund_b > 0 {
        math::mul_div_ceil(refund_b, BPS_DENOMINATOR as Amount, amount_b)?
    } else {
        math::mul_div_ceil(refund_a, BPS_DENOMINATOR as Amount, amount_a)?
    };
    if deviation_bps > tolerance_bps as Amount {
        return Err(AmmError::RatioMismatch {
            deviation_bps,
            tolerance_bps,
        });
    }

    let shares = math::mul_div(pool.total_shares, a_used, reserve_a)?
        .min(math::mul_div(pool.total_shares, b_used, reserve_b)?);
    if shares == 0 {
        return Err(AmmError::ZeroLiquidity);
    }

    Ok(LiquidityReceipt {
        key: pool.key,
        shares_minted: shares,
        amount_a_used: a_used,
        amount_b_used: b_used,
        refund_a,
        refund_b,
    })
}

/// Work out payouts for burning `shares` out of a position holding `available`
pub fn plan_withdrawal(pool: &Pool, available: Amount, shares: Amount) -> AmmResult<Withdrawal> {
    if shares == 0 {
        return Err(AmmError::InvalidAmount);
    }
    if shares > available {
        return Err(AmmError::InsufficientShares {
            requested: shares,
            available,
        });
    }

    let amount_a = math::mul_div(pool.reserve_a, shares, pool.total_shares)?;
    let amount_b = math::mul_div(pool.reserve_b, shares, pool.total_shares)?;

    Ok(Withdrawal {
        key: pool.key,
        shares_burned: shares,
        amount_a,
        amount_b,
    })
}

impl PoolRegistry {
    /// Deposit `amount_a` / `amount_b` (canonical order) and mint shares to `provider`
    pub fn add_liquidity(
        &self,
        key: &PoolKey,
        provider: AccountId,
        amount_a: Amount,
        amount_b: Amount,
    ) -> AmmResult<LiquidityReceipt> {
        let handle = self.handle(key)?;
        let tolerance_bps = self.config().ratio_tolerance_bps;

        let result = {
            let mut state = handle.write();
            Self::deposit_locked(&mut state, provider, amount_a, amount_b, tolerance_bps)
        };
        self.record(Operation::Deposit, &result);

        match &result {
            Ok(receipt) => info!(
                pool = %key,
                provider = %provider,
                shares = receipt.shares_minted,
                amount_a = receipt.amount_a_used,
                amount_b = receipt.amount_b_used,
                refund_a = receipt.refund_a,
                refund_b = receipt.refund_b,
                "Added liquidity"
            ),
            Err(AmmError::RatioMismatch { deviation_bps, tolerance_bps }) => warn!(
                pool = %key,
                provider = %provider,
                deviation_bps,
                tolerance_bps,
                "Deposit rejected: ratio mismatch"
            ),
            Err(err) => warn!(pool = %key, provider = %provider, error = %err, "Deposit rejected"),
        }
        result
    }

    /// Burn `shares` from `provider` and release its pro-rata reserves
    pub fn remove_liquidity(
        &self,
        key: &PoolKey,
        provider: AccountId,
        shares: Amount,
    ) -> AmmResult<Withdrawal> {
        let handle = self.handle(key)?;

        let result = {
            let mut state = handle.write();
            Self::withdraw_locked(&mut state, provider, shares)
        };
        self.record(Operation::Withdrawal, &result);

        match &result {
            Ok(withdrawal) => info!(
                pool = %key,
                provider = %provider,
                shares,
                amount_a = withdrawal.amount_a,
                amount_b = withdrawal.amount_b,
                "Removed liquidity"
            ),
            Err(err) => warn!(pool = %key, provider = %provider, error = %err, "Withdrawal rejected"),
        }
        result
    }

    fn deposit_locked(
        state: &mut PoolState,
        provider: AccountId,
        amount_a: Amount,
        amount_b: Amount,
        tolerance_bps: u32,
    ) -> AmmResult<LiquidityReceipt> {
        let receipt = plan_deposit(state.pool(), amount_a, amount_b, tolerance_bps)?;
        state.commit_deposit(
            provider,
            receipt.amount_a_used,
            receipt.amount_b_used,
            receipt.shares_minted,
        )?;
        Ok(receipt)
    }

    fn withdraw_locked(
        state: &mut PoolState,
        provider: AccountId,
        shares: Amount,
    ) -> AmmResult<Withdrawal> {
        let available = state.position(&provider);
        let withdrawal = plan_withdrawal(state.pool(), available, shares)?;
        state.commit_withdrawal(provider, shares, withdrawal.amount_a, withdrawal.amount_b)?;
        Ok(withdrawal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dex_config::EngineConfig;

    fn lp(tag: u8) -> AccountId {
        AccountId::from_low_byte(tag)
    }

    fn registry_with_pool(tolerance_bps: u32) -> (PoolRegistry, PoolKey) {
        let registry = PoolRegistry::new(EngineConfig::default().with_ratio_tolerance(tolerance_bps));
        let key = registry
            .create_pool(AssetId::from_low_byte(1), AssetId::from_low_byte(2))
            .unwrap();
        (registry, key)
    }

    #[test]
    fn test_first_deposit_mints_sqrt() {
        let (registry, key) = registry_with_pool(100);

        let receipt = registry.add_liquidity(&key, lp(1), 1_000, 200_000).unwrap();

        assert_eq!(receipt.shares_minted, 14_142);
        assert_eq!((receipt.refund_a, receipt.refund_b), (0, 0));
        let pool = registry.snapshot(&key).unwrap();
        assert_eq!((pool.reserve_a, pool.reserve_b, pool.total_shares), (1_000, 200_000, 14_142));
        assert_eq!(registry.position(&key, &lp(1)).unwrap(), 14_142);
    }

    #[test]
    fn test_first_deposit_requires_both_sides() {
        let (registry, key) = registry_with_pool(100);

        assert_eq!(registry.add_liquidity(&key, lp(1), 0, 5), Err(AmmError::ZeroLiquidity));
        assert_eq!(registry.add_liquidity(&key, lp(1), 5, 0), Err(AmmError::ZeroLiquidity));
        assert!(!registry.snapshot(&key).unwrap().is_initialized());
    }

    #[test]
    fn test_proportional_deposit() {
        let (registry, key) = registry_with_pool(0);
        registry.add_liquidity(&key, lp(1), 1_000, 200_000).unwrap();

        let receipt = registry.add_liquidity(&key, lp(2), 100, 20_000).unwrap();

        // 14142 * 100 / 1000 = 1414, 14142 * 20000 / 200000 = 1414
        assert_eq!(receipt.shares_minted, 1_414);
        assert_eq!((receipt.amount_a_used, receipt.amount_b_used), (100, 20_000));
        let (pool, positions) = registry.positions(&key).unwrap();
        assert_eq!(pool.total_shares, 15_556);
        assert_eq!(positions.iter().map(|(_, s)| s).sum::<u128>(), pool.total_shares);
    }

    #[test]
    fn test_excess_within_tolerance_is_refunded() {
        let (registry, key) = registry_with_pool(100);
        registry.add_liquidity(&key, lp(1), 1_000, 200_000).unwrap();

        // 0.5% too much B
        let receipt = registry.add_liquidity(&key, lp(2), 100, 20_100).unwrap();

        assert_eq!(receipt.amount_b_used, 20_000);
        assert_eq!(receipt.refund_b, 100);
        assert_eq!(receipt.refund(key.asset_b()), 100);
        assert_eq!(receipt.amount_used(key.asset_a()), 100);

        // 0.5% too much A
        let receipt = registry.add_liquidity(&key, lp(3), 101, 20_000).unwrap();
        assert_eq!(receipt.amount_a_used, 100);
        assert_eq!(receipt.refund_a, 1);
    }

    #[test]
    fn test_excess_beyond_tolerance_rejected() {
        let (registry, key) = registry_with_pool(100);
        registry.add_liquidity(&key, lp(1), 1_000, 200_000).unwrap();
        let before = registry.snapshot(&key).unwrap();

        let err = registry.add_liquidity(&key, lp(2), 100, 30_000).unwrap_err();

        // 10000 unused of 30000 supplied
        assert_eq!(
            err,
            AmmError::RatioMismatch {
                deviation_bps: 3_334,
                tolerance_bps: 100
            }
        );
        assert_eq!(registry.snapshot(&key).unwrap(), before);
        assert_eq!(registry.position(&key, &lp(2)).unwrap(), 0);
    }

    #[test]
    fn test_dust_deposit_mints_nothing() {
        let (registry, key) = registry_with_pool(10_000);
        registry.add_liquidity(&key, lp(1), 1_000, 1).unwrap();

        // 1 A pairs with 0 B at a 1000:1 ratio
        assert_eq!(
            registry.add_liquidity(&key, lp(2), 1, 1),
            Err(AmmError::ZeroLiquidity)
        );

        let (balanced, balanced_key) = registry_with_pool(10_000);
        balanced.add_liquidity(&balanced_key, lp(1), 1_000_000, 1_000_000).unwrap();
        let receipt = balanced.add_liquidity(&balanced_key, lp(2), 1, 1).unwrap();
        assert_eq!(receipt.shares_minted, 1);
    }

    #[test]
    fn test_remove_all_liquidity_empties_pool() {
        let (registry, key) = registry_with_pool(100);
        let minted = registry.add_liquidity(&key, lp(1), 1_000, 200_000).unwrap();

        let withdrawal = registry
            .remove_liquidity(&key, lp(1), minted.shares_minted)
            .unwrap();

        assert_eq!((withdrawal.amount_a, withdrawal.amount_b), (1_000, 200_000));
        let pool = registry.snapshot(&key).unwrap();
        assert_eq!((pool.reserve_a, pool.reserve_b, pool.total_shares), (0, 0, 0));

        // Behaves as freshly created, but cannot be re-created
        assert_eq!(registry.add_liquidity(&key, lp(2), 4, 9).unwrap().shares_minted, 6);
        assert!(matches!(
            registry.create_pool(key.asset_a(), key.asset_b()),
            Err(AmmError::PoolAlreadyExists(_))
        ));
    }

    #[test]
    fn test_partial_removal_floors() {
        let (registry, key) = registry_with_pool(100);
        registry.add_liquidity(&key, lp(1), 1_000, 200_000).unwrap();

        let withdrawal = registry.remove_liquidity(&key, lp(1), 1_000).unwrap();

        // 1000 * 1000 / 14142 = 70.7, 200000 * 1000 / 14142 = 14142.3
        assert_eq!((withdrawal.amount_a, withdrawal.amount_b), (70, 14_142));
        let pool = registry.snapshot(&key).unwrap();
        assert_eq!((pool.reserve_a, pool.reserve_b, pool.total_shares), (930, 185_858, 13_142));
        assert_eq!(registry.position(&key, &lp(1)).unwrap(), 13_142);
    }

    #[test]
    fn test_remove_rejections() {
        let (registry, key) = registry_with_pool(100);
        registry.add_liquidity(&key, lp(1), 1_000, 200_000).unwrap();
        let before = registry.snapshot(&key).unwrap();

        assert_eq!(registry.remove_liquidity(&key, lp(1), 0), Err(AmmError::InvalidAmount));
        assert_eq!(
            registry.remove_liquidity(&key, lp(2), 1),
            Err(AmmError::InsufficientShares {
                requested: 1,
                available: 0
            })
        );
        assert_eq!(
            registry.remove_liquidity(&key, lp(1), 14_143),
            Err(AmmError::InsufficientShares {
                requested: 14_143,
                available: 14_142
            })
        );
        assert_eq!(registry.snapshot(&key).unwrap(), before);
    }

    #[test]
    fn test_small_position_can_exit() {
        let (registry, key) = registry_with_pool(100);
        registry.add_liquidity(&key, lp(1), 1_000, 200_000).unwrap();
        let minted = registry.add_liquidity(&key, lp(2), 1, 200).unwrap();
        assert_eq!(minted.shares_minted, 14);

        let withdrawal = registry.remove_liquidity(&key, lp(2), 14).unwrap();

        // 1001 * 14 / 14156 floors to zero, 200200 * 14 / 14156 = 197.99
        assert_eq!((withdrawal.amount_a, withdrawal.amount_b), (0, 197));
        let (pool, positions) = registry.positions(&key).unwrap();
        assert_eq!((pool.reserve_a, pool.reserve_b, pool.total_shares), (1_001, 200_003, 14_142));
        assert_eq!(positions, vec![(lp(1), 14_142)]);
    }
}
