//! AMM Property Tests
//!
//! Properties that must hold for any reserves, fee and trade size: the
//! constant product never shrinks, shares always sum to the pool total,
//! liquidity never round-trips at a profit and quotes match executions.

use dex_amm::{math, AccountId, AmmError, AmmPool, AssetId, EngineConfig, PoolKey, PoolRegistry};
use proptest::prelude::*;

const ASSET_X: AssetId = AssetId::from_low_byte(0x11);
const ASSET_Y: AssetId = AssetId::from_low_byte(0x22);
const LP: AccountId = AccountId::from_low_byte(0x01);
const LATE_LP: AccountId = AccountId::from_low_byte(0x02);

/// Reserves from dust up to 10^24 (a million tokens at 18 decimals)
fn reserves() -> impl Strategy<Value = u128> {
    prop_oneof![1u128..1_000, 1_000u128..1_000_000_000, 1_000_000_000u128..1_000_000_000_000_000_000_000_000]
}

fn trade_size() -> impl Strategy<Value = u128> {
    prop_oneof![1u128..1_000, 1_000u128..1_000_000_000_000_000_000_000]
}

fn fee_bps() -> impl Strategy<Value = u32> {
    prop_oneof![Just(0u32), Just(30u32), 1u32..1_000, 9_000u32..10_000]
}

fn seeded(fee: u32, reserve_x: u128, reserve_y: u128) -> (PoolRegistry, PoolKey) {
    let registry = PoolRegistry::new(EngineConfig::default());
    let key = registry.create_pool_with_fee(ASSET_X, ASSET_Y, fee).unwrap();
    registry.add_liquidity(&key, LP, reserve_x, reserve_y).unwrap();
    (registry, key)
}

fn product(a: u128, b: u128) -> ethereum_types::U256 {
    math::wide_mul(a, b)
}

proptest! {
    /// Property: a committed swap never decreases reserve_a * reserve_b
    #[test]
    fn swap_never_decreases_product(
        reserve_x in reserves(),
        reserve_y in reserves(),
        fee in fee_bps(),
        amount_in in trade_size(),
        x_to_y in any::<bool>(),
    ) {
        let (registry, key) = seeded(fee, reserve_x, reserve_y);
        let before = registry.snapshot(&key).unwrap();
        let token_in = if x_to_y { ASSET_X } else { ASSET_Y };

        match registry.execute_swap(&key, token_in, amount_in, 1) {
            Ok(outcome) => {
                let after = registry.snapshot(&key).unwrap();
                prop_assert!(product(after.reserve_a, after.reserve_b) >= product(before.reserve_a, before.reserve_b));
                prop_assert_eq!(after.version, before.version + 1);
                prop_assert!(outcome.amount_out > 0);
            }
            Err(_) => {
                // Rejected swaps leave the pool exactly as it was
                prop_assert_eq!(registry.snapshot(&key).unwrap(), before);
            }
        }
    }

    /// Property: execution with the quote as the minimum always yields the quote
    #[test]
    fn quote_matches_execution(
        reserve_x in reserves(),
        reserve_y in reserves(),
        fee in fee_bps(),
        amount_in in trade_size(),
    ) {
        let (registry, key) = seeded(fee, reserve_x, reserve_y);

        if let Ok(quoted) = registry.quote_swap(&key, ASSET_X, amount_in) {
            let outcome = registry.execute_swap(&key, ASSET_X, amount_in, quoted).unwrap();
            prop_assert_eq!(outcome.amount_out, quoted);
        }
    }

    /// Property: the reverse quote is the smallest input reaching the target output
    #[test]
    fn exact_out_quote_is_minimal(
        reserve_x in 1_000u128..1_000_000_000_000,
        reserve_y in 1_000u128..1_000_000_000_000,
        fee in fee_bps(),
        out_fraction in 1u128..1_000,
    ) {
        let (registry, key) = seeded(fee, reserve_x, reserve_y);
        let pool = registry.snapshot(&key).unwrap();
        let target = (reserve_y * out_fraction / 1_000).max(1);

        match pool.get_amount_in(ASSET_X, target) {
            Ok(amount_in) => {
                prop_assert!(pool.get_amount_out(ASSET_X, amount_in).unwrap() >= target);
                if amount_in > 1 {
                    let short = pool.get_amount_out(ASSET_X, amount_in - 1).unwrap_or(0);
                    prop_assert!(short < target);
                }
            }
            Err(err) => prop_assert!(matches!(err, AmmError::InsufficientLiquidity | AmmError::ArithmeticOverflow)),
        }
    }

    /// Property: provider positions always sum to total_shares
    #[test]
    fn shares_are_conserved(
        reserve_x in 1_000u128..1_000_000_000_000,
        reserve_y in 1_000u128..1_000_000_000_000,
        multiple in 1u128..50,
        swap_in in trade_size(),
        burn_fraction in 1u128..=100,
    ) {
        let (registry, key) = seeded(30, reserve_x, reserve_y);
        let _ = registry.execute_swap(&key, ASSET_Y, swap_in, 1);

        let pool = registry.snapshot(&key).unwrap();
        let _ = registry.add_liquidity(&key, LATE_LP, pool.reserve_a * multiple, pool.reserve_b * multiple);

        let held = registry.position(&key, &LP).unwrap();
        let _ = registry.remove_liquidity(&key, LP, held * burn_fraction / 100);

        let (pool, positions) = registry.positions(&key).unwrap();
        let sum: u128 = positions.iter().map(|(_, shares)| shares).sum();
        prop_assert_eq!(sum, pool.total_shares);
        prop_assert_eq!(pool.total_shares == 0, pool.reserve_a == 0 && pool.reserve_b == 0);
    }

    /// Property: deposit followed by full withdrawal returns at most what was used
    #[test]
    fn liquidity_round_trip_never_profits(
        reserve_x in 1_000u128..1_000_000_000_000,
        reserve_y in 1_000u128..1_000_000_000_000,
        multiple in 1u128..50,
        swap_in in trade_size(),
    ) {
        let (registry, key) = seeded(30, reserve_x, reserve_y);
        let _ = registry.execute_swap(&key, ASSET_X, swap_in, 1);

        let pool = registry.snapshot(&key).unwrap();
        let receipt = registry
            .add_liquidity(&key, LATE_LP, pool.reserve_a * multiple, pool.reserve_b * multiple)
            .unwrap();
        let withdrawal = registry
            .remove_liquidity(&key, LATE_LP, receipt.shares_minted)
            .unwrap();

        prop_assert!(withdrawal.amount_a <= receipt.amount_a_used);
        prop_assert!(withdrawal.amount_b <= receipt.amount_b_used);
    }

    /// Property: argument order never changes which pool a pair resolves to
    #[test]
    fn pair_key_is_order_independent(x in any::<[u8; 20]>(), y in any::<[u8; 20]>()) {
        let (x, y) = (AssetId::new(x), AssetId::new(y));
        match (PoolKey::new(x, y), PoolKey::new(y, x)) {
            (Ok(forward), Ok(reverse)) => {
                prop_assert_eq!(forward, reverse);
                prop_assert!(forward.asset_a() < forward.asset_b());
            }
            (Err(_), Err(_)) => prop_assert_eq!(x, y),
            _ => prop_assert!(false, "canonicalization disagreed for {} / {}", x, y),
        }
    }
}
