//! Engine-wide constants
//!
//! Basis-point arithmetic, configuration defaults and the price scale used
//! by price readouts.

/// Denominator for basis-point arithmetic (100% = 10_000 bps)
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Default swap fee in basis points (0.3%)
pub const DEFAULT_FEE_BPS: u32 = 30;

/// Default tolerance for unused excess on liquidity deposits (1%)
pub const DEFAULT_RATIO_TOLERANCE_BPS: u32 = 100;

/// Fixed-point scale for price readouts (18 decimals, matching `getPrice`)
pub const PRICE_SCALE: u128 = 1_000_000_000_000_000_000;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "DEX";

/// Seed values for the bootstrap deployment
pub mod seed {
    /// Initial ETH/USDT and ETH/DAI deposits (ETH side)
    pub const ETH_RESERVE: u128 = 1_000;

    /// Initial stablecoin deposits
    pub const STABLE_RESERVE: u128 = 200_000;

    /// Swap size used by the smoke run
    pub const SMOKE_SWAP_AMOUNT: u128 = 10;

    /// Trader ETH balance minted before the smoke run
    pub const TRADER_FUNDING: u128 = 100;

    /// Trader stablecoin balance minted before the smoke run
    pub const TRADER_STABLE_FUNDING: u128 = 10_000;
}
