//! # SimpleDEX AMM Engine
//!
//! ## Purpose
//!
//! Constant-product market maker for independent two-asset pools. Holds pool
//! reserves and per-provider share balances, prices swaps with an input-side
//! fee, and mints or burns liquidity shares proportional to contribution.
//!
//! ## Components
//!
//! - **Registry**: [`PoolRegistry`], at most one pool per unordered asset pair
//! - **Swap engine**: quotes and executes `x * y = k` swaps with slippage bounds
//! - **Liquidity**: share minting, ratio tolerance, proportional withdrawal
//! - **Oracle**: spot prices as exact [`PriceRatio`] values
//! - **Settlement**: [`Exchange`] moves funds through an [`AssetLedger`]
//!
//! ## Arithmetic
//!
//! Amounts are `u128`. Every product is formed in 256-bit space and narrowed
//! back with an explicit overflow error. Division floors in the pool's favour
//! except where a reverse quote needs ceiling division.
//!
//! ## Concurrency
//!
//! Each pool sits behind its own lock. Operations on different pools never
//! block each other; operations on one pool are linearizable and a failed
//! operation leaves the pool untouched.

pub mod error;
pub mod ledger;
pub mod liquidity;
pub mod math;
pub mod oracle;
pub mod pool;
pub mod pool_traits;
pub mod registry;
pub mod settlement;
pub mod swap;

pub use error::{AmmError, AmmResult};
pub use ledger::{AssetLedger, InMemoryLedger, LedgerError};
pub use liquidity::{LiquidityReceipt, Withdrawal};
pub use oracle::PriceRatio;
pub use pool::{Pool, PoolState};
pub use pool_traits::AmmPool;
pub use registry::{PoolRegistry, RegistryStats};
pub use settlement::{Exchange, RouteOutcome, SettlementError, SettlementResult};
pub use swap::SwapOutcome;

pub use dex_config::EngineConfig;
pub use dex_types::{AccountId, Amount, AssetId, PoolKey, Side};

/// Decimal type used for display conversions
pub use rust_decimal::Decimal;
