//! # SimpleDEX Types
//!
//! Shared value types for the SimpleDEX workspace.
//!
//! - **Identifiers**: [`AssetId`] and [`AccountId`], 20-byte typed wrappers that
//!   cannot be swapped for one another at compile time
//! - **Pair keys**: [`PoolKey`], the canonical `(min, max)` ordering of an
//!   unordered asset pair
//! - **Amounts**: [`Amount`], raw integer token units with no implied decimals
//!
//! Decimal scaling is a caller concern; everything here is integer based.

pub mod errors;
pub mod identifiers;
pub mod pool_key;

pub use errors::ValidationError;
pub use identifiers::{AccountId, AssetId};
pub use pool_key::{PoolKey, Side};

/// Raw token amount in the asset's smallest unit
pub type Amount = u128;
