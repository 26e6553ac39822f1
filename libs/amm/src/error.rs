//! AMM engine error taxonomy
//!
//! Every variant is recoverable by the caller. A failed operation leaves the
//! pool untouched.

use dex_types::{Amount, AssetId, PoolKey, ValidationError};
use thiserror::Error;

/// Errors returned by the registry, reserve engine and liquidity accounting
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmmError {
    #[error("Pool already exists: {0}")]
    PoolAlreadyExists(PoolKey),

    #[error("Pool not found: {0}")]
    PoolNotFound(PoolKey),

    #[error("Pool requires two distinct assets, got {0} twice")]
    IdenticalAssets(AssetId),

    #[error("Asset {asset} is not part of pool {pool}")]
    InvalidAsset { asset: AssetId, pool: PoolKey },

    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Insufficient liquidity for operation")]
    InsufficientLiquidity,

    #[error("Slippage exceeded: expected minimum {expected}, got {actual}")]
    SlippageExceeded { expected: Amount, actual: Amount },

    #[error("Deposit ratio deviates by {deviation_bps} bps, tolerance is {tolerance_bps} bps")]
    RatioMismatch { deviation_bps: u128, tolerance_bps: u32 },

    #[error("Insufficient shares: requested {requested}, available {available}")]
    InsufficientShares { requested: Amount, available: Amount },

    #[error("Zero liquidity provided")]
    ZeroLiquidity,

    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    #[error("Fee too high: {0} bps, must be below 10000")]
    InvalidFee(u32),

    #[error("Constant-product invariant would decrease")]
    InvariantViolation,

    #[error(transparent)]
    Validation(ValidationError),
}

impl From<ValidationError> for AmmError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::IdenticalAssets(asset) => AmmError::IdenticalAssets(asset),
            other => AmmError::Validation(other),
        }
    }
}

/// Result type for AMM operations
pub type AmmResult<T> = Result<T, AmmError>;
