//! Error types for identifier parsing and pool key construction

use crate::identifiers::AssetId;
use thiserror::Error;

/// Errors raised while validating identifiers and pair keys
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Input is not valid hexadecimal
    #[error("Invalid hex string '{input}': {reason}")]
    InvalidHex { input: String, reason: String },

    /// Decoded byte length does not match the identifier width
    #[error("Invalid identifier length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// A pair was built from the same asset twice
    #[error("Pair requires two distinct assets, got {0} twice")]
    IdenticalAssets(AssetId),
}
