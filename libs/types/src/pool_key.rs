//! Canonical unordered-pair keys
//!
//! A pool is identified by the pair `(min(x, y), max(x, y))`, so the same two
//! assets always map to one key regardless of argument order.

use crate::errors::ValidationError;
use crate::identifiers::AssetId;
use serde::{Deserialize, Serialize};

/// Which side of a pool an asset sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The smaller asset id
    A,
    /// The larger asset id
    B,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

/// Canonical `(asset_a, asset_b)` pair with `asset_a < asset_b`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PoolKey {
    asset_a: AssetId,
    asset_b: AssetId,
}

impl PoolKey {
    /// Build the canonical key for an unordered pair
    pub fn new(x: AssetId, y: AssetId) -> Result<Self, ValidationError> {
        if x == y {
            return Err(ValidationError::IdenticalAssets(x));
        }
        let (asset_a, asset_b) = if x < y { (x, y) } else { (y, x) };
        Ok(Self { asset_a, asset_b })
    }

    #[inline]
    pub fn asset_a(&self) -> AssetId {
        self.asset_a
    }

    #[inline]
    pub fn asset_b(&self) -> AssetId {
        self.asset_b
    }

    pub fn contains(&self, asset: AssetId) -> bool {
        self.side_of(asset).is_some()
    }

    /// Side of `asset` in this pair, `None` if it is not a member
    pub fn side_of(&self, asset: AssetId) -> Option<Side> {
        if asset == self.asset_a {
            Some(Side::A)
        } else if asset == self.asset_b {
            Some(Side::B)
        } else {
            None
        }
    }

    pub fn asset(&self, side: Side) -> AssetId {
        match side {
            Side::A => self.asset_a,
            Side::B => self.asset_b,
        }
    }
}

impl std::fmt::Display for PoolKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.asset_a.to_hex(), self.asset_b.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_order_independent() {
        let x = AssetId::from_low_byte(9);
        let y = AssetId::from_low_byte(3);

        let forward = PoolKey::new(x, y).unwrap();
        let backward = PoolKey::new(y, x).unwrap();

        assert_eq!(forward, backward);
        assert_eq!(forward.asset_a(), y);
        assert_eq!(forward.asset_b(), x);
    }

    #[test]
    fn test_identical_assets_rejected() {
        let x = AssetId::from_low_byte(1);
        assert_eq!(
            PoolKey::new(x, x),
            Err(ValidationError::IdenticalAssets(x))
        );
    }

    #[test]
    fn test_side_lookup() {
        let x = AssetId::from_low_byte(1);
        let y = AssetId::from_low_byte(2);
        let stranger = AssetId::from_low_byte(3);
        let key = PoolKey::new(x, y).unwrap();

        assert_eq!(key.side_of(x), Some(Side::A));
        assert_eq!(key.side_of(y), Some(Side::B));
        assert_eq!(key.side_of(stranger), None);
        assert_eq!(key.asset(Side::B), y);
        assert!(!key.contains(stranger));
    }
}
