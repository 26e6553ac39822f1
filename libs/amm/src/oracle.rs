//! Price oracle view
//!
//! Pure reads over the latest reserves. Prices are exact rationals so that
//! downstream consumers choose their own rounding; nothing is cached.

use crate::error::{AmmError, AmmResult};
use crate::math;
use crate::pool_traits::AmmPool;
use crate::registry::PoolRegistry;
use dex_types::{Amount, AssetId, PoolKey};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Exact price as `numerator / denominator`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRatio {
    pub numerator: Amount,
    pub denominator: Amount,
}

impl PriceRatio {
    pub fn new(numerator: Amount, denominator: Amount) -> AmmResult<Self> {
        if denominator == 0 {
            return Err(AmmError::InsufficientLiquidity);
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// `floor(numerator * scale / denominator)`
    pub fn scaled(&self, scale: Amount) -> AmmResult<Amount> {
        math::mul_div(self.numerator, scale, self.denominator)
    }

    /// Same price, possibly with different terms (cross-multiplied)
    pub fn same_price(&self, other: &PriceRatio) -> bool {
        math::wide_mul(self.numerator, other.denominator)
            == math::wide_mul(other.numerator, self.denominator)
    }

    /// The reciprocal price, `None` for a zero price
    pub fn inverse(&self) -> Option<PriceRatio> {
        PriceRatio::new(self.denominator, self.numerator).ok()
    }

    /// Lossy decimal form for display and logging
    ///
    /// `None` when either term exceeds `Decimal`'s 96-bit mantissa.
    pub fn to_decimal(&self) -> Option<Decimal> {
        let numerator = Decimal::from_u128(self.numerator)?;
        let denominator = Decimal::from_u128(self.denominator)?;
        numerator.checked_div(denominator)
    }
}

impl std::fmt::Display for PriceRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

impl PoolRegistry {
    /// Price of `of` in units of the pool's other asset
    pub fn spot_price(&self, key: &PoolKey, of: AssetId) -> AmmResult<PriceRatio> {
        let pool = self.snapshot(key)?;
        let (reserve_of, reserve_other) = pool.reserves_for(of)?;
        PriceRatio::new(reserve_other, reserve_of)
    }

    /// Quoted execution shortfall against spot for a swap, in basis points
    pub fn price_impact_bps(
        &self,
        key: &PoolKey,
        token_in: AssetId,
        amount_in: Amount,
    ) -> AmmResult<u32> {
        let pool = self.snapshot(key)?;
        let (reserve_in, reserve_out) = pool.reserves_for(token_in)?;
        let amount_out = pool.get_amount_out(token_in, amount_in)?;
        math::price_impact_bps(amount_in, amount_out, reserve_in, reserve_out)
    }
}
