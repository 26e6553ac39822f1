//! Pool trait definitions for a unified quoting interface

use crate::error::AmmResult;
use crate::math;
use crate::pool::Pool;
use dex_types::{Amount, AssetId};

/// Quoting interface over a pool snapshot
pub trait AmmPool {
    /// Calculate output amount for an exact input of `token_in`
    fn get_amount_out(&self, token_in: AssetId, amount_in: Amount) -> AmmResult<Amount>;

    /// Calculate the minimal input of `token_in` for a desired output
    fn get_amount_in(&self, token_in: AssetId, amount_out: Amount) -> AmmResult<Amount>;
}

impl AmmPool for Pool {
    fn get_amount_out(&self, token_in: AssetId, amount_in: Amount) -> AmmResult<Amount> {
        let (reserve_in, reserve_out) = self.reserves_for(token_in)?;
        math::calculate_output_amount(amount_in, reserve_in, reserve_out, self.fee_bps)
    }

    fn get_amount_in(&self, token_in: AssetId, amount_out: Amount) -> AmmResult<Amount> {
        let (reserve_in, reserve_out) = self.reserves_for(token_in)?;
        math::calculate_input_amount(amount_out, reserve_in, reserve_out, self.fee_bps)
    }
}
