//! Constant-product AMM math with exact integer arithmetic
//!
//! All products are formed in 256-bit space so two `u128` operands can never
//! wrap; results are narrowed back to [`Amount`] with an explicit overflow
//! check. Every division floors, which always rounds in the pool's favour.

use crate::error::{AmmError, AmmResult};
use dex_config::BPS_DENOMINATOR;
use dex_types::Amount;
use ethereum_types::U256;

/// Narrow a 256-bit intermediate back to an amount
#[inline]
pub fn narrow(value: U256) -> AmmResult<Amount> {
    if value > U256::from(u128::MAX) {
        return Err(AmmError::ArithmeticOverflow);
    }
    Ok(value.as_u128())
}

/// Full-width product of two amounts
#[inline]
pub fn wide_mul(a: Amount, b: Amount) -> U256 {
    // u128 * u128 < 2^256, cannot overflow
    U256::from(a) * U256::from(b)
}

/// `floor(a * b / denominator)`
pub fn mul_div(a: Amount, b: Amount, denominator: Amount) -> AmmResult<Amount> {
    if denominator == 0 {
        return Err(AmmError::InsufficientLiquidity);
    }
    narrow(wide_mul(a, b) / U256::from(denominator))
}

/// `ceil(a * b / denominator)`
pub fn mul_div_ceil(a: Amount, b: Amount, denominator: Amount) -> AmmResult<Amount> {
    if denominator == 0 {
        return Err(AmmError::InsufficientLiquidity);
    }
    let numerator = wide_mul(a, b);
    let denominator = U256::from(denominator);
    let quotient = numerator / denominator;
    if (numerator % denominator).is_zero() {
        narrow(quotient)
    } else {
        narrow(quotient + U256::one())
    }
}

/// Integer square root of `a * b`, used to size the first deposit
pub fn sqrt_product(a: Amount, b: Amount) -> AmmResult<Amount> {
    narrow(wide_mul(a, b).integer_sqrt())
}

/// Input amount remaining after the swap fee
///
/// `amount_in * (10000 - fee_bps) / 10000`, truncated.
pub fn amount_after_fee(amount_in: Amount, fee_bps: u32) -> AmmResult<Amount> {
    if fee_bps >= BPS_DENOMINATOR {
        return Err(AmmError::InvalidFee(fee_bps));
    }
    mul_div(
        amount_in,
        (BPS_DENOMINATOR - fee_bps) as Amount,
        BPS_DENOMINATOR as Amount,
    )
}

/// Output amount for an exact input using the fee-adjusted x*y=k formula
///
/// `amount_out = reserve_out * after_fee / (reserve_in + after_fee)`. The fee
/// is applied before the division; quoting and execution both go through
/// here so they can never disagree on the same reserves.
pub fn calculate_output_amount(
    amount_in: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
    fee_bps: u32,
) -> AmmResult<Amount> {
    if amount_in == 0 {
        return Err(AmmError::InvalidAmount);
    }
    if reserve_in == 0 || reserve_out == 0 {
        return Err(AmmError::InsufficientLiquidity);
    }

    let after_fee = amount_after_fee(amount_in, fee_bps)?;
    let denominator = reserve_in
        .checked_add(after_fee)
        .ok_or(AmmError::ArithmeticOverflow)?;
    let amount_out = mul_div(reserve_out, after_fee, denominator)?;

    if amount_out == 0 {
        return Err(AmmError::InsufficientLiquidity);
    }
    Ok(amount_out)
}

/// Smallest input whose quoted output is at least `amount_out`
///
/// Inverts both truncations of [`calculate_output_amount`]: the minimal
/// post-fee input is `ceil(out * r_in / (r_out - out))`, and the minimal gross
/// input that survives the fee floor is `ceil(after_fee * 10000 / (10000 - fee))`.
pub fn calculate_input_amount(
    amount_out: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
    fee_bps: u32,
) -> AmmResult<Amount> {
    if amount_out == 0 {
        return Err(AmmError::InvalidAmount);
    }
    if reserve_in == 0 || reserve_out == 0 || amount_out >= reserve_out {
        return Err(AmmError::InsufficientLiquidity);
    }
    if fee_bps >= BPS_DENOMINATOR {
        return Err(AmmError::InvalidFee(fee_bps));
    }

    let after_fee = mul_div_ceil(amount_out, reserve_in, reserve_out - amount_out)?;
    mul_div_ceil(
        after_fee,
        BPS_DENOMINATOR as Amount,
        (BPS_DENOMINATOR - fee_bps) as Amount,
    )
}

/// Verify `after_in * after_out >= before_in * before_out`
pub fn check_invariant(
    before_in: Amount,
    before_out: Amount,
    after_in: Amount,
    after_out: Amount,
) -> AmmResult<()> {
    if wide_mul(after_in, after_out) < wide_mul(before_in, before_out) {
        return Err(AmmError::InvariantViolation);
    }
    Ok(())
}

/// Execution price shortfall against the spot price, in basis points
///
/// `1 - (amount_out / amount_in) / (reserve_out / reserve_in)`, floored.
/// Includes the fee, so even a dust trade reports roughly `fee_bps`.
pub fn price_impact_bps(
    amount_in: Amount,
    amount_out: Amount,
    reserve_in: Amount,
    reserve_out: Amount,
) -> AmmResult<u32> {
    if amount_in == 0 {
        return Err(AmmError::InvalidAmount);
    }
    if reserve_in == 0 || reserve_out == 0 {
        return Err(AmmError::InsufficientLiquidity);
    }

    let ideal = wide_mul(amount_in, reserve_out);
    let actual = wide_mul(amount_out, reserve_in);
    let shortfall = ideal.saturating_sub(actual);
    let bps = shortfall * U256::from(BPS_DENOMINATOR) / ideal;

    // shortfall <= ideal, so bps <= 10000
    Ok(bps.as_u32())
}
