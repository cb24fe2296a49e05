//! # Liquidity Math
//!
//! Calculations for a concentrated liquidity range in Q64.96: amount0/amount1
//! deltas between two sqrt prices and the sqrt price reached after adding an
//! input amount.

use alloy_primitives::U256;

use crate::constants::{Q96, RESOLUTION_96};
use crate::errors::{CoreResult, DopplerCoreError};
use crate::math::big_int::{mul_div, mul_div_down, mul_div_up, Rounding};

fn rounding(round_up: bool) -> Rounding {
    if round_up {
        Rounding::Up
    } else {
        Rounding::Down
    }
}

/// Calculate amount0 delta between two sqrt prices
/// amount0 = L * 2^96 * (sqrt_b - sqrt_a) / (sqrt_b * sqrt_a)
pub fn get_amount_0_delta(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> CoreResult<U256> {
    let (lower, upper) = if sqrt_ratio_a_x96 > sqrt_ratio_b_x96 {
        (sqrt_ratio_b_x96, sqrt_ratio_a_x96)
    } else {
        (sqrt_ratio_a_x96, sqrt_ratio_b_x96)
    };

    if lower.is_zero() {
        return Err(DopplerCoreError::DivisionByZero);
    }

    let numerator1 = U256::from(liquidity) << RESOLUTION_96;
    let numerator2 = upper - lower;

    let scaled = mul_div(numerator1, numerator2, upper, rounding(round_up))?;
    if round_up {
        let quotient = scaled / lower;
        let remainder = scaled % lower;
        Ok(if remainder.is_zero() {
            quotient
        } else {
            quotient + U256::from(1u8)
        })
    } else {
        Ok(scaled / lower)
    }
}

/// Calculate amount1 delta between two sqrt prices
/// amount1 = L * (sqrt_b - sqrt_a) / 2^96
pub fn get_amount_1_delta(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> CoreResult<U256> {
    let (lower, upper) = if sqrt_ratio_a_x96 > sqrt_ratio_b_x96 {
        (sqrt_ratio_b_x96, sqrt_ratio_a_x96)
    } else {
        (sqrt_ratio_a_x96, sqrt_ratio_b_x96)
    };

    mul_div(U256::from(liquidity), upper - lower, Q96, rounding(round_up))
}

/// Sqrt price after adding `amount` of token0, rounding up
/// sqrt' = L * sqrt * 2^96 / (L * 2^96 + amount * sqrt)
pub fn get_next_sqrt_price_from_amount_0_in(
    sqrt_price_x96: U256,
    liquidity: u128,
    amount: U256,
) -> CoreResult<U256> {
    if amount.is_zero() {
        return Ok(sqrt_price_x96);
    }
    if liquidity == 0 {
        return Err(DopplerCoreError::DivisionByZero);
    }

    let numerator1 = U256::from(liquidity) << RESOLUTION_96;
    let product = amount
        .checked_mul(sqrt_price_x96)
        .ok_or(DopplerCoreError::MathOverflow)?;
    let denominator = numerator1
        .checked_add(product)
        .ok_or(DopplerCoreError::MathOverflow)?;

    mul_div_up(numerator1, sqrt_price_x96, denominator)
}

/// Sqrt price after adding `amount` of token1, rounding down
/// sqrt' = sqrt + amount * 2^96 / L
pub fn get_next_sqrt_price_from_amount_1_in(
    sqrt_price_x96: U256,
    liquidity: u128,
    amount: U256,
) -> CoreResult<U256> {
    if liquidity == 0 {
        return Err(DopplerCoreError::DivisionByZero);
    }

    let quotient = mul_div_down(amount, Q96, U256::from(liquidity))?;
    sqrt_price_x96
        .checked_add(quotient)
        .ok_or(DopplerCoreError::MathOverflow)
}
