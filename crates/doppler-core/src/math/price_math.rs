//! # Price Math
//!
//! Squares a Q64.96 sqrt price into a fixed-point price without losing
//! precision or overflowing 256 bits.
//!
//! Below 2^128 the square fits in 256 bits and is taken directly as a Q192
//! price. Above it the square is divided by 2^64 on the way (512-bit
//! intermediate) and returned as a Q128 price.

use alloy_primitives::U256;

use crate::constants::{PRICE_X128_SHIFT, PRICE_X192_SHIFT, Q128, Q64};
use crate::errors::{CoreResult, DopplerCoreError};
use crate::math::big_int::mul_div_down;
use crate::math::tick_math::validate_sqrt_price;

/// A price of token0 in token1, `value / 2^shift`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRatio {
    /// Fixed-point price numerator
    pub value: U256,
    /// Number of fractional bits in `value`
    pub shift: usize,
}

/// Square a sqrt price below 2^128 into a Q192 price
pub fn price_x192(sqrt_price_x96: U256) -> CoreResult<U256> {
    if sqrt_price_x96 >= Q128 {
        return Err(DopplerCoreError::MathOverflow);
    }
    Ok(sqrt_price_x96 * sqrt_price_x96)
}

/// Square a sqrt price into a Q128 price via a 512-bit intermediate
pub fn price_x128(sqrt_price_x96: U256) -> CoreResult<U256> {
    mul_div_down(sqrt_price_x96, sqrt_price_x96, Q64)
}

/// Pick the precision path for a validated sqrt price
pub fn price_ratio(sqrt_price_x96: U256) -> CoreResult<PriceRatio> {
    let sqrt_price_x96 = validate_sqrt_price(sqrt_price_x96)?;

    if sqrt_price_x96 < Q128 {
        Ok(PriceRatio {
            value: price_x192(sqrt_price_x96)?,
            shift: PRICE_X192_SHIFT,
        })
    } else {
        Ok(PriceRatio {
            value: price_x128(sqrt_price_x96)?,
            shift: PRICE_X128_SHIFT,
        })
    }
}
