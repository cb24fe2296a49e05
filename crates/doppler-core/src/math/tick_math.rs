//! # Tick Math
//!
//! Conversions from ticks to Q64.96 sqrt prices and range checks on sqrt
//! prices. Results match the canonical concentrated liquidity tables bit for bit.

use alloy_primitives::{uint, U256};

use crate::constants::{MAX_SQRT_PRICE, MAX_TICK, MIN_SQRT_PRICE, MIN_TICK};
use crate::errors::{CoreResult, DopplerCoreError};

/// Magic sqrt(1.0001)^-(2^i) multipliers in Q128 format, for i = 1..=19.
/// The i = 0 entry seeds the ratio directly and is handled separately.
const MAGIC_SQRT_1_0001_POW_2: [U256; 19] = [
    uint!(0xfff97272373d413259a46990580e213a_U256), // 2^1
    uint!(0xfff2e50f5f656932ef12357cf3c7fdcc_U256), // 2^2
    uint!(0xffe5caca7e10e4e61c3624eaa0941cd0_U256), // 2^3
    uint!(0xffcb9843d60f6159c9db58835c926644_U256), // 2^4
    uint!(0xff973b41fa98c081472e6896dfb254c0_U256), // 2^5
    uint!(0xff2ea16466c96a3843ec78b326b52861_U256), // 2^6
    uint!(0xfe5dee046a99a2a811c461f1969c3053_U256), // 2^7
    uint!(0xfcbe86c7900a88aedcffc83b479aa3a4_U256), // 2^8
    uint!(0xf987a7253ac413176f2b074cf7815e54_U256), // 2^9
    uint!(0xf3392b0822b70005940c7a398e4b70f3_U256), // 2^10
    uint!(0xe7159475a2c29b7443b29c7fa6e889d9_U256), // 2^11
    uint!(0xd097f3bdfd2022b8845ad8f792aa5825_U256), // 2^12
    uint!(0xa9f746462d870fdf8a65dc1f90e061e5_U256), // 2^13
    uint!(0x70d869a156d2a1b890bb3df62baf32f7_U256), // 2^14
    uint!(0x31be135f97d08fd981231505542fcfa6_U256), // 2^15
    uint!(0x9aa508b5b7a84e1c677de54f3e99bc9_U256),  // 2^16
    uint!(0x5d6af8dedb81196699c329225ee604_U256),   // 2^17
    uint!(0x2216e584f5fa1ea926041bedfe98_U256),     // 2^18
    uint!(0x48a170391f7dc42444e8fa2_U256),          // 2^19
];

const SQRT_1_0001_NEG_POW_1: U256 = uint!(0xfffcb933bd6fad37aa2d162d1a594001_U256);

/// Get the Q64.96 sqrt price at a tick
pub fn get_sqrt_ratio_at_tick(tick: i32) -> CoreResult<U256> {
    if !is_tick_valid(tick) {
        return Err(DopplerCoreError::InvalidTick(tick));
    }

    let abs_tick = tick.unsigned_abs();

    // Q128 ratio for sqrt(1.0001)^-abs_tick
    let mut ratio = if abs_tick & 0x1 != 0 {
        SQRT_1_0001_NEG_POW_1
    } else {
        U256::from(1u8) << 128
    };

    // Binary decomposition of the tick using the magic constants
    for (i, magic) in MAGIC_SQRT_1_0001_POW_2.iter().enumerate() {
        if abs_tick & (1u32 << (i + 1)) != 0 {
            ratio = (ratio * *magic) >> 128;
        }
    }

    // Positive ticks take the reciprocal
    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Q128 -> Q96, rounding up so get_tick(get_sqrt_ratio(tick)) == tick
    let remainder = ratio & U256::from(u32::MAX);
    let sqrt_price = (ratio >> 32) + if remainder.is_zero() { U256::ZERO } else { U256::from(1u8) };

    Ok(sqrt_price)
}

/// Check if a tick is within the supported range
pub fn is_tick_valid(tick: i32) -> bool {
    (MIN_TICK..=MAX_TICK).contains(&tick)
}

/// Check if a Q64.96 sqrt price is within the supported range
pub fn is_sqrt_price_valid(sqrt_price_x96: U256) -> bool {
    sqrt_price_x96 >= MIN_SQRT_PRICE && sqrt_price_x96 < MAX_SQRT_PRICE
}

/// Reject a sqrt price outside `[MIN_SQRT_PRICE, MAX_SQRT_PRICE)`
pub fn validate_sqrt_price(sqrt_price_x96: U256) -> CoreResult<U256> {
    if is_sqrt_price_valid(sqrt_price_x96) {
        Ok(sqrt_price_x96)
    } else {
        Err(DopplerCoreError::InvalidSqrtPrice(sqrt_price_x96))
    }
}

/// Price limit that never binds a swap in the given direction
pub fn extreme_price_limit(zero_for_one: bool) -> U256 {
    if zero_for_one {
        MIN_SQRT_PRICE + U256::from(1u8)
    } else {
        MAX_SQRT_PRICE - U256::from(1u8)
    }
}
