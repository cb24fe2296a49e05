//! Big integer operations for high-precision math
//!
//! Widening helpers between 256 and 512 bits and the `mul_div` family
//! needed for exact fixed-point calculations on token amounts.

use alloy_primitives::{U256, U512};

use crate::errors::{CoreResult, DopplerCoreError};

/// Rounding mode for division operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub enum Rounding {
    /// Round down (towards zero)
    Down,
    /// Round up (away from zero)
    Up,
}

/// Widen a 256-bit value to 512 bits
pub fn widen(value: U256) -> U512 {
    let limbs = value.as_limbs();
    U512::from_limbs([limbs[0], limbs[1], limbs[2], limbs[3], 0, 0, 0, 0])
}

/// Narrow a 512-bit value to 256 bits, returning None if it does not fit
pub fn narrow(value: U512) -> Option<U256> {
    let limbs = value.as_limbs();
    if limbs[4..].iter().any(|&limb| limb != 0) {
        return None;
    }
    Some(U256::from_limbs([limbs[0], limbs[1], limbs[2], limbs[3]]))
}

/// Multiply two 256-bit values into a full 512-bit product
pub fn full_mul(a: U256, b: U256) -> U512 {
    widen(a) * widen(b)
}

/// Divide a 512-bit value and narrow the quotient with the given rounding
pub fn div_wide(numerator: U512, denominator: U512, rounding: Rounding) -> CoreResult<U256> {
    if denominator.is_zero() {
        return Err(DopplerCoreError::DivisionByZero);
    }

    let quotient = numerator / denominator;
    let quotient = if rounding == Rounding::Up && !(numerator % denominator).is_zero() {
        quotient + U512::from(1u8)
    } else {
        quotient
    };

    narrow(quotient).ok_or(DopplerCoreError::MulDivOverflow)
}

/// Multiply two values and divide by a third with specified rounding
/// result = (a * b) / denominator
pub fn mul_div(a: U256, b: U256, denominator: U256, rounding: Rounding) -> CoreResult<U256> {
    if denominator.is_zero() {
        return Err(DopplerCoreError::DivisionByZero);
    }
    div_wide(full_mul(a, b), widen(denominator), rounding)
}

/// `mul_div` rounding down
pub fn mul_div_down(a: U256, b: U256, denominator: U256) -> CoreResult<U256> {
    mul_div(a, b, denominator, Rounding::Down)
}

/// `mul_div` rounding up
pub fn mul_div_up(a: U256, b: U256, denominator: U256) -> CoreResult<U256> {
    mul_div(a, b, denominator, Rounding::Up)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widen_narrow() {
        let value = U256::MAX;
        assert_eq!(narrow(widen(value)), Some(value));

        let too_big = widen(U256::MAX) + U512::from(1u8);
        assert_eq!(narrow(too_big), None);
    }

    #[test]
    fn test_mul_div_rounding() {
        let ten = U256::from(10u8);
        let three = U256::from(3u8);
        let four = U256::from(4u8);

        // 30 / 4 = 7.5
        assert_eq!(mul_div_down(ten, three, four).unwrap(), U256::from(7u8));
        assert_eq!(mul_div_up(ten, three, four).unwrap(), U256::from(8u8));

        // Exact division does not round
        assert_eq!(
            mul_div_up(ten, four, U256::from(5u8)).unwrap(),
            U256::from(8u8)
        );
    }

    #[test]
    fn test_mul_div_large_numbers() {
        // The intermediate product exceeds 256 bits
        let a = U256::MAX;
        let result = mul_div_down(a, U256::from(2u8), U256::from(2u8)).unwrap();
        assert_eq!(result, a);

        let err = mul_div_down(a, U256::from(2u8), U256::from(1u8)).unwrap_err();
        assert_eq!(err, DopplerCoreError::MulDivOverflow);
    }

    #[test]
    fn test_mul_div_zero_denominator() {
        let err = mul_div_down(U256::from(1u8), U256::from(1u8), U256::ZERO).unwrap_err();
        assert_eq!(err, DopplerCoreError::DivisionByZero);
    }
}
