//! # Safe Math Operations
//!
//! Overflow-checked arithmetic on token amounts and timestamps.

use alloy_primitives::U256;

use crate::errors::{CoreResult, DopplerCoreError};

/// Macro to generate safe arithmetic functions
macro_rules! safe_arith {
    // Binary operations with checked methods
    ($fn_name:ident, $type:ty, $checked_method:ident, $error:expr) => {
        /// Checked arithmetic mapped onto a core error
        pub fn $fn_name(a: $type, b: $type) -> CoreResult<$type> {
            a.$checked_method(b).ok_or($error)
        }
    };
}

safe_arith!(safe_add_u256, U256, checked_add, DopplerCoreError::MathOverflow);
safe_arith!(safe_sub_u256, U256, checked_sub, DopplerCoreError::MathUnderflow);

/// Sum an iterator of amounts, failing on overflow
pub fn safe_sum_u256<I>(values: I) -> CoreResult<U256>
where
    I: IntoIterator<Item = U256>,
{
    values
        .into_iter()
        .try_fold(U256::ZERO, |acc, value| safe_add_u256(acc, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_u256() {
        let one = U256::from(1u8);
        assert_eq!(safe_add_u256(one, one).unwrap(), U256::from(2u8));
        assert_eq!(
            safe_add_u256(U256::MAX, one).unwrap_err(),
            DopplerCoreError::MathOverflow
        );
        assert_eq!(
            safe_sub_u256(U256::ZERO, one).unwrap_err(),
            DopplerCoreError::MathUnderflow
        );
    }

    #[test]
    fn test_sum() {
        let values = [U256::from(1u8), U256::from(2u8), U256::from(3u8)];
        assert_eq!(safe_sum_u256(values).unwrap(), U256::from(6u8));
        assert!(safe_sum_u256([U256::MAX, U256::from(1u8)]).is_err());
    }
}
