//! Fee balance pairs

use alloy_primitives::U256;

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreResult;
use crate::math::safe_math::{safe_add_u256, safe_sub_u256};

/// Two token balances held by the hook, one per pool currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct FeeBalances {
    pub amount0: U256,
    pub amount1: U256,
}

impl FeeBalances {
    pub const ZERO: Self = Self {
        amount0: U256::ZERO,
        amount1: U256::ZERO,
    };

    pub fn new(amount0: U256, amount1: U256) -> Self {
        Self { amount0, amount1 }
    }

    pub fn is_zero(&self) -> bool {
        self.amount0.is_zero() && self.amount1.is_zero()
    }

    /// Balance on the input side of a swap in this direction
    pub fn input_side(&self, zero_for_one: bool) -> U256 {
        if zero_for_one {
            self.amount0
        } else {
            self.amount1
        }
    }

    /// New balances after paying `amount_in` and receiving `amount_out`
    pub fn after_swap(&self, zero_for_one: bool, amount_in: U256, amount_out: U256) -> CoreResult<Self> {
        if zero_for_one {
            Ok(Self {
                amount0: safe_sub_u256(self.amount0, amount_in)?,
                amount1: safe_add_u256(self.amount1, amount_out)?,
            })
        } else {
            Ok(Self {
                amount0: safe_add_u256(self.amount0, amount_out)?,
                amount1: safe_sub_u256(self.amount1, amount_in)?,
            })
        }
    }

    /// Component-wise sum
    pub fn checked_add(&self, other: &Self) -> CoreResult<Self> {
        Ok(Self {
            amount0: safe_add_u256(self.amount0, other.amount0)?,
            amount1: safe_add_u256(self.amount1, other.amount1)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_after_swap() {
        let fees = FeeBalances::new(U256::from(100u8), U256::from(50u8));

        let swapped = fees.after_swap(true, U256::from(40u8), U256::from(30u8)).unwrap();
        assert_eq!(swapped, FeeBalances::new(U256::from(60u8), U256::from(80u8)));

        let swapped = fees.after_swap(false, U256::from(50u8), U256::from(10u8)).unwrap();
        assert_eq!(swapped, FeeBalances::new(U256::from(110u8), U256::ZERO));

        // Original pair is untouched
        assert_eq!(fees.amount0, U256::from(100u8));
        assert!(fees.after_swap(false, U256::from(51u8), U256::ZERO).is_err());
    }
}
