//! Imbalance between two fee balances at a given price.
//!
//! Both sides are compared as 512-bit values scaled by the price's
//! fixed-point shift, so the comparison itself never rounds. Only the final
//! conversion back to token units truncates, and it truncates toward zero.

use alloy_primitives::U256;

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

use crate::errors::{CoreResult, DopplerCoreError};
use crate::math::big_int::{div_wide, full_mul, narrow, widen, Rounding};
use crate::math::price_math::price_ratio;

/// Value by which one side of a balance pair exceeds the other,
/// denominated in the token holding the excess. At most one side is non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct Excess {
    pub excess0: U256,
    pub excess1: U256,
}

impl Excess {
    pub const ZERO: Self = Self {
        excess0: U256::ZERO,
        excess1: U256::ZERO,
    };

    /// Scalar imbalance used to rank candidate swaps
    pub fn score(&self) -> U256 {
        score(self.excess0, self.excess1)
    }

    /// Whether both sides are within `epsilon`
    pub fn is_within(&self, epsilon: U256) -> bool {
        self.excess0 <= epsilon && self.excess1 <= epsilon
    }

    /// Excess on the input side and on the output side of a swap direction
    pub fn by_direction(&self, zero_for_one: bool) -> (U256, U256) {
        if zero_for_one {
            (self.excess0, self.excess1)
        } else {
            (self.excess1, self.excess0)
        }
    }

    /// Fail if both sides carry excess
    pub fn ensure_exclusive(&self) -> CoreResult<()> {
        if !self.excess0.is_zero() && !self.excess1.is_zero() {
            return Err(DopplerCoreError::ExcessInvariantViolated {
                excess0: self.excess0,
                excess1: self.excess1,
            });
        }
        Ok(())
    }
}

/// Rank an imbalance; only one of the two arguments is ever non-zero
pub fn score(excess0: U256, excess1: U256) -> U256 {
    excess0.saturating_add(excess1)
}

/// Compute the excess of `balance0` over `balance1` (or the reverse) at
/// `sqrt_price_x96`. Rejects prices outside the supported range.
pub fn calculate_excess(balance0: U256, balance1: U256, sqrt_price_x96: U256) -> CoreResult<Excess> {
    let price = price_ratio(sqrt_price_x96)?;

    // Both values are token1 amounts scaled by 2^shift
    let value0 = full_mul(balance0, price.value);
    let value1 = widen(balance1) << price.shift;

    let excess = if value0 > value1 {
        Excess {
            excess0: div_wide(value0 - value1, widen(price.value), Rounding::Down)?,
            excess1: U256::ZERO,
        }
    } else if value1 > value0 {
        Excess {
            excess0: U256::ZERO,
            excess1: narrow((value1 - value0) >> price.shift).ok_or(DopplerCoreError::MathOverflow)?,
        }
    } else {
        Excess::ZERO
    };

    excess.ensure_exclusive()?;
    Ok(excess)
}
