//! Offline quoter for a pool whose active liquidity sits in a single range.
//!
//! A full-range quoter with a zero fee behaves as a constant-product pool.
//! The swap step follows the concentrated liquidity rules: the fee is taken
//! from the input first, and the swap stops at the range edge or the price
//! limit, whichever comes first.

use alloy_primitives::{I256, U256};

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

use super::{QuoteError, QuoteOracle, QuoteResult};
use crate::constants::{FEE_PIPS_DENOMINATOR, MAX_TICK, MIN_TICK};
use crate::errors::{CoreResult, DopplerCoreError};
use crate::math::big_int::{mul_div_down, mul_div_up};
use crate::math::liquidity_math::{
    get_amount_0_delta, get_amount_1_delta, get_next_sqrt_price_from_amount_0_in,
    get_next_sqrt_price_from_amount_1_in,
};
use crate::math::tick_math::{get_sqrt_ratio_at_tick, validate_sqrt_price};
use crate::types::PoolKey;

/// Pool state for quoting within one liquidity range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct SingleRangeQuoter {
    pub sqrt_price_x96: U256,
    pub liquidity: u128,
    pub sqrt_price_lower_x96: U256,
    pub sqrt_price_upper_x96: U256,
    /// Swap fee in pips
    pub fee_pips: u32,
}

impl SingleRangeQuoter {
    /// Create a quoter for the range `[tick_lower, tick_upper]`
    pub fn new(
        sqrt_price_x96: U256,
        liquidity: u128,
        tick_lower: i32,
        tick_upper: i32,
        fee_pips: u32,
    ) -> CoreResult<Self> {
        if tick_lower >= tick_upper {
            return Err(DopplerCoreError::invalid_parameter(
                "tick_lower",
                format!("{} must be below tick_upper {}", tick_lower, tick_upper),
            ));
        }
        if fee_pips >= FEE_PIPS_DENOMINATOR {
            return Err(DopplerCoreError::invalid_parameter(
                "fee_pips",
                format!("{} must be below {}", fee_pips, FEE_PIPS_DENOMINATOR),
            ));
        }

        let sqrt_price_x96 = validate_sqrt_price(sqrt_price_x96)?;
        let sqrt_price_lower_x96 = get_sqrt_ratio_at_tick(tick_lower)?;
        let sqrt_price_upper_x96 = get_sqrt_ratio_at_tick(tick_upper)?;
        if sqrt_price_x96 < sqrt_price_lower_x96 || sqrt_price_x96 > sqrt_price_upper_x96 {
            return Err(DopplerCoreError::InvalidSqrtPrice(sqrt_price_x96));
        }

        Ok(Self {
            sqrt_price_x96,
            liquidity,
            sqrt_price_lower_x96,
            sqrt_price_upper_x96,
            fee_pips,
        })
    }

    /// Create a quoter spanning every tick
    pub fn full_range(sqrt_price_x96: U256, liquidity: u128, fee_pips: u32) -> CoreResult<Self> {
        Self::new(sqrt_price_x96, liquidity, MIN_TICK, MAX_TICK, fee_pips)
    }

    fn quote(
        &self,
        zero_for_one: bool,
        amount_in: U256,
        sqrt_price_limit_x96: U256,
    ) -> CoreResult<Option<QuoteResult>> {
        let current = self.sqrt_price_x96;
        let edge = if zero_for_one {
            self.sqrt_price_lower_x96.max(sqrt_price_limit_x96)
        } else {
            self.sqrt_price_upper_x96.min(sqrt_price_limit_x96)
        };
        if (zero_for_one && edge >= current) || (!zero_for_one && edge <= current) {
            return Ok(None);
        }

        let fee_complement = FEE_PIPS_DENOMINATOR
            .checked_sub(self.fee_pips)
            .filter(|complement| *complement > 0)
            .map(|complement| U256::from(complement))
            .ok_or_else(|| DopplerCoreError::invalid_parameter("fee_pips", "fee must be below 100%"))?;
        let denominator = U256::from(FEE_PIPS_DENOMINATOR);
        let amount_less_fee = mul_div_down(amount_in, fee_complement, denominator)?;

        let max_in = if zero_for_one {
            get_amount_0_delta(edge, current, self.liquidity, true)?
        } else {
            get_amount_1_delta(current, edge, self.liquidity, true)?
        };

        let (next, consumed) = if amount_less_fee >= max_in {
            // Stops at the edge; gross the fee back up on what was actually used
            let fee = mul_div_up(max_in, U256::from(self.fee_pips), fee_complement)?;
            (edge, max_in + fee)
        } else if zero_for_one {
            let next = get_next_sqrt_price_from_amount_0_in(current, self.liquidity, amount_less_fee)?;
            (next, amount_in)
        } else {
            let next = get_next_sqrt_price_from_amount_1_in(current, self.liquidity, amount_less_fee)?;
            (next, amount_in)
        };

        let produced = if zero_for_one {
            get_amount_1_delta(next, current, self.liquidity, false)?
        } else {
            get_amount_0_delta(current, next, self.liquidity, false)?
        };

        let consumed = I256::try_from(consumed).map_err(|_| DopplerCoreError::MathOverflow)?;
        let produced = I256::try_from(produced).map_err(|_| DopplerCoreError::MathOverflow)?;
        let (amount0, amount1) = if zero_for_one {
            (-consumed, produced)
        } else {
            (produced, -consumed)
        };

        Ok(Some(QuoteResult {
            amount0,
            amount1,
            sqrt_price_after_x96: next,
        }))
    }
}

impl QuoteOracle for SingleRangeQuoter {
    fn quote_exact_input(
        &self,
        _key: &PoolKey,
        zero_for_one: bool,
        amount_in: U256,
        sqrt_price_limit_x96: U256,
    ) -> Result<QuoteResult, QuoteError> {
        if amount_in.is_zero() {
            return Err(QuoteError::InvalidInput("zero amount"));
        }
        if self.liquidity == 0 {
            return Err(QuoteError::InsufficientLiquidity);
        }

        match self.quote(zero_for_one, amount_in, sqrt_price_limit_x96) {
            Ok(Some(result)) => Ok(result),
            Ok(None) => Err(QuoteError::PriceLimitReached),
            Err(err) => Err(QuoteError::Reverted(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Q96;
    use crate::math::tick_math::extreme_price_limit;

    const LIQUIDITY: u128 = 1_000_000_000_000_000_000_000;

    fn key() -> PoolKey {
        PoolKey::default()
    }

    #[test]
    fn test_zero_for_one_moves_price_down() {
        let quoter = SingleRangeQuoter::full_range(Q96, LIQUIDITY, 0).unwrap();
        let amount = U256::from(1_000_000_000_000_000_000u64);
        let result = quoter
            .quote_exact_input(&key(), true, amount, extreme_price_limit(true))
            .unwrap();

        let (consumed, produced) = result.amounts(true).unwrap();
        assert_eq!(consumed, amount);
        assert!(produced < amount);
        assert!(produced > U256::ZERO);
        assert!(result.sqrt_price_after_x96 < Q96);
    }

    #[test]
    fn test_one_for_zero_moves_price_up() {
        let quoter = SingleRangeQuoter::full_range(Q96, LIQUIDITY, 3000).unwrap();
        let amount = U256::from(1_000_000_000_000_000u64);
        let result = quoter
            .quote_exact_input(&key(), false, amount, extreme_price_limit(false))
            .unwrap();

        let (consumed, produced) = result.amounts(false).unwrap();
        assert_eq!(consumed, amount);
        // 0.3% fee plus price impact
        assert!(produced < amount * U256::from(997u16) / U256::from(1000u16));
        assert!(result.sqrt_price_after_x96 > Q96);
    }

    #[test]
    fn test_narrow_range_caps_input() {
        let quoter = SingleRangeQuoter::new(Q96, 1_000_000_000u128, -10, 10, 0).unwrap();
        let amount = U256::from(1_000_000_000_000_000_000u64);
        let result = quoter
            .quote_exact_input(&key(), true, amount, extreme_price_limit(true))
            .unwrap();

        let (consumed, _) = result.amounts(true).unwrap();
        assert!(consumed < amount);
        assert_eq!(result.sqrt_price_after_x96, get_sqrt_ratio_at_tick(-10).unwrap());
    }

    #[test]
    fn test_failures() {
        let empty = SingleRangeQuoter::full_range(Q96, 0, 0).unwrap();
        assert_eq!(
            empty
                .quote_exact_input(&key(), true, U256::from(1u8), extreme_price_limit(true))
                .unwrap_err(),
            QuoteError::InsufficientLiquidity
        );

        let quoter = SingleRangeQuoter::full_range(Q96, LIQUIDITY, 0).unwrap();
        assert!(quoter
            .quote_exact_input(&key(), true, U256::ZERO, extreme_price_limit(true))
            .is_err());
        // Limit on the wrong side of the current price
        assert_eq!(
            quoter
                .quote_exact_input(&key(), true, U256::from(1u8), Q96)
                .unwrap_err(),
            QuoteError::PriceLimitReached
        );
    }

    #[test]
    fn test_invalid_range() {
        assert!(SingleRangeQuoter::new(Q96, LIQUIDITY, 10, -10, 0).is_err());
        assert!(SingleRangeQuoter::new(Q96, LIQUIDITY, 100, 200, 0).is_err());
        assert!(SingleRangeQuoter::full_range(Q96, LIQUIDITY, FEE_PIPS_DENOMINATOR).is_err());
    }
}
