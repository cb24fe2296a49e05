//! # Quote Oracle
//!
//! The solver's only external capability: a quote for a hypothetical
//! exact-input swap that is never committed. Failures are ordinary values
//! the solver branches on.

pub mod single_range;

pub use single_range::SingleRangeQuoter;

use alloy_primitives::{I256, U256};
use thiserror::Error;

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

use crate::types::PoolKey;

/// Outcome of a quoted swap, as balance deltas from the swapper's side.
/// Negative amounts are paid into the pool, positive amounts are received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct QuoteResult {
    pub amount0: I256,
    pub amount1: I256,
    /// Pool sqrt price after the swap
    pub sqrt_price_after_x96: U256,
}

impl QuoteResult {
    /// Split the deltas into (consumed, produced) for a swap direction.
    /// Returns None if the signs do not describe a swap in that direction.
    pub fn amounts(&self, zero_for_one: bool) -> Option<(U256, U256)> {
        let (input, output) = if zero_for_one {
            (self.amount0, self.amount1)
        } else {
            (self.amount1, self.amount0)
        };

        if input.is_positive() || output.is_negative() {
            return None;
        }
        Some((input.unsigned_abs(), output.unsigned_abs()))
    }
}

/// Reasons a quote could not be produced
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuoteError {
    #[error("Insufficient liquidity")]
    InsufficientLiquidity,

    #[error("Price limit already reached")]
    PriceLimitReached,

    #[error("Invalid quote input: {0}")]
    InvalidInput(&'static str),

    #[error("Quote reverted: {0}")]
    Reverted(String),
}

/// Anything that can quote an exact-input single-pool swap
pub trait QuoteOracle {
    fn quote_exact_input(
        &self,
        key: &PoolKey,
        zero_for_one: bool,
        amount_in: U256,
        sqrt_price_limit_x96: U256,
    ) -> Result<QuoteResult, QuoteError>;
}

impl<T: QuoteOracle + ?Sized> QuoteOracle for &T {
    fn quote_exact_input(
        &self,
        key: &PoolKey,
        zero_for_one: bool,
        amount_in: U256,
        sqrt_price_limit_x96: U256,
    ) -> Result<QuoteResult, QuoteError> {
        (**self).quote_exact_input(key, zero_for_one, amount_in, sqrt_price_limit_x96)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(amount0: i64, amount1: i64) -> QuoteResult {
        QuoteResult {
            amount0: I256::try_from(amount0).unwrap(),
            amount1: I256::try_from(amount1).unwrap(),
            sqrt_price_after_x96: U256::ZERO,
        }
    }

    #[test]
    fn test_amounts_by_direction() {
        let q = quote(-100, 95);
        assert_eq!(q.amounts(true), Some((U256::from(100u8), U256::from(95u8))));
        assert_eq!(q.amounts(false), None);

        let q = quote(40, -50);
        assert_eq!(q.amounts(false), Some((U256::from(50u8), U256::from(40u8))));
        assert_eq!(q.amounts(true), None);
    }
}
