//! Single hypothetical swap against the quote oracle.
//!
//! Every way a guess can fail (bad size, oracle refusal, nonsensical quote)
//! is a `SimulationFailure` value. The search treats all of them as
//! "guess too large".

use alloy_primitives::U256;
use thiserror::Error;
use tracing::warn;

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

use super::excess::{calculate_excess, Excess};
use crate::math::tick_math::extreme_price_limit;
use crate::oracle::{QuoteError, QuoteOracle};
use crate::types::{FeeBalances, PoolKey};

/// A successfully simulated swap and the balances it would leave behind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct SwapSimulation {
    pub amount_in: U256,
    pub amount_out: U256,
    pub resulting_fees: FeeBalances,
    pub resulting_sqrt_price_x96: U256,
    /// Excess of `resulting_fees` at `resulting_sqrt_price_x96`
    pub excess: Excess,
}

/// Why a guess could not be simulated
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimulationFailure {
    #[error("Guess amount is zero")]
    ZeroAmount,

    #[error("Guess {guess} exceeds input balance {available}")]
    ExceedsBalance { guess: U256, available: U256 },

    #[error("Oracle failed: {0}")]
    Oracle(#[from] QuoteError),

    #[error("Malformed quote: {0}")]
    MalformedQuote(&'static str),
}

/// Simulate swapping `guess_amount_in` out of `fees` in the given direction.
/// The price limit is pinned to the extreme of the direction so only the
/// input amount bounds the swap.
pub fn simulate_swap<O: QuoteOracle + ?Sized>(
    oracle: &O,
    key: &PoolKey,
    zero_for_one: bool,
    guess_amount_in: U256,
    fees: FeeBalances,
) -> Result<SwapSimulation, SimulationFailure> {
    if guess_amount_in.is_zero() {
        return Err(SimulationFailure::ZeroAmount);
    }

    let available = fees.input_side(zero_for_one);
    if guess_amount_in > available {
        return Err(SimulationFailure::ExceedsBalance {
            guess: guess_amount_in,
            available,
        });
    }

    let quote = oracle.quote_exact_input(
        key,
        zero_for_one,
        guess_amount_in,
        extreme_price_limit(zero_for_one),
    )?;

    let (amount_in, amount_out) = quote.amounts(zero_for_one).ok_or_else(|| {
        warn!(?quote, zero_for_one, "quote deltas have the wrong signs");
        SimulationFailure::MalformedQuote("delta signs do not match direction")
    })?;

    if amount_in.is_zero() {
        return Err(SimulationFailure::MalformedQuote("no input consumed"));
    }
    if amount_in > available {
        warn!(%amount_in, %available, "quote consumed more than the available balance");
        return Err(SimulationFailure::MalformedQuote("consumed more than available"));
    }

    let resulting_fees = fees
        .after_swap(zero_for_one, amount_in, amount_out)
        .map_err(|_| SimulationFailure::MalformedQuote("resulting balance overflows"))?;

    let excess = calculate_excess(
        resulting_fees.amount0,
        resulting_fees.amount1,
        quote.sqrt_price_after_x96,
    )
    .map_err(|err| {
        warn!(%err, "quote left the pool at an unsupported price");
        SimulationFailure::MalformedQuote("resulting price out of range")
    })?;

    Ok(SwapSimulation {
        amount_in,
        amount_out,
        resulting_fees,
        resulting_sqrt_price_x96: quote.sqrt_price_after_x96,
        excess,
    })
}
