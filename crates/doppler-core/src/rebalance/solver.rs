//! Binary search for the swap that balances two fee balances.
//!
//! The search assumes resulting imbalance is monotone in swap size, which
//! holds for a single range but can break at tick boundaries. It therefore
//! keeps the lowest-score simulation seen and returns that when the
//! iteration budget runs out before the tolerance is reached.

use alloy_primitives::U256;
use tracing::{debug, trace};

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

use super::excess::{calculate_excess, Excess};
use super::simulate::{simulate_swap, SwapSimulation};
use crate::config::RebalanceConfig;
use crate::errors::CoreResult;
use crate::oracle::QuoteOracle;
use crate::types::{FeeBalances, PoolKey};

/// The swap a caller should execute to rebalance its fees
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct RebalanceSwap {
    pub zero_for_one: bool,
    pub amount_in: U256,
    pub amount_out: U256,
    pub new_sqrt_price_x96: U256,
    /// Balances left after the swap
    pub resulting_fees: FeeBalances,
    /// Excess left after the swap
    pub excess: Excess,
    /// Whether the remaining excess is within epsilon on both sides
    pub converged: bool,
    /// Oracle calls spent finding this swap
    pub iterations: u32,
}

/// Decision returned by the solver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub enum RebalanceOutcome {
    /// Balances are already within epsilon at the current price
    AlreadyBalanced,
    /// No simulated swap improved on the starting imbalance
    NoSwapFound,
    /// Best swap found; closest achievable when not converged
    Swap(RebalanceSwap),
}

impl RebalanceOutcome {
    pub fn should_swap(&self) -> bool {
        matches!(self, Self::Swap(_))
    }

    pub fn swap(&self) -> Option<&RebalanceSwap> {
        match self {
            Self::Swap(swap) => Some(swap),
            _ => None,
        }
    }
}

/// Rebalance with the default epsilon and iteration bound
pub fn rebalance_fees<O: QuoteOracle + ?Sized>(
    oracle: &O,
    key: &PoolKey,
    fees: FeeBalances,
    sqrt_price_x96: U256,
) -> CoreResult<RebalanceOutcome> {
    rebalance_fees_with_config(oracle, key, fees, sqrt_price_x96, &RebalanceConfig::default())
}

/// Find a swap that leaves both sides of `fees` within `config.epsilon` of
/// each other at the post-swap price, spending at most
/// `config.max_iterations` oracle calls.
pub fn rebalance_fees_with_config<O: QuoteOracle + ?Sized>(
    oracle: &O,
    key: &PoolKey,
    fees: FeeBalances,
    sqrt_price_x96: U256,
    config: &RebalanceConfig,
) -> CoreResult<RebalanceOutcome> {
    config.validate()?;
    let epsilon = config.epsilon();

    let initial = calculate_excess(fees.amount0, fees.amount1, sqrt_price_x96)?;
    if initial.is_within(epsilon) {
        return Ok(RebalanceOutcome::AlreadyBalanced);
    }

    // Swap away the side holding the excess
    let zero_for_one = initial.excess0 >= initial.excess1;
    let (excess_in, _) = initial.by_direction(zero_for_one);

    let mut low = U256::ZERO;
    let mut high = excess_in;
    let mut best: Option<(SwapSimulation, u32)> = None;
    let mut iterations = 0u32;

    while iterations < config.max_iterations {
        if high < low {
            break;
        }
        iterations += 1;
        // Midpoint without forming low + high, which can exceed 256 bits
        let guess = (low + ((high - low) >> 1usize)).max(U256::from(1u8));

        let sim = match simulate_swap(oracle, key, zero_for_one, guess, fees) {
            Ok(sim) => sim,
            Err(failure) => {
                trace!(iteration = iterations, %guess, %failure, "simulation failed");
                // Treat failure as an oversized guess
                if high <= U256::from(1u8) || guess <= low {
                    break;
                }
                high = guess - U256::from(1u8);
                continue;
            }
        };

        sim.excess.ensure_exclusive()?;
        trace!(
            iteration = iterations,
            %guess,
            excess0 = %sim.excess.excess0,
            excess1 = %sim.excess.excess1,
            "simulated"
        );

        if best
            .as_ref()
            .map_or(true, |(current, _)| sim.excess.score() < current.excess.score())
        {
            best = Some((sim, iterations));
        }

        let (remaining_in, flipped_out) = sim.excess.by_direction(zero_for_one);
        if flipped_out > epsilon {
            // Overshot: the other side now holds the excess
            if guess <= low {
                break;
            }
            high = guess - U256::from(1u8);
        } else if remaining_in <= epsilon {
            debug!(iterations, %guess, zero_for_one, "rebalance converged");
            return Ok(RebalanceOutcome::Swap(to_swap(zero_for_one, &sim, true, iterations)));
        } else {
            // Undershot: still excess on the original side
            if low == guess && high <= guess.saturating_add(U256::from(1u8)) {
                break;
            }
            low = guess;
        }
    }

    match best {
        Some((sim, found_at)) if sim.excess.score() < initial.score() => {
            let converged = sim.excess.is_within(epsilon);
            debug!(
                iterations,
                found_at,
                remaining = %sim.excess.score(),
                "rebalance returning best effort"
            );
            Ok(RebalanceOutcome::Swap(to_swap(zero_for_one, &sim, converged, found_at)))
        }
        _ => {
            debug!(iterations, "no rebalance swap found");
            Ok(RebalanceOutcome::NoSwapFound)
        }
    }
}

fn to_swap(zero_for_one: bool, sim: &SwapSimulation, converged: bool, iterations: u32) -> RebalanceSwap {
    RebalanceSwap {
        zero_for_one,
        amount_in: sim.amount_in,
        amount_out: sim.amount_out,
        new_sqrt_price_x96: sim.resulting_sqrt_price_x96,
        resulting_fees: sim.resulting_fees,
        excess: sim.excess,
        converged,
        iterations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{EPSILON, Q96};
    use crate::oracle::{QuoteError, QuoteResult, SingleRangeQuoter};
    use alloy_primitives::I256;
    use std::cell::{Cell, RefCell};

    const LIQUIDITY: u128 = 1_000_000_000_000_000_000_000;
    const ONE: u64 = 1_000_000_000_000_000_000;

    /// Counts calls and fails every quote
    struct FailingOracle {
        calls: Cell<u32>,
    }

    impl QuoteOracle for FailingOracle {
        fn quote_exact_input(
            &self,
            _key: &PoolKey,
            _zero_for_one: bool,
            _amount_in: U256,
            _sqrt_price_limit_x96: U256,
        ) -> Result<QuoteResult, QuoteError> {
            self.calls.set(self.calls.get() + 1);
            Err(QuoteError::Reverted("always".to_string()))
        }
    }

    /// Fails above a size threshold, otherwise defers to a real quoter
    struct CappedOracle {
        inner: SingleRangeQuoter,
        max_amount: U256,
    }

    impl QuoteOracle for CappedOracle {
        fn quote_exact_input(
            &self,
            key: &PoolKey,
            zero_for_one: bool,
            amount_in: U256,
            sqrt_price_limit_x96: U256,
        ) -> Result<QuoteResult, QuoteError> {
            if amount_in > self.max_amount {
                return Err(QuoteError::InsufficientLiquidity);
            }
            self.inner
                .quote_exact_input(key, zero_for_one, amount_in, sqrt_price_limit_x96)
        }
    }

    /// Consumes one unit whatever it is asked to swap, so every guess
    /// undershoots; records the requested amounts
    struct StubbornOracle {
        requested: RefCell<Vec<U256>>,
    }

    impl QuoteOracle for StubbornOracle {
        fn quote_exact_input(
            &self,
            _key: &PoolKey,
            zero_for_one: bool,
            amount_in: U256,
            _sqrt_price_limit_x96: U256,
        ) -> Result<QuoteResult, QuoteError> {
            self.requested.borrow_mut().push(amount_in);
            let (amount0, amount1) = if zero_for_one {
                (I256::MINUS_ONE, I256::ZERO)
            } else {
                (I256::ZERO, I256::MINUS_ONE)
            };
            Ok(QuoteResult {
                amount0,
                amount1,
                sqrt_price_after_x96: Q96,
            })
        }
    }

    fn fees(amount0: u64, amount1: u64) -> FeeBalances {
        FeeBalances::new(U256::from(amount0), U256::from(amount1))
    }

    #[test]
    fn test_balanced_fees_need_no_swap() {
        let quoter = SingleRangeQuoter::full_range(Q96, LIQUIDITY, 0).unwrap();
        let outcome = rebalance_fees(&quoter, &PoolKey::default(), fees(ONE, ONE), Q96).unwrap();
        assert_eq!(outcome, RebalanceOutcome::AlreadyBalanced);
        assert!(!outcome.should_swap());
    }

    #[test]
    fn test_within_epsilon_needs_no_swap() {
        let oracle = FailingOracle { calls: Cell::new(0) };
        let outcome = rebalance_fees(
            &oracle,
            &PoolKey::default(),
            FeeBalances::new(U256::from(ONE) + U256::from(EPSILON), U256::from(ONE)),
            Q96,
        )
        .unwrap();
        assert_eq!(outcome, RebalanceOutcome::AlreadyBalanced);
        assert_eq!(oracle.calls.get(), 0);
    }

    #[test]
    fn test_converges_zero_for_one() {
        let quoter = SingleRangeQuoter::full_range(Q96, LIQUIDITY, 0).unwrap();
        let outcome = rebalance_fees(&quoter, &PoolKey::default(), fees(ONE, 0), Q96).unwrap();

        let swap = outcome.swap().expect("expected a swap");
        assert!(swap.zero_for_one);
        assert!(swap.converged);
        assert!(swap.excess.is_within(U256::from(EPSILON)));
        // Slightly under half because the price moves against the seller
        assert!(swap.amount_in < U256::from(ONE / 2));
        assert!(swap.amount_in > U256::from(ONE / 2 - ONE / 1000));
        assert!(swap.new_sqrt_price_x96 < Q96);
    }

    #[test]
    fn test_converges_one_for_zero() {
        let quoter = SingleRangeQuoter::full_range(Q96, LIQUIDITY, 0).unwrap();
        let outcome = rebalance_fees(&quoter, &PoolKey::default(), fees(0, ONE), Q96).unwrap();

        let swap = outcome.swap().expect("expected a swap");
        assert!(!swap.zero_for_one);
        assert!(swap.converged);
        assert!(swap.new_sqrt_price_x96 > Q96);
        assert_eq!(swap.resulting_fees.amount1, U256::from(ONE) - swap.amount_in);
    }

    #[test]
    fn test_failing_oracle_is_bounded() {
        let oracle = FailingOracle { calls: Cell::new(0) };
        let config = RebalanceConfig {
            epsilon: EPSILON,
            max_iterations: 20,
        };
        let outcome =
            rebalance_fees_with_config(&oracle, &PoolKey::default(), fees(ONE, 0), Q96, &config)
                .unwrap();

        assert_eq!(outcome, RebalanceOutcome::NoSwapFound);
        assert!(oracle.calls.get() <= 20);
        assert!(oracle.calls.get() > 0);
    }

    #[test]
    fn test_failures_shrink_the_search() {
        // Only small swaps route; the search must walk below the cap
        let oracle = CappedOracle {
            inner: SingleRangeQuoter::full_range(Q96, LIQUIDITY, 0).unwrap(),
            max_amount: U256::from(ONE / 10),
        };
        let outcome = rebalance_fees(&oracle, &PoolKey::default(), fees(ONE, 0), Q96).unwrap();

        let swap = outcome.swap().expect("expected a best-effort swap");
        assert!(swap.amount_in <= U256::from(ONE / 10));
        assert!(!swap.converged);
        assert!(swap.excess.score() < U256::from(ONE));
    }

    #[test]
    fn test_tiny_budget_returns_best_effort() {
        let quoter = SingleRangeQuoter::full_range(Q96, LIQUIDITY, 0).unwrap();
        let config = RebalanceConfig {
            epsilon: EPSILON,
            max_iterations: 3,
        };
        let outcome =
            rebalance_fees_with_config(&quoter, &PoolKey::default(), fees(ONE, 0), Q96, &config)
                .unwrap();

        let swap = outcome.swap().expect("expected a swap");
        assert!(!swap.converged);
        assert!(swap.iterations <= 3);
        assert!(swap.excess.score() < U256::from(ONE));
    }

    #[test]
    fn test_undershoots_near_u256_max_keep_raising_the_guess() {
        let oracle = StubbornOracle {
            requested: RefCell::new(Vec::new()),
        };
        let config = RebalanceConfig {
            epsilon: EPSILON,
            max_iterations: 4,
        };
        let balances = FeeBalances::new(U256::MAX, U256::ZERO);
        rebalance_fees_with_config(&oracle, &PoolKey::default(), balances, Q96, &config).unwrap();

        let requested = oracle.requested.into_inner();
        assert_eq!(requested.len(), 4);
        assert!(requested[0] >= U256::MAX >> 2usize);
        for pair in requested.windows(2) {
            assert!(pair[1] > pair[0], "guess fell from {} to {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_invalid_price_is_an_error() {
        let quoter = SingleRangeQuoter::full_range(Q96, LIQUIDITY, 0).unwrap();
        assert!(rebalance_fees(&quoter, &PoolKey::default(), fees(ONE, 0), U256::ZERO).is_err());
    }
}
