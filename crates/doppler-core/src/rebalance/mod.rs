//! # Rebalance Solver
//!
//! Decides whether a single swap can bring two fee balances to equal value
//! at the post-swap price, and sizes that swap by binary search over a
//! quote oracle.

pub mod excess;
pub mod simulate;
pub mod solver;

pub use excess::{calculate_excess, score, Excess};
pub use simulate::{simulate_swap, SimulationFailure, SwapSimulation};
pub use solver::{rebalance_fees, rebalance_fees_with_config, RebalanceOutcome, RebalanceSwap};
