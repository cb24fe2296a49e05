//! # Doppler Core - Fee Rebalancing and Vesting
//!
//! This crate contains the arithmetic-heavy pieces of the Doppler launch
//! protocol, kept free of any on-chain plumbing so they can be exercised
//! and simulated off-chain. It provides:
//!
//! - Q64.96 price math and 256-bit fixed-point helpers
//! - The rehype rebalance solver (binary search over a quote oracle)
//! - Fee distribution between buyback, beneficiary and LP buckets
//! - The multi-schedule vesting ledger with pooled custody
//!
//! ## Feature Flags
//!
//! - `client`: Enables serde serialization for off-chain use

pub mod config;
pub mod constants;
pub mod distribution;
pub mod errors;
pub mod math;
pub mod oracle;
pub mod rebalance;
pub mod types;
pub mod vesting;

// Re-export commonly used items
pub use config::{PreMintLimits, RebalanceConfig};
pub use constants::*;
pub use distribution::{FeeAccumulator, FeeDistribution, FeeSplit};
pub use errors::{CoreResult, DopplerCoreError};
pub use oracle::{QuoteError, QuoteOracle, QuoteResult, SingleRangeQuoter};
pub use rebalance::{rebalance_fees, rebalance_fees_with_config, Excess, RebalanceOutcome, RebalanceSwap};
pub use types::*;
pub use vesting::{InMemoryToken, TokenCustody, VestingAllocation, VestingLedger, VestingParams, VestingSchedule};
