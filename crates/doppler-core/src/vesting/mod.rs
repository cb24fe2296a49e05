//! # Vesting Ledger
//!
//! Pre-minted token allocations released over cliff/duration schedules.
//! All allocations share one custody account; releases move tokens out of
//! it to the beneficiary and never to whoever triggered the release.

pub mod custody;
pub mod ledger;
pub mod schedule;

pub use custody::{InMemoryToken, TokenCustody};
pub use ledger::{VestingLedger, VestingParams};
pub use schedule::{VestingAllocation, VestingSchedule};
