//! # Core Error Types
//!
//! Error types shared by the rebalance solver and the vesting ledger.
//! Expected-negative outcomes of the solver are not errors and live in
//! `rebalance::RebalanceOutcome`; oracle failures live in `oracle::QuoteError`.

use alloy_primitives::{Address, U256};
use thiserror::Error;

/// Core protocol errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(serde::Serialize, serde::Deserialize))]
pub enum DopplerCoreError {
    // ========================================================================
    // Math Errors
    // ========================================================================
    #[error("Math overflow")]
    MathOverflow,

    #[error("Math underflow")]
    MathUnderflow,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Mul div overflow")]
    MulDivOverflow,

    // ========================================================================
    // Validation Errors
    // ========================================================================
    #[error("Invalid sqrt price: {0}")]
    InvalidSqrtPrice(U256),

    #[error("Invalid tick: {0}")]
    InvalidTick(i32),

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    // ========================================================================
    // Rebalance Errors
    // ========================================================================
    #[error("Excess on both sides: excess0={excess0}, excess1={excess1}")]
    ExcessInvariantViolated { excess0: U256, excess1: U256 },

    // ========================================================================
    // Fee Distribution Errors
    // ========================================================================
    #[error("Fee distribution does not sum to WAD: {0}")]
    InvalidFeeDistribution(U256),

    // ========================================================================
    // Vesting Errors
    // ========================================================================
    #[error("Invalid schedule {schedule_id}: cliff {cliff} exceeds duration {duration}")]
    InvalidSchedule {
        schedule_id: u64,
        cliff: u64,
        duration: u64,
    },

    #[error("Unknown schedule id {0}")]
    UnknownScheduleId(u64),

    #[error("Array lengths mismatch: {beneficiaries} beneficiaries, {schedule_ids} schedule ids, {amounts} amounts")]
    ArrayLengthsMismatch {
        beneficiaries: usize,
        schedule_ids: usize,
        amounts: usize,
    },

    #[error("Invalid allocation for {beneficiary} on schedule {schedule_id}")]
    InvalidAllocation {
        beneficiary: Address,
        schedule_id: u64,
    },

    #[error("Pre-mint for {beneficiary} of {amount} exceeds per-address cap {cap}")]
    MaxPreMintPerAddressExceeded {
        beneficiary: Address,
        amount: U256,
        cap: U256,
    },

    #[error("Total pre-mint {amount} exceeds cap {cap}")]
    MaxTotalPreMintExceeded { amount: U256, cap: U256 },

    #[error("No releasable amount for {beneficiary}")]
    NoReleasableAmount { beneficiary: Address },

    #[error("Released {released} exceeds total {total} for {beneficiary} on schedule {schedule_id}")]
    ReleasedExceedsTotal {
        beneficiary: Address,
        schedule_id: u64,
        released: U256,
        total: U256,
    },

    #[error("Custody balance {actual} does not match expected {expected}")]
    CustodyMismatch { expected: U256, actual: U256 },

    #[error("Released total {released} exceeds vested total {vested}")]
    ReleasedExceedsVested { released: U256, vested: U256 },

    // ========================================================================
    // Custody Errors
    // ========================================================================
    #[error("Insufficient balance for {account}: has {balance}, needs {needed}")]
    InsufficientBalance {
        account: Address,
        balance: U256,
        needed: U256,
    },

    #[error("Transfer rejected: {0}")]
    TransferRejected(String),
}

/// Result type using core errors
pub type CoreResult<T> = Result<T, DopplerCoreError>;

// Helper functions for creating specific errors
impl DopplerCoreError {
    /// Create an invalid parameter error with reason
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// Whether this error is the expected "nothing to release" outcome
    pub fn is_no_releasable_amount(&self) -> bool {
        matches!(self, Self::NoReleasableAmount { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = DopplerCoreError::invalid_parameter("max_iterations", "must be non-zero");
        assert_eq!(
            format!("{}", err),
            "Invalid parameter 'max_iterations': must be non-zero"
        );

        let err = DopplerCoreError::InvalidSchedule {
            schedule_id: 2,
            cliff: 10,
            duration: 5,
        };
        assert_eq!(
            format!("{}", err),
            "Invalid schedule 2: cliff 10 exceeds duration 5"
        );
    }

    #[test]
    fn test_no_releasable_amount_detection() {
        let err = DopplerCoreError::NoReleasableAmount {
            beneficiary: Address::ZERO,
        };
        assert!(err.is_no_releasable_amount());
        assert!(!DopplerCoreError::MathOverflow.is_no_releasable_amount());
    }
}
