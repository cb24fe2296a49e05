//! # Protocol Constants
//!
//! Fundamental constants for the rehype fee engine and vesting ledger:
//! - Fixed-point scale factors (Q64, Q96, Q128, Q192, WAD)
//! - Tick and sqrt price bounds of the concentrated liquidity curve
//! - Rebalance search defaults
//! - Pre-mint limits

use alloy_primitives::{uint, U256};

// ============================================================================
// Mathematical Constants
// ============================================================================

/// Q64 fixed-point scale factor: 2^64
pub const Q64: U256 = uint!(0x10000000000000000_U256);

/// Q96 format for sqrt price calculations: 2^96
pub const Q96: U256 = uint!(0x1000000000000000000000000_U256);

/// Q128 scale factor: 2^128
pub const Q128: U256 = uint!(0x100000000000000000000000000000000_U256);

/// Resolution of Q96 values in bits
pub const RESOLUTION_96: usize = 96;

/// Shift applied to a price computed as sqrt^2 (Q96 * Q96)
pub const PRICE_X192_SHIFT: usize = 192;

/// Shift applied to a price computed as sqrt^2 / 2^64
pub const PRICE_X128_SHIFT: usize = 128;

/// 18-decimal fixed point one (100%)
pub const WAD: U256 = uint!(1_000_000_000_000_000_000_U256);

/// Fee denominator in pips (1_000_000 = 100%)
pub const FEE_PIPS_DENOMINATOR: u32 = 1_000_000;

// ============================================================================
// Price Bounds
// ============================================================================

/// Minimum tick of the concentrated liquidity curve
pub const MIN_TICK: i32 = -887_272;

/// Maximum tick of the concentrated liquidity curve
pub const MAX_TICK: i32 = 887_272;

/// Sqrt price at `MIN_TICK` in Q64.96
pub const MIN_SQRT_PRICE: U256 = uint!(4295128739_U256);

/// Sqrt price at `MAX_TICK` in Q64.96 (exclusive upper bound)
pub const MAX_SQRT_PRICE: U256 =
    uint!(1461446703485210103287273052203988822378723970342_U256);

// ============================================================================
// Rebalance Constants
// ============================================================================

/// Default imbalance below which two fee balances count as balanced
pub const EPSILON: u128 = 1_000_000;

/// Default bound on binary-search iterations per rebalance
pub const MAX_REBALANCE_ITERATIONS: u32 = 64;

/// Hard ceiling accepted for a configured iteration bound
pub const MAX_REBALANCE_ITERATIONS_CAP: u32 = 256;

// ============================================================================
// Vesting Constants
// ============================================================================

/// Default cap on a single address' pre-mint, as a fraction of supply (20%)
pub const MAX_PRE_MINT_PER_ADDRESS_WAD: U256 = uint!(200_000_000_000_000_000_U256);

/// Default cap on the aggregate pre-mint, as a fraction of supply (80%)
pub const MAX_TOTAL_PRE_MINT_WAD: U256 = uint!(800_000_000_000_000_000_U256);
