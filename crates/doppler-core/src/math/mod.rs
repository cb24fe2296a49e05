//! # Mathematical Functions
//!
//! Integer fixed-point math for Q64.96 prices and 256-bit token amounts.

pub mod big_int;
pub mod liquidity_math;
pub mod price_math;
pub mod safe_math;
pub mod tick_math;

// Re-export commonly used functions
pub use big_int::*;
pub use liquidity_math::*;
pub use price_math::*;
pub use safe_math::*;
pub use tick_math::*;
