//! # Core Types
//!
//! Data structures shared by the solver, the fee distribution and callers.

pub mod fees;
pub mod pool;

pub use fees::*;
pub use pool::*;
