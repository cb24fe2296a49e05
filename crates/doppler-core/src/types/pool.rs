//! Pool identification

use alloy_primitives::Address;

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

/// Identifies a pool by its sorted currencies, fee tier, tick spacing and hook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct PoolKey {
    /// Lower-sorted currency
    pub currency0: Address,
    /// Higher-sorted currency
    pub currency1: Address,
    /// Fee tier in pips
    pub fee: u32,
    /// Tick spacing of the pool
    pub tick_spacing: i32,
    /// Hook contract attached to the pool
    pub hooks: Address,
}

impl PoolKey {
    /// Create a pool key, sorting the two currencies
    pub fn new(token_a: Address, token_b: Address, fee: u32, tick_spacing: i32, hooks: Address) -> Self {
        let (currency0, currency1) = if token_a <= token_b {
            (token_a, token_b)
        } else {
            (token_b, token_a)
        };
        Self {
            currency0,
            currency1,
            fee,
            tick_spacing,
            hooks,
        }
    }

    /// Currency paid into the pool for a swap in this direction
    pub fn input_currency(&self, zero_for_one: bool) -> Address {
        if zero_for_one {
            self.currency0
        } else {
            self.currency1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_currencies_sorted() {
        let a = address!("00000000000000000000000000000000000000aa");
        let b = address!("00000000000000000000000000000000000000bb");
        let key = PoolKey::new(b, a, 3000, 60, Address::ZERO);
        assert_eq!(key.currency0, a);
        assert_eq!(key.currency1, b);
        assert_eq!(key.input_currency(true), a);
        assert_eq!(key.input_currency(false), b);
    }
}
