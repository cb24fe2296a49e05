//! # Engine Configuration
//!
//! Tunables for the rebalance search and pre-mint caps for the vesting ledger.

use alloy_primitives::U256;

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

use crate::constants::{
    EPSILON, MAX_PRE_MINT_PER_ADDRESS_WAD, MAX_REBALANCE_ITERATIONS, MAX_REBALANCE_ITERATIONS_CAP,
    MAX_TOTAL_PRE_MINT_WAD, WAD,
};
use crate::errors::{CoreResult, DopplerCoreError};

/// Rebalance search configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct RebalanceConfig {
    /// Imbalance at or below which both sides count as balanced
    pub epsilon: u128,
    /// Upper bound on oracle calls per rebalance
    pub max_iterations: u32,
}

impl RebalanceConfig {
    /// Validate configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.max_iterations == 0 {
            return Err(DopplerCoreError::invalid_parameter(
                "max_iterations",
                "must be greater than 0",
            ));
        }

        if self.max_iterations > MAX_REBALANCE_ITERATIONS_CAP {
            return Err(DopplerCoreError::invalid_parameter(
                "max_iterations",
                format!("{} exceeds cap {}", self.max_iterations, MAX_REBALANCE_ITERATIONS_CAP),
            ));
        }

        Ok(())
    }

    /// Epsilon as a 256-bit amount
    pub fn epsilon(&self) -> U256 {
        U256::from(self.epsilon)
    }
}

impl Default for RebalanceConfig {
    fn default() -> Self {
        Self {
            epsilon: EPSILON,
            max_iterations: MAX_REBALANCE_ITERATIONS,
        }
    }
}

/// Caps on pre-minted vesting allocations, as WAD fractions of initial supply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct PreMintLimits {
    pub max_pre_mint_per_address_wad: U256,
    pub max_total_pre_mint_wad: U256,
}

impl PreMintLimits {
    /// Validate configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.max_pre_mint_per_address_wad > WAD {
            return Err(DopplerCoreError::invalid_parameter(
                "max_pre_mint_per_address_wad",
                "at most WAD (100%)",
            ));
        }

        if self.max_total_pre_mint_wad > WAD {
            return Err(DopplerCoreError::invalid_parameter(
                "max_total_pre_mint_wad",
                "at most WAD (100%)",
            ));
        }

        Ok(())
    }
}

impl Default for PreMintLimits {
    fn default() -> Self {
        Self {
            max_pre_mint_per_address_wad: MAX_PRE_MINT_PER_ADDRESS_WAD,
            max_total_pre_mint_wad: MAX_TOTAL_PRE_MINT_WAD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rebalance_config_validation() {
        let mut config = RebalanceConfig::default();
        assert!(config.validate().is_ok());

        config.max_iterations = 0;
        assert!(config.validate().is_err());

        config.max_iterations = MAX_REBALANCE_ITERATIONS_CAP + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pre_mint_limits_validation() {
        let mut limits = PreMintLimits::default();
        assert!(limits.validate().is_ok());

        limits.max_total_pre_mint_wad = WAD + U256::from(1u8);
        assert!(limits.validate().is_err());
    }
}
