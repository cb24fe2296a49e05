//! # Fee Distribution
//!
//! Every collected fee pair is split four ways: asset buyback, numeraire
//! buyback, beneficiary and LP. The LP share accrues until it is rebalanced
//! and reinvested as liquidity.
//!
//! Percentages are WAD fractions. The LP bucket takes whatever the other
//! three leave after flooring, so a split never creates or loses dust.

use alloy_primitives::U256;
use tracing::debug;

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

use crate::config::RebalanceConfig;
use crate::constants::WAD;
use crate::errors::{CoreResult, DopplerCoreError};
use crate::math::big_int::mul_div_down;
use crate::math::safe_math::{safe_sub_u256, safe_sum_u256};
use crate::oracle::QuoteOracle;
use crate::rebalance::{rebalance_fees_with_config, RebalanceOutcome};
use crate::types::{FeeBalances, PoolKey};

/// WAD-denominated fee shares; must sum to exactly `WAD`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct FeeDistribution {
    pub asset_buyback_wad: U256,
    pub numeraire_buyback_wad: U256,
    pub beneficiary_wad: U256,
    pub lp_wad: U256,
}

/// One fee pair split into its four buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct FeeSplit {
    pub asset_buyback: FeeBalances,
    pub numeraire_buyback: FeeBalances,
    pub beneficiary: FeeBalances,
    pub lp: FeeBalances,
}

impl FeeSplit {
    /// Component-wise sum of all four buckets
    pub fn total(&self) -> CoreResult<FeeBalances> {
        self.asset_buyback
            .checked_add(&self.numeraire_buyback)?
            .checked_add(&self.beneficiary)?
            .checked_add(&self.lp)
    }
}

impl FeeDistribution {
    pub fn new(
        asset_buyback_wad: U256,
        numeraire_buyback_wad: U256,
        beneficiary_wad: U256,
        lp_wad: U256,
    ) -> CoreResult<Self> {
        let distribution = Self {
            asset_buyback_wad,
            numeraire_buyback_wad,
            beneficiary_wad,
            lp_wad,
        };
        distribution.validate()?;
        Ok(distribution)
    }

    /// Everything goes to LP reinvestment
    pub fn all_to_lp() -> Self {
        Self {
            asset_buyback_wad: U256::ZERO,
            numeraire_buyback_wad: U256::ZERO,
            beneficiary_wad: U256::ZERO,
            lp_wad: WAD,
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        let total = safe_sum_u256([
            self.asset_buyback_wad,
            self.numeraire_buyback_wad,
            self.beneficiary_wad,
            self.lp_wad,
        ])?;
        if total != WAD {
            return Err(DopplerCoreError::InvalidFeeDistribution(total));
        }
        Ok(())
    }

    /// Split `fees` into the four buckets
    pub fn split(&self, fees: FeeBalances) -> CoreResult<FeeSplit> {
        let asset_buyback = share(fees, self.asset_buyback_wad)?;
        let numeraire_buyback = share(fees, self.numeraire_buyback_wad)?;
        let beneficiary = share(fees, self.beneficiary_wad)?;

        let lp = FeeBalances {
            amount0: safe_sub_u256(
                fees.amount0,
                safe_sum_u256([asset_buyback.amount0, numeraire_buyback.amount0, beneficiary.amount0])?,
            )?,
            amount1: safe_sub_u256(
                fees.amount1,
                safe_sum_u256([asset_buyback.amount1, numeraire_buyback.amount1, beneficiary.amount1])?,
            )?,
        };

        Ok(FeeSplit {
            asset_buyback,
            numeraire_buyback,
            beneficiary,
            lp,
        })
    }
}

fn share(fees: FeeBalances, pct_wad: U256) -> CoreResult<FeeBalances> {
    Ok(FeeBalances {
        amount0: mul_div_down(fees.amount0, pct_wad, WAD)?,
        amount1: mul_div_down(fees.amount1, pct_wad, WAD)?,
    })
}

/// Fee buckets accrued across collections
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct FeeAccumulator {
    distribution: FeeDistribution,
    buyback_asset: FeeBalances,
    buyback_numeraire: FeeBalances,
    beneficiary: FeeBalances,
    lp: FeeBalances,
}

impl FeeAccumulator {
    pub fn new(distribution: FeeDistribution) -> CoreResult<Self> {
        distribution.validate()?;
        Ok(Self {
            distribution,
            buyback_asset: FeeBalances::ZERO,
            buyback_numeraire: FeeBalances::ZERO,
            beneficiary: FeeBalances::ZERO,
            lp: FeeBalances::ZERO,
        })
    }

    pub fn distribution(&self) -> &FeeDistribution {
        &self.distribution
    }

    /// Split newly collected fees and add them to the buckets. Nothing is
    /// accrued if any bucket would overflow.
    pub fn accrue(&mut self, fees: FeeBalances) -> CoreResult<FeeSplit> {
        let split = self.distribution.split(fees)?;

        let buyback_asset = self.buyback_asset.checked_add(&split.asset_buyback)?;
        let buyback_numeraire = self.buyback_numeraire.checked_add(&split.numeraire_buyback)?;
        let beneficiary = self.beneficiary.checked_add(&split.beneficiary)?;
        let lp = self.lp.checked_add(&split.lp)?;

        self.buyback_asset = buyback_asset;
        self.buyback_numeraire = buyback_numeraire;
        self.beneficiary = beneficiary;
        self.lp = lp;

        debug!(
            amount0 = %fees.amount0,
            amount1 = %fees.amount1,
            lp0 = %split.lp.amount0,
            lp1 = %split.lp.amount1,
            "fees accrued"
        );
        Ok(split)
    }

    pub fn beneficiary_fees(&self) -> FeeBalances {
        self.beneficiary
    }

    pub fn lp_fees(&self) -> FeeBalances {
        self.lp
    }

    /// Pending buyback buckets as (asset, numeraire)
    pub fn buyback_fees(&self) -> (FeeBalances, FeeBalances) {
        (self.buyback_asset, self.buyback_numeraire)
    }

    pub fn take_beneficiary_fees(&mut self) -> FeeBalances {
        std::mem::take(&mut self.beneficiary)
    }

    pub fn take_lp_fees(&mut self) -> FeeBalances {
        std::mem::take(&mut self.lp)
    }

    /// Drain both buyback buckets as (asset, numeraire)
    pub fn take_buyback_fees(&mut self) -> (FeeBalances, FeeBalances) {
        (
            std::mem::take(&mut self.buyback_asset),
            std::mem::take(&mut self.buyback_numeraire),
        )
    }

    /// Drain the LP bucket and size the swap that balances it at
    /// `sqrt_price_x96`. On error the bucket is left untouched.
    pub fn plan_lp_reinvestment<O: QuoteOracle + ?Sized>(
        &mut self,
        oracle: &O,
        key: &PoolKey,
        sqrt_price_x96: U256,
        config: &RebalanceConfig,
    ) -> CoreResult<(FeeBalances, RebalanceOutcome)> {
        let outcome = rebalance_fees_with_config(oracle, key, self.lp, sqrt_price_x96, config)?;
        let drained = self.take_lp_fees();
        debug!(
            amount0 = %drained.amount0,
            amount1 = %drained.amount1,
            swap = outcome.should_swap(),
            "lp reinvestment planned"
        );
        Ok((drained, outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Q96;
    use crate::oracle::SingleRangeQuoter;

    const PCT: u64 = 10_000_000_000_000_000; // 1%

    fn pct(n: u64) -> U256 {
        U256::from(n * PCT)
    }

    fn pair(amount0: u64, amount1: u64) -> FeeBalances {
        FeeBalances::new(U256::from(amount0), U256::from(amount1))
    }

    #[test]
    fn test_distribution_must_sum_to_wad() {
        assert!(FeeDistribution::new(pct(10), pct(10), pct(30), pct(50)).is_ok());
        assert_eq!(
            FeeDistribution::new(pct(10), pct(10), pct(30), pct(49)).unwrap_err(),
            DopplerCoreError::InvalidFeeDistribution(pct(99))
        );
        assert!(FeeDistribution::all_to_lp().validate().is_ok());
    }

    #[test]
    fn test_split_floors_and_lp_takes_remainder() {
        let distribution = FeeDistribution::new(pct(33), pct(33), pct(33), pct(1)).unwrap();
        let split = distribution.split(pair(10, 7)).unwrap();

        assert_eq!(split.asset_buyback, pair(3, 2));
        assert_eq!(split.numeraire_buyback, pair(3, 2));
        assert_eq!(split.beneficiary, pair(3, 2));
        assert_eq!(split.lp, pair(1, 1));
        assert_eq!(split.total().unwrap(), pair(10, 7));
    }

    #[test]
    fn test_split_of_max_amounts() {
        let distribution = FeeDistribution::new(pct(25), pct(25), pct(25), pct(25)).unwrap();
        let fees = FeeBalances::new(U256::MAX, U256::MAX);
        let split = distribution.split(fees).unwrap();
        assert_eq!(split.total().unwrap(), fees);
    }

    #[test]
    fn test_accumulator_take_drains() {
        let distribution = FeeDistribution::new(pct(10), pct(20), pct(30), pct(40)).unwrap();
        let mut acc = FeeAccumulator::new(distribution).unwrap();

        acc.accrue(pair(100, 1000)).unwrap();
        acc.accrue(pair(100, 1000)).unwrap();

        assert_eq!(acc.beneficiary_fees(), pair(60, 600));
        assert_eq!(acc.take_beneficiary_fees(), pair(60, 600));
        assert_eq!(acc.beneficiary_fees(), FeeBalances::ZERO);

        let (asset, numeraire) = acc.take_buyback_fees();
        assert_eq!(asset, pair(20, 200));
        assert_eq!(numeraire, pair(40, 400));
        assert_eq!(acc.buyback_fees(), (FeeBalances::ZERO, FeeBalances::ZERO));

        assert_eq!(acc.take_lp_fees(), pair(80, 800));
        assert!(acc.lp_fees().is_zero());
    }

    #[test]
    fn test_accrue_overflow_leaves_buckets_untouched() {
        let mut acc = FeeAccumulator::new(FeeDistribution::all_to_lp()).unwrap();
        acc.accrue(FeeBalances::new(U256::MAX, U256::ZERO)).unwrap();
        assert!(acc.accrue(pair(1, 1)).is_err());
        assert_eq!(acc.lp_fees(), FeeBalances::new(U256::MAX, U256::ZERO));
    }

    #[test]
    fn test_plan_lp_reinvestment() {
        let quoter = SingleRangeQuoter::full_range(Q96, 1_000_000_000_000_000_000_000, 0).unwrap();
        let mut acc = FeeAccumulator::new(FeeDistribution::all_to_lp()).unwrap();
        acc.accrue(pair(1_000_000_000_000_000_000, 0)).unwrap();

        let (drained, outcome) = acc
            .plan_lp_reinvestment(&quoter, &PoolKey::default(), Q96, &RebalanceConfig::default())
            .unwrap();

        assert_eq!(drained, pair(1_000_000_000_000_000_000, 0));
        assert!(outcome.should_swap());
        assert!(acc.lp_fees().is_zero());
    }

    #[test]
    fn test_plan_lp_reinvestment_keeps_fees_on_error() {
        let quoter = SingleRangeQuoter::full_range(Q96, 1_000_000_000_000_000_000_000, 0).unwrap();
        let mut acc = FeeAccumulator::new(FeeDistribution::all_to_lp()).unwrap();
        acc.accrue(pair(500, 0)).unwrap();

        assert!(acc
            .plan_lp_reinvestment(&quoter, &PoolKey::default(), U256::ZERO, &RebalanceConfig::default())
            .is_err());
        assert_eq!(acc.lp_fees(), pair(500, 0));
    }
}
