//! Scenario runs driven by a [`SimConfig`]

use alloy_primitives::{Address, U256};
use serde::Serialize;
use tracing::{info, warn};

use doppler_core::{
    FeeAccumulator, FeeBalances, FeeSplit, InMemoryToken, RebalanceOutcome, VestingLedger,
};

use crate::config::SimConfig;
use crate::error::SimResult;

#[derive(Debug, Clone, Serialize)]
pub struct RebalanceReport {
    pub collected: FeeBalances,
    pub split: FeeSplit,
    /// LP share handed to the solver
    pub lp_fees: FeeBalances,
    pub outcome: RebalanceOutcome,
}

/// Split the configured fees and plan the LP reinvestment swap
pub fn run_rebalance(config: &SimConfig) -> SimResult<RebalanceReport> {
    let quoter = config.quoter()?;
    let key = config.pool_key();
    let collected = config.collected_fees();

    let mut accumulator = FeeAccumulator::new(config.fee_distribution()?)?;
    let split = accumulator.accrue(collected)?;
    let (lp_fees, outcome) = accumulator.plan_lp_reinvestment(
        &quoter,
        &key,
        config.pool.sqrt_price_x96,
        &config.rebalance_config(),
    )?;

    match &outcome {
        RebalanceOutcome::Swap(swap) => info!(
            zero_for_one = swap.zero_for_one,
            amount_in = %swap.amount_in,
            amount_out = %swap.amount_out,
            converged = swap.converged,
            "rebalance swap planned"
        ),
        RebalanceOutcome::AlreadyBalanced => info!("lp fees already balanced"),
        RebalanceOutcome::NoSwapFound => warn!("no rebalance swap improves the lp fees"),
    }

    Ok(RebalanceReport {
        collected,
        split,
        lp_fees,
        outcome,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct ReleaseStep {
    pub at: u64,
    pub beneficiary: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub released: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VestingReport {
    pub vested_total_amount: U256,
    pub released_total: U256,
    pub custody_balance: U256,
    pub steps: Vec<ReleaseStep>,
}

/// Build the ledger and replay the configured releases. A release that
/// fails is recorded in its step; the run stops only if the accounting
/// invariants break.
pub fn run_vesting(config: &SimConfig) -> SimResult<VestingReport> {
    let mut ledger = VestingLedger::new(config.vesting.custodian, config.vesting_params(), InMemoryToken::new())?;
    let mut steps = Vec::with_capacity(config.vesting.releases.len());

    for release in &config.vesting.releases {
        let result = match release.schedule_id {
            Some(id) => ledger.release_for(release.beneficiary, id, release.at),
            None => ledger.release_all_for(release.beneficiary, release.at),
        };

        let (released, error) = match result {
            Ok(amount) => (Some(amount), None),
            Err(err) if err.is_no_releasable_amount() => (None, Some(err.to_string())),
            Err(err) => {
                warn!(%err, beneficiary = %release.beneficiary, "release failed");
                (None, Some(err.to_string()))
            }
        };

        ledger.check_invariants(release.at)?;
        steps.push(ReleaseStep {
            at: release.at,
            beneficiary: release.beneficiary,
            schedule_id: release.schedule_id,
            released,
            error,
        });
    }

    info!(
        releases = steps.len(),
        released_total = %ledger.released_total(),
        "vesting scenario complete"
    );

    Ok(VestingReport {
        vested_total_amount: ledger.vested_total_amount(),
        released_total: ledger.released_total(),
        custody_balance: ledger.custody_balance(),
        steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rebalance_scenario() {
        let config = SimConfig::default();
        let report = run_rebalance(&config).unwrap();

        assert_eq!(report.split.total().unwrap(), report.collected);
        assert_eq!(report.lp_fees, report.split.lp);
        // Half of 2e18 token0 against half of 0.5e18 token1 at price 1
        let swap = report.outcome.swap().expect("expected a swap");
        assert!(swap.zero_for_one);
        assert!(swap.amount_in < report.lp_fees.amount0);
    }

    #[test]
    fn test_default_vesting_scenario() {
        let config = SimConfig::default();
        let report = run_vesting(&config).unwrap();

        assert_eq!(report.steps.len(), 3);
        // Only the immediate schedule has vested a month in
        assert_eq!(
            report.steps[0].released,
            Some(U256::from(10_000_000_000_000_000_000_000u128))
        );
        assert!(report.steps[1].released.is_some());
        assert!(report.steps[2].released.is_none());
        assert!(report.steps[2].error.is_some());
        assert_eq!(
            report.custody_balance,
            report.vested_total_amount - report.released_total
        );
    }
}
