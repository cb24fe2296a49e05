//! Multi-schedule vesting ledger with a single pooled custody account.
//!
//! Allocations are keyed by `(beneficiary, schedule_id)`. Every release goes
//! through [`VestingLedger::settle`], which stages the new released amounts,
//! moves tokens out of custody and only then commits the staged state, so a
//! failed transfer leaves the ledger exactly as it was.

use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};
use tracing::{debug, info};

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

use super::custody::TokenCustody;
use super::schedule::{VestingAllocation, VestingSchedule};
use crate::config::PreMintLimits;
use crate::constants::WAD;
use crate::errors::{CoreResult, DopplerCoreError};
use crate::math::big_int::mul_div_down;
use crate::math::safe_math::{safe_add_u256, safe_sub_u256};

/// Construction input; the three allocation vectors are parallel
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct VestingParams {
    /// Timestamp every schedule is measured from
    pub start: u64,
    pub schedules: Vec<VestingSchedule>,
    pub beneficiaries: Vec<Address>,
    pub schedule_ids: Vec<u64>,
    pub amounts: Vec<U256>,
    /// Supply the pre-mint caps are fractions of
    pub initial_supply: U256,
    pub limits: PreMintLimits,
}

#[derive(Debug)]
pub struct VestingLedger<T: TokenCustody> {
    custodian: Address,
    start: u64,
    schedules: Vec<VestingSchedule>,
    allocations: BTreeMap<(Address, u64), VestingAllocation>,
    schedule_ids: BTreeMap<Address, Vec<u64>>,
    vested_total_amount: U256,
    released_total: U256,
    token: T,
}

impl<T: TokenCustody> VestingLedger<T> {
    /// Validate `params`, record the allocations and mint their sum into
    /// `custodian` on `token`.
    pub fn new(custodian: Address, params: VestingParams, mut token: T) -> CoreResult<Self> {
        let VestingParams {
            start,
            schedules,
            beneficiaries,
            schedule_ids: allocation_schedule_ids,
            amounts,
            initial_supply,
            limits,
        } = params;

        limits.validate()?;
        for (id, schedule) in schedules.iter().enumerate() {
            schedule.validate(id as u64)?;
        }

        if beneficiaries.len() != allocation_schedule_ids.len() || beneficiaries.len() != amounts.len() {
            return Err(DopplerCoreError::ArrayLengthsMismatch {
                beneficiaries: beneficiaries.len(),
                schedule_ids: allocation_schedule_ids.len(),
                amounts: amounts.len(),
            });
        }

        if custodian == Address::ZERO {
            return Err(DopplerCoreError::invalid_parameter("custodian", "zero address"));
        }
        if !token.balance_of(custodian).is_zero() {
            return Err(DopplerCoreError::invalid_parameter(
                "custodian",
                "custody account already holds tokens",
            ));
        }

        let per_address_cap = mul_div_down(initial_supply, limits.max_pre_mint_per_address_wad, WAD)?;
        let total_cap = mul_div_down(initial_supply, limits.max_total_pre_mint_wad, WAD)?;

        let mut allocations: BTreeMap<(Address, u64), VestingAllocation> = BTreeMap::new();
        let mut schedule_ids: BTreeMap<Address, Vec<u64>> = BTreeMap::new();
        let mut per_address: BTreeMap<Address, U256> = BTreeMap::new();
        let mut vested_total_amount = U256::ZERO;

        for ((&beneficiary, &schedule_id), &amount) in beneficiaries
            .iter()
            .zip(allocation_schedule_ids.iter())
            .zip(amounts.iter())
        {
            if schedule_id as usize >= schedules.len() {
                return Err(DopplerCoreError::UnknownScheduleId(schedule_id));
            }
            // Custody cannot pay itself: a self-transfer moves nothing
            if beneficiary == Address::ZERO || beneficiary == custodian || amount.is_zero() {
                return Err(DopplerCoreError::InvalidAllocation {
                    beneficiary,
                    schedule_id,
                });
            }

            let address_total = safe_add_u256(per_address.get(&beneficiary).copied().unwrap_or_default(), amount)?;
            if address_total > per_address_cap {
                return Err(DopplerCoreError::MaxPreMintPerAddressExceeded {
                    beneficiary,
                    amount: address_total,
                    cap: per_address_cap,
                });
            }
            per_address.insert(beneficiary, address_total);

            vested_total_amount = safe_add_u256(vested_total_amount, amount)?;
            if vested_total_amount > total_cap {
                return Err(DopplerCoreError::MaxTotalPreMintExceeded {
                    amount: vested_total_amount,
                    cap: total_cap,
                });
            }

            let allocation = allocations.entry((beneficiary, schedule_id)).or_default();
            if allocation.total_amount.is_zero() {
                schedule_ids.entry(beneficiary).or_default().push(schedule_id);
            }
            allocation.total_amount = safe_add_u256(allocation.total_amount, amount)?;
        }

        token.mint(custodian, vested_total_amount)?;

        info!(
            %custodian,
            start,
            schedules = schedules.len(),
            allocations = allocations.len(),
            %vested_total_amount,
            "vesting ledger initialized"
        );

        Ok(Self {
            custodian,
            start,
            schedules,
            allocations,
            schedule_ids,
            vested_total_amount,
            released_total: U256::ZERO,
            token,
        })
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn custodian(&self) -> Address {
        self.custodian
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn schedules(&self) -> &[VestingSchedule] {
        &self.schedules
    }

    pub fn schedule(&self, schedule_id: u64) -> CoreResult<&VestingSchedule> {
        usize::try_from(schedule_id)
            .ok()
            .and_then(|index| self.schedules.get(index))
            .ok_or(DopplerCoreError::UnknownScheduleId(schedule_id))
    }

    /// Schedule ids the beneficiary holds an allocation in, in first-seen order
    pub fn schedule_ids_of(&self, beneficiary: Address) -> &[u64] {
        self.schedule_ids
            .get(&beneficiary)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn allocation(&self, beneficiary: Address, schedule_id: u64) -> Option<&VestingAllocation> {
        self.allocations.get(&(beneficiary, schedule_id))
    }

    /// Sum of every allocation, minted into custody at construction
    pub fn vested_total_amount(&self) -> U256 {
        self.vested_total_amount
    }

    pub fn released_total(&self) -> U256 {
        self.released_total
    }

    pub fn custody_balance(&self) -> U256 {
        self.token.balance_of(self.custodian)
    }

    pub fn token(&self) -> &T {
        &self.token
    }

    pub fn token_mut(&mut self) -> &mut T {
        &mut self.token
    }

    /// Seconds since start; zero before start
    pub fn elapsed(&self, now: u64) -> u64 {
        now.saturating_sub(self.start)
    }

    pub fn vested_amount(&self, beneficiary: Address, schedule_id: u64, now: u64) -> CoreResult<U256> {
        let schedule = self.schedule(schedule_id)?;
        match self.allocation(beneficiary, schedule_id) {
            Some(allocation) => schedule.vested_amount(allocation.total_amount, self.elapsed(now)),
            None => Ok(U256::ZERO),
        }
    }

    /// Vested amount summed over every schedule the beneficiary holds
    pub fn vested_amount_of(&self, beneficiary: Address, now: u64) -> CoreResult<U256> {
        self.schedule_ids_of(beneficiary)
            .iter()
            .try_fold(U256::ZERO, |acc, &id| {
                safe_add_u256(acc, self.vested_amount(beneficiary, id, now)?)
            })
    }

    pub fn releasable_amount(&self, beneficiary: Address, schedule_id: u64, now: u64) -> CoreResult<U256> {
        let schedule = self.schedule(schedule_id)?;
        match self.allocation(beneficiary, schedule_id) {
            Some(allocation) => allocation.releasable(schedule, self.elapsed(now)),
            None => Ok(U256::ZERO),
        }
    }

    // ========================================================================
    // Releases
    // ========================================================================

    /// Release the caller's vested tokens on one schedule
    pub fn release(&mut self, caller: Address, schedule_id: u64, now: u64) -> CoreResult<U256> {
        self.settle(caller, &[schedule_id], now, false)
    }

    /// Release the caller's vested tokens across all of their schedules.
    /// Schedules with nothing releasable are skipped; fails with
    /// `NoReleasableAmount` only if every schedule is empty.
    pub fn release_all(&mut self, caller: Address, now: u64) -> CoreResult<U256> {
        let ids = self.schedule_ids_of(caller).to_vec();
        self.settle(caller, &ids, now, true)
    }

    /// Release on behalf of `beneficiary`; tokens go to the beneficiary
    pub fn release_for(&mut self, beneficiary: Address, schedule_id: u64, now: u64) -> CoreResult<U256> {
        self.settle(beneficiary, &[schedule_id], now, false)
    }

    /// Same as [`Self::release_all`] on behalf of `beneficiary`
    pub fn release_all_for(&mut self, beneficiary: Address, now: u64) -> CoreResult<U256> {
        let ids = self.schedule_ids_of(beneficiary).to_vec();
        self.settle(beneficiary, &ids, now, true)
    }

    /// The single place allocations are mutated. With `skip_empty`, schedules
    /// with nothing releasable are passed over; otherwise any such schedule
    /// fails the call. Fails with `NoReleasableAmount` if the total is zero.
    fn settle(&mut self, beneficiary: Address, schedule_ids: &[u64], now: u64, skip_empty: bool) -> CoreResult<U256> {
        let elapsed = self.elapsed(now);
        let mut staged: Vec<(u64, VestingAllocation)> = Vec::with_capacity(schedule_ids.len());
        let mut amount = U256::ZERO;

        for &schedule_id in schedule_ids {
            let schedule = self.schedule(schedule_id)?;
            let current = self
                .allocation(beneficiary, schedule_id)
                .copied()
                .unwrap_or_default();

            let available = current.releasable(schedule, elapsed)?;
            if available.is_zero() {
                if skip_empty {
                    continue;
                }
                return Err(DopplerCoreError::NoReleasableAmount { beneficiary });
            }

            let updated = VestingAllocation {
                total_amount: current.total_amount,
                released_amount: safe_add_u256(current.released_amount, available)?,
            };
            if updated.released_amount > updated.total_amount {
                return Err(DopplerCoreError::ReleasedExceedsTotal {
                    beneficiary,
                    schedule_id,
                    released: updated.released_amount,
                    total: updated.total_amount,
                });
            }

            amount = safe_add_u256(amount, available)?;
            staged.push((schedule_id, updated));
        }

        if amount.is_zero() {
            return Err(DopplerCoreError::NoReleasableAmount { beneficiary });
        }

        let released_total = safe_add_u256(self.released_total, amount)?;
        self.token.transfer(self.custodian, beneficiary, amount)?;

        for (schedule_id, updated) in staged {
            self.allocations.insert((beneficiary, schedule_id), updated);
        }
        self.released_total = released_total;

        debug!(%beneficiary, %amount, now, schedules = schedule_ids.len(), "vested tokens released");
        Ok(amount)
    }

    // ========================================================================
    // Invariants
    // ========================================================================

    /// Check the global accounting invariants at time `now`:
    /// no allocation is over-released, total released never exceeds what
    /// has vested, and custody holds exactly the unreleased remainder.
    pub fn check_invariants(&self, now: u64) -> CoreResult<()> {
        let elapsed = self.elapsed(now);
        let mut released = U256::ZERO;
        let mut vested = U256::ZERO;

        for (&(beneficiary, schedule_id), allocation) in &self.allocations {
            if allocation.released_amount > allocation.total_amount {
                return Err(DopplerCoreError::ReleasedExceedsTotal {
                    beneficiary,
                    schedule_id,
                    released: allocation.released_amount,
                    total: allocation.total_amount,
                });
            }
            let schedule = self.schedule(schedule_id)?;
            released = safe_add_u256(released, allocation.released_amount)?;
            vested = safe_add_u256(vested, schedule.vested_amount(allocation.total_amount, elapsed)?)?;
        }

        if released != self.released_total {
            return Err(DopplerCoreError::CustodyMismatch {
                expected: released,
                actual: self.released_total,
            });
        }
        if released > vested {
            return Err(DopplerCoreError::ReleasedExceedsVested { released, vested });
        }

        let expected = safe_sub_u256(self.vested_total_amount, released)?;
        let actual = self.custody_balance();
        if actual != expected {
            return Err(DopplerCoreError::CustodyMismatch { expected, actual });
        }
        Ok(())
    }
}
