//! Vesting schedules and per-beneficiary allocations

use alloy_primitives::U256;

#[cfg(feature = "client")]
use serde::{Deserialize, Serialize};

use crate::errors::{CoreResult, DopplerCoreError};
use crate::math::big_int::mul_div_down;

/// Cliff and duration in seconds, both relative to the ledger start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct VestingSchedule {
    pub cliff: u64,
    pub duration: u64,
}

impl VestingSchedule {
    pub fn new(cliff: u64, duration: u64) -> Self {
        Self { cliff, duration }
    }

    /// Schedule that vests everything at start
    pub fn immediate() -> Self {
        Self::default()
    }

    pub fn validate(&self, schedule_id: u64) -> CoreResult<()> {
        if self.cliff > self.duration {
            return Err(DopplerCoreError::InvalidSchedule {
                schedule_id,
                cliff: self.cliff,
                duration: self.duration,
            });
        }
        Ok(())
    }

    /// Amount of `total` vested `elapsed` seconds after start.
    ///
    /// The cliff only gates the result to zero; once past it the amount
    /// ramps linearly from start, so crossing the cliff releases
    /// `total * cliff / duration` at once. Rounds down.
    pub fn vested_amount(&self, total: U256, elapsed: u64) -> CoreResult<U256> {
        if self.duration == 0 {
            return Ok(total);
        }
        if elapsed < self.cliff {
            return Ok(U256::ZERO);
        }
        if elapsed >= self.duration {
            return Ok(total);
        }
        mul_div_down(total, U256::from(elapsed), U256::from(self.duration))
    }
}

/// One beneficiary's stake in one schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "client", derive(Serialize, Deserialize))]
pub struct VestingAllocation {
    pub total_amount: U256,
    pub released_amount: U256,
}

impl VestingAllocation {
    pub fn new(total_amount: U256) -> Self {
        Self {
            total_amount,
            released_amount: U256::ZERO,
        }
    }

    /// Vested but not yet released
    pub fn releasable(&self, schedule: &VestingSchedule, elapsed: u64) -> CoreResult<U256> {
        let vested = schedule.vested_amount(self.total_amount, elapsed)?;
        Ok(vested.saturating_sub(self.released_amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cliff_schedule() {
        let schedule = VestingSchedule::new(100, 1000);
        let total = U256::from(1000u16);

        assert_eq!(schedule.vested_amount(total, 0).unwrap(), U256::ZERO);
        assert_eq!(schedule.vested_amount(total, 50).unwrap(), U256::ZERO);
        assert_eq!(schedule.vested_amount(total, 99).unwrap(), U256::ZERO);
        assert_eq!(schedule.vested_amount(total, 100).unwrap(), U256::from(100u16));
        assert_eq!(schedule.vested_amount(total, 500).unwrap(), U256::from(500u16));
        assert_eq!(schedule.vested_amount(total, 1000).unwrap(), total);
        assert_eq!(schedule.vested_amount(total, u64::MAX).unwrap(), total);
    }

    #[test]
    fn test_zero_duration_vests_immediately() {
        let schedule = VestingSchedule::immediate();
        let total = U256::from(500u16);
        assert_eq!(schedule.vested_amount(total, 0).unwrap(), total);
        assert_eq!(schedule.vested_amount(total, 12345).unwrap(), total);
    }

    #[test]
    fn test_rounds_down() {
        let schedule = VestingSchedule::new(0, 3);
        assert_eq!(
            schedule.vested_amount(U256::from(10u8), 1).unwrap(),
            U256::from(3u8)
        );
        assert_eq!(
            schedule.vested_amount(U256::from(10u8), 2).unwrap(),
            U256::from(6u8)
        );
    }

    #[test]
    fn test_huge_totals() {
        let schedule = VestingSchedule::new(0, 2);
        assert_eq!(
            schedule.vested_amount(U256::MAX, 1).unwrap(),
            U256::MAX >> 1usize
        );
    }

    #[test]
    fn test_validate() {
        assert!(VestingSchedule::new(10, 10).validate(0).is_ok());
        assert_eq!(
            VestingSchedule::new(11, 10).validate(3).unwrap_err(),
            DopplerCoreError::InvalidSchedule {
                schedule_id: 3,
                cliff: 11,
                duration: 10
            }
        );
    }

    #[test]
    fn test_releasable() {
        let schedule = VestingSchedule::new(0, 100);
        let mut allocation = VestingAllocation::new(U256::from(100u8));
        assert_eq!(allocation.releasable(&schedule, 40).unwrap(), U256::from(40u8));

        allocation.released_amount = U256::from(40u8);
        assert_eq!(allocation.releasable(&schedule, 40).unwrap(), U256::ZERO);
        assert_eq!(allocation.releasable(&schedule, 70).unwrap(), U256::from(30u8));
    }
}
