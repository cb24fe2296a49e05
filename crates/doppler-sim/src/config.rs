use std::fs;
use std::path::Path;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use doppler_core::{
    FeeBalances, FeeDistribution, PoolKey, PreMintLimits, RebalanceConfig, SingleRangeQuoter, VestingParams,
    VestingSchedule, MAX_PRE_MINT_PER_ADDRESS_WAD, MAX_REBALANCE_ITERATIONS, MAX_TOTAL_PRE_MINT_WAD, MAX_TICK,
    MIN_TICK, Q96, WAD,
};

use crate::error::{SimError, SimResult};

/// Scenario configuration loaded from a TOML file.
/// 256-bit amounts and addresses are written as strings; amounts accept
/// decimal or `0x` hex.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SimConfig {
    pub pool: PoolConfig,
    pub fees: FeesConfig,
    pub rebalance: SolverConfig,
    pub distribution: DistributionConfig,
    pub vesting: VestingConfig,
}

/// Pool the rebalance quotes against, modelled as a single liquidity range
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PoolConfig {
    #[serde(with = "string_serde")]
    pub currency0: Address,
    #[serde(with = "string_serde")]
    pub currency1: Address,
    #[serde(with = "string_serde")]
    pub sqrt_price_x96: U256,
    #[serde(with = "string_serde")]
    pub liquidity: u128,
    pub tick_lower: i32,
    pub tick_upper: i32,
    /// Swap fee in pips (1e-6)
    pub fee_pips: u32,
    pub tick_spacing: i32,
}

/// Fees collected by the hook before distribution
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct FeesConfig {
    #[serde(with = "string_serde")]
    pub amount0: U256,
    #[serde(with = "string_serde")]
    pub amount1: U256,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SolverConfig {
    /// Tolerance in token units
    pub epsilon: u64,
    pub max_iterations: u32,
}

/// WAD shares; must sum to 1e18
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct DistributionConfig {
    #[serde(with = "string_serde")]
    pub asset_buyback_wad: U256,
    #[serde(with = "string_serde")]
    pub numeraire_buyback_wad: U256,
    #[serde(with = "string_serde")]
    pub beneficiary_wad: U256,
    #[serde(with = "string_serde")]
    pub lp_wad: U256,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct VestingConfig {
    #[serde(with = "string_serde")]
    pub custodian: Address,
    pub start: u64,
    #[serde(with = "string_serde")]
    pub initial_supply: U256,
    #[serde(with = "string_serde")]
    pub max_pre_mint_per_address_wad: U256,
    #[serde(with = "string_serde")]
    pub max_total_pre_mint_wad: U256,
    pub schedules: Vec<ScheduleConfig>,
    pub allocations: Vec<AllocationConfig>,
    /// Release calls replayed in order
    #[serde(default)]
    pub releases: Vec<ReleaseConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ScheduleConfig {
    pub cliff: u64,
    pub duration: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AllocationConfig {
    #[serde(with = "string_serde")]
    pub beneficiary: Address,
    pub schedule_id: u64,
    #[serde(with = "string_serde")]
    pub amount: U256,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ReleaseConfig {
    /// Wall-clock timestamp of the call
    pub at: u64,
    #[serde(with = "string_serde")]
    pub beneficiary: Address,
    /// Release one schedule, or all of them when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_id: Option<u64>,
}

impl SimConfig {
    /// Load configuration from TOML file
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| SimError::io(path.display().to_string(), e))?;

        let config: SimConfig = toml::from_str(&content)?;
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> SimResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| SimError::io(path.display().to_string(), e))?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SimResult<()> {
        self.pool.validate()?;
        self.rebalance_config().validate()?;
        self.fee_distribution()?;
        self.pre_mint_limits().validate()?;

        if self.vesting.custodian == Address::ZERO {
            return Err(SimError::invalid_config("vesting.custodian must not be the zero address"));
        }
        for (id, schedule) in self.vesting.schedules.iter().enumerate() {
            if schedule.cliff > schedule.duration {
                return Err(SimError::invalid_config(format!(
                    "vesting.schedules[{}]: cliff {} exceeds duration {}",
                    id, schedule.cliff, schedule.duration
                )));
            }
        }

        let schedule_count = self.vesting.schedules.len() as u64;
        for release in &self.vesting.releases {
            if let Some(id) = release.schedule_id {
                if id >= schedule_count {
                    return Err(SimError::invalid_config(format!(
                        "release at {} references unknown schedule {}",
                        release.at, id
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn pool_key(&self) -> PoolKey {
        PoolKey::new(
            self.pool.currency0,
            self.pool.currency1,
            self.pool.fee_pips,
            self.pool.tick_spacing,
            Address::ZERO,
        )
    }

    pub fn quoter(&self) -> SimResult<SingleRangeQuoter> {
        Ok(SingleRangeQuoter::new(
            self.pool.sqrt_price_x96,
            self.pool.liquidity,
            self.pool.tick_lower,
            self.pool.tick_upper,
            self.pool.fee_pips,
        )?)
    }

    pub fn collected_fees(&self) -> FeeBalances {
        FeeBalances::new(self.fees.amount0, self.fees.amount1)
    }

    pub fn rebalance_config(&self) -> RebalanceConfig {
        RebalanceConfig {
            epsilon: u128::from(self.rebalance.epsilon),
            max_iterations: self.rebalance.max_iterations,
        }
    }

    pub fn fee_distribution(&self) -> SimResult<FeeDistribution> {
        let d = &self.distribution;
        Ok(FeeDistribution::new(
            d.asset_buyback_wad,
            d.numeraire_buyback_wad,
            d.beneficiary_wad,
            d.lp_wad,
        )?)
    }

    pub fn pre_mint_limits(&self) -> PreMintLimits {
        PreMintLimits {
            max_pre_mint_per_address_wad: self.vesting.max_pre_mint_per_address_wad,
            max_total_pre_mint_wad: self.vesting.max_total_pre_mint_wad,
        }
    }

    pub fn vesting_params(&self) -> VestingParams {
        let v = &self.vesting;
        VestingParams {
            start: v.start,
            schedules: v
                .schedules
                .iter()
                .map(|s| VestingSchedule::new(s.cliff, s.duration))
                .collect(),
            beneficiaries: v.allocations.iter().map(|a| a.beneficiary).collect(),
            schedule_ids: v.allocations.iter().map(|a| a.schedule_id).collect(),
            amounts: v.allocations.iter().map(|a| a.amount).collect(),
            initial_supply: v.initial_supply,
            limits: self.pre_mint_limits(),
        }
    }
}

impl PoolConfig {
    fn validate(&self) -> SimResult<()> {
        if self.currency0 == self.currency1 {
            return Err(SimError::invalid_config("pool currencies must differ"));
        }
        if self.tick_lower < MIN_TICK || self.tick_upper > MAX_TICK || self.tick_lower >= self.tick_upper {
            return Err(SimError::invalid_config(format!(
                "pool range [{}, {}] is not a valid tick range",
                self.tick_lower, self.tick_upper
            )));
        }
        if self.tick_spacing <= 0 {
            return Err(SimError::invalid_config("pool.tick_spacing must be positive"));
        }
        if self.liquidity == 0 {
            return Err(SimError::invalid_config("pool.liquidity must be greater than 0"));
        }
        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        let ten_pct = WAD / U256::from(10u8);
        Self {
            pool: PoolConfig {
                currency0: Address::repeat_byte(0x11),
                currency1: Address::repeat_byte(0x22),
                sqrt_price_x96: Q96,
                liquidity: 1_000_000_000_000_000_000_000,
                tick_lower: MIN_TICK,
                tick_upper: MAX_TICK,
                fee_pips: 3000, // 0.30%
                tick_spacing: 60,
            },
            fees: FeesConfig {
                amount0: U256::from(2_000_000_000_000_000_000u64),
                amount1: U256::from(500_000_000_000_000_000u64),
            },
            rebalance: SolverConfig {
                epsilon: 1_000_000,
                max_iterations: MAX_REBALANCE_ITERATIONS,
            },
            distribution: DistributionConfig {
                asset_buyback_wad: ten_pct,
                numeraire_buyback_wad: ten_pct,
                beneficiary_wad: ten_pct * U256::from(3u8),
                lp_wad: ten_pct * U256::from(5u8),
            },
            vesting: VestingConfig {
                custodian: Address::repeat_byte(0xd0),
                start: 1_700_000_000,
                initial_supply: U256::from(1_000_000_000_000_000_000_000_000u128),
                max_pre_mint_per_address_wad: MAX_PRE_MINT_PER_ADDRESS_WAD,
                max_total_pre_mint_wad: MAX_TOTAL_PRE_MINT_WAD,
                schedules: vec![
                    ScheduleConfig {
                        cliff: 90 * 86_400,
                        duration: 365 * 86_400,
                    },
                    ScheduleConfig { cliff: 0, duration: 0 },
                ],
                allocations: vec![
                    AllocationConfig {
                        beneficiary: Address::repeat_byte(0xa1),
                        schedule_id: 0,
                        amount: U256::from(100_000_000_000_000_000_000_000u128),
                    },
                    AllocationConfig {
                        beneficiary: Address::repeat_byte(0xa1),
                        schedule_id: 1,
                        amount: U256::from(10_000_000_000_000_000_000_000u128),
                    },
                    AllocationConfig {
                        beneficiary: Address::repeat_byte(0xb2),
                        schedule_id: 0,
                        amount: U256::from(50_000_000_000_000_000_000_000u128),
                    },
                ],
                releases: vec![
                    ReleaseConfig {
                        at: 1_700_000_000 + 30 * 86_400,
                        beneficiary: Address::repeat_byte(0xa1),
                        schedule_id: None,
                    },
                    ReleaseConfig {
                        at: 1_700_000_000 + 180 * 86_400,
                        beneficiary: Address::repeat_byte(0xb2),
                        schedule_id: Some(0),
                    },
                    ReleaseConfig {
                        at: 1_700_000_000 + 180 * 86_400,
                        beneficiary: Address::repeat_byte(0xb2),
                        schedule_id: Some(0),
                    },
                ],
            },
        }
    }
}

/// Write the default scenario to `path`
pub fn create_example_config(path: impl AsRef<Path>) -> SimResult<()> {
    SimConfig::default().save(path)
}

// Values that round-trip through their Display/FromStr forms
mod string_serde {
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.trim().parse::<T>().map_err(serde::de::Error::custom)
    }
}
