pub mod config;
pub mod error;
pub mod scenario;

pub use config::{create_example_config, SimConfig};
pub use error::{SimError, SimResult};
pub use scenario::{run_rebalance, run_vesting, RebalanceReport, VestingReport};
