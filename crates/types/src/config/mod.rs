// Path: crates/types/src/config/mod.rs

//! Configuration structures for the staking and epoch modules.

use serde::{Deserialize, Serialize};

/// Parameters of the staking keeper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingParams {
    /// The only denomination accepted for bonding.
    #[serde(default = "default_bond_denom")]
    pub bond_denom: String,
    /// The unbonding period in seconds.
    #[serde(default = "default_unbonding_time_secs")]
    pub unbonding_time_secs: u64,
    /// The maximum number of concurrent unbonding or redelegation entries per tuple.
    #[serde(default = "default_max_entries")]
    pub max_entries: u32,
    /// The number of base units per unit of consensus power.
    #[serde(default = "default_power_reduction")]
    pub power_reduction: u128,
}

fn default_bond_denom() -> String {
    "stake".to_string()
}
fn default_unbonding_time_secs() -> u64 {
    21 * 24 * 60 * 60 // 21 days
}
fn default_max_entries() -> u32 {
    7
}
fn default_power_reduction() -> u128 {
    1_000_000
}

impl Default for StakingParams {
    fn default() -> Self {
        Self {
            bond_denom: default_bond_denom(),
            unbonding_time_secs: default_unbonding_time_secs(),
            max_entries: default_max_entries(),
            power_reduction: default_power_reduction(),
        }
    }
}

/// Parameters of the epoch clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochParams {
    /// The number of blocks in one epoch. Boundaries fall on multiples of this value.
    #[serde(default = "default_epoch_length_blocks")]
    pub epoch_length_blocks: u64,
    /// The expected block interval, used to project the time of the next boundary.
    #[serde(default = "default_expected_block_time_secs")]
    pub expected_block_time_secs: u64,
}

fn default_epoch_length_blocks() -> u64 {
    10
}
fn default_expected_block_time_secs() -> u64 {
    5
}

impl Default for EpochParams {
    fn default() -> Self {
        Self {
            epoch_length_blocks: default_epoch_length_blocks(),
            expected_block_time_secs: default_expected_block_time_secs(),
        }
    }
}

/// Top-level configuration of the staking module as loaded from a node config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingModuleConfig {
    /// Staking keeper parameters.
    #[serde(default)]
    pub staking: StakingParams,
    /// Epoch clock parameters.
    #[serde(default)]
    pub epochs: EpochParams,
}
