// Path: crates/types/src/app/delegation.rs
use crate::app::{AccountId, ValidatorAddress};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Shares a delegator holds in one validator.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct Delegation {
    /// The delegating account.
    pub delegator_address: AccountId,
    /// The validator delegated to.
    pub validator_address: ValidatorAddress,
    /// The shares held.
    pub shares: u128,
}

/// One pending unbonding.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct UnbondingDelegationEntry {
    /// The height the unbonding started at.
    pub creation_height: u64,
    /// The time the tokens become liquid, in UNIX seconds.
    pub completion_time: u64,
    /// The tokens initially scheduled for release.
    pub initial_balance: u128,
    /// The tokens still to be released.
    pub balance: u128,
}

/// All pending unbondings of a delegator from one validator.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct UnbondingDelegation {
    /// The unbonding account.
    pub delegator_address: AccountId,
    /// The validator being left.
    pub validator_address: ValidatorAddress,
    /// The pending entries, oldest first.
    pub entries: Vec<UnbondingDelegationEntry>,
}

/// One pending redelegation.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct RedelegationEntry {
    /// The height the redelegation started at.
    pub creation_height: u64,
    /// The time the redelegation matures, in UNIX seconds.
    pub completion_time: u64,
    /// The tokens moved.
    pub initial_balance: u128,
    /// The shares created at the destination.
    pub shares_dst: u128,
}

/// All pending redelegations of a delegator between a source and destination.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct Redelegation {
    /// The redelegating account.
    pub delegator_address: AccountId,
    /// The source validator.
    pub validator_src_address: ValidatorAddress,
    /// The destination validator.
    pub validator_dst_address: ValidatorAddress,
    /// The pending entries, oldest first.
    pub entries: Vec<RedelegationEntry>,
}

impl Redelegation {
    /// Returns true if any entry has not matured at `now`.
    pub fn has_immature_entry(&self, now: u64) -> bool {
        self.entries.iter().any(|e| e.completion_time > now)
    }
}
