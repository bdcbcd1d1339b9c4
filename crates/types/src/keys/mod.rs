// Path: crates/types/src/keys/mod.rs
//! Defines constants for well-known state keys.
//!
//! These constants provide a single source of truth for the keys used by the
//! staking keeper, the epoch queue and the reference bank. Composite keys are
//! built with the helpers below so that every writer and reader agrees on the
//! byte layout.

use crate::app::{AccountId, ConsensusAddress, ValidatorAddress};

/// The state key prefix for validator records, keyed by operator address.
pub const VALIDATOR_KEY_PREFIX: &[u8] = b"staking::validator::";
/// The state key prefix for the consensus-address index.
pub const VALIDATOR_BY_CONS_ADDR_PREFIX: &[u8] = b"staking::validator_by_cons::";
/// The state key prefix for the power-ranking index.
pub const VALIDATOR_POWER_INDEX_PREFIX: &[u8] = b"staking::power::";
/// The state key prefix for delegations, keyed by delegator then validator.
pub const DELEGATION_KEY_PREFIX: &[u8] = b"staking::delegation::";
/// The state key prefix for unbonding delegations.
pub const UNBONDING_DELEGATION_KEY_PREFIX: &[u8] = b"staking::ubd::";
/// The state key prefix for redelegations, keyed by delegator, source, destination.
pub const REDELEGATION_KEY_PREFIX: &[u8] = b"staking::red::";
/// The state key prefix for the redelegation index keyed by destination validator.
pub const REDELEGATION_BY_DST_PREFIX: &[u8] = b"staking::red_by_dst::";

/// The state key for the active epoch number.
pub const EPOCH_NUMBER_KEY: &[u8] = b"epoch::number";
/// The state key prefix for queued epoch actions, keyed by epoch then action id.
pub const EPOCH_ACTION_QUEUE_PREFIX: &[u8] = b"epoch::queue::";
/// The state key for the next epoch action id.
pub const EPOCH_NEXT_ACTION_ID_KEY: &[u8] = b"epoch::next_action_id";

/// The state key prefix for account balances, keyed by address then denomination.
pub const BALANCE_KEY_PREFIX: &[u8] = b"bank::balance::";

/// Key of a validator record.
pub fn validator_key(operator: &ValidatorAddress) -> Vec<u8> {
    [VALIDATOR_KEY_PREFIX, operator.as_ref()].concat()
}

/// Key of the consensus-address index entry.
pub fn validator_by_cons_addr_key(cons: &ConsensusAddress) -> Vec<u8> {
    [VALIDATOR_BY_CONS_ADDR_PREFIX, cons.as_ref()].concat()
}

/// Key of a power-index entry. Power is big-endian so a prefix scan is ordered
/// by ascending power, then by operator address.
pub fn validator_power_index_key(power: u64, operator: &ValidatorAddress) -> Vec<u8> {
    [
        VALIDATOR_POWER_INDEX_PREFIX,
        &power.to_be_bytes(),
        operator.as_ref(),
    ]
    .concat()
}

/// Key of a delegation.
pub fn delegation_key(delegator: &AccountId, validator: &ValidatorAddress) -> Vec<u8> {
    [DELEGATION_KEY_PREFIX, delegator.as_ref(), validator.as_ref()].concat()
}

/// Key of an unbonding delegation.
pub fn unbonding_delegation_key(delegator: &AccountId, validator: &ValidatorAddress) -> Vec<u8> {
    [
        UNBONDING_DELEGATION_KEY_PREFIX,
        delegator.as_ref(),
        validator.as_ref(),
    ]
    .concat()
}

/// Key of a redelegation.
pub fn redelegation_key(
    delegator: &AccountId,
    src: &ValidatorAddress,
    dst: &ValidatorAddress,
) -> Vec<u8> {
    [
        REDELEGATION_KEY_PREFIX,
        delegator.as_ref(),
        src.as_ref(),
        dst.as_ref(),
    ]
    .concat()
}

/// Key of the destination index of a redelegation.
pub fn redelegation_by_dst_key(
    delegator: &AccountId,
    src: &ValidatorAddress,
    dst: &ValidatorAddress,
) -> Vec<u8> {
    [
        REDELEGATION_BY_DST_PREFIX,
        dst.as_ref(),
        delegator.as_ref(),
        src.as_ref(),
    ]
    .concat()
}

/// Prefix of all incoming redelegations of `delegator` into `dst`.
pub fn redelegations_into_prefix(delegator: &AccountId, dst: &ValidatorAddress) -> Vec<u8> {
    [REDELEGATION_BY_DST_PREFIX, dst.as_ref(), delegator.as_ref()].concat()
}

/// Prefix of every action queued under `epoch`.
pub fn epoch_queue_prefix(epoch: u64) -> Vec<u8> {
    [EPOCH_ACTION_QUEUE_PREFIX, &epoch.to_be_bytes()].concat()
}

/// Key of one queued action.
pub fn epoch_action_key(epoch: u64, action_id: u64) -> Vec<u8> {
    [
        EPOCH_ACTION_QUEUE_PREFIX,
        &epoch.to_be_bytes(),
        &action_id.to_be_bytes(),
    ]
    .concat()
}

/// Key of an account balance for one denomination.
pub fn balance_key(account: &AccountId, denom: &str) -> Vec<u8> {
    [BALANCE_KEY_PREFIX, account.as_ref(), b"::", denom.as_bytes()].concat()
}
