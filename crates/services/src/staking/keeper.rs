// Path: crates/services/src/staking/keeper.rs
//! Storage access for the validator registry, delegations and the epoch queue.

use crate::epoching::EpochQueue;
use epochstake_api::bank::BankKeeper;
use epochstake_api::epoch::EpochClock;
use epochstake_api::hooks::MultiStakingHooks;
use epochstake_api::state::{get_decoded, put_encoded, StateAccess};
use epochstake_types::app::{
    AccountId, ConsensusAddress, Delegation, EpochAction, Redelegation, UnbondingDelegation,
    Validator, ValidatorAddress,
};
use epochstake_types::config::StakingParams;
use epochstake_types::error::StakingError;
use epochstake_types::keys::{
    delegation_key, redelegation_by_dst_key, redelegation_key, redelegations_into_prefix,
    unbonding_delegation_key, validator_by_cons_addr_key, validator_key,
    validator_power_index_key,
};
use epochstake_types::Result;
use std::fmt;
use std::sync::Arc;

/// Owns the staking parameters and the collaborators every staking
/// operation needs.
#[derive(Clone)]
pub struct Keeper {
    params: StakingParams,
    bank: Arc<dyn BankKeeper>,
    hooks: MultiStakingHooks,
    epochs: Arc<dyn EpochClock>,
    queue: EpochQueue<EpochAction>,
}

impl fmt::Debug for Keeper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keeper")
            .field("params", &self.params)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

impl Keeper {
    pub fn new(
        params: StakingParams,
        bank: Arc<dyn BankKeeper>,
        hooks: MultiStakingHooks,
        epochs: Arc<dyn EpochClock>,
    ) -> Self {
        Self {
            params,
            bank,
            hooks,
            epochs,
            queue: EpochQueue::new(),
        }
    }

    pub fn params(&self) -> &StakingParams {
        &self.params
    }

    /// The only denomination accepted for bonding.
    pub fn bond_denom(&self) -> &str {
        &self.params.bond_denom
    }

    pub fn bank(&self) -> &dyn BankKeeper {
        self.bank.as_ref()
    }

    pub fn hooks(&self) -> &MultiStakingHooks {
        &self.hooks
    }

    pub fn epochs(&self) -> &dyn EpochClock {
        self.epochs.as_ref()
    }

    pub fn queue(&self) -> &EpochQueue<EpochAction> {
        &self.queue
    }

    /// Appends `action` to the queue of `epoch`. Storage faults are the only
    /// failure.
    pub fn save_epoch_action(
        &self,
        state: &mut dyn StateAccess,
        epoch: u64,
        action: &EpochAction,
    ) -> Result<u64> {
        let id = self.queue.push(state, epoch, action)?;
        log::debug!(
            "[Staking] Queued {} action {} under epoch {}",
            action.kind(),
            id,
            epoch
        );
        Ok(id)
    }

    // --- Validators ---

    pub fn get_validator(
        &self,
        state: &dyn StateAccess,
        operator: &ValidatorAddress,
    ) -> Result<Option<Validator>> {
        Ok(get_decoded(state, &validator_key(operator))?)
    }

    /// Like [`Keeper::get_validator`] but a missing validator is an error.
    pub fn must_get_validator(
        &self,
        state: &dyn StateAccess,
        operator: &ValidatorAddress,
    ) -> Result<Validator> {
        self.get_validator(state, operator)?
            .ok_or(StakingError::NoValidatorFound)
    }

    pub fn get_validator_by_cons_addr(
        &self,
        state: &dyn StateAccess,
        cons: &ConsensusAddress,
    ) -> Result<Option<Validator>> {
        match get_decoded::<ValidatorAddress>(state, &validator_by_cons_addr_key(cons))? {
            Some(operator) => self.get_validator(state, &operator),
            None => Ok(None),
        }
    }

    pub fn set_validator(&self, state: &mut dyn StateAccess, validator: &Validator) -> Result<()> {
        put_encoded(state, &validator_key(&validator.operator_address), validator)?;
        Ok(())
    }

    pub fn set_validator_by_cons_addr(
        &self,
        state: &mut dyn StateAccess,
        validator: &Validator,
    ) -> Result<()> {
        put_encoded(
            state,
            &validator_by_cons_addr_key(&validator.consensus_address()),
            &validator.operator_address,
        )?;
        Ok(())
    }

    fn power_index_key(&self, validator: &Validator) -> Vec<u8> {
        validator_power_index_key(
            validator.potential_consensus_power(self.params.power_reduction),
            &validator.operator_address,
        )
    }

    /// Inserts a validator into the power ranking at its current tokens.
    pub fn set_new_validator_by_power_index(
        &self,
        state: &mut dyn StateAccess,
        validator: &Validator,
    ) -> Result<()> {
        state.insert(
            &self.power_index_key(validator),
            validator.operator_address.as_ref(),
        )?;
        Ok(())
    }

    pub fn delete_validator_by_power_index(
        &self,
        state: &mut dyn StateAccess,
        validator: &Validator,
    ) -> Result<()> {
        state.delete(&self.power_index_key(validator))?;
        Ok(())
    }

    /// Removes a validator and both of its index entries.
    pub fn remove_validator(&self, state: &mut dyn StateAccess, validator: &Validator) -> Result<()> {
        state.delete(&validator_key(&validator.operator_address))?;
        state.delete(&validator_by_cons_addr_key(&validator.consensus_address()))?;
        self.delete_validator_by_power_index(state, validator)?;
        log::info!(
            "[Staking] Removed validator {} with no remaining shares",
            validator.operator_address
        );
        Ok(())
    }

    // --- Delegations ---

    pub fn get_delegation(
        &self,
        state: &dyn StateAccess,
        delegator: &AccountId,
        validator: &ValidatorAddress,
    ) -> Result<Option<Delegation>> {
        Ok(get_decoded(state, &delegation_key(delegator, validator))?)
    }

    pub fn set_delegation(&self, state: &mut dyn StateAccess, delegation: &Delegation) -> Result<()> {
        put_encoded(
            state,
            &delegation_key(&delegation.delegator_address, &delegation.validator_address),
            delegation,
        )?;
        Ok(())
    }

    pub fn remove_delegation(
        &self,
        state: &mut dyn StateAccess,
        delegation: &Delegation,
    ) -> Result<()> {
        state.delete(&delegation_key(
            &delegation.delegator_address,
            &delegation.validator_address,
        ))?;
        Ok(())
    }

    pub fn get_unbonding_delegation(
        &self,
        state: &dyn StateAccess,
        delegator: &AccountId,
        validator: &ValidatorAddress,
    ) -> Result<Option<UnbondingDelegation>> {
        Ok(get_decoded(
            state,
            &unbonding_delegation_key(delegator, validator),
        )?)
    }

    pub fn set_unbonding_delegation(
        &self,
        state: &mut dyn StateAccess,
        ubd: &UnbondingDelegation,
    ) -> Result<()> {
        put_encoded(
            state,
            &unbonding_delegation_key(&ubd.delegator_address, &ubd.validator_address),
            ubd,
        )?;
        Ok(())
    }

    pub fn get_redelegation(
        &self,
        state: &dyn StateAccess,
        delegator: &AccountId,
        src: &ValidatorAddress,
        dst: &ValidatorAddress,
    ) -> Result<Option<Redelegation>> {
        Ok(get_decoded(state, &redelegation_key(delegator, src, dst))?)
    }

    /// Stores a redelegation together with its destination index entry.
    pub fn set_redelegation(&self, state: &mut dyn StateAccess, red: &Redelegation) -> Result<()> {
        put_encoded(
            state,
            &redelegation_key(
                &red.delegator_address,
                &red.validator_src_address,
                &red.validator_dst_address,
            ),
            red,
        )?;
        put_encoded(
            state,
            &redelegation_by_dst_key(
                &red.delegator_address,
                &red.validator_src_address,
                &red.validator_dst_address,
            ),
            &red.validator_src_address,
        )?;
        Ok(())
    }

    /// Returns true if `delegator` has an immature redelegation into `validator`.
    pub fn has_receiving_redelegation(
        &self,
        state: &dyn StateAccess,
        delegator: &AccountId,
        validator: &ValidatorAddress,
        now: u64,
    ) -> Result<bool> {
        let prefix = redelegations_into_prefix(delegator, validator);
        let mut sources = Vec::new();
        for item in state.prefix_scan(&prefix)? {
            let (_key, value) = item?;
            let src: ValidatorAddress = epochstake_types::codec::from_bytes_canonical(&value)
                .map_err(epochstake_types::error::StateError::Decode)?;
            sources.push(src);
        }
        for src in sources {
            if let Some(red) = self.get_redelegation(state, delegator, &src, validator)? {
                if red.has_immature_entry(now) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}
