// Path: crates/services/src/staking/delegation.rs
//! Share accounting for delegate, unbond, undelegate and redelegate.
//!
//! These operations run at epoch time (or against a projected context when a
//! handler needs a completion time). They move tokens between the staking
//! pools and keep the validator, delegation and power-index records in step.

use super::keeper::Keeper;
use epochstake_api::context::Context;
use epochstake_api::hooks::StakingHooks;
use epochstake_types::app::{
    pools, AccountId, BondStatus, Coin, Delegation, Redelegation, RedelegationEntry,
    UnbondingDelegation, UnbondingDelegationEntry, Validator, ValidatorAddress,
};
use epochstake_types::error::StakingError;
use epochstake_types::Result;

/// The pool holding a validator's tokens for its bond status.
fn pool_for(status: BondStatus) -> &'static str {
    match status {
        BondStatus::Bonded => pools::BONDED_POOL,
        BondStatus::Unbonding | BondStatus::Unbonded => pools::NOT_BONDED_POOL,
    }
}

impl Keeper {
    fn move_between_pools(
        &self,
        ctx: &mut Context<'_>,
        from: &str,
        to: &str,
        amount: u128,
    ) -> Result<()> {
        if from == to || amount == 0 {
            return Ok(());
        }
        let coins = [Coin::new(self.bond_denom(), amount)];
        self.bank()
            .send_coins_from_module_to_module(ctx.state_mut(), from, to, &coins)?;
        Ok(())
    }

    /// Bonds `amount` tokens held in `source_pool` to `validator` on behalf of
    /// `delegator` and returns the shares issued.
    ///
    /// The updated validator is written back and re-ranked in the power index.
    pub fn delegate(
        &self,
        ctx: &mut Context<'_>,
        delegator: &AccountId,
        amount: u128,
        source_pool: &str,
        validator: &mut Validator,
    ) -> Result<u128> {
        if validator.tokens == 0 && validator.delegator_shares > 0 {
            return Err(StakingError::DelegatorShareExRateInvalid);
        }

        let mut delegation = self
            .get_delegation(ctx.state(), delegator, &validator.operator_address)?
            .unwrap_or(Delegation {
                delegator_address: *delegator,
                validator_address: validator.operator_address,
                shares: 0,
            });

        self.move_between_pools(ctx, source_pool, pool_for(validator.status), amount)?;

        if !validator.jailed {
            self.delete_validator_by_power_index(ctx.state_mut(), validator)?;
        }
        let new_shares = validator.add_tokens_from_del(amount)?;
        self.set_validator(ctx.state_mut(), validator)?;
        if !validator.jailed {
            self.set_new_validator_by_power_index(ctx.state_mut(), validator)?;
        }

        delegation.shares = delegation
            .shares
            .checked_add(new_shares)
            .ok_or(StakingError::Overflow("delegation shares"))?;
        self.set_delegation(ctx.state_mut(), &delegation)?;
        self.hooks()
            .after_delegation_modified(ctx, delegator, &validator.operator_address);

        log::debug!(
            "[Staking] {} delegated {} to {} for {} shares",
            delegator,
            amount,
            validator.operator_address,
            new_shares
        );
        Ok(new_shares)
    }

    /// Converts a token amount into the shares to unbond, checking that the
    /// delegation holds enough of them.
    pub fn validate_unbond_amount(
        &self,
        ctx: &Context<'_>,
        delegator: &AccountId,
        operator: &ValidatorAddress,
        amount: u128,
    ) -> Result<u128> {
        let validator = self.must_get_validator(ctx.state(), operator)?;
        let delegation = self
            .get_delegation(ctx.state(), delegator, operator)?
            .ok_or(StakingError::NoDelegation)?;

        let shares = validator.shares_from_tokens(amount)?;
        let truncated = validator.shares_from_tokens_truncated(amount)?;
        if truncated > delegation.shares {
            return Err(StakingError::BadSharesAmount);
        }
        // Rounding up may overshoot by a fraction of a share.
        Ok(shares.min(delegation.shares))
    }

    /// Removes `shares` from a delegation and returns the tokens they were worth.
    ///
    /// Jails the operator when its self delegation drops below the minimum and
    /// removes an unbonded validator left without shares.
    pub fn unbond(
        &self,
        ctx: &mut Context<'_>,
        delegator: &AccountId,
        operator: &ValidatorAddress,
        shares: u128,
    ) -> Result<u128> {
        let mut delegation = self
            .get_delegation(ctx.state(), delegator, operator)?
            .ok_or(StakingError::NoDelegation)?;
        if shares > delegation.shares {
            return Err(StakingError::BadSharesAmount);
        }
        let mut validator = self.must_get_validator(ctx.state(), operator)?;

        delegation.shares -= shares;

        let is_self_delegation = AccountId::from(*operator) == *delegator;
        if is_self_delegation
            && !validator.jailed
            && validator.tokens_from_shares(delegation.shares)? < validator.min_self_delegation
        {
            log::warn!(
                "[Staking] Jailing {}: self delegation fell below the minimum",
                operator
            );
            self.delete_validator_by_power_index(ctx.state_mut(), &validator)?;
            validator.jailed = true;
        }

        if delegation.shares == 0 {
            self.remove_delegation(ctx.state_mut(), &delegation)?;
        } else {
            self.set_delegation(ctx.state_mut(), &delegation)?;
            self.hooks()
                .after_delegation_modified(ctx, delegator, operator);
        }

        if !validator.jailed {
            self.delete_validator_by_power_index(ctx.state_mut(), &validator)?;
        }
        let amount = validator.remove_del_shares(shares)?;

        if validator.delegator_shares == 0 && validator.is_unbonded() {
            self.remove_validator(ctx.state_mut(), &validator)?;
        } else {
            self.set_validator(ctx.state_mut(), &validator)?;
            if !validator.jailed {
                self.set_new_validator_by_power_index(ctx.state_mut(), &validator)?;
            }
        }
        Ok(amount)
    }

    /// Unbonds `shares` and records an unbonding entry.
    ///
    /// Returns the completion time and the number of tokens unbonding.
    pub fn undelegate(
        &self,
        ctx: &mut Context<'_>,
        delegator: &AccountId,
        operator: &ValidatorAddress,
        shares: u128,
    ) -> Result<(u64, u128)> {
        let validator = self.must_get_validator(ctx.state(), operator)?;

        let mut ubd = self
            .get_unbonding_delegation(ctx.state(), delegator, operator)?
            .unwrap_or(UnbondingDelegation {
                delegator_address: *delegator,
                validator_address: *operator,
                entries: Vec::new(),
            });
        if ubd.entries.len() >= self.params().max_entries as usize {
            return Err(StakingError::MaxUnbondingDelegationEntries);
        }

        let amount = self.unbond(ctx, delegator, operator, shares)?;
        if validator.is_bonded() {
            self.move_between_pools(ctx, pools::BONDED_POOL, pools::NOT_BONDED_POOL, amount)?;
        }

        let completion_time = ctx
            .block_time()
            .saturating_add(self.params().unbonding_time_secs);
        ubd.entries.push(UnbondingDelegationEntry {
            creation_height: ctx.block_height(),
            completion_time,
            initial_balance: amount,
            balance: amount,
        });
        self.set_unbonding_delegation(ctx.state_mut(), &ubd)?;
        Ok((completion_time, amount))
    }

    /// Moves `shares` from `src` to `dst` and returns the completion time and
    /// the tokens moved.
    ///
    /// The completion time depends on the source validator: a bonded source
    /// matures after the unbonding period, an unbonding source when the
    /// validator finishes unbonding, and an unbonded source immediately, in
    /// which case no redelegation record is kept.
    pub fn begin_redelegation(
        &self,
        ctx: &mut Context<'_>,
        delegator: &AccountId,
        src: &ValidatorAddress,
        dst: &ValidatorAddress,
        shares: u128,
    ) -> Result<(u64, u128)> {
        if src == dst {
            return Err(StakingError::SelfRedelegation);
        }
        if self.get_validator(ctx.state(), dst)?.is_none() {
            return Err(StakingError::BadRedelegationDst);
        }
        let src_validator = self.must_get_validator(ctx.state(), src)?;

        let now = ctx.block_time();
        if self.has_receiving_redelegation(ctx.state(), delegator, src, now)? {
            return Err(StakingError::TransitiveRedelegation);
        }

        let mut red = self
            .get_redelegation(ctx.state(), delegator, src, dst)?
            .unwrap_or(Redelegation {
                delegator_address: *delegator,
                validator_src_address: *src,
                validator_dst_address: *dst,
                entries: Vec::new(),
            });
        if red.entries.len() >= self.params().max_entries as usize {
            return Err(StakingError::MaxRedelegationEntries);
        }

        let amount = self.unbond(ctx, delegator, src, shares)?;
        if amount == 0 {
            return Err(StakingError::TinyRedelegationAmount);
        }

        let mut dst_validator = self.must_get_validator(ctx.state(), dst)?;
        let shares_dst = self.delegate(
            ctx,
            delegator,
            amount,
            pool_for(src_validator.status),
            &mut dst_validator,
        )?;

        let completion_time = match src_validator.status {
            BondStatus::Bonded => now.saturating_add(self.params().unbonding_time_secs),
            BondStatus::Unbonding => src_validator.unbonding_time,
            BondStatus::Unbonded => now,
        };
        if completion_time <= now {
            return Ok((completion_time, amount));
        }

        red.entries.push(RedelegationEntry {
            creation_height: ctx.block_height(),
            completion_time,
            initial_balance: amount,
            shares_dst,
        });
        self.set_redelegation(ctx.state_mut(), &red)?;
        Ok((completion_time, amount))
    }
}
