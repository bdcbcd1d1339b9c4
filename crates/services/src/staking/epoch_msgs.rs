// Path: crates/services/src/staking/epoch_msgs.rs
//! Applies queued staking requests against a context.
//!
//! The executor calls these at the epoch boundary. The redelegate and
//! undelegate handlers also call them on a projected context to learn the
//! completion time a request would get.

use super::keeper::Keeper;
use epochstake_api::context::Context;
use epochstake_types::app::{
    pools, AccountId, Coin, EpochAction, MsgBeginRedelegate, MsgCreateValidator, MsgDelegate,
    MsgEditValidator, MsgUndelegate, StakingEvent, ValidatorAddress,
};
use epochstake_types::error::StakingError;
use epochstake_types::Result;

impl Keeper {
    fn ensure_bond_denom(&self, coin: &Coin) -> Result<()> {
        if coin.denom != self.bond_denom() {
            return Err(StakingError::BadDenom {
                got: coin.denom.clone(),
                expected: self.bond_denom().to_string(),
            });
        }
        Ok(())
    }

    /// Dispatches one queued action.
    pub fn apply_epoch_action(&self, ctx: &mut Context<'_>, action: &EpochAction) -> Result<()> {
        match action {
            EpochAction::CreateValidator(msg) => self.epoch_create_validator(ctx, msg),
            EpochAction::EditValidator(msg) => self.epoch_edit_validator(ctx, msg),
            EpochAction::Delegate(msg) => self.epoch_delegate(ctx, msg),
            EpochAction::BeginRedelegate(msg) => self.epoch_begin_redelegate(ctx, msg).map(|_| ()),
            EpochAction::Undelegate(msg) => self.epoch_undelegate(ctx, msg).map(|_| ()),
        }
    }

    /// Bonds the escrowed initial self delegation of a registered validator.
    pub fn epoch_create_validator(
        &self,
        ctx: &mut Context<'_>,
        msg: &MsgCreateValidator,
    ) -> Result<()> {
        let (operator, delegator) = msg.self_delegator()?;
        self.ensure_bond_denom(&msg.value)?;

        let mut validator = self.must_get_validator(ctx.state(), &operator)?;
        let new_shares = self.delegate(
            ctx,
            &delegator,
            msg.value.amount,
            pools::EPOCH_TEMP_POOL,
            &mut validator,
        )?;
        ctx.emit(StakingEvent::Delegate {
            validator: msg.validator_address.clone(),
            amount: msg.value.clone(),
            new_shares,
        });
        Ok(())
    }

    /// Applies a description, commission or minimum self delegation change.
    pub fn epoch_edit_validator(&self, ctx: &mut Context<'_>, msg: &MsgEditValidator) -> Result<()> {
        let operator: ValidatorAddress = msg.validator_address.parse()?;
        let mut validator = self.must_get_validator(ctx.state(), &operator)?;

        let description = validator.description.update(&msg.description)?;

        if let Some(rate) = msg.commission_rate_bps {
            validator
                .commission
                .validate_new_rate(rate, ctx.block_time())?;
            validator.commission.rates.rate_bps = rate;
            validator.commission.update_time = ctx.block_time();
        }

        if let Some(min_self) = msg.min_self_delegation {
            if min_self <= validator.min_self_delegation {
                return Err(StakingError::MinSelfDelegationDecreased);
            }
            if min_self > validator.tokens {
                return Err(StakingError::SelfDelegationBelowMinimum);
            }
            validator.min_self_delegation = min_self;
        }

        validator.description = description;
        self.set_validator(ctx.state_mut(), &validator)?;
        ctx.emit(StakingEvent::EditValidator {
            validator: msg.validator_address.clone(),
            commission_rate_bps: validator.commission.rates.rate_bps,
            min_self_delegation: validator.min_self_delegation,
        });
        Ok(())
    }

    /// Bonds escrowed tokens to the requested validator.
    pub fn epoch_delegate(&self, ctx: &mut Context<'_>, msg: &MsgDelegate) -> Result<()> {
        let delegator: AccountId = msg.delegator_address.parse()?;
        let operator: ValidatorAddress = msg.validator_address.parse()?;
        self.ensure_bond_denom(&msg.amount)?;

        let mut validator = self.must_get_validator(ctx.state(), &operator)?;
        let new_shares = self.delegate(
            ctx,
            &delegator,
            msg.amount.amount,
            pools::EPOCH_TEMP_POOL,
            &mut validator,
        )?;
        ctx.emit(StakingEvent::Delegate {
            validator: msg.validator_address.clone(),
            amount: msg.amount.clone(),
            new_shares,
        });
        Ok(())
    }

    /// Runs a redelegation and returns its completion time.
    pub fn epoch_begin_redelegate(
        &self,
        ctx: &mut Context<'_>,
        msg: &MsgBeginRedelegate,
    ) -> Result<u64> {
        let delegator: AccountId = msg.delegator_address.parse()?;
        let src: ValidatorAddress = msg.validator_src_address.parse()?;
        let dst: ValidatorAddress = msg.validator_dst_address.parse()?;
        self.ensure_bond_denom(&msg.amount)?;

        let shares = self.validate_unbond_amount(ctx, &delegator, &src, msg.amount.amount)?;
        let (completion_time, amount) =
            self.begin_redelegation(ctx, &delegator, &src, &dst, shares)?;
        ctx.emit(StakingEvent::Redelegate {
            source_validator: msg.validator_src_address.clone(),
            destination_validator: msg.validator_dst_address.clone(),
            amount: Coin::new(self.bond_denom(), amount),
            completion_time,
        });
        Ok(completion_time)
    }

    /// Runs an undelegation and returns its completion time.
    pub fn epoch_undelegate(&self, ctx: &mut Context<'_>, msg: &MsgUndelegate) -> Result<u64> {
        let delegator: AccountId = msg.delegator_address.parse()?;
        let operator: ValidatorAddress = msg.validator_address.parse()?;
        self.ensure_bond_denom(&msg.amount)?;

        let shares = self.validate_unbond_amount(ctx, &delegator, &operator, msg.amount.amount)?;
        let (completion_time, amount) = self.undelegate(ctx, &delegator, &operator, shares)?;
        ctx.emit(StakingEvent::Unbond {
            validator: msg.validator_address.clone(),
            amount: Coin::new(self.bond_denom(), amount),
            completion_time,
        });
        Ok(completion_time)
    }
}
