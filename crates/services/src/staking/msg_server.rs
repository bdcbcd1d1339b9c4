// Path: crates/services/src/staking/msg_server.rs
//! Staking request handlers.
//!
//! Every handler turns a request into a queued [`EpochAction`]. Nothing takes
//! effect on validators or delegations until the epoch executor drains the
//! queue. Handlers that must answer with a completion time compute it by
//! running the action against a projection of the next epoch boundary, which
//! is always discarded.

use super::keeper::Keeper;
use epochstake_api::context::Context;
use epochstake_api::hooks::StakingHooks;
use epochstake_types::app::{
    pools, AccountId, Commission, EpochAction, MsgBeginRedelegate, MsgBeginRedelegateResponse,
    MsgCreateValidator, MsgCreateValidatorResponse, MsgDelegate, MsgDelegateResponse,
    MsgEditValidator, MsgEditValidatorResponse, MsgUndelegate, MsgUndelegateResponse,
    StakingEvent, Validator, IMMEDIATE_EPOCH, STAKING_MODULE_NAME,
};
use epochstake_types::error::StakingError;
use epochstake_types::Result;

/// Handles staking requests on behalf of a [`Keeper`].
#[derive(Debug, Clone, Copy)]
pub struct MsgServer<'k> {
    keeper: &'k Keeper,
}

impl<'k> MsgServer<'k> {
    pub fn new(keeper: &'k Keeper) -> Self {
        Self { keeper }
    }

    /// Registers a validator, escrows its initial bond and queues the bond for
    /// the current epoch.
    ///
    /// The funding account must be the operator's own account. All checks run
    /// before anything is written. The registry writes, the
    /// escrow transfer and the queue append are staged in one projection that
    /// is committed only if all of them succeed.
    pub fn create_validator(
        &self,
        ctx: &mut Context<'_>,
        msg: MsgCreateValidator,
    ) -> Result<MsgCreateValidatorResponse> {
        let keeper = self.keeper;
        let (operator, delegator) = msg.self_delegator()?;

        if keeper.get_validator(ctx.state(), &operator)?.is_some() {
            return Err(StakingError::ValidatorOwnerExists);
        }
        let cons_addr = msg.pubkey.consensus_address();
        if keeper
            .get_validator_by_cons_addr(ctx.state(), &cons_addr)?
            .is_some()
        {
            return Err(StakingError::ValidatorPubKeyExists);
        }

        if msg.value.denom != keeper.bond_denom() {
            return Err(StakingError::BadDenom {
                got: msg.value.denom.clone(),
                expected: keeper.bond_denom().to_string(),
            });
        }

        msg.description.ensure_length()?;

        if let Some(allowed) = ctx
            .consensus_params()
            .and_then(|p| p.allowed_pub_key_types())
        {
            let key_type = msg.pubkey.key_type.as_str();
            if !allowed.iter().any(|t| t == key_type) {
                return Err(StakingError::PubKeyTypeNotSupported {
                    got: key_type.to_string(),
                    allowed: allowed.to_vec(),
                });
            }
        }

        let mut validator = Validator::new(operator, msg.pubkey.clone(), msg.description.clone())?
            .set_initial_commission(Commission::with_time(msg.commission, ctx.block_time()))?;
        validator.min_self_delegation = msg.min_self_delegation;

        let epoch = keeper.epochs().epoch_number(ctx)?;
        let action = EpochAction::CreateValidator(msg.clone());

        let (changes, hook_events) = {
            let mut cache = ctx.cache_context();
            let hook_events = {
                let mut staged = cache.context();
                keeper.set_validator(staged.state_mut(), &validator)?;
                keeper.set_validator_by_cons_addr(staged.state_mut(), &validator)?;
                keeper.set_new_validator_by_power_index(staged.state_mut(), &validator)?;
                keeper
                    .hooks()
                    .after_validator_created(&mut staged, &operator);

                keeper.bank().delegate_coins_from_account_to_module(
                    staged.state_mut(),
                    &delegator,
                    pools::EPOCH_TEMP_POOL,
                    std::slice::from_ref(&msg.value),
                )?;
                keeper.save_epoch_action(staged.state_mut(), epoch, &action)?;
                staged.take_events()
            };
            (cache.into_change_set(), hook_events)
        };
        let (inserts, deletes) = changes;
        ctx.state_mut().batch_apply(&inserts, &deletes)?;

        ctx.emit_events(hook_events);
        ctx.emit(StakingEvent::CreateValidator {
            validator: msg.validator_address.clone(),
            amount: msg.value.clone(),
        });
        ctx.emit(StakingEvent::Message {
            module: STAKING_MODULE_NAME.to_string(),
            sender: msg.delegator_address.clone(),
        });

        tracing::info!(
            target: "staking",
            validator = %operator,
            amount = %msg.value,
            epoch,
            "validator registered; initial bond queued"
        );
        Ok(MsgCreateValidatorResponse {})
    }

    /// Queues a validator edit for the current epoch. The edit is checked only
    /// when it is applied.
    pub fn edit_validator(
        &self,
        ctx: &mut Context<'_>,
        msg: MsgEditValidator,
    ) -> Result<MsgEditValidatorResponse> {
        let epoch = self.keeper.epochs().epoch_number(ctx)?;
        let validator = msg.validator_address.clone();
        self.keeper
            .save_epoch_action(ctx.state_mut(), epoch, &EpochAction::EditValidator(msg))?;
        tracing::info!(target: "staking", %validator, epoch, "validator edit queued");
        Ok(MsgEditValidatorResponse {})
    }

    /// Escrows the delegated amount and queues the delegation for the current
    /// epoch.
    pub fn delegate(&self, ctx: &mut Context<'_>, msg: MsgDelegate) -> Result<MsgDelegateResponse> {
        let keeper = self.keeper;
        let delegator: AccountId = msg.delegator_address.parse()?;

        if msg.amount.denom != keeper.bond_denom() {
            return Err(StakingError::BadDenom {
                got: msg.amount.denom.clone(),
                expected: keeper.bond_denom().to_string(),
            });
        }

        keeper.bank().delegate_coins_from_account_to_module(
            ctx.state_mut(),
            &delegator,
            pools::EPOCH_TEMP_POOL,
            std::slice::from_ref(&msg.amount),
        )?;

        let epoch = keeper.epochs().epoch_number(ctx)?;
        keeper.save_epoch_action(ctx.state_mut(), epoch, &EpochAction::Delegate(msg.clone()))?;

        ctx.emit(StakingEvent::DelegationQueued {
            validator: msg.validator_address.clone(),
            amount: msg.amount.clone(),
            epoch,
        });
        tracing::info!(
            target: "staking",
            delegator = %delegator,
            validator = %msg.validator_address,
            amount = %msg.amount,
            epoch,
            "delegation escrowed and queued"
        );
        Ok(MsgDelegateResponse {})
    }

    /// Queues a redelegation for the current epoch and answers with the
    /// completion time it would get at the next epoch boundary.
    ///
    /// The action stays queued even when the projection fails.
    pub fn begin_redelegate(
        &self,
        ctx: &mut Context<'_>,
        msg: MsgBeginRedelegate,
    ) -> Result<MsgBeginRedelegateResponse> {
        let keeper = self.keeper;
        let epoch = keeper.epochs().epoch_number(ctx)?;
        keeper.save_epoch_action(
            ctx.state_mut(),
            epoch,
            &EpochAction::BeginRedelegate(msg.clone()),
        )?;

        let completion_time = self.project(ctx, |staged| {
            keeper.epoch_begin_redelegate(staged, &msg)
        })?;
        tracing::info!(
            target: "staking",
            src = %msg.validator_src_address,
            dst = %msg.validator_dst_address,
            amount = %msg.amount,
            completion_time,
            "redelegation queued"
        );
        Ok(MsgBeginRedelegateResponse { completion_time })
    }

    /// Queues an undelegation for the next drain and answers with the
    /// completion time it would get at the next epoch boundary.
    ///
    /// Undelegations skip the current epoch's queue and go to the immediate
    /// queue, which the executor drains first.
    pub fn undelegate(
        &self,
        ctx: &mut Context<'_>,
        msg: MsgUndelegate,
    ) -> Result<MsgUndelegateResponse> {
        let keeper = self.keeper;
        keeper.save_epoch_action(
            ctx.state_mut(),
            IMMEDIATE_EPOCH,
            &EpochAction::Undelegate(msg.clone()),
        )?;

        let completion_time =
            self.project(ctx, |staged| keeper.epoch_undelegate(staged, &msg))?;
        tracing::info!(
            target: "staking",
            validator = %msg.validator_address,
            amount = %msg.amount,
            completion_time,
            "undelegation queued"
        );
        Ok(MsgUndelegateResponse { completion_time })
    }

    /// Runs `f` against a throwaway projection of `ctx` moved to the next epoch
    /// boundary.
    fn project<T>(
        &self,
        ctx: &Context<'_>,
        f: impl FnOnce(&mut Context<'_>) -> Result<T>,
    ) -> Result<T> {
        let epochs = self.keeper.epochs();
        let mut cache = ctx
            .cache_context()
            .with_block_height(epochs.next_epoch_height(ctx))
            .with_block_time(epochs.next_epoch_time(ctx));
        let mut staged = cache.context();
        let result = f(&mut staged);
        if let Err(e) = &result {
            log::debug!("[Staking] Projection at the next epoch failed: {}", e);
        }
        result
    }
}
