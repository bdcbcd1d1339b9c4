// Path: crates/services/src/staking/mod.rs
//! The epoch-batched staking module.
//!
//! Requests arrive through [`StakingModule::handle_service_call`], are checked
//! with [`ValidateBasic`], and are handed to the [`MsgServer`], which escrows
//! funds and queues the work. [`StakingModule::on_end_block`] drains the queue
//! through the [`EpochExecutor`] whenever a block closes an epoch.

mod delegation;
mod epoch_msgs;
mod executor;
mod keeper;
mod msg_server;

#[cfg(test)]
mod tests;

pub use executor::{EpochExecutor, EpochReport};
pub use keeper::Keeper;
pub use msg_server::MsgServer;

use crate::epoching::EpochKeeper;
use epochstake_api::bank::BankKeeper;
use epochstake_api::context::Context;
use epochstake_api::epoch::EpochClock;
use epochstake_api::hooks::MultiStakingHooks;
use epochstake_types::app::{
    MsgBeginRedelegate, MsgCreateValidator, MsgDelegate, MsgEditValidator, MsgUndelegate,
    ValidateBasic,
};
use epochstake_types::codec;
use epochstake_types::config::StakingModuleConfig;
use epochstake_types::error::StakingError;
use epochstake_types::Result;
use parity_scale_codec::{Decode, Encode};
use std::sync::Arc;

/// The staking module: keeper, epoch clock and service surface.
#[derive(Debug, Clone)]
pub struct StakingModule {
    keeper: Keeper,
    epochs: Arc<EpochKeeper>,
}

impl StakingModule {
    pub fn new(
        config: StakingModuleConfig,
        bank: Arc<dyn BankKeeper>,
        hooks: MultiStakingHooks,
    ) -> Self {
        let epochs = Arc::new(EpochKeeper::new(config.epochs));
        let clock: Arc<dyn EpochClock> = epochs.clone();
        let keeper = Keeper::new(config.staking, bank, hooks, clock);
        Self { keeper, epochs }
    }

    pub fn keeper(&self) -> &Keeper {
        &self.keeper
    }

    pub fn epochs(&self) -> &EpochKeeper {
        &self.epochs
    }

    pub fn msg_server(&self) -> MsgServer<'_> {
        MsgServer::new(&self.keeper)
    }

    pub fn executor(&self) -> EpochExecutor<'_> {
        EpochExecutor::new(&self.keeper, &self.epochs)
    }

    /// Decodes a SCALE request for `method`, runs it and returns the SCALE
    /// encoded response.
    pub fn handle_service_call(
        &self,
        ctx: &mut Context<'_>,
        method: &str,
        params: &[u8],
    ) -> Result<Vec<u8>> {
        let server = self.msg_server();
        match method {
            "create_validator@v1" => {
                let msg: MsgCreateValidator = decode_checked(params)?;
                encode(&server.create_validator(ctx, msg)?)
            }
            "edit_validator@v1" => {
                let msg: MsgEditValidator = decode_checked(params)?;
                encode(&server.edit_validator(ctx, msg)?)
            }
            "delegate@v1" => {
                let msg: MsgDelegate = decode_checked(params)?;
                encode(&server.delegate(ctx, msg)?)
            }
            "begin_redelegate@v1" => {
                let msg: MsgBeginRedelegate = decode_checked(params)?;
                encode(&server.begin_redelegate(ctx, msg)?)
            }
            "undelegate@v1" => {
                let msg: MsgUndelegate = decode_checked(params)?;
                encode(&server.undelegate(ctx, msg)?)
            }
            _ => Err(StakingError::UnknownMethod(method.to_string())),
        }
    }

    /// Executes the queued actions if `ctx`'s block closes an epoch.
    pub fn on_end_block(&self, ctx: &mut Context<'_>) -> Result<Option<EpochReport>> {
        if !self.epochs.is_epoch_boundary(ctx) {
            return Ok(None);
        }
        log::info!(
            "[Staking OnEndBlock] Epoch boundary at height {}",
            ctx.block_height()
        );
        self.executor().execute_epoch(ctx).map(Some)
    }
}

fn decode_checked<T: Decode + ValidateBasic>(params: &[u8]) -> Result<T> {
    let msg: T = codec::from_bytes_canonical(params).map_err(StakingError::Deserialization)?;
    msg.validate_basic()?;
    Ok(msg)
}

fn encode<T: Encode>(response: &T) -> Result<Vec<u8>> {
    codec::to_bytes_canonical(response).map_err(StakingError::Serialization)
}
