// Path: crates/services/src/epoching/mod.rs
//! The epoch keeper: a block-count epoch schedule backed by a stored epoch number.

mod queue;

pub use queue::EpochQueue;

use epochstake_api::context::Context;
use epochstake_api::epoch::EpochClock;
use epochstake_api::state::{get_decoded, put_encoded, StateAccess};
use epochstake_types::app::FIRST_EPOCH;
use epochstake_types::config::EpochParams;
use epochstake_types::error::StateError;
use epochstake_types::keys::EPOCH_NUMBER_KEY;

/// Epochs are fixed runs of `epoch_length_blocks` blocks. Boundaries fall on
/// heights that are multiples of the length.
#[derive(Debug, Clone, Default)]
pub struct EpochKeeper {
    params: EpochParams,
}

impl EpochKeeper {
    pub fn new(params: EpochParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &EpochParams {
        &self.params
    }

    fn epoch_length(&self) -> u64 {
        self.params.epoch_length_blocks.max(1)
    }

    /// The stored epoch number, or [`FIRST_EPOCH`] before the first boundary.
    pub fn current_epoch(&self, state: &dyn StateAccess) -> Result<u64, StateError> {
        Ok(get_decoded::<u64>(state, EPOCH_NUMBER_KEY)?.unwrap_or(FIRST_EPOCH))
    }

    pub fn set_epoch_number(&self, state: &mut dyn StateAccess, epoch: u64) -> Result<(), StateError> {
        if epoch < FIRST_EPOCH {
            return Err(StateError::InvalidValue(format!(
                "epoch number {} is reserved",
                epoch
            )));
        }
        put_encoded(state, EPOCH_NUMBER_KEY, &epoch)
    }

    /// Advances the stored epoch number and returns the new value.
    pub fn increment_epoch_number(&self, state: &mut dyn StateAccess) -> Result<u64, StateError> {
        let next = self
            .current_epoch(state)?
            .checked_add(1)
            .ok_or_else(|| StateError::InvalidValue("epoch number overflow".into()))?;
        put_encoded(state, EPOCH_NUMBER_KEY, &next)?;
        log::info!("[Epoch] Advanced to epoch {}", next);
        Ok(next)
    }

    /// The first boundary strictly after `height`.
    pub fn next_boundary_after(&self, height: u64) -> u64 {
        let len = self.epoch_length();
        (height / len).saturating_add(1).saturating_mul(len)
    }
}

impl EpochClock for EpochKeeper {
    fn epoch_number(&self, ctx: &Context<'_>) -> Result<u64, StateError> {
        self.current_epoch(ctx.state())
    }

    fn next_epoch_height(&self, ctx: &Context<'_>) -> u64 {
        self.next_boundary_after(ctx.block_height())
    }

    fn next_epoch_time(&self, ctx: &Context<'_>) -> u64 {
        let blocks = self
            .next_epoch_height(ctx)
            .saturating_sub(ctx.block_height());
        ctx.block_time()
            .saturating_add(blocks.saturating_mul(self.params.expected_block_time_secs))
    }

    fn is_epoch_boundary(&self, ctx: &Context<'_>) -> bool {
        let height = ctx.block_height();
        height > 0 && height % self.epoch_length() == 0
    }
}
