// Path: crates/api/src/epoch.rs
//! Defines the epoch clock contract.

use crate::context::Context;
use epochstake_types::error::StateError;

/// Answers where the chain is in its epoch schedule.
///
/// All answers are derived from the explicitly passed context, so the same
/// clock serves the live path and forward projections.
pub trait EpochClock: Send + Sync {
    /// The epoch number active in `ctx`. Never the immediate-queue sentinel.
    fn epoch_number(&self, ctx: &Context<'_>) -> Result<u64, StateError>;

    /// The height of the next epoch boundary after `ctx`'s block.
    fn next_epoch_height(&self, ctx: &Context<'_>) -> u64;

    /// The projected block time at the next epoch boundary, in UNIX seconds.
    fn next_epoch_time(&self, ctx: &Context<'_>) -> u64;

    /// Returns true if `ctx`'s block closes an epoch.
    fn is_epoch_boundary(&self, ctx: &Context<'_>) -> bool;
}
