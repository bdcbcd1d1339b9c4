// Path: crates/services/src/staking/executor.rs
//! Drains the epoch queue at a boundary and applies each action for real.

use super::keeper::Keeper;
use crate::epoching::EpochKeeper;
use epochstake_api::context::Context;
use epochstake_types::app::{
    pools, AccountId, Coin, EpochAction, QueuedAction, StakingEvent, IMMEDIATE_EPOCH,
};
use epochstake_types::Result;

/// The outcome of one epoch drain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EpochReport {
    /// The epoch whose queue was drained.
    pub epoch: u64,
    /// Actions applied and committed.
    pub applied: usize,
    /// Actions that failed and were discarded.
    pub failed: usize,
}

/// Applies queued actions in order: the immediate queue first, then the
/// current epoch's queue.
///
/// Each action runs in its own projection. Its queue entry is deleted in the
/// same commit as its effects, or as its refund when it fails, so a storage
/// fault part way through leaves the unprocessed actions queued. The epoch
/// number advances once the queues are empty.
#[derive(Debug, Clone, Copy)]
pub struct EpochExecutor<'k> {
    keeper: &'k Keeper,
    epochs: &'k EpochKeeper,
}

impl<'k> EpochExecutor<'k> {
    pub fn new(keeper: &'k Keeper, epochs: &'k EpochKeeper) -> Self {
        Self { keeper, epochs }
    }

    pub fn execute_epoch(&self, ctx: &mut Context<'_>) -> Result<EpochReport> {
        let epoch = self.epochs.current_epoch(ctx.state())?;
        let mut actions = self.keeper.queue().pending(ctx.state(), IMMEDIATE_EPOCH)?;
        actions.extend(self.keeper.queue().pending(ctx.state(), epoch)?);

        log::info!(
            "[EpochExecutor] Draining {} queued action(s) at epoch {} (height {})",
            actions.len(),
            epoch,
            ctx.block_height()
        );

        let mut report = EpochReport {
            epoch,
            ..Default::default()
        };
        for queued in actions {
            if self.apply(ctx, &queued)? {
                report.applied += 1;
            } else {
                report.failed += 1;
            }
        }

        self.epochs.increment_epoch_number(ctx.state_mut())?;
        tracing::info!(
            target: "epoch_executor",
            epoch,
            applied = report.applied,
            failed = report.failed,
            "epoch executed"
        );
        Ok(report)
    }

    /// Applies one action. Returns `Ok(false)` if the action itself failed;
    /// storage faults while committing are returned as errors.
    fn apply(&self, ctx: &mut Context<'_>, queued: &QueuedAction<EpochAction>) -> Result<bool> {
        let (outcome, changes, events) = {
            let mut cache = ctx.cache_context();
            let (outcome, events) = {
                let mut staged = cache.context();
                let outcome = self.keeper.apply_epoch_action(&mut staged, &queued.action);
                if outcome.is_ok() {
                    self.keeper.queue().remove(staged.state_mut(), queued)?;
                }
                (outcome, staged.take_events())
            };
            (outcome, cache.into_change_set(), events)
        };

        match outcome {
            Ok(()) => {
                let (inserts, deletes) = changes;
                ctx.state_mut().batch_apply(&inserts, &deletes)?;
                ctx.emit_events(events);
                Ok(true)
            }
            Err(e) => {
                log::warn!(
                    "[EpochExecutor] {} action {} from epoch {} failed: {}",
                    queued.action.kind(),
                    queued.action_id,
                    queued.epoch,
                    e
                );
                self.discard(ctx, queued)?;
                ctx.emit(StakingEvent::EpochActionFailed {
                    kind: queued.action.kind().to_string(),
                    reason: e.to_string(),
                });
                Ok(false)
            }
        }
    }

    /// Dequeues a failed action and returns its escrow in one commit. A failed
    /// refund is logged and the action is dequeued anyway.
    fn discard(&self, ctx: &mut Context<'_>, queued: &QueuedAction<EpochAction>) -> Result<()> {
        let (inserts, deletes) = {
            let mut cache = ctx.cache_context();
            {
                let mut staged = cache.context();
                if let Err(refund_err) = self.refund_escrow(&mut staged, &queued.action) {
                    log::error!(
                        "[EpochExecutor] Could not refund escrow of action {}: {}",
                        queued.action_id,
                        refund_err
                    );
                }
                self.keeper.queue().remove(staged.state_mut(), queued)?;
            }
            cache.into_change_set()
        };
        ctx.state_mut().batch_apply(&inserts, &deletes)?;
        Ok(())
    }

    fn refund_escrow(&self, ctx: &mut Context<'_>, action: &EpochAction) -> Result<()> {
        let (delegator, coin): (&str, &Coin) = match action {
            EpochAction::CreateValidator(msg) => (&msg.delegator_address, &msg.value),
            EpochAction::Delegate(msg) => (&msg.delegator_address, &msg.amount),
            _ => return Ok(()),
        };
        let delegator: AccountId = delegator.parse()?;
        self.keeper.bank().undelegate_coins_from_module_to_account(
            ctx.state_mut(),
            pools::EPOCH_TEMP_POOL,
            &delegator,
            std::slice::from_ref(coin),
        )?;
        log::debug!("[EpochExecutor] Refunded {} to {}", coin, delegator);
        Ok(())
    }
}
