// Path: crates/api/src/hooks.rs
//! Extension hooks invoked by the staking keeper.

use crate::context::Context;
use epochstake_types::app::{AccountId, ValidatorAddress};
use std::fmt;
use std::sync::Arc;

/// A capability other modules register to observe staking lifecycle events.
///
/// Hooks are fire-and-forget from the keeper's point of view: they return
/// nothing and the keeper does not react to what they do.
pub trait StakingHooks: Send + Sync {
    /// Called once a new validator has been persisted and indexed.
    fn after_validator_created(&self, _ctx: &mut Context<'_>, _operator: &ValidatorAddress) {}

    /// Called after a delegation's shares changed at an epoch boundary.
    fn after_delegation_modified(
        &self,
        _ctx: &mut Context<'_>,
        _delegator: &AccountId,
        _validator: &ValidatorAddress,
    ) {
    }
}

/// An ordered list of hooks, invoked synchronously in registration order.
#[derive(Clone, Default)]
pub struct MultiStakingHooks {
    hooks: Vec<Arc<dyn StakingHooks>>,
}

impl fmt::Debug for MultiStakingHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiStakingHooks")
            .field("hook_count", &self.hooks.len())
            .finish()
    }
}

impl MultiStakingHooks {
    /// Creates an empty hook list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a hook; it runs after every previously registered one.
    pub fn register(&mut self, hook: Arc<dyn StakingHooks>) {
        self.hooks.push(hook);
    }

    /// The number of registered hooks.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Returns true if no hook is registered.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl StakingHooks for MultiStakingHooks {
    fn after_validator_created(&self, ctx: &mut Context<'_>, operator: &ValidatorAddress) {
        for hook in &self.hooks {
            hook.after_validator_created(ctx, operator);
        }
    }

    fn after_delegation_modified(
        &self,
        ctx: &mut Context<'_>,
        delegator: &AccountId,
        validator: &ValidatorAddress,
    ) {
        for hook in &self.hooks {
            hook.after_delegation_modified(ctx, delegator, validator);
        }
    }
}
