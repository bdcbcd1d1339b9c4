//! Hook implementations that record what the keeper invoked

use epochstake_api::context::Context;
use epochstake_api::hooks::StakingHooks;
use epochstake_types::app::{AccountId, ValidatorAddress};
use std::sync::{Arc, Mutex};

/// One recorded hook invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookCall {
    /// `after_validator_created`, tagged with the recorder's label
    ValidatorCreated(&'static str, ValidatorAddress),
    /// `after_delegation_modified`, tagged with the recorder's label
    DelegationModified(&'static str, AccountId, ValidatorAddress),
}

/// A shared, ordered call log several recorders can append to
pub type CallLog = Arc<Mutex<Vec<HookCall>>>;

/// Records every hook invocation into a shared log
#[derive(Debug, Clone)]
pub struct RecordingHooks {
    label: &'static str,
    log: CallLog,
}

impl RecordingHooks {
    /// Create a recorder writing to its own log
    pub fn new(label: &'static str) -> Self {
        Self::with_log(label, CallLog::default())
    }

    /// Create a recorder writing to a shared log
    pub fn with_log(label: &'static str, log: CallLog) -> Self {
        Self { label, log }
    }

    /// A handle to the call log
    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    /// A snapshot of the recorded calls
    pub fn calls(&self) -> Vec<HookCall> {
        self.log.lock().map(|l| l.clone()).unwrap_or_default()
    }

    fn record(&self, call: HookCall) {
        if let Ok(mut log) = self.log.lock() {
            log.push(call);
        }
    }
}

impl StakingHooks for RecordingHooks {
    fn after_validator_created(&self, _ctx: &mut Context<'_>, operator: &ValidatorAddress) {
        self.record(HookCall::ValidatorCreated(self.label, *operator));
    }

    fn after_delegation_modified(
        &self,
        _ctx: &mut Context<'_>,
        delegator: &AccountId,
        validator: &ValidatorAddress,
    ) {
        self.record(HookCall::DelegationModified(
            self.label, *delegator, *validator,
        ));
    }
}
