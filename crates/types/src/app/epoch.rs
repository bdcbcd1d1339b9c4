// Path: crates/types/src/app/epoch.rs
use crate::app::{
    MsgBeginRedelegate, MsgCreateValidator, MsgDelegate, MsgEditValidator, MsgUndelegate,
};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// The reserved epoch number meaning "apply at the very next drain".
pub const IMMEDIATE_EPOCH: u64 = 0;

/// The first real epoch number. Real epochs never collide with [`IMMEDIATE_EPOCH`].
pub const FIRST_EPOCH: u64 = 1;

/// A staking intent queued for execution at an epoch boundary.
///
/// Each variant carries exactly the request that produced it, which is all the
/// executor needs to replay it deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub enum EpochAction {
    /// Self-delegate the initial bond of a newly registered validator.
    CreateValidator(MsgCreateValidator),
    /// Update a validator's description, commission or minimum self delegation.
    EditValidator(MsgEditValidator),
    /// Bond escrowed tokens to a validator.
    Delegate(MsgDelegate),
    /// Move a delegation from one validator to another.
    BeginRedelegate(MsgBeginRedelegate),
    /// Start unbonding a delegation.
    Undelegate(MsgUndelegate),
}

impl EpochAction {
    /// A stable name of the action kind, used in logs and events.
    pub fn kind(&self) -> &'static str {
        match self {
            EpochAction::CreateValidator(_) => "create_validator",
            EpochAction::EditValidator(_) => "edit_validator",
            EpochAction::Delegate(_) => "delegate",
            EpochAction::BeginRedelegate(_) => "begin_redelegate",
            EpochAction::Undelegate(_) => "undelegate",
        }
    }
}

/// An action as read back from the queue, with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedAction<T> {
    /// The epoch number the action was queued under.
    pub epoch: u64,
    /// The global, monotonically increasing action id.
    pub action_id: u64,
    /// The queued payload.
    pub action: T,
}
