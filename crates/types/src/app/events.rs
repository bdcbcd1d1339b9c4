// Path: crates/types/src/app/events.rs
use crate::app::Coin;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// The module name reported in `Message` events.
pub const STAKING_MODULE_NAME: &str = "staking";

/// Observable staking events emitted by handlers and the epoch executor.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub enum StakingEvent {
    /// A validator was registered and its initial bond escrowed.
    CreateValidator {
        /// The operator address.
        validator: String,
        /// The escrowed amount.
        amount: Coin,
    },
    /// Attribution of a request to its module and sender.
    Message {
        /// The emitting module.
        module: String,
        /// The account that sent the request.
        sender: String,
    },
    /// A delegation was escrowed and queued.
    DelegationQueued {
        /// The target validator.
        validator: String,
        /// The escrowed amount.
        amount: Coin,
        /// The epoch the action was queued under.
        epoch: u64,
    },
    /// A delegation was applied at an epoch boundary.
    Delegate {
        /// The validator delegated to.
        validator: String,
        /// The bonded amount.
        amount: Coin,
        /// The shares issued.
        new_shares: u128,
    },
    /// A validator edit was applied.
    EditValidator {
        /// The operator address.
        validator: String,
        /// The new commission rate, in basis points.
        commission_rate_bps: u32,
        /// The new minimum self delegation.
        min_self_delegation: u128,
    },
    /// A redelegation was applied.
    Redelegate {
        /// The source validator.
        source_validator: String,
        /// The destination validator.
        destination_validator: String,
        /// The amount moved.
        amount: Coin,
        /// When the redelegation matures.
        completion_time: u64,
    },
    /// An undelegation was applied.
    Unbond {
        /// The validator left.
        validator: String,
        /// The amount unbonding.
        amount: Coin,
        /// When the tokens become liquid.
        completion_time: u64,
    },
    /// A queued action failed at the boundary and its escrow, if any, was refunded.
    EpochActionFailed {
        /// The action kind.
        kind: String,
        /// The failure reason.
        reason: String,
    },
}
