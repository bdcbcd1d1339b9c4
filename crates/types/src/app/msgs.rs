// Path: crates/types/src/app/msgs.rs
//! Staking request messages and their responses.
//!
//! Addresses travel as text and are parsed by the handlers, so a badly encoded
//! address is reported as a malformed-input error rather than being
//! unrepresentable.

use crate::app::{AccountId, Coin, CommissionRates, Description, PublicKey, ValidatorAddress};
use crate::error::StakingError;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Stateless well-formedness checks performed before a message reaches a handler.
pub trait ValidateBasic {
    /// Returns an error if the message is malformed regardless of ledger state.
    fn validate_basic(&self) -> Result<(), StakingError>;
}

/// Registers a new validator and bonds its initial self delegation.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct MsgCreateValidator {
    /// Validator metadata.
    pub description: Description,
    /// Initial commission rates.
    pub commission: CommissionRates,
    /// The minimum self delegation the operator commits to.
    pub min_self_delegation: u128,
    /// The account funding the initial bond.
    pub delegator_address: String,
    /// The operator address of the new validator.
    pub validator_address: String,
    /// The consensus public key.
    pub pubkey: PublicKey,
    /// The initial bond.
    pub value: Coin,
}

impl MsgCreateValidator {
    /// Parses the operator and funding addresses. The initial bond is a self
    /// delegation, so both must name the same account.
    pub fn self_delegator(&self) -> Result<(ValidatorAddress, AccountId), StakingError> {
        let operator: ValidatorAddress = self.validator_address.parse()?;
        let delegator: AccountId = self.delegator_address.parse()?;
        if AccountId::from(operator) != delegator {
            return Err(StakingError::BadValidatorAddr);
        }
        Ok((operator, delegator))
    }
}

/// Empty acknowledgement of a queued validator creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode)]
pub struct MsgCreateValidatorResponse {}

/// Edits an existing validator at the next epoch boundary.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct MsgEditValidator {
    /// The new description; fields set to `[do-not-modify]` are kept.
    pub description: Description,
    /// The validator's operator address.
    pub validator_address: String,
    /// A new commission rate in basis points, if it should change.
    pub commission_rate_bps: Option<u32>,
    /// A new minimum self delegation, if it should change.
    pub min_self_delegation: Option<u128>,
}

/// Empty acknowledgement of a queued validator edit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode)]
pub struct MsgEditValidatorResponse {}

/// Delegates tokens to a validator at the next epoch boundary.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct MsgDelegate {
    /// The delegating account.
    pub delegator_address: String,
    /// The target validator.
    pub validator_address: String,
    /// The amount to bond.
    pub amount: Coin,
}

/// Empty acknowledgement of a queued delegation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode)]
pub struct MsgDelegateResponse {}

/// Moves a delegation between validators at the next epoch boundary.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct MsgBeginRedelegate {
    /// The delegating account.
    pub delegator_address: String,
    /// The validator the tokens leave.
    pub validator_src_address: String,
    /// The validator the tokens join.
    pub validator_dst_address: String,
    /// The amount of tokens to move.
    pub amount: Coin,
}

/// The projected completion of a queued redelegation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode)]
pub struct MsgBeginRedelegateResponse {
    /// When the redelegation matures, in UNIX seconds, as projected at the next epoch.
    pub completion_time: u64,
}

/// Unbonds tokens from a validator at the next drain.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct MsgUndelegate {
    /// The delegating account.
    pub delegator_address: String,
    /// The validator being left.
    pub validator_address: String,
    /// The amount of tokens to unbond.
    pub amount: Coin,
}

/// The projected completion of a queued undelegation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode)]
pub struct MsgUndelegateResponse {
    /// When the tokens become liquid, in UNIX seconds, as projected at the next epoch.
    pub completion_time: u64,
}

fn check_positive(coin: &Coin) -> Result<(), StakingError> {
    if !coin.is_valid_positive() {
        return Err(StakingError::InvalidAmount(format!(
            "amount must be positive, got {}",
            coin
        )));
    }
    Ok(())
}

impl ValidateBasic for MsgCreateValidator {
    fn validate_basic(&self) -> Result<(), StakingError> {
        self.self_delegator()?;
        self.pubkey.validate()?;
        check_positive(&self.value)?;
        if self.description.is_empty() {
            return Err(StakingError::EmptyDescription);
        }
        if self.min_self_delegation == 0 {
            return Err(StakingError::MinSelfDelegationInvalid);
        }
        if self.value.amount < self.min_self_delegation {
            return Err(StakingError::SelfDelegationBelowMinimum);
        }
        Ok(())
    }
}

impl ValidateBasic for MsgEditValidator {
    fn validate_basic(&self) -> Result<(), StakingError> {
        self.validator_address.parse::<ValidatorAddress>()?;
        if self.description.is_empty() {
            return Err(StakingError::EmptyDescription);
        }
        if self.min_self_delegation == Some(0) {
            return Err(StakingError::MinSelfDelegationInvalid);
        }
        if matches!(self.commission_rate_bps, Some(r) if r > crate::app::RATE_PRECISION_BPS) {
            return Err(StakingError::CommissionHuge);
        }
        Ok(())
    }
}

impl ValidateBasic for MsgDelegate {
    fn validate_basic(&self) -> Result<(), StakingError> {
        self.delegator_address.parse::<AccountId>()?;
        self.validator_address.parse::<ValidatorAddress>()?;
        check_positive(&self.amount)
    }
}

impl ValidateBasic for MsgBeginRedelegate {
    fn validate_basic(&self) -> Result<(), StakingError> {
        self.delegator_address.parse::<AccountId>()?;
        self.validator_src_address.parse::<ValidatorAddress>()?;
        self.validator_dst_address.parse::<ValidatorAddress>()?;
        check_positive(&self.amount)
    }
}

impl ValidateBasic for MsgUndelegate {
    fn validate_basic(&self) -> Result<(), StakingError> {
        self.delegator_address.parse::<AccountId>()?;
        self.validator_address.parse::<ValidatorAddress>()?;
        check_positive(&self.amount)
    }
}
