// Path: crates/types/src/error/mod.rs
//! Core error types for epoch-batched staking.

use thiserror::Error;

/// A trait for assigning a stable, machine-readable string code to an error.
pub trait ErrorCode {
    /// Returns the unique, stable string identifier for this error variant.
    fn code(&self) -> &'static str;
}

/// The broad class a staking failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The request itself is malformed (bad address, wrong denom, bad lengths).
    MalformedInput,
    /// The request conflicts with existing registry state.
    Conflict,
    /// A resource operation such as a fund transfer failed.
    Resource,
    /// Applying the action against (possibly projected) state failed.
    Execution,
    /// Storage or codec fault below the staking logic.
    Internal,
}

/// Errors related to the underlying key-value state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The storage backend failed.
    #[error("State backend error: {0}")]
    Backend(String),
    /// The provided value was invalid.
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    /// An error occurred during state deserialization.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl ErrorCode for StateError {
    fn code(&self) -> &'static str {
        match self {
            Self::Backend(_) => "STATE_BACKEND_ERROR",
            Self::InvalidValue(_) => "STATE_INVALID_VALUE",
            Self::Decode(_) => "STATE_DECODE_ERROR",
        }
    }
}

/// Errors raised while parsing a textual address.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// The address was an empty string.
    #[error("empty address string is not allowed")]
    Empty,
    /// The address was not valid hex.
    #[error("invalid address encoding: {0}")]
    Encoding(String),
    /// The decoded address had the wrong length.
    #[error("invalid address length: expected {expected} bytes, got {got}")]
    Length {
        /// The required length in bytes.
        expected: usize,
        /// The decoded length in bytes.
        got: usize,
    },
}

/// Errors raised by the account/pool transfer service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BankError {
    /// The sending account does not hold enough of a denomination.
    #[error("insufficient funds for {denom}: required {required}, available {available}")]
    InsufficientFunds {
        /// The denomination that was short.
        denom: String,
        /// The amount the transfer needed.
        required: u128,
        /// The amount the account holds.
        available: u128,
    },
    /// A credit would overflow the receiving balance.
    #[error("balance overflow for {0}")]
    Overflow(String),
    /// The coin set was malformed (zero amounts, empty denominations).
    #[error("invalid coins: {0}")]
    InvalidCoins(String),
    /// The module account name is not known to the bank.
    #[error("unknown module account: {0}")]
    UnknownModule(String),
    /// An error occurred while accessing state.
    #[error("State error: {0}")]
    State(#[from] StateError),
}

impl ErrorCode for BankError {
    fn code(&self) -> &'static str {
        match self {
            Self::InsufficientFunds { .. } => "BANK_INSUFFICIENT_FUNDS",
            Self::Overflow(_) => "BANK_BALANCE_OVERFLOW",
            Self::InvalidCoins(_) => "BANK_INVALID_COINS",
            Self::UnknownModule(_) => "BANK_UNKNOWN_MODULE",
            Self::State(_) => "BANK_STATE_ERROR",
        }
    }
}

/// Errors returned by the staking request handlers and the epoch-time keeper logic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StakingError {
    /// An address string could not be parsed.
    #[error("invalid address: {0}")]
    InvalidAddress(#[from] AddressError),
    /// The funding account is not the validator's operator account.
    #[error("validator address is invalid")]
    BadValidatorAddr,
    /// The consensus public key was malformed.
    #[error("invalid consensus public key: {0}")]
    InvalidPubKey(String),
    /// The coin denomination does not match the bonding denomination.
    #[error("invalid coin denomination: got {got}, expected {expected}")]
    BadDenom {
        /// The denomination on the request.
        got: String,
        /// The chain's bonding denomination.
        expected: String,
    },
    /// A coin amount was zero or otherwise unusable.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    /// A description field exceeded its length limit.
    #[error("invalid {field} length; got: {got}, max: {max}")]
    DescriptionLength {
        /// The name of the offending field.
        field: &'static str,
        /// The provided length.
        got: usize,
        /// The maximum length.
        max: usize,
    },
    /// The description carried no fields at all.
    #[error("empty description")]
    EmptyDescription,
    /// The operator address already has a validator.
    #[error("validator already exist for this operator address; must use new validator operator address")]
    ValidatorOwnerExists,
    /// The consensus public key is already registered to a validator.
    #[error("validator already exist for this pubkey; must use new validator pubkey")]
    ValidatorPubKeyExists,
    /// The key type is not in the consensus-parameter allow-list.
    #[error("validator pubkey type is not supported; got: {got}, expected: {allowed:?}")]
    PubKeyTypeNotSupported {
        /// The key type on the request.
        got: String,
        /// The permitted key types.
        allowed: Vec<String>,
    },
    /// The maximum commission rate exceeded 100%.
    #[error("commission cannot be more than 100%")]
    CommissionHuge,
    /// The commission rate exceeded the maximum rate.
    #[error("commission cannot be more than the max rate")]
    CommissionGtMaxRate,
    /// The commission change rate exceeded the maximum rate.
    #[error("commission change rate cannot be more than the max rate")]
    CommissionChangeRateGtMaxRate,
    /// The commission was changed less than a day after the last change.
    #[error("commission cannot be changed more than once in 24h")]
    CommissionUpdateTime,
    /// The commission change exceeded the maximum change rate.
    #[error("commission cannot be changed more than max change rate")]
    CommissionGtMaxChangeRate,
    /// The minimum self delegation was not positive.
    #[error("minimum self delegation must be a positive integer")]
    MinSelfDelegationInvalid,
    /// The minimum self delegation was lowered.
    #[error("minimum self delegation cannot be decrease")]
    MinSelfDelegationDecreased,
    /// Self delegation would fall below the validator's minimum.
    #[error("validator's self delegation must be greater than their minimum self delegation")]
    SelfDelegationBelowMinimum,
    /// No validator exists at the given address.
    #[error("validator does not exist")]
    NoValidatorFound,
    /// No delegation exists for the delegator/validator pair.
    #[error("no delegation for (address, validator) tuple")]
    NoDelegation,
    /// The requested shares exceed the delegation.
    #[error("invalid shares amount")]
    BadSharesAmount,
    /// The validator has no tokens backing its shares.
    #[error("invalid delegator share exchange rate")]
    DelegatorShareExRateInvalid,
    /// Source and destination of a redelegation are the same validator.
    #[error("cannot redelegate to the same validator")]
    SelfRedelegation,
    /// The redelegation destination does not exist.
    #[error("redelegation destination validator not found")]
    BadRedelegationDst,
    /// The source has an incoming redelegation that has not matured.
    #[error("redelegation to this validator already in progress; first redelegation to this validator must complete before next redelegation")]
    TransitiveRedelegation,
    /// Too many concurrent redelegation entries.
    #[error("too many redelegation entries for (delegator, src-validator, dst-validator) tuple")]
    MaxRedelegationEntries,
    /// Too many concurrent unbonding entries.
    #[error("too many unbonding delegation entries for (delegator, validator) tuple")]
    MaxUnbondingDelegationEntries,
    /// The redelegation amount rounds down to nothing.
    #[error("too few tokens to redelegate (truncates to zero tokens)")]
    TinyRedelegationAmount,
    /// A token or share computation overflowed.
    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),
    /// The service method name is unknown.
    #[error("unknown staking method: {0}")]
    UnknownMethod(String),
    /// Request parameters could not be decoded.
    #[error("Deserialization error: {0}")]
    Deserialization(String),
    /// A value could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// The fund transfer service failed.
    #[error("Bank error: {0}")]
    Bank(#[from] BankError),
    /// An error originating from the state layer.
    #[error("State error: {0}")]
    State(#[from] StateError),
}

impl StakingError {
    /// Returns the broad class of this failure.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidAddress(_)
            | Self::BadValidatorAddr
            | Self::InvalidPubKey(_)
            | Self::BadDenom { .. }
            | Self::InvalidAmount(_)
            | Self::DescriptionLength { .. }
            | Self::EmptyDescription
            | Self::CommissionHuge
            | Self::CommissionGtMaxRate
            | Self::CommissionChangeRateGtMaxRate
            | Self::MinSelfDelegationInvalid
            | Self::UnknownMethod(_)
            | Self::Deserialization(_) => ErrorCategory::MalformedInput,
            Self::ValidatorOwnerExists
            | Self::ValidatorPubKeyExists
            | Self::PubKeyTypeNotSupported { .. } => ErrorCategory::Conflict,
            Self::Bank(_) => ErrorCategory::Resource,
            Self::CommissionUpdateTime
            | Self::CommissionGtMaxChangeRate
            | Self::MinSelfDelegationDecreased
            | Self::SelfDelegationBelowMinimum
            | Self::NoValidatorFound
            | Self::NoDelegation
            | Self::BadSharesAmount
            | Self::DelegatorShareExRateInvalid
            | Self::SelfRedelegation
            | Self::BadRedelegationDst
            | Self::TransitiveRedelegation
            | Self::MaxRedelegationEntries
            | Self::MaxUnbondingDelegationEntries
            | Self::TinyRedelegationAmount
            | Self::Overflow(_) => ErrorCategory::Execution,
            Self::Serialization(_) | Self::State(_) => ErrorCategory::Internal,
        }
    }
}

impl ErrorCode for StakingError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidAddress(_) => "STAKING_INVALID_ADDRESS",
            Self::BadValidatorAddr => "STAKING_BAD_VALIDATOR_ADDR",
            Self::InvalidPubKey(_) => "STAKING_INVALID_PUBKEY",
            Self::BadDenom { .. } => "STAKING_BAD_DENOM",
            Self::InvalidAmount(_) => "STAKING_INVALID_AMOUNT",
            Self::DescriptionLength { .. } => "STAKING_DESCRIPTION_LENGTH",
            Self::EmptyDescription => "STAKING_EMPTY_DESCRIPTION",
            Self::ValidatorOwnerExists => "STAKING_VALIDATOR_OWNER_EXISTS",
            Self::ValidatorPubKeyExists => "STAKING_VALIDATOR_PUBKEY_EXISTS",
            Self::PubKeyTypeNotSupported { .. } => "STAKING_PUBKEY_TYPE_NOT_SUPPORTED",
            Self::CommissionHuge => "STAKING_COMMISSION_HUGE",
            Self::CommissionGtMaxRate => "STAKING_COMMISSION_GT_MAX_RATE",
            Self::CommissionChangeRateGtMaxRate => "STAKING_COMMISSION_CHANGE_RATE_GT_MAX_RATE",
            Self::CommissionUpdateTime => "STAKING_COMMISSION_UPDATE_TIME",
            Self::CommissionGtMaxChangeRate => "STAKING_COMMISSION_GT_MAX_CHANGE_RATE",
            Self::MinSelfDelegationInvalid => "STAKING_MIN_SELF_DELEGATION_INVALID",
            Self::MinSelfDelegationDecreased => "STAKING_MIN_SELF_DELEGATION_DECREASED",
            Self::SelfDelegationBelowMinimum => "STAKING_SELF_DELEGATION_BELOW_MINIMUM",
            Self::NoValidatorFound => "STAKING_NO_VALIDATOR_FOUND",
            Self::NoDelegation => "STAKING_NO_DELEGATION",
            Self::BadSharesAmount => "STAKING_BAD_SHARES_AMOUNT",
            Self::DelegatorShareExRateInvalid => "STAKING_DELEGATOR_SHARE_EX_RATE_INVALID",
            Self::SelfRedelegation => "STAKING_SELF_REDELEGATION",
            Self::BadRedelegationDst => "STAKING_BAD_REDELEGATION_DST",
            Self::TransitiveRedelegation => "STAKING_TRANSITIVE_REDELEGATION",
            Self::MaxRedelegationEntries => "STAKING_MAX_REDELEGATION_ENTRIES",
            Self::MaxUnbondingDelegationEntries => "STAKING_MAX_UNBONDING_ENTRIES",
            Self::TinyRedelegationAmount => "STAKING_TINY_REDELEGATION_AMOUNT",
            Self::Overflow(_) => "STAKING_OVERFLOW",
            Self::UnknownMethod(_) => "STAKING_UNKNOWN_METHOD",
            Self::Deserialization(_) => "STAKING_DESERIALIZATION_ERROR",
            Self::Serialization(_) => "STAKING_SERIALIZATION_ERROR",
            Self::Bank(_) => "STAKING_BANK_ERROR",
            Self::State(_) => "STAKING_STATE_ERROR",
        }
    }
}
