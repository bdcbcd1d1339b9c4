// Path: crates/types/src/app/validator.rs
use crate::app::{ConsensusAddress, ValidatorAddress, ADDRESS_LEN};
use crate::error::StakingError;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Maximum length of a validator moniker.
pub const MAX_MONIKER_LENGTH: usize = 70;
/// Maximum length of a validator identity string.
pub const MAX_IDENTITY_LENGTH: usize = 3000;
/// Maximum length of a validator website.
pub const MAX_WEBSITE_LENGTH: usize = 140;
/// Maximum length of a validator security contact.
pub const MAX_SECURITY_CONTACT_LENGTH: usize = 140;
/// Maximum length of a validator details string.
pub const MAX_DETAILS_LENGTH: usize = 280;

/// Sentinel used by edit requests to leave a description field untouched.
pub const DO_NOT_MODIFY_DESC: &str = "[do-not-modify]";

/// One hundred percent, expressed in basis points.
pub const RATE_PRECISION_BPS: u32 = 10_000;

/// Minimum spacing between two commission rate changes, in seconds.
pub const COMMISSION_UPDATE_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// The signature scheme of a consensus key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Encode, Decode, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    /// Ed25519, 32-byte keys.
    Ed25519,
    /// Compressed secp256k1, 33-byte keys.
    Secp256k1,
    /// Sr25519, 32-byte keys.
    Sr25519,
}

impl KeyType {
    /// The canonical type name used in consensus parameter allow-lists.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Ed25519 => "ed25519",
            KeyType::Secp256k1 => "secp256k1",
            KeyType::Sr25519 => "sr25519",
        }
    }

    /// The encoded key length in bytes.
    pub fn key_len(&self) -> usize {
        match self {
            KeyType::Ed25519 | KeyType::Sr25519 => 32,
            KeyType::Secp256k1 => 33,
        }
    }
}

/// A validator's consensus public key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Encode, Decode, Serialize, Deserialize)]
pub struct PublicKey {
    /// The signature scheme.
    pub key_type: KeyType,
    /// The raw key bytes.
    pub bytes: Vec<u8>,
}

impl PublicKey {
    /// Creates a key, checking the length against the scheme.
    pub fn new(key_type: KeyType, bytes: Vec<u8>) -> Result<Self, StakingError> {
        let pk = Self { key_type, bytes };
        pk.validate()?;
        Ok(pk)
    }

    /// Checks the key length against its scheme.
    pub fn validate(&self) -> Result<(), StakingError> {
        if self.bytes.len() != self.key_type.key_len() {
            return Err(StakingError::InvalidPubKey(format!(
                "{} key must be {} bytes, got {}",
                self.key_type.as_str(),
                self.key_type.key_len(),
                self.bytes.len()
            )));
        }
        Ok(())
    }

    /// Derives the consensus address: the first 20 bytes of `sha256(key)`.
    pub fn consensus_address(&self) -> ConsensusAddress {
        let digest = Sha256::digest(&self.bytes);
        let mut out = [0u8; ADDRESS_LEN];
        out.copy_from_slice(&digest[..ADDRESS_LEN]);
        ConsensusAddress(out)
    }
}

/// Human-readable validator metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct Description {
    /// The validator's name.
    pub moniker: String,
    /// An optional identity signature (e.g. a keybase fingerprint).
    pub identity: String,
    /// An optional website link.
    pub website: String,
    /// An optional security contact.
    pub security_contact: String,
    /// Optional free-form details.
    pub details: String,
}

impl Description {
    /// Creates a description.
    pub fn new(
        moniker: impl Into<String>,
        identity: impl Into<String>,
        website: impl Into<String>,
        security_contact: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            moniker: moniker.into(),
            identity: identity.into(),
            website: website.into(),
            security_contact: security_contact.into(),
            details: details.into(),
        }
    }

    /// Returns true if every field is empty.
    pub fn is_empty(&self) -> bool {
        self.moniker.is_empty()
            && self.identity.is_empty()
            && self.website.is_empty()
            && self.security_contact.is_empty()
            && self.details.is_empty()
    }

    /// Checks every field against its length limit.
    pub fn ensure_length(&self) -> Result<(), StakingError> {
        let checks: [(&'static str, &str, usize); 5] = [
            ("moniker", &self.moniker, MAX_MONIKER_LENGTH),
            ("identity", &self.identity, MAX_IDENTITY_LENGTH),
            ("website", &self.website, MAX_WEBSITE_LENGTH),
            (
                "security contact",
                &self.security_contact,
                MAX_SECURITY_CONTACT_LENGTH,
            ),
            ("details", &self.details, MAX_DETAILS_LENGTH),
        ];
        for (field, value, max) in checks {
            if value.len() > max {
                return Err(StakingError::DescriptionLength {
                    field,
                    got: value.len(),
                    max,
                });
            }
        }
        Ok(())
    }

    /// Applies an edit, keeping every field set to [`DO_NOT_MODIFY_DESC`].
    pub fn update(&self, edit: &Description) -> Result<Description, StakingError> {
        let pick = |new: &String, old: &String| {
            if new == DO_NOT_MODIFY_DESC {
                old.clone()
            } else {
                new.clone()
            }
        };
        let updated = Description {
            moniker: pick(&edit.moniker, &self.moniker),
            identity: pick(&edit.identity, &self.identity),
            website: pick(&edit.website, &self.website),
            security_contact: pick(&edit.security_contact, &self.security_contact),
            details: pick(&edit.details, &self.details),
        };
        updated.ensure_length()?;
        Ok(updated)
    }
}

/// Commission rates in basis points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct CommissionRates {
    /// The current commission rate.
    pub rate_bps: u32,
    /// The maximum rate the validator may ever charge.
    pub max_rate_bps: u32,
    /// The maximum change of the rate per day.
    pub max_change_rate_bps: u32,
}

impl CommissionRates {
    /// Creates a rate set.
    pub fn new(rate_bps: u32, max_rate_bps: u32, max_change_rate_bps: u32) -> Self {
        Self {
            rate_bps,
            max_rate_bps,
            max_change_rate_bps,
        }
    }

    /// Checks the creation-time bounds.
    pub fn validate(&self) -> Result<(), StakingError> {
        if self.max_rate_bps > RATE_PRECISION_BPS {
            return Err(StakingError::CommissionHuge);
        }
        if self.rate_bps > self.max_rate_bps {
            return Err(StakingError::CommissionGtMaxRate);
        }
        if self.max_change_rate_bps > self.max_rate_bps {
            return Err(StakingError::CommissionChangeRateGtMaxRate);
        }
        Ok(())
    }
}

/// Commission rates together with the time they were last changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct Commission {
    /// The rates.
    pub rates: CommissionRates,
    /// The time of the last change, in UNIX seconds.
    pub update_time: u64,
}

impl Commission {
    /// Creates a commission stamped with `update_time`.
    pub fn with_time(rates: CommissionRates, update_time: u64) -> Self {
        Self { rates, update_time }
    }

    /// Checks whether `new_rate_bps` may replace the current rate at `block_time`.
    pub fn validate_new_rate(&self, new_rate_bps: u32, block_time: u64) -> Result<(), StakingError> {
        if block_time.saturating_sub(self.update_time) < COMMISSION_UPDATE_INTERVAL_SECS {
            return Err(StakingError::CommissionUpdateTime);
        }
        if new_rate_bps > self.rates.max_rate_bps {
            return Err(StakingError::CommissionGtMaxRate);
        }
        if new_rate_bps.abs_diff(self.rates.rate_bps) > self.rates.max_change_rate_bps {
            return Err(StakingError::CommissionGtMaxChangeRate);
        }
        Ok(())
    }
}

/// The bonding state of a validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub enum BondStatus {
    /// Not in the active set; tokens sit in the not-bonded pool.
    Unbonded,
    /// Leaving the active set; tokens sit in the not-bonded pool.
    Unbonding,
    /// In the active set; tokens sit in the bonded pool.
    Bonded,
}

/// A validator record as stored by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct Validator {
    /// The operator address. Unique and immutable.
    pub operator_address: ValidatorAddress,
    /// The consensus public key. Unique across validators.
    pub consensus_pubkey: PublicKey,
    /// Whether the validator has been jailed.
    pub jailed: bool,
    /// The bonding status.
    pub status: BondStatus,
    /// Tokens delegated to the validator.
    pub tokens: u128,
    /// Total shares issued to delegators.
    pub delegator_shares: u128,
    /// Metadata.
    pub description: Description,
    /// The height the validator started unbonding at.
    pub unbonding_height: u64,
    /// The time unbonding completes, in UNIX seconds.
    pub unbonding_time: u64,
    /// Commission parameters.
    pub commission: Commission,
    /// The minimum self delegation the operator must keep.
    pub min_self_delegation: u128,
}

impl Validator {
    /// Creates an unbonded validator with no tokens.
    pub fn new(
        operator_address: ValidatorAddress,
        consensus_pubkey: PublicKey,
        description: Description,
    ) -> Result<Self, StakingError> {
        description.ensure_length()?;
        Ok(Self {
            operator_address,
            consensus_pubkey,
            jailed: false,
            status: BondStatus::Unbonded,
            tokens: 0,
            delegator_shares: 0,
            description,
            unbonding_height: 0,
            unbonding_time: 0,
            commission: Commission::default(),
            min_self_delegation: 1,
        })
    }

    /// Attaches the creation-time commission after validating its bounds.
    pub fn set_initial_commission(mut self, commission: Commission) -> Result<Self, StakingError> {
        commission.rates.validate()?;
        self.commission = commission;
        Ok(self)
    }

    /// The address derived from the consensus key.
    pub fn consensus_address(&self) -> ConsensusAddress {
        self.consensus_pubkey.consensus_address()
    }

    /// Returns true if the validator is bonded.
    pub fn is_bonded(&self) -> bool {
        self.status == BondStatus::Bonded
    }

    /// Returns true if the validator is unbonded.
    pub fn is_unbonded(&self) -> bool {
        self.status == BondStatus::Unbonded
    }

    /// The power the validator would have if bonded.
    pub fn potential_consensus_power(&self, power_reduction: u128) -> u64 {
        let power = self.tokens / power_reduction.max(1);
        u64::try_from(power).unwrap_or(u64::MAX)
    }

    /// Shares worth `amount` tokens, rounded up.
    pub fn shares_from_tokens(&self, amount: u128) -> Result<u128, StakingError> {
        if self.tokens == 0 {
            return Err(StakingError::DelegatorShareExRateInvalid);
        }
        let num = amount
            .checked_mul(self.delegator_shares)
            .ok_or(StakingError::Overflow("shares_from_tokens"))?;
        Ok(num.div_ceil(self.tokens))
    }

    /// Shares worth `amount` tokens, rounded down.
    pub fn shares_from_tokens_truncated(&self, amount: u128) -> Result<u128, StakingError> {
        if self.tokens == 0 {
            return Err(StakingError::DelegatorShareExRateInvalid);
        }
        let num = amount
            .checked_mul(self.delegator_shares)
            .ok_or(StakingError::Overflow("shares_from_tokens"))?;
        Ok(num / self.tokens)
    }

    /// Tokens backing `shares`, rounded down.
    pub fn tokens_from_shares(&self, shares: u128) -> Result<u128, StakingError> {
        if self.delegator_shares == 0 {
            return Ok(0);
        }
        let num = shares
            .checked_mul(self.tokens)
            .ok_or(StakingError::Overflow("tokens_from_shares"))?;
        Ok(num / self.delegator_shares)
    }

    /// Adds delegated tokens and returns the shares issued for them.
    pub fn add_tokens_from_del(&mut self, amount: u128) -> Result<u128, StakingError> {
        let issued = if self.delegator_shares == 0 {
            amount
        } else {
            self.shares_from_tokens_truncated(amount)?
        };
        self.tokens = self
            .tokens
            .checked_add(amount)
            .ok_or(StakingError::Overflow("validator tokens"))?;
        self.delegator_shares = self
            .delegator_shares
            .checked_add(issued)
            .ok_or(StakingError::Overflow("validator shares"))?;
        Ok(issued)
    }

    /// Removes delegator shares and returns the tokens they were worth.
    pub fn remove_del_shares(&mut self, shares: u128) -> Result<u128, StakingError> {
        if shares > self.delegator_shares {
            return Err(StakingError::BadSharesAmount);
        }
        let remaining = self.delegator_shares - shares;
        let issued = if remaining == 0 {
            self.tokens
        } else {
            self.tokens_from_shares(shares)?
        };
        self.tokens -= issued.min(self.tokens);
        self.delegator_shares = remaining;
        Ok(issued)
    }
}
