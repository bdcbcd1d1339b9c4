// Path: crates/types/src/app/mod.rs
//! Core staking data structures.

use crate::error::AddressError;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

mod coin;
mod consensus;
mod delegation;
mod epoch;
mod events;
mod msgs;
mod validator;

pub use coin::*;
pub use consensus::*;
pub use delegation::*;
pub use epoch::*;
pub use events::*;
pub use msgs::*;
pub use validator::*;

/// The length in bytes of every address type.
pub const ADDRESS_LEN: usize = 20;

/// Names of the module-owned accounts that hold staked funds.
pub mod pools {
    /// Escrow pool holding funds committed by queued actions until the epoch boundary.
    pub const EPOCH_TEMP_POOL: &str = "epoch_temp_pool";
    /// Pool holding tokens of bonded validators.
    pub const BONDED_POOL: &str = "bonded_tokens_pool";
    /// Pool holding tokens of unbonded or unbonding validators.
    pub const NOT_BONDED_POOL: &str = "not_bonded_tokens_pool";
}

macro_rules! define_address {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Encode, Decode, Serialize,
            Deserialize,
        )]
        pub struct $name(pub [u8; ADDRESS_LEN]);

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), hex::encode(self.0))
            }
        }

        impl FromStr for $name {
            type Err = AddressError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if s.trim().is_empty() {
                    return Err(AddressError::Empty);
                }
                let bytes = hex::decode(s).map_err(|e| AddressError::Encoding(e.to_string()))?;
                let got = bytes.len();
                let arr: [u8; ADDRESS_LEN] = bytes.try_into().map_err(|_| AddressError::Length {
                    expected: ADDRESS_LEN,
                    got,
                })?;
                Ok(Self(arr))
            }
        }
    };
}

define_address!(
    /// The address of an account that holds balances and delegates.
    AccountId
);
define_address!(
    /// The operator address of a validator.
    ValidatorAddress
);
define_address!(
    /// The address derived from a validator's consensus public key.
    ConsensusAddress
);

impl AccountId {
    /// Derives the deterministic account address of a module-owned pool.
    pub fn module(name: &str) -> Self {
        let digest = Sha256::digest([b"module:".as_slice(), name.as_bytes()].concat());
        let mut out = [0u8; ADDRESS_LEN];
        out.copy_from_slice(&digest[..ADDRESS_LEN]);
        Self(out)
    }
}

impl From<AccountId> for ValidatorAddress {
    fn from(a: AccountId) -> Self {
        Self(a.0)
    }
}

impl From<ValidatorAddress> for AccountId {
    fn from(v: ValidatorAddress) -> Self {
        Self(v.0)
    }
}

/// The header fields of the block a request executes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Encode, Decode, Serialize, Deserialize)]
pub struct BlockHeader {
    /// The block height.
    pub height: u64,
    /// The deterministic block time in UNIX seconds.
    pub time: u64,
}
