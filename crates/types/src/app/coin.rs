// Path: crates/types/src/app/coin.rs
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An amount of a single denomination.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Encode, Decode, Serialize, Deserialize)]
pub struct Coin {
    /// The denomination, e.g. `stake`.
    pub denom: String,
    /// The amount in base units.
    pub amount: u128,
}

impl Coin {
    /// Creates a coin.
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    /// Returns true if the coin has a non-empty denomination and a positive amount.
    pub fn is_valid_positive(&self) -> bool {
        !self.denom.is_empty() && self.amount > 0
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}
