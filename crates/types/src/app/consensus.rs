// Path: crates/types/src/app/consensus.rs
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Consensus parameters relevant to validator admission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct ConsensusParams {
    /// Validator-related parameters. `None` means no restriction is configured.
    #[serde(default)]
    pub validator: Option<ValidatorParams>,
}

/// Restrictions on validator consensus keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode, Serialize, Deserialize)]
pub struct ValidatorParams {
    /// The permitted key type names, e.g. `["ed25519"]`.
    pub pub_key_types: Vec<String>,
}

impl ConsensusParams {
    /// Returns the key-type allow-list, if one is configured.
    pub fn allowed_pub_key_types(&self) -> Option<&[String]> {
        self.validator.as_ref().map(|v| v.pub_key_types.as_slice())
    }
}
