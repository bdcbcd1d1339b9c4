//! Test fixtures for staking scenarios

use epochstake_types::app::{
    AccountId, BlockHeader, Coin, CommissionRates, ConsensusParams, Description, KeyType,
    MsgBeginRedelegate, MsgCreateValidator, MsgDelegate, MsgEditValidator, MsgUndelegate,
    PublicKey, ValidatorAddress, ValidatorParams, ADDRESS_LEN,
};

/// The bond denomination used by the default staking parameters
pub const BOND_DENOM: &str = "stake";

/// An account address filled with `n`
pub fn account(n: u8) -> AccountId {
    AccountId([n; ADDRESS_LEN])
}

/// The operator address sharing its bytes with `account(n)`
pub fn operator(n: u8) -> ValidatorAddress {
    ValidatorAddress([n; ADDRESS_LEN])
}

/// An ed25519 consensus key filled with `n`
pub fn ed25519_key(n: u8) -> PublicKey {
    PublicKey {
        key_type: KeyType::Ed25519,
        bytes: vec![n; KeyType::Ed25519.key_len()],
    }
}

/// A compressed secp256k1 consensus key derived from `n`
pub fn secp256k1_key(n: u8) -> PublicKey {
    let mut bytes = vec![n; KeyType::Secp256k1.key_len()];
    if let Some(first) = bytes.first_mut() {
        *first = 0x02;
    }
    PublicKey {
        key_type: KeyType::Secp256k1,
        bytes,
    }
}

/// A block header
pub fn header(height: u64, time: u64) -> BlockHeader {
    BlockHeader { height, time }
}

/// Consensus parameters allowing only the listed key types
pub fn consensus_params(types: &[&str]) -> ConsensusParams {
    ConsensusParams {
        validator: Some(ValidatorParams {
            pub_key_types: types.iter().map(|t| t.to_string()).collect(),
        }),
    }
}

/// A `stake` coin
pub fn stake(amount: u128) -> Coin {
    Coin::new(BOND_DENOM, amount)
}

/// A create-validator request where operator and delegator are both `n`
pub fn create_validator_msg(n: u8, value: Coin) -> MsgCreateValidator {
    MsgCreateValidator {
        description: Description::new(format!("validator-{n}"), "", "", "", ""),
        commission: CommissionRates::new(1_000, 2_000, 100),
        min_self_delegation: 1,
        delegator_address: account(n).to_string(),
        validator_address: operator(n).to_string(),
        pubkey: ed25519_key(n),
        value,
    }
}

/// An edit request that only changes the moniker
pub fn edit_validator_msg(n: u8, moniker: &str) -> MsgEditValidator {
    MsgEditValidator {
        description: Description::new(
            moniker,
            "[do-not-modify]",
            "[do-not-modify]",
            "[do-not-modify]",
            "[do-not-modify]",
        ),
        validator_address: operator(n).to_string(),
        commission_rate_bps: None,
        min_self_delegation: None,
    }
}

/// A delegate request
pub fn delegate_msg(delegator: u8, validator: u8, amount: Coin) -> MsgDelegate {
    MsgDelegate {
        delegator_address: account(delegator).to_string(),
        validator_address: operator(validator).to_string(),
        amount,
    }
}

/// A redelegate request
pub fn redelegate_msg(delegator: u8, src: u8, dst: u8, amount: Coin) -> MsgBeginRedelegate {
    MsgBeginRedelegate {
        delegator_address: account(delegator).to_string(),
        validator_src_address: operator(src).to_string(),
        validator_dst_address: operator(dst).to_string(),
        amount,
    }
}

/// An undelegate request
pub fn undelegate_msg(delegator: u8, validator: u8, amount: Coin) -> MsgUndelegate {
    MsgUndelegate {
        delegator_address: account(delegator).to_string(),
        validator_address: operator(validator).to_string(),
        amount,
    }
}
