//! Deterministic randomness for reproducible tests

use epochstake_types::app::{AccountId, KeyType, PublicKey, ValidatorAddress, ADDRESS_LEN};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Deterministic random number generator for tests
pub struct TestRng {
    /// Internal RNG with fixed seed
    rng: StdRng,
}

impl TestRng {
    /// Create a new test RNG with the specified seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create a test RNG with the default seed 12345
    pub fn with_default_seed() -> Self {
        Self::new(12345)
    }

    /// Fill a buffer with random bytes
    pub fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest);
    }

    /// Generate a random value
    pub fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    /// Generate an amount in `[min, max]`
    pub fn amount(&mut self, min: u128, max: u128) -> u128 {
        self.rng.gen_range(min..=max)
    }

    /// Generate a random account address
    pub fn account(&mut self) -> AccountId {
        let mut bytes = [0u8; ADDRESS_LEN];
        self.fill_bytes(&mut bytes);
        AccountId(bytes)
    }

    /// Generate a random operator address
    pub fn validator_address(&mut self) -> ValidatorAddress {
        ValidatorAddress::from(self.account())
    }

    /// Generate a random ed25519-shaped consensus key
    pub fn ed25519_pubkey(&mut self) -> PublicKey {
        let mut bytes = vec![0u8; KeyType::Ed25519.key_len()];
        self.fill_bytes(&mut bytes);
        PublicKey {
            key_type: KeyType::Ed25519,
            bytes,
        }
    }
}

impl Default for TestRng {
    fn default() -> Self {
        Self::with_default_seed()
    }
}
