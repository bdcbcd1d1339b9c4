// Path: crates/types/src/codec.rs

//! Defines the canonical, deterministic binary codec for all consensus-critical state.
//!
//! Validators, delegations and queued epoch actions are all persisted with
//! `parity-scale-codec` (SCALE). Keeping the wrappers here guarantees that the
//! request handlers and the epoch executor agree on the exact byte layout of
//! everything they exchange through state.

use parity_scale_codec::{Decode, DecodeAll, Encode};

/// Encodes a value into its canonical SCALE byte representation.
pub fn to_bytes_canonical<T: Encode>(v: &T) -> Result<Vec<u8>, String> {
    Ok(v.encode())
}

/// Decodes a value from its canonical SCALE byte representation.
///
/// Fails on malformed input and on trailing bytes, so a value read back from
/// state is always exactly what was written.
pub fn from_bytes_canonical<T: Decode>(b: &[u8]) -> Result<T, String> {
    T::decode_all(&mut &*b).map_err(|e| format!("canonical decode failed: {}", e))
}
