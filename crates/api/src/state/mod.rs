// Path: crates/api/src/state/mod.rs
//! Key-value state access for the staking ledger.
//!
//! - `StateAccess`: the dyn-safe key-value interface every component reads and
//!   writes through.
//! - `StateOverlay`: a copy-on-write layer used to project state forward
//!   without touching the canonical store.

use epochstake_types::error::StateError;
use std::sync::Arc;

/// An atomically reference-counted, owned key slice.
pub type StateKey = Arc<[u8]>;
/// An atomically reference-counted, owned value slice.
pub type StateVal = Arc<[u8]>;
/// An owned key-value pair from the state, using cheap-to-clone Arcs.
pub type StateKVPair = (StateKey, StateVal);
/// A streaming iterator over key-value pairs, in ascending key order.
pub type StateScanIter<'a> = Box<dyn Iterator<Item = Result<StateKVPair, StateError>> + Send + 'a>;

mod accessor;
mod overlay;

pub use accessor::*;
pub use overlay::*;
