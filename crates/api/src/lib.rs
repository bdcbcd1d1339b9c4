// Path: crates/api/src/lib.rs

//! # Epoch Staking API Crate Lints
//!
//! This crate enforces a strict set of lints to ensure panic-free code.
//! Panics are disallowed in non-test code to promote robust error handling.
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::todo,
        clippy::unimplemented,
        clippy::indexing_slicing
    )
)]
//! # Epoch Staking API
//!
//! Core traits and the execution context for epoch-batched staking. This crate
//! defines the stable contract between the staking handlers and their external
//! collaborators: the key-value ledger, the transfer service, the epoch clock
//! and the extension hooks.

/// The account/pool transfer contract.
pub mod bank;
/// The per-call execution context and its copy-on-write projections.
pub mod context;
/// The epoch clock contract.
pub mod epoch;
/// Extension hooks invoked by the staking keeper.
pub mod hooks;
/// Key-value state access and the copy-on-write overlay.
pub mod state;

/// A curated set of the most commonly used traits and types.
pub mod prelude {
    pub use crate::bank::BankKeeper;
    pub use crate::context::{CacheContext, Context, EventManager};
    pub use crate::epoch::EpochClock;
    pub use crate::hooks::{MultiStakingHooks, StakingHooks};
    pub use crate::state::{StateAccess, StateOverlay};
    pub use epochstake_types::error::{BankError, ErrorCode, StakingError, StateError};
}
