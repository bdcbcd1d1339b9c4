// Path: crates/types/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]

//! # Epoch Staking Types
//!
//! The foundational crate of the epoch-batched staking workspace. It holds the
//! staking data model (validators, delegations, request messages, queued epoch
//! actions), the canonical codec, well-known state keys, configuration and
//! every error type.
//!
//! ## Architectural Role
//!
//! `epochstake-types` has minimal dependencies and is a dependency of every
//! other crate in the workspace, giving a single canonical definition for
//! shared types like `Validator`, `EpochAction` and `StakingError`.

/// A top-level, crate-wide `Result` type alias with a default error type.
pub type Result<T, E = crate::error::StakingError> = std::result::Result<T, E>;

/// Staking data structures: addresses, coins, validators, messages and actions.
pub mod app;
/// The canonical, deterministic binary codec for consensus-critical state.
pub mod codec;
/// Serde-driven configuration for the staking and epoch modules.
pub mod config;
/// A unified set of all error types used across the workspace.
pub mod error;
/// Constants and builders for well-known state keys.
pub mod keys;
