// Path: crates/test_utils/src/lib.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # Epoch Staking Test Utilities
//!
//! Utilities for testing the epoch-batched staking components.

pub mod assertions;
pub mod fixtures;
pub mod hooks;
pub mod randomness;
pub mod state;
