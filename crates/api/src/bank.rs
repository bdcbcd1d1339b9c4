// Path: crates/api/src/bank.rs
//! Defines the account/pool transfer contract consumed by the staking keeper.

use crate::state::StateAccess;
use epochstake_types::app::{AccountId, Coin};
use epochstake_types::error::BankError;

/// Moves funds between accounts and module-owned pools.
///
/// Every transfer is all-or-nothing: on error no balance has changed.
pub trait BankKeeper: Send + Sync {
    /// The balance of `account` in `denom`.
    fn balance(
        &self,
        state: &dyn StateAccess,
        account: &AccountId,
        denom: &str,
    ) -> Result<u128, BankError>;

    /// Moves `coins` from a user account into the named module pool.
    fn delegate_coins_from_account_to_module(
        &self,
        state: &mut dyn StateAccess,
        from: &AccountId,
        module: &str,
        coins: &[Coin],
    ) -> Result<(), BankError>;

    /// Moves `coins` from the named module pool back to a user account.
    fn undelegate_coins_from_module_to_account(
        &self,
        state: &mut dyn StateAccess,
        module: &str,
        to: &AccountId,
        coins: &[Coin],
    ) -> Result<(), BankError>;

    /// Moves `coins` between two module pools.
    fn send_coins_from_module_to_module(
        &self,
        state: &mut dyn StateAccess,
        from_module: &str,
        to_module: &str,
        coins: &[Coin],
    ) -> Result<(), BankError>;
}
