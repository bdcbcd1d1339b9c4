// Path: crates/services/src/bank/mod.rs
//! A state-backed bank holding account and module-pool balances.

use epochstake_api::bank::BankKeeper;
use epochstake_api::state::{get_decoded, put_encoded, StateAccess};
use epochstake_types::app::{pools, AccountId, Coin};
use epochstake_types::error::BankError;
use epochstake_types::keys::balance_key;
use std::collections::{BTreeMap, BTreeSet};

/// Balances keyed by `(address, denom)` in the ledger itself.
///
/// Module pools are ordinary accounts whose address is derived from the pool
/// name, so they can be inspected with [`LedgerBank::module_balance`].
#[derive(Debug, Clone)]
pub struct LedgerBank {
    modules: BTreeSet<String>,
}

impl Default for LedgerBank {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerBank {
    /// Creates a bank that knows the three staking pools.
    pub fn new() -> Self {
        let modules = [
            pools::EPOCH_TEMP_POOL,
            pools::BONDED_POOL,
            pools::NOT_BONDED_POOL,
        ]
        .into_iter()
        .map(str::to_string)
        .collect();
        Self { modules }
    }

    /// Registers an additional module account.
    pub fn with_module(mut self, name: impl Into<String>) -> Self {
        self.modules.insert(name.into());
        self
    }

    /// The account address of a registered module.
    pub fn module_address(&self, name: &str) -> Result<AccountId, BankError> {
        if !self.modules.contains(name) {
            return Err(BankError::UnknownModule(name.to_string()));
        }
        Ok(AccountId::module(name))
    }

    /// The balance of a module pool in `denom`.
    pub fn module_balance(
        &self,
        state: &dyn StateAccess,
        module: &str,
        denom: &str,
    ) -> Result<u128, BankError> {
        let addr = self.module_address(module)?;
        self.balance(state, &addr, denom)
    }

    /// Credits `coin` to `account` out of thin air. Used for genesis funding.
    pub fn mint(
        &self,
        state: &mut dyn StateAccess,
        account: &AccountId,
        coin: &Coin,
    ) -> Result<(), BankError> {
        validate_coins(std::slice::from_ref(coin))?;
        let current = self.balance(state, account, &coin.denom)?;
        let updated = current
            .checked_add(coin.amount)
            .ok_or_else(|| BankError::Overflow(coin.denom.clone()))?;
        write_balance(state, account, &coin.denom, updated)
    }

    /// Moves `coins` from `from` to `to`, checking every denomination before
    /// writing any balance.
    fn transfer(
        &self,
        state: &mut dyn StateAccess,
        from: &AccountId,
        to: &AccountId,
        coins: &[Coin],
    ) -> Result<(), BankError> {
        validate_coins(coins)?;

        let mut totals: BTreeMap<&str, u128> = BTreeMap::new();
        for coin in coins {
            let total = totals.entry(coin.denom.as_str()).or_default();
            *total = total
                .checked_add(coin.amount)
                .ok_or_else(|| BankError::Overflow(coin.denom.clone()))?;
        }

        let mut writes = Vec::with_capacity(totals.len() * 2);
        for (denom, amount) in totals {
            let available = self.balance(state, from, denom)?;
            if available < amount {
                return Err(BankError::InsufficientFunds {
                    denom: denom.to_string(),
                    required: amount,
                    available,
                });
            }
            if from == to {
                continue;
            }
            let credited = self
                .balance(state, to, denom)?
                .checked_add(amount)
                .ok_or_else(|| BankError::Overflow(denom.to_string()))?;
            writes.push((*from, denom, available - amount));
            writes.push((*to, denom, credited));
        }

        for (account, denom, amount) in writes {
            write_balance(state, &account, denom, amount)?;
        }
        log::debug!(
            "[Bank] Transferred {} coin(s) from {} to {}",
            coins.len(),
            from,
            to
        );
        Ok(())
    }
}

fn validate_coins(coins: &[Coin]) -> Result<(), BankError> {
    if coins.is_empty() {
        return Err(BankError::InvalidCoins("empty coin set".into()));
    }
    for coin in coins {
        if !coin.is_valid_positive() {
            return Err(BankError::InvalidCoins(format!(
                "coin must have a denomination and a positive amount, got {}",
                coin
            )));
        }
    }
    Ok(())
}

fn write_balance(
    state: &mut dyn StateAccess,
    account: &AccountId,
    denom: &str,
    amount: u128,
) -> Result<(), BankError> {
    let key = balance_key(account, denom);
    if amount == 0 {
        state.delete(&key)?;
    } else {
        put_encoded(state, &key, &amount)?;
    }
    Ok(())
}

impl BankKeeper for LedgerBank {
    fn balance(
        &self,
        state: &dyn StateAccess,
        account: &AccountId,
        denom: &str,
    ) -> Result<u128, BankError> {
        Ok(get_decoded::<u128>(state, &balance_key(account, denom))?.unwrap_or(0))
    }

    fn delegate_coins_from_account_to_module(
        &self,
        state: &mut dyn StateAccess,
        from: &AccountId,
        module: &str,
        coins: &[Coin],
    ) -> Result<(), BankError> {
        let to = self.module_address(module)?;
        self.transfer(state, from, &to, coins)
    }

    fn undelegate_coins_from_module_to_account(
        &self,
        state: &mut dyn StateAccess,
        module: &str,
        to: &AccountId,
        coins: &[Coin],
    ) -> Result<(), BankError> {
        let from = self.module_address(module)?;
        self.transfer(state, &from, to, coins)
    }

    fn send_coins_from_module_to_module(
        &self,
        state: &mut dyn StateAccess,
        from_module: &str,
        to_module: &str,
        coins: &[Coin],
    ) -> Result<(), BankError> {
        let from = self.module_address(from_module)?;
        let to = self.module_address(to_module)?;
        self.transfer(state, &from, &to, coins)
    }
}
