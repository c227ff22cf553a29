//! # Supply Ledger
//!
//! Per-account balances and the total issued supply. [`SupplyLedger::credit`]
//! and [`SupplyLedger::debit`] are the only two ways a balance changes; every
//! other component routes through them.
//!
//! ## Invariants
//!
//! - `sum(balances) == total_supply` after every call.
//! - `total_supply <= supply_cap` after every call.
//! - No balance is ever negative (they're `u64` and debits are checked).
//!
//! Both operations validate first and mutate second, so a failed call
//! leaves the ledger untouched.

use std::collections::HashMap;

use pegcoin_protocol::crypto::Address;
use serde::Serialize;
use thiserror::Error;

/// Errors from the two ledger mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Crediting would push total supply above the cap (or past `u64::MAX`).
    #[error("supply cap exceeded: supply {supply} + {requested} > cap {cap}")]
    SupplyCapExceeded {
        /// Total supply before the credit.
        supply: u64,
        /// The amount that was requested.
        requested: u64,
        /// The configured cap.
        cap: u64,
    },

    /// Attempted to debit more than the account holds.
    #[error("insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance {
        /// Current balance.
        available: u64,
        /// The amount that was requested.
        requested: u64,
    },
}

/// Balances and supply for a single asset.
///
/// Serialize-only: a ledger is built through [`SupplyLedger::new`] and the
/// two mutations, never loaded from outside.
#[derive(Debug, Clone, Serialize)]
pub struct SupplyLedger {
    /// Non-zero balances. Accounts that reach zero are dropped, so a zero
    /// balance and a never-seen account look the same.
    balances: HashMap<Address, u64>,
    /// Sum of all balances.
    total_supply: u64,
    /// Upper bound on `total_supply`, fixed at construction.
    supply_cap: u64,
}

impl SupplyLedger {
    /// Creates an empty ledger with the given cap.
    pub fn new(supply_cap: u64) -> Self {
        Self {
            balances: HashMap::new(),
            total_supply: 0,
            supply_cap,
        }
    }

    /// Adds `amount` to `account` and to the total supply.
    ///
    /// Returns the account's new balance.
    ///
    /// # Errors
    ///
    /// [`LedgerError::SupplyCapExceeded`] if `total_supply + amount > cap`.
    pub fn credit(&mut self, account: Address, amount: u64) -> Result<u64, LedgerError> {
        let cap_exceeded = LedgerError::SupplyCapExceeded {
            supply: self.total_supply,
            requested: amount,
            cap: self.supply_cap,
        };
        let new_total = self
            .total_supply
            .checked_add(amount)
            .ok_or_else(|| cap_exceeded.clone())?;
        if new_total > self.supply_cap {
            return Err(cap_exceeded);
        }

        // A balance never exceeds the total, so this cannot overflow once
        // the total has been checked.
        let balance = self.balances.get(&account).copied().unwrap_or(0) + amount;

        if balance > 0 {
            self.balances.insert(account, balance);
        }
        self.total_supply = new_total;
        Ok(balance)
    }

    /// Removes `amount` from `account` and from the total supply.
    ///
    /// Returns the account's remaining balance.
    ///
    /// # Errors
    ///
    /// [`LedgerError::InsufficientBalance`] if the account holds less than
    /// `amount`.
    pub fn debit(&mut self, account: Address, amount: u64) -> Result<u64, LedgerError> {
        let available = self.balance_of(&account);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                available,
                requested: amount,
            });
        }

        let remaining = available - amount;
        if remaining == 0 {
            self.balances.remove(&account);
        } else {
            self.balances.insert(account, remaining);
        }
        self.total_supply -= amount;
        Ok(remaining)
    }

    /// Balance of `account`, zero if it has never held anything.
    pub fn balance_of(&self, account: &Address) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Total issued supply.
    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    /// The configured supply cap.
    pub fn supply_cap(&self) -> u64 {
        self.supply_cap
    }

    /// Supply that can still be credited before hitting the cap.
    pub fn headroom(&self) -> u64 {
        self.supply_cap.saturating_sub(self.total_supply)
    }

    /// All accounts with a non-zero balance, in no particular order.
    pub fn holders(&self) -> impl Iterator<Item = (&Address, &u64)> {
        self.balances.iter()
    }

    /// Number of accounts with a non-zero balance.
    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }
}
