//! Native-currency movement between bettors and the vault.
//!
//! On-chain the host runtime moves value for us; off-chain the engine is handed a
//! `FundsLedger` and every stake or payout goes through it.

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use dashmap::DashMap;

use crate::error::LedgerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Account {
    /// Pooled stakes plus external top-ups; pays every claim.
    Vault,
    User(Address),
}

impl std::fmt::Display for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Account::Vault => write!(f, "vault"),
            Account::User(addr) => write!(f, "{addr}"),
        }
    }
}

/// Balances the ledger holds custody of.
///
/// Inflows originate outside the ledger: a stake is value attached to the bet
/// call and a top-up is value attached to the funding call, so both are plain
/// `credit`s to `Account::Vault`. User accounts only ever receive payouts; they
/// are never debited for a stake.
pub trait FundsLedger: Send + Sync {
    fn balance(&self, account: &Account) -> U256;

    /// Fails with `Overflow` only.
    fn credit(&self, account: Account, amount: U256) -> Result<(), LedgerError>;

    /// Fails with `InsufficientFunds` and leaves the balance untouched.
    fn debit(&self, account: Account, amount: U256) -> Result<(), LedgerError>;

    /// All-or-nothing move of `amount` from one account to another.
    fn transfer(&self, from: Account, to: Account, amount: U256) -> Result<(), LedgerError> {
        self.debit(from, amount)?;
        if let Err(e) = self.credit(to, amount) {
            // Re-crediting what was just debited cannot overflow.
            let _ = self.credit(from, amount);
            return Err(e);
        }
        Ok(())
    }
}

/// Balances held in memory; the default backend for the service and tests.
#[derive(Debug, Default)]
pub struct InMemoryFunds {
    balances: DashMap<Account, U256>,
}

impl InMemoryFunds {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl FundsLedger for InMemoryFunds {
    fn balance(&self, account: &Account) -> U256 {
        self.balances.get(account).map(|b| *b).unwrap_or(U256::ZERO)
    }

    fn credit(&self, account: Account, amount: U256) -> Result<(), LedgerError> {
        let mut balance = self.balances.entry(account).or_insert(U256::ZERO);
        *balance = balance.checked_add(amount).ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    fn debit(&self, account: Account, amount: U256) -> Result<(), LedgerError> {
        if amount.is_zero() {
            return Ok(());
        }
        let Some(mut balance) = self.balances.get_mut(&account) else {
            return Err(LedgerError::InsufficientFunds);
        };
        *balance = balance.checked_sub(amount).ok_or(LedgerError::InsufficientFunds)?;
        Ok(())
    }
}
