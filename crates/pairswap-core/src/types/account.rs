use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::address::Address;

/// A holder in the exchange ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Account {
    /// Balances per asset (pool addresses are the asset ids of their shares)
    pub balances: BTreeMap<Address, u64>,
    /// Spending allowances keyed by `(asset, spender)`
    pub allowances: BTreeMap<(Address, Address), u64>,
    /// Transaction nonce (incremented with each applied transaction)
    pub nonce: u64,
}

impl Account {
    pub fn with_balance(asset: Address, amount: u64) -> Self {
        let mut account = Account::default();
        account.balances.insert(asset, amount);
        account
    }

    /// Get balance for an asset
    pub fn balance(&self, asset: &Address) -> u64 {
        self.balances.get(asset).copied().unwrap_or(0)
    }

    /// Credit an asset balance. Returns `None` if the balance would overflow.
    pub fn credit(&mut self, asset: &Address, amount: u64) -> Option<u64> {
        let current = self.balance(asset);
        if amount == 0 {
            return Some(current);
        }
        let updated = current.checked_add(amount)?;
        self.balances.insert(*asset, updated);
        Some(updated)
    }

    /// Debit an asset balance. Returns `None` if the balance is insufficient.
    pub fn debit(&mut self, asset: &Address, amount: u64) -> Option<u64> {
        let current = self.balance(asset);
        if amount == 0 {
            return Some(current);
        }
        let updated = current.checked_sub(amount)?;
        if updated == 0 {
            self.balances.remove(asset);
        } else {
            self.balances.insert(*asset, updated);
        }
        Some(updated)
    }

    pub fn allowance(&self, asset: &Address, spender: &Address) -> u64 {
        self.allowances.get(&(*asset, *spender)).copied().unwrap_or(0)
    }

    pub fn set_allowance(&mut self, asset: &Address, spender: &Address, amount: u64) {
        if amount == 0 {
            self.allowances.remove(&(*asset, *spender));
        } else {
            self.allowances.insert((*asset, *spender), amount);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty() && self.allowances.is_empty() && self.nonce == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usdc() -> Address {
        Address::from_label("USDC")
    }

    #[test]
    fn test_credit_and_debit() {
        let mut account = Account::with_balance(usdc(), 1000);
        assert_eq!(account.credit(&usdc(), 500), Some(1500));
        assert_eq!(account.debit(&usdc(), 1500), Some(0));
        assert!(account.balances.is_empty());
        assert_eq!(account.debit(&usdc(), 1), None);
    }

    #[test]
    fn test_credit_overflow() {
        let mut account = Account::with_balance(usdc(), u64::MAX);
        assert_eq!(account.credit(&usdc(), 1), None);
        assert_eq!(account.balance(&usdc()), u64::MAX);
    }

    #[test]
    fn test_allowance_cleared_at_zero() {
        let mut account = Account::default();
        let router = Address::from_label("router");
        account.set_allowance(&usdc(), &router, 250);
        assert_eq!(account.allowance(&usdc(), &router), 250);
        account.set_allowance(&usdc(), &router, 0);
        assert!(account.is_empty());
    }
}
