use pairswap_core::{Address, AmmEvent};
use tracing::trace;

use crate::error::StateError;
use crate::state::ExchangeState;
use crate::storage::Storage;

/// Balance ledger shared by plain assets and pool shares.
///
/// A failed call leaves every balance and allowance untouched.
pub trait Ledger {
    fn balance_of(&self, asset: &Address, holder: &Address) -> u64;

    fn transfer(
        &mut self,
        asset: &Address,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> Result<(), StateError>;

    fn approve(
        &mut self,
        asset: &Address,
        owner: &Address,
        spender: &Address,
        amount: u64,
    ) -> Result<(), StateError>;

    fn allowance(&self, asset: &Address, owner: &Address, spender: &Address) -> u64;

    /// Move funds on behalf of `from`, consuming `spender`'s allowance
    fn transfer_from(
        &mut self,
        asset: &Address,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> Result<(), StateError>;
}

impl<S: Storage> Ledger for ExchangeState<S> {
    fn balance_of(&self, asset: &Address, holder: &Address) -> u64 {
        self.get_token_balance(holder, asset)
    }

    fn transfer(
        &mut self,
        asset: &Address,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> Result<(), StateError> {
        let from_balance = self.get_token_balance(from, asset);
        if from_balance < amount {
            return Err(StateError::InsufficientBalance {
                have: from_balance,
                need: amount,
            });
        }
        if from != to {
            let to_balance = self.get_token_balance(to, asset);
            if to_balance.checked_add(amount).is_none() {
                return Err(StateError::BalanceOverflow);
            }
            self.debit_token(from, asset, amount)?;
            self.credit_token(to, asset, amount)?;
        }
        trace!(%asset, %from, %to, amount, "transfer");
        self.emit(AmmEvent::Transfer {
            asset: *asset,
            from: *from,
            to: *to,
            amount,
        });
        Ok(())
    }

    fn approve(
        &mut self,
        asset: &Address,
        owner: &Address,
        spender: &Address,
        amount: u64,
    ) -> Result<(), StateError> {
        self.get_or_create_account(owner)
            .set_allowance(asset, spender, amount);
        self.emit(AmmEvent::Approval {
            asset: *asset,
            owner: *owner,
            spender: *spender,
            amount,
        });
        Ok(())
    }

    fn allowance(&self, asset: &Address, owner: &Address, spender: &Address) -> u64 {
        self.get_account(owner)
            .map_or(0, |account| account.allowance(asset, spender))
    }

    fn transfer_from(
        &mut self,
        asset: &Address,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> Result<(), StateError> {
        let allowed = self.allowance(asset, from, spender);
        if allowed < amount {
            return Err(StateError::InsufficientAllowance {
                have: allowed,
                need: amount,
            });
        }
        self.transfer(asset, from, to, amount)?;
        // u64::MAX is an unlimited approval
        if allowed != u64::MAX {
            self.get_or_create_account(from)
                .set_allowance(asset, spender, allowed - amount);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn setup() -> (ExchangeState<MemoryStorage>, Address, Address, Address) {
        let mut state = ExchangeState::new(MemoryStorage::new());
        let asset = Address::from_label("USDC");
        let alice = Address::from_label("alice");
        let bob = Address::from_label("bob");
        state.credit_token(&alice, &asset, 1_000).unwrap();
        (state, asset, alice, bob)
    }

    #[test]
    fn test_transfer_emits_event() {
        let (mut state, asset, alice, bob) = setup();
        state.transfer(&asset, &alice, &bob, 300).unwrap();

        assert_eq!(state.balance_of(&asset, &alice), 700);
        assert_eq!(state.balance_of(&asset, &bob), 300);
        assert_eq!(
            state.events,
            vec![AmmEvent::Transfer {
                asset,
                from: alice,
                to: bob,
                amount: 300
            }]
        );
    }

    #[test]
    fn test_transfer_insufficient_balance() {
        let (mut state, asset, alice, bob) = setup();
        let result = state.transfer(&asset, &alice, &bob, 1_001);
        assert!(matches!(result, Err(StateError::InsufficientBalance { .. })));
        assert_eq!(state.balance_of(&asset, &alice), 1_000);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_transfer_overflow_leaves_sender_untouched() {
        let (mut state, asset, alice, bob) = setup();
        state.credit_token(&bob, &asset, u64::MAX).unwrap();
        let result = state.transfer(&asset, &alice, &bob, 1);
        assert!(matches!(result, Err(StateError::BalanceOverflow)));
        assert_eq!(state.balance_of(&asset, &alice), 1_000);
    }

    #[test]
    fn test_self_transfer_is_noop() {
        let (mut state, asset, alice, _) = setup();
        state.transfer(&asset, &alice, &alice, 1_000).unwrap();
        assert_eq!(state.balance_of(&asset, &alice), 1_000);
    }

    #[test]
    fn test_transfer_from_consumes_allowance() {
        let (mut state, asset, alice, bob) = setup();
        let carol = Address::from_label("carol");

        state.approve(&asset, &alice, &bob, 400).unwrap();
        assert_eq!(state.allowance(&asset, &alice, &bob), 400);

        state.transfer_from(&asset, &bob, &alice, &carol, 150).unwrap();
        assert_eq!(state.allowance(&asset, &alice, &bob), 250);
        assert_eq!(state.balance_of(&asset, &carol), 150);

        let result = state.transfer_from(&asset, &bob, &alice, &carol, 251);
        assert!(matches!(
            result,
            Err(StateError::InsufficientAllowance { have: 250, need: 251 })
        ));
    }

    #[test]
    fn test_unlimited_allowance_not_decremented() {
        let (mut state, asset, alice, bob) = setup();
        state.approve(&asset, &alice, &bob, u64::MAX).unwrap();
        state.transfer_from(&asset, &bob, &alice, &bob, 500).unwrap();
        assert_eq!(state.allowance(&asset, &alice, &bob), u64::MAX);
    }
}
