use pairswap_core::Address;
use pairswap_state::{ExchangeState, Ledger, Storage};
use tracing::debug;

use crate::context::CallContext;
use crate::error::VmError;

/// Move the sender's `asset` to `to`
pub fn execute_transfer<S: Storage>(
    state: &mut ExchangeState<S>,
    ctx: &CallContext,
    asset: &Address,
    to: &Address,
    amount: u64,
) -> Result<(), VmError> {
    state.transfer(asset, &ctx.sender, to, amount)?;
    debug!("Transferred {} of {} from {} to {}", amount, asset, ctx.sender, to);
    Ok(())
}

pub fn execute_approve<S: Storage>(
    state: &mut ExchangeState<S>,
    ctx: &CallContext,
    asset: &Address,
    spender: &Address,
    amount: u64,
) -> Result<(), VmError> {
    state.approve(asset, &ctx.sender, spender, amount)?;
    debug!("{} approved {} of {} for {}", ctx.sender, amount, asset, spender);
    Ok(())
}

/// Spend an allowance `from` granted to the sender
pub fn execute_transfer_from<S: Storage>(
    state: &mut ExchangeState<S>,
    ctx: &CallContext,
    asset: &Address,
    from: &Address,
    to: &Address,
    amount: u64,
) -> Result<(), VmError> {
    state.transfer_from(asset, &ctx.sender, from, to, amount)?;
    debug!(
        "{} moved {} of {} from {} to {}",
        ctx.sender, amount, asset, from, to
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairswap_state::{MemoryStorage, StateError};

    fn setup() -> (ExchangeState<MemoryStorage>, CallContext, Address) {
        let mut state = ExchangeState::new(MemoryStorage::new());
        let alice = Address::from_label("alice");
        let usdc = Address::from_label("USDC");
        state.credit_token(&alice, &usdc, 1_000).unwrap();
        (state, CallContext::new(alice, 0), usdc)
    }

    #[test]
    fn test_transfer_success() {
        let (mut state, ctx, usdc) = setup();
        let bob = Address::from_label("bob");

        execute_transfer(&mut state, &ctx, &usdc, &bob, 300).unwrap();

        assert_eq!(state.balance_of(&usdc, &ctx.sender), 700);
        assert_eq!(state.balance_of(&usdc, &bob), 300);
    }

    #[test]
    fn test_transfer_insufficient_balance() {
        let (mut state, ctx, usdc) = setup();
        let bob = Address::from_label("bob");

        let result = execute_transfer(&mut state, &ctx, &usdc, &bob, 5_000);
        assert!(matches!(
            result,
            Err(VmError::State(StateError::InsufficientBalance { .. }))
        ));
    }

    #[test]
    fn test_transfer_from_with_approval() {
        let (mut state, ctx, usdc) = setup();
        let bob = CallContext::new(Address::from_label("bob"), 0);

        execute_approve(&mut state, &ctx, &usdc, &bob.sender, 500).unwrap();
        execute_transfer_from(&mut state, &bob, &usdc, &ctx.sender, &bob.sender, 200).unwrap();

        assert_eq!(state.balance_of(&usdc, &bob.sender), 200);
        assert_eq!(state.allowance(&usdc, &ctx.sender, &bob.sender), 300);
    }
}
