use pairswap_core::{Address, AmmEvent};
use pairswap_state::{ExchangeState, Storage};
use tracing::{debug, info};

use crate::context::CallContext;
use crate::error::VmError;

/// Create the pool for an unordered pair and return its address
pub fn create_pool<S: Storage>(
    state: &mut ExchangeState<S>,
    asset_a: &Address,
    asset_b: &Address,
) -> Result<Address, VmError> {
    let (token0, token1, pool) = state.create_pool_record(asset_a, asset_b)?;

    let pool_count = state.registry().pool_count() as u64;
    state.emit(AmmEvent::PoolCreated {
        token0,
        token1,
        pool,
        pool_count,
    });
    info!(%token0, %token1, %pool, pool_count, "Created pool");
    Ok(pool)
}

pub fn set_fee_to<S: Storage>(
    state: &mut ExchangeState<S>,
    ctx: &CallContext,
    fee_to: Option<Address>,
) -> Result<(), VmError> {
    state.registry_mut().set_fee_to(&ctx.sender, fee_to)?;
    debug!(fee_to = ?fee_to, "Protocol fee recipient updated");
    Ok(())
}

pub fn set_fee_to_setter<S: Storage>(
    state: &mut ExchangeState<S>,
    ctx: &CallContext,
    setter: &Address,
) -> Result<(), VmError> {
    state.registry_mut().set_fee_to_setter(&ctx.sender, *setter)?;
    debug!(%setter, "Protocol fee setter updated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairswap_core::{pair_key, AmmError};
    use pairswap_state::MemoryStorage;

    #[test]
    fn test_create_pool_matches_pair_key() {
        let mut state = ExchangeState::new(MemoryStorage::new());
        let (a, b) = (Address::from_label("A"), Address::from_label("B"));

        let pool = create_pool(&mut state, &b, &a).unwrap();

        assert_eq!(pool, pair_key(&state.registry().registry_id(), a, b).unwrap());
        let record = state.get_pool(&pool).unwrap();
        assert!(record.token0 < record.token1);
        assert_eq!(record.total_shares, 0);
        assert_eq!(
            state.events,
            vec![AmmEvent::PoolCreated {
                token0: record.token0,
                token1: record.token1,
                pool,
                pool_count: 1
            }]
        );
    }

    #[test]
    fn test_create_pool_twice_fails() {
        let mut state = ExchangeState::new(MemoryStorage::new());
        let (a, b) = (Address::from_label("A"), Address::from_label("B"));
        create_pool(&mut state, &a, &b).unwrap();

        let err = create_pool(&mut state, &b, &a).unwrap_err();
        assert_eq!(err.amm(), Some(AmmError::PoolExists));
        assert_eq!(state.registry().pool_count(), 1);
    }

    #[test]
    fn test_fee_setters_require_setter() {
        let mut state = ExchangeState::new(MemoryStorage::new());
        let admin = Address::from_label("admin");
        state
            .registry_mut()
            .set_fee_to_setter(&Address::ZERO, admin)
            .unwrap();
        let treasury = Address::from_label("treasury");

        let stranger = CallContext::new(Address::from_label("stranger"), 0);
        let err = set_fee_to(&mut state, &stranger, Some(treasury)).unwrap_err();
        assert_eq!(err.amm(), Some(AmmError::Forbidden));

        let ctx = CallContext::new(admin, 0);
        set_fee_to(&mut state, &ctx, Some(treasury)).unwrap();
        set_fee_to_setter(&mut state, &ctx, &treasury).unwrap();
        assert_eq!(state.registry().fee_to(), Some(treasury));
        assert_eq!(state.registry().fee_to_setter(), treasury);
    }
}
