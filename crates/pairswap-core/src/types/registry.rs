use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::AmmError;
use crate::math::{pair_key, sort_tokens};
use crate::types::address::Address;

/// Index of every pool created under one registry.
///
/// Pool addresses are derived from `registry_id` and the sorted pair, so
/// the same pair always resolves to the same pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairRegistry {
    registry_id: Address,
    /// `(token0, token1)` with `token0 < token1` -> pool address
    pairs: BTreeMap<(Address, Address), Address>,
    /// Pools in creation order
    all_pools: Vec<Address>,
    /// Recipient of protocol fee shares; `None` disables the fee
    fee_to: Option<Address>,
    /// The only holder allowed to change `fee_to` and itself
    fee_to_setter: Address,
}

impl PairRegistry {
    pub fn new(registry_id: Address, fee_to_setter: Address) -> Self {
        PairRegistry {
            registry_id,
            pairs: BTreeMap::new(),
            all_pools: Vec::new(),
            fee_to: None,
            fee_to_setter,
        }
    }

    pub fn registry_id(&self) -> Address {
        self.registry_id
    }

    pub fn fee_to(&self) -> Option<Address> {
        self.fee_to
    }

    pub fn fee_to_setter(&self) -> Address {
        self.fee_to_setter
    }

    /// Reserve an entry for `(a, b)` and return `(token0, token1, pool)`
    pub fn register(&mut self, a: Address, b: Address) -> Result<(Address, Address, Address), AmmError> {
        let (token0, token1) = sort_tokens(a, b)?;
        if token0.is_zero() || token1.is_zero() {
            return Err(AmmError::InvalidAsset);
        }
        if self.pairs.contains_key(&(token0, token1)) {
            return Err(AmmError::PoolExists);
        }
        let pool = pair_key(&self.registry_id, token0, token1)?;
        self.pairs.insert((token0, token1), pool);
        self.all_pools.push(pool);
        Ok((token0, token1, pool))
    }

    /// Pool for the unordered pair, if one was created
    pub fn get_pool(&self, a: &Address, b: &Address) -> Option<Address> {
        let key = if a < b { (*a, *b) } else { (*b, *a) };
        self.pairs.get(&key).copied()
    }

    pub fn pool_count(&self) -> usize {
        self.all_pools.len()
    }

    pub fn pool_at(&self, index: usize) -> Option<Address> {
        self.all_pools.get(index).copied()
    }

    pub fn set_fee_to(&mut self, caller: &Address, fee_to: Option<Address>) -> Result<(), AmmError> {
        if *caller != self.fee_to_setter {
            return Err(AmmError::Forbidden);
        }
        self.fee_to = fee_to;
        Ok(())
    }

    pub fn set_fee_to_setter(&mut self, caller: &Address, setter: Address) -> Result<(), AmmError> {
        if *caller != self.fee_to_setter {
            return Err(AmmError::Forbidden);
        }
        self.fee_to_setter = setter;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> PairRegistry {
        PairRegistry::new(Address::from_label("registry"), Address::from_label("admin"))
    }

    #[test]
    fn test_register_canonicalizes_pair() {
        let mut registry = registry();
        let (a, b) = (Address::from_label("A"), Address::from_label("B"));
        let (token0, token1, pool) = registry.register(b, a).unwrap();
        assert!(token0 < token1);
        assert_eq!(registry.get_pool(&a, &b), Some(pool));
        assert_eq!(registry.get_pool(&b, &a), Some(pool));
        assert_eq!(pool, pair_key(&registry.registry_id(), a, b).unwrap());
        assert_eq!(registry.pool_count(), 1);
        assert_eq!(registry.pool_at(0), Some(pool));
    }

    #[test]
    fn test_register_rejects_bad_pairs() {
        let mut registry = registry();
        let (a, b) = (Address::from_label("A"), Address::from_label("B"));
        assert_eq!(registry.register(a, a), Err(AmmError::IdenticalAssets));
        assert_eq!(registry.register(a, Address::ZERO), Err(AmmError::InvalidAsset));
        registry.register(a, b).unwrap();
        assert_eq!(registry.register(b, a), Err(AmmError::PoolExists));
        assert_eq!(registry.pool_count(), 1);
    }

    #[test]
    fn test_fee_setter_permissions() {
        let mut registry = registry();
        let admin = Address::from_label("admin");
        let stranger = Address::from_label("stranger");
        let treasury = Address::from_label("treasury");

        assert_eq!(registry.set_fee_to(&stranger, Some(treasury)), Err(AmmError::Forbidden));
        registry.set_fee_to(&admin, Some(treasury)).unwrap();
        assert_eq!(registry.fee_to(), Some(treasury));

        registry.set_fee_to_setter(&admin, stranger).unwrap();
        assert_eq!(registry.set_fee_to(&admin, None), Err(AmmError::Forbidden));
        registry.set_fee_to(&stranger, None).unwrap();
        assert_eq!(registry.fee_to(), None);
    }
}
