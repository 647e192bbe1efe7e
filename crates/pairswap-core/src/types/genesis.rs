use serde::{Deserialize, Serialize};

use crate::crypto::hash_domain;
use crate::types::address::Address;

/// Initial exchange state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisConfig {
    pub timestamp: u64,
    /// Salt for the registry identity; distinct salts yield disjoint pool addresses
    pub registry_salt: String,
    pub fee_to_setter: Address,
    /// `(holder, asset, amount)`
    pub initial_balances: Vec<(Address, Address, u64)>,
}

impl GenesisConfig {
    pub fn registry_id(&self) -> Address {
        hash_domain(b"pairswap/registry", &[self.registry_salt.as_bytes()]).into()
    }
}
