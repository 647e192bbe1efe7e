use std::collections::BTreeMap;

use pairswap_core::{
    serialize, Account, Address, AmmError, AmmEvent, GenesisConfig, Hash, PairRegistry, PoolState,
};
use tracing::{debug, info};

use crate::error::StateError;
use crate::merkle::compute_state_root;
use crate::storage::Storage;

/// Key prefixes for storage
mod keys {
    pub const ACCOUNT: &[u8] = b"acc:";
    pub const POOL: &[u8] = b"pool:";
    pub const REGISTRY: &[u8] = b"registry";
}

/// Copy of the mutable exchange state taken before an atomic operation
#[derive(Debug, Clone)]
pub struct StateSnapshot {
    accounts: BTreeMap<Address, Account>,
    pools: BTreeMap<Address, PoolState>,
    registry: PairRegistry,
    event_count: usize,
}

/// The exchange state: ledger accounts, pools, registry and event log
pub struct ExchangeState<S: Storage> {
    storage: S,
    accounts: BTreeMap<Address, Account>,
    /// Pool records keyed by pool address
    pools: BTreeMap<Address, PoolState>,
    registry: PairRegistry,
    /// Events in execution order; not persisted
    pub events: Vec<AmmEvent>,
}

impl<S: Storage + Clone> Clone for ExchangeState<S> {
    fn clone(&self) -> Self {
        ExchangeState {
            storage: self.storage.clone(),
            accounts: self.accounts.clone(),
            pools: self.pools.clone(),
            registry: self.registry.clone(),
            events: self.events.clone(),
        }
    }
}

impl<S: Storage> ExchangeState<S> {
    /// Create an empty state. The registry has no fee setter until genesis.
    pub fn new(storage: S) -> Self {
        ExchangeState {
            storage,
            accounts: BTreeMap::new(),
            pools: BTreeMap::new(),
            registry: PairRegistry::new(Address::ZERO, Address::ZERO),
            events: Vec::new(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Initialize state from genesis configuration
    pub fn init_genesis(&mut self, config: &GenesisConfig) -> Result<(), StateError> {
        info!(salt = %config.registry_salt, "Initializing genesis state");

        self.registry = PairRegistry::new(config.registry_id(), config.fee_to_setter);

        for (holder, asset, amount) in &config.initial_balances {
            self.credit_token(holder, asset, *amount)?;
            debug!(%holder, %asset, amount, "Set initial balance");
        }

        self.persist_state()?;

        info!(registry = %self.registry.registry_id(), "Genesis state initialized");
        Ok(())
    }

    /// Persist accounts, pools and the registry, then commit
    pub fn persist_state(&mut self) -> Result<(), StateError> {
        for (key, value) in self.entries()? {
            self.storage.put(&key, &value);
        }
        self.storage.commit()
    }

    /// Replace in-memory state with what storage holds
    pub fn load_from_storage(&mut self) -> Result<(), StateError> {
        self.accounts.clear();
        self.pools.clear();
        self.events.clear();

        for key in self.storage.keys_with_prefix(keys::ACCOUNT) {
            if let (Some(holder), Some(value)) = (
                Address::from_slice(&key[keys::ACCOUNT.len()..]),
                self.storage.get(&key),
            ) {
                let account: Account = serialize::from_bytes(&value)
                    .map_err(|e| StateError::Serialization(e.to_string()))?;
                self.accounts.insert(holder, account);
            }
        }

        for key in self.storage.keys_with_prefix(keys::POOL) {
            if let (Some(address), Some(value)) = (
                Address::from_slice(&key[keys::POOL.len()..]),
                self.storage.get(&key),
            ) {
                let pool: PoolState = serialize::from_bytes(&value)
                    .map_err(|e| StateError::Serialization(e.to_string()))?;
                self.pools.insert(address, pool);
            }
        }

        if let Some(value) = self.storage.get(keys::REGISTRY) {
            self.registry = serialize::from_bytes(&value)
                .map_err(|e| StateError::Serialization(e.to_string()))?;
        }

        info!(
            accounts = self.accounts.len(),
            pools = self.pools.len(),
            "Loaded state from storage"
        );
        Ok(())
    }

    /// Merkle root over every persisted entry
    pub fn compute_state_root(&self) -> Result<Hash, StateError> {
        let entries = self.entries()?;
        Ok(compute_state_root(
            entries.iter().map(|(k, v)| (k.as_slice(), v.as_slice())),
        ))
    }

    fn entries(&self) -> Result<Vec<(Vec<u8>, Vec<u8>)>, StateError> {
        let mut entries = Vec::with_capacity(self.accounts.len() + self.pools.len() + 1);

        for (holder, account) in &self.accounts {
            let key = [keys::ACCOUNT, holder.as_bytes()].concat();
            let value = serialize::to_bytes(account)
                .map_err(|e| StateError::Serialization(e.to_string()))?;
            entries.push((key, value));
        }

        for (address, pool) in &self.pools {
            let key = [keys::POOL, address.as_bytes()].concat();
            let value =
                serialize::to_bytes(pool).map_err(|e| StateError::Serialization(e.to_string()))?;
            entries.push((key, value));
        }

        let registry = serialize::to_bytes(&self.registry)
            .map_err(|e| StateError::Serialization(e.to_string()))?;
        entries.push((keys::REGISTRY.to_vec(), registry));

        Ok(entries)
    }

    // Account operations

    pub fn get_or_create_account(&mut self, holder: &Address) -> &mut Account {
        self.accounts.entry(*holder).or_default()
    }

    pub fn get_account(&self, holder: &Address) -> Option<&Account> {
        self.accounts.get(holder)
    }

    pub fn get_token_balance(&self, holder: &Address, asset: &Address) -> u64 {
        self.accounts.get(holder).map_or(0, |a| a.balance(asset))
    }

    /// Credit a balance without emitting an event
    pub fn credit_token(
        &mut self,
        holder: &Address,
        asset: &Address,
        amount: u64,
    ) -> Result<(), StateError> {
        self.get_or_create_account(holder)
            .credit(asset, amount)
            .map(|_| ())
            .ok_or(StateError::BalanceOverflow)
    }

    /// Debit a balance without emitting an event
    pub fn debit_token(
        &mut self,
        holder: &Address,
        asset: &Address,
        amount: u64,
    ) -> Result<(), StateError> {
        let balance = self.get_token_balance(holder, asset);
        if balance < amount {
            return Err(StateError::InsufficientBalance {
                have: balance,
                need: amount,
            });
        }
        self.get_or_create_account(holder).debit(asset, amount);
        Ok(())
    }

    /// Create `amount` of `asset` for `to`, recorded as a transfer from the null address
    pub fn mint_asset(&mut self, asset: &Address, to: &Address, amount: u64) -> Result<(), StateError> {
        self.credit_token(to, asset, amount)?;
        self.emit(AmmEvent::Transfer {
            asset: *asset,
            from: Address::ZERO,
            to: *to,
            amount,
        });
        Ok(())
    }

    /// Destroy `amount` of `asset` held by `from`, recorded as a transfer to the null address
    pub fn burn_asset(&mut self, asset: &Address, from: &Address, amount: u64) -> Result<(), StateError> {
        self.debit_token(from, asset, amount)?;
        self.emit(AmmEvent::Transfer {
            asset: *asset,
            from: *from,
            to: Address::ZERO,
            amount,
        });
        Ok(())
    }

    pub fn nonce(&self, holder: &Address) -> u64 {
        self.accounts.get(holder).map_or(0, |a| a.nonce)
    }

    pub fn increment_nonce(&mut self, holder: &Address) {
        let account = self.get_or_create_account(holder);
        account.nonce += 1;
    }

    // Registry and pools

    pub fn registry(&self) -> &PairRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut PairRegistry {
        &mut self.registry
    }

    /// Register `(a, b)` and store its empty pool record.
    /// Returns `(token0, token1, pool)`.
    pub fn create_pool_record(
        &mut self,
        a: &Address,
        b: &Address,
    ) -> Result<(Address, Address, Address), AmmError> {
        let (token0, token1, pool) = self.registry.register(*a, *b)?;
        self.pools.insert(pool, PoolState::new(pool, token0, token1));
        Ok((token0, token1, pool))
    }

    pub fn get_pool(&self, address: &Address) -> Option<&PoolState> {
        self.pools.get(address)
    }

    pub fn get_pool_mut(&mut self, address: &Address) -> Option<&mut PoolState> {
        self.pools.get_mut(address)
    }

    /// Pool for an unordered pair, resolved through the registry
    pub fn pool_for_pair(&self, a: &Address, b: &Address) -> Option<&PoolState> {
        self.registry
            .get_pool(a, b)
            .and_then(|address| self.pools.get(&address))
    }

    // Event log

    pub fn emit(&mut self, event: AmmEvent) {
        self.events.push(event);
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Events appended after position `mark`
    pub fn events_since(&self, mark: usize) -> &[AmmEvent] {
        self.events.get(mark..).unwrap_or(&[])
    }

    // Atomicity

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            accounts: self.accounts.clone(),
            pools: self.pools.clone(),
            registry: self.registry.clone(),
            event_count: self.events.len(),
        }
    }

    pub fn restore(&mut self, snapshot: StateSnapshot) {
        self.accounts = snapshot.accounts;
        self.pools = snapshot.pools;
        self.registry = snapshot.registry;
        self.events.truncate(snapshot.event_count);
    }

    /// Run `f` against the state; if it fails, every effect it had is undone
    pub fn transact<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
    {
        let snapshot = self.snapshot();
        let result = f(self);
        if result.is_err() {
            self.restore(snapshot);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn create_test_state() -> ExchangeState<MemoryStorage> {
        ExchangeState::new(MemoryStorage::new())
    }

    fn usdc() -> Address {
        Address::from_label("USDC")
    }

    #[test]
    fn test_genesis_initialization() {
        let mut state = create_test_state();
        let alice = Address::from_label("alice");
        let admin = Address::from_label("admin");

        let config = GenesisConfig {
            timestamp: 0,
            registry_salt: "test".to_string(),
            fee_to_setter: admin,
            initial_balances: vec![(alice, usdc(), 1_000_000)],
        };
        state.init_genesis(&config).unwrap();

        assert_eq!(state.get_token_balance(&alice, &usdc()), 1_000_000);
        assert_eq!(state.registry().fee_to_setter(), admin);
        assert_eq!(state.registry().registry_id(), config.registry_id());
    }

    #[test]
    fn test_debit_insufficient_balance() {
        let mut state = create_test_state();
        let alice = Address::from_label("alice");
        state.credit_token(&alice, &usdc(), 100).unwrap();

        let result = state.debit_token(&alice, &usdc(), 200);
        assert!(matches!(
            result,
            Err(StateError::InsufficientBalance { have: 100, need: 200 })
        ));
    }

    #[test]
    fn test_credit_overflow() {
        let mut state = create_test_state();
        let alice = Address::from_label("alice");
        state.credit_token(&alice, &usdc(), u64::MAX).unwrap();
        assert!(matches!(
            state.credit_token(&alice, &usdc(), 1),
            Err(StateError::BalanceOverflow)
        ));
    }

    #[test]
    fn test_transact_restores_on_error() {
        let mut state = create_test_state();
        let alice = Address::from_label("alice");
        state.credit_token(&alice, &usdc(), 500).unwrap();

        let result: Result<(), StateError> = state.transact(|s| {
            s.mint_asset(&usdc(), &alice, 100)?;
            s.debit_token(&alice, &usdc(), 10_000)
        });

        assert!(result.is_err());
        assert_eq!(state.get_token_balance(&alice, &usdc()), 500);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_transact_keeps_effects_on_success() {
        let mut state = create_test_state();
        let alice = Address::from_label("alice");

        state
            .transact(|s| s.mint_asset(&usdc(), &alice, 100))
            .unwrap();

        assert_eq!(state.get_token_balance(&alice, &usdc()), 100);
        assert_eq!(state.event_count(), 1);
        assert!(state.events_since(1).is_empty());
    }

    #[test]
    fn test_persist_and_load() {
        let mut state = create_test_state();
        let alice = Address::from_label("alice");
        state.credit_token(&alice, &usdc(), 42).unwrap();
        let (a, b) = (Address::from_label("A"), Address::from_label("B"));
        let (_, _, address) = state.create_pool_record(&a, &b).unwrap();
        state.increment_nonce(&alice);
        state.persist_state().unwrap();
        let root = state.compute_state_root().unwrap();

        let mut restored = ExchangeState::new(state.storage().clone());
        restored.load_from_storage().unwrap();

        assert_eq!(restored.get_token_balance(&alice, &usdc()), 42);
        assert_eq!(restored.nonce(&alice), 1);
        assert_eq!(restored.pool_for_pair(&b, &a).map(|p| p.address), Some(address));
        assert_eq!(restored.compute_state_root().unwrap(), root);
    }

    #[test]
    fn test_state_root_changes() {
        let mut state = create_test_state();
        let alice = Address::from_label("alice");

        state.credit_token(&alice, &usdc(), 1000).unwrap();
        let root1 = state.compute_state_root().unwrap();
        assert_eq!(root1, state.compute_state_root().unwrap());

        state.credit_token(&alice, &usdc(), 1000).unwrap();
        assert_ne!(root1, state.compute_state_root().unwrap());
    }
}
