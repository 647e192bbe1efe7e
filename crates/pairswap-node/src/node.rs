use anyhow::{anyhow, Result};
use pairswap_core::{Address, Hash, PoolState, Transaction};
use pairswap_state::{ExchangeState, FileStorage, Ledger};
use pairswap_vm::{router, ExecutionResult, Executor};
use tracing::{info, warn};

use crate::config::NodeConfig;

/// A file-backed exchange: loads persisted state, applies batches, persists again
pub struct Node {
    state: ExchangeState<FileStorage>,
}

impl Node {
    /// Open the state under `config.data_dir`, running genesis on first use
    pub fn open(config: &NodeConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        let storage = FileStorage::new(config.state_path())?;
        let mut state = ExchangeState::new(storage);
        state.load_from_storage()?;

        // A registry identity is a hash and never zero once genesis ran
        if state.registry().registry_id().is_zero() {
            let genesis = config.to_genesis_config()?;
            state.init_genesis(&genesis)?;
        }

        Ok(Node { state })
    }

    /// Apply `txs` in order at `timestamp` and persist the result
    pub fn apply(&mut self, txs: &[Transaction], timestamp: u64) -> Result<Vec<ExecutionResult>> {
        let executor = Executor::new(timestamp);
        let results = executor.execute_transactions(txs, &mut self.state);
        self.state.persist_state()?;

        let applied = results.iter().filter(|r| r.success).count();
        if applied < results.len() {
            warn!("{} of {} transactions failed", results.len() - applied, results.len());
        }
        let root = self.state_root()?;
        info!(applied, state_root = %root, "Batch applied");
        Ok(results)
    }

    pub fn state_root(&self) -> Result<Hash> {
        Ok(self.state.compute_state_root()?)
    }

    /// Expected amounts along `path` for an exact input
    pub fn quote(&self, amount_in: u64, path: &[Address]) -> Result<Vec<u64>> {
        router::get_amounts_out(&self.state, amount_in, path).map_err(|e| anyhow!(e))
    }

    /// Pools in creation order
    pub fn pools(&self) -> Vec<&PoolState> {
        let registry = self.state.registry();
        (0..registry.pool_count())
            .filter_map(|i| registry.pool_at(i))
            .filter_map(|address| self.state.get_pool(&address))
            .collect()
    }

    pub fn balance(&self, holder: &Address, asset: &Address) -> u64 {
        self.state.balance_of(asset, holder)
    }

    pub fn nonce(&self, holder: &Address) -> u64 {
        self.state.nonce(holder)
    }
}
