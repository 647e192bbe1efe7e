use pairswap_core::{AmmEvent, Hash, Op, Transaction};
use pairswap_state::{ExchangeState, Storage};
use tracing::{debug, info, warn};

use crate::context::CallContext;
use crate::error::VmError;
use crate::opcodes::{
    burn, create_pool, execute_approve, execute_transfer, execute_transfer_from, mint,
    set_fee_to, set_fee_to_setter, skim, swap, sync,
};
use crate::router;
use crate::validation::validate_transaction;

/// Result of executing a transaction
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub tx_hash: Hash,
    pub success: bool,
    /// Error message if failed
    pub error: Option<String>,
    /// Events emitted by the transaction; empty on failure
    pub events: Vec<AmmEvent>,
}

impl ExecutionResult {
    fn failed(tx_hash: Hash, error: String) -> Self {
        ExecutionResult {
            tx_hash,
            success: false,
            error: Some(error),
            events: vec![],
        }
    }
}

/// Transaction executor
pub struct Executor {
    /// Timestamp seen by every operation in the batch
    current_time: u64,
}

impl Executor {
    pub fn new(current_time: u64) -> Self {
        Executor { current_time }
    }

    /// Execute a single transaction.
    ///
    /// A valid transaction always consumes its nonce; its operations either
    /// all apply or none do.
    pub fn execute_transaction<S: Storage>(
        &self,
        tx: &Transaction,
        state: &mut ExchangeState<S>,
    ) -> ExecutionResult {
        let tx_hash = match tx.hash() {
            Ok(h) => h,
            Err(e) => {
                return ExecutionResult::failed(
                    Hash::ZERO,
                    format!("Failed to hash transaction: {}", e),
                )
            }
        };

        debug!("Executing transaction {}", tx_hash);

        let validation = validate_transaction(tx, state);
        if !validation.is_valid {
            let error_msg = validation
                .error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "Unknown validation error".to_string());
            warn!("Transaction {} validation failed: {}", tx_hash, error_msg);
            return ExecutionResult::failed(tx_hash, error_msg);
        }

        let ctx = CallContext::new(tx.sender(), self.current_time);
        let mark = state.event_count();
        let outcome = state.transact(|state| -> Result<(), VmError> {
            for op in &tx.ops {
                self.execute_op(op, &ctx, state)?;
            }
            Ok(())
        });
        state.increment_nonce(&ctx.sender);

        match outcome {
            Ok(()) => {
                info!("Transaction {} executed successfully", tx_hash);
                ExecutionResult {
                    tx_hash,
                    success: true,
                    error: None,
                    events: state.events_since(mark).to_vec(),
                }
            }
            Err(e) => {
                warn!("Transaction {} failed: {}", tx_hash, e);
                ExecutionResult::failed(tx_hash, e.to_string())
            }
        }
    }

    /// Execute a single operation on behalf of `ctx.sender`
    fn execute_op<S: Storage>(
        &self,
        op: &Op,
        ctx: &CallContext,
        state: &mut ExchangeState<S>,
    ) -> Result<(), VmError> {
        match op {
            Op::Transfer { asset, to, amount } => {
                execute_transfer(state, ctx, asset, to, *amount)?;
            }
            Op::Approve {
                asset,
                spender,
                amount,
            } => {
                execute_approve(state, ctx, asset, spender, *amount)?;
            }
            Op::TransferFrom {
                asset,
                from,
                to,
                amount,
            } => {
                execute_transfer_from(state, ctx, asset, from, to, *amount)?;
            }
            Op::CreatePool { asset_a, asset_b } => {
                create_pool(state, asset_a, asset_b)?;
            }
            Op::AddLiquidity {
                asset_a,
                asset_b,
                amount_a_desired,
                amount_b_desired,
                amount_a_min,
                amount_b_min,
                to,
                deadline,
            } => {
                router::add_liquidity(
                    state,
                    ctx,
                    asset_a,
                    asset_b,
                    *amount_a_desired,
                    *amount_b_desired,
                    *amount_a_min,
                    *amount_b_min,
                    to,
                    *deadline,
                )?;
            }
            Op::RemoveLiquidity {
                asset_a,
                asset_b,
                liquidity,
                amount_a_min,
                amount_b_min,
                to,
                deadline,
            } => {
                router::remove_liquidity(
                    state,
                    ctx,
                    asset_a,
                    asset_b,
                    *liquidity,
                    *amount_a_min,
                    *amount_b_min,
                    to,
                    *deadline,
                )?;
            }
            Op::SwapExactTokensForTokens {
                amount_in,
                amount_out_min,
                path,
                to,
                deadline,
            } => {
                router::swap_exact_tokens_for_tokens(
                    state,
                    ctx,
                    *amount_in,
                    *amount_out_min,
                    path,
                    to,
                    *deadline,
                )?;
            }
            Op::SwapTokensForExactTokens {
                amount_out,
                amount_in_max,
                path,
                to,
                deadline,
            } => {
                router::swap_tokens_for_exact_tokens(
                    state,
                    ctx,
                    *amount_out,
                    *amount_in_max,
                    path,
                    to,
                    *deadline,
                )?;
            }
            Op::Mint { pool, to } => {
                mint(state, ctx, pool, to)?;
            }
            Op::Burn { pool, to } => {
                burn(state, ctx, pool, to)?;
            }
            Op::Swap {
                pool,
                amount0_out,
                amount1_out,
                to,
            } => {
                swap(state, ctx, pool, *amount0_out, *amount1_out, to, None)?;
            }
            Op::Sync { pool } => {
                sync(state, ctx, pool)?;
            }
            Op::Skim { pool, to } => {
                skim(state, ctx, pool, to)?;
            }
            Op::SetFeeTo { fee_to } => {
                set_fee_to(state, ctx, *fee_to)?;
            }
            Op::SetFeeToSetter { setter } => {
                set_fee_to_setter(state, ctx, setter)?;
            }
        }
        Ok(())
    }

    /// Execute transactions in order
    pub fn execute_transactions<S: Storage>(
        &self,
        txs: &[Transaction],
        state: &mut ExchangeState<S>,
    ) -> Vec<ExecutionResult> {
        txs.iter()
            .map(|tx| self.execute_transaction(tx, state))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairswap_core::{pair_key, Address, GenesisConfig, KeyPair};
    use pairswap_state::{Ledger, MemoryStorage};

    fn setup() -> (ExchangeState<MemoryStorage>, KeyPair, Address, Address) {
        let mut state = ExchangeState::new(MemoryStorage::new());
        let trader = KeyPair::from_secret_bytes(&[9u8; 32]);
        let (a, b) = (Address::from_label("A"), Address::from_label("B"));
        let config = GenesisConfig {
            timestamp: 0,
            registry_salt: "executor-test".to_string(),
            fee_to_setter: trader.address(),
            initial_balances: vec![
                (trader.address(), a, 10_000_000),
                (trader.address(), b, 10_000_000),
            ],
        };
        state.init_genesis(&config).unwrap();
        (state, trader, a, b)
    }

    fn add_liquidity_op(a: Address, b: Address, to: Address) -> Op {
        Op::AddLiquidity {
            asset_a: a,
            asset_b: b,
            amount_a_desired: 1_000_000,
            amount_b_desired: 500_000,
            amount_a_min: 0,
            amount_b_min: 0,
            to,
            deadline: 200,
        }
    }

    #[test]
    fn test_execute_add_liquidity_and_swap() {
        let (mut state, trader, a, b) = setup();
        let executor = Executor::new(100);
        let ops = vec![
            add_liquidity_op(a, b, trader.address()),
            Op::SwapExactTokensForTokens {
                amount_in: 1_000,
                amount_out_min: 497,
                path: vec![a, b],
                to: trader.address(),
                deadline: 200,
            },
        ];
        let tx = Transaction::new_signed(trader.public, 1, ops, &trader.secret).unwrap();

        let result = executor.execute_transaction(&tx, &mut state);

        assert!(result.success, "{:?}", result.error);
        assert!(result
            .events
            .iter()
            .any(|e| matches!(e, AmmEvent::PoolCreated { .. })));
        assert!(result.events.iter().any(|e| matches!(e, AmmEvent::Swap { .. })));
        assert_eq!(state.balance_of(&b, &trader.address()), 10_000_000 - 500_000 + 498);
        assert_eq!(state.nonce(&trader.address()), 1);
    }

    #[test]
    fn test_failed_op_rolls_back_whole_transaction() {
        let (mut state, trader, a, b) = setup();
        let executor = Executor::new(100);
        let ops = vec![
            add_liquidity_op(a, b, trader.address()),
            Op::SwapExactTokensForTokens {
                amount_in: 1_000,
                amount_out_min: 10_000,
                path: vec![a, b],
                to: trader.address(),
                deadline: 200,
            },
        ];
        let tx = Transaction::new_signed(trader.public, 1, ops, &trader.secret).unwrap();
        let root_before = state.compute_state_root().unwrap();

        let result = executor.execute_transaction(&tx, &mut state);

        assert!(!result.success);
        assert!(result.events.is_empty());
        assert_eq!(state.registry().pool_count(), 0);
        assert_eq!(state.balance_of(&a, &trader.address()), 10_000_000);
        // Only the nonce moved
        assert_eq!(state.nonce(&trader.address()), 1);
        assert_ne!(state.compute_state_root().unwrap(), root_before);
    }

    #[test]
    fn test_expired_deadline() {
        let (mut state, trader, a, b) = setup();
        let executor = Executor::new(201);
        let tx = Transaction::new_signed(
            trader.public,
            1,
            vec![add_liquidity_op(a, b, trader.address())],
            &trader.secret,
        )
        .unwrap();

        let result = executor.execute_transaction(&tx, &mut state);
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Deadline expired"));
    }

    #[test]
    fn test_donate_then_sync_on_empty_pool_rejected() {
        let (mut state, trader, a, b) = setup();
        let executor = Executor::new(100);
        let pool = pair_key(&state.registry().registry_id(), a, b).unwrap();
        let ops = vec![
            Op::CreatePool { asset_a: a, asset_b: b },
            Op::Transfer { asset: a, to: pool, amount: 5_000 },
            Op::Transfer { asset: b, to: pool, amount: 5_000 },
            Op::Sync { pool },
        ];
        let tx = Transaction::new_signed(trader.public, 1, ops, &trader.secret).unwrap();

        let result = executor.execute_transaction(&tx, &mut state);

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Insufficient liquidity"));
        assert!(state.get_pool(&pool).is_none());
        assert_eq!(state.balance_of(&a, &pool), 0);
        assert_eq!(state.balance_of(&a, &trader.address()), 10_000_000);
    }

    #[test]
    fn test_replayed_transaction_rejected() {
        let (mut state, trader, a, b) = setup();
        let executor = Executor::new(100);
        let tx = Transaction::new_signed(
            trader.public,
            1,
            vec![Op::CreatePool { asset_a: a, asset_b: b }],
            &trader.secret,
        )
        .unwrap();

        let results = executor.execute_transactions(&[tx.clone(), tx], &mut state);
        assert!(results[0].success);
        assert!(!results[1].success);
        assert_eq!(state.registry().pool_count(), 1);
    }
}
