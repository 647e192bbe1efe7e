//! Pool-level operations.
//!
//! These follow the "transfer first, then call" pattern: `mint` and `swap`
//! infer deposited amounts from the pool's ledger balances, and `burn`
//! redeems whatever shares the pool itself holds. Each public operation
//! runs under the pool's lock and is all-or-nothing.

use std::ops::{Deref, DerefMut};

use pairswap_core::{
    Address, AmmError, AmmEvent, PoolState, LOCKED_LIQUIDITY_SINK, MINIMUM_LIQUIDITY,
};
use pairswap_state::{ExchangeState, Ledger, Storage};
use tracing::{debug, trace};

use crate::context::CallContext;
use crate::error::VmError;
use crate::opcodes::transfer::{execute_approve, execute_transfer, execute_transfer_from};

/// Details handed to a flash-swap callee after the optimistic transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashSwap {
    pub pool: Address,
    pub sender: Address,
    pub amount0_out: u64,
    pub amount1_out: u64,
}

/// What a flash-swap callee can do while the swapping pool is locked.
///
/// Every mutation acts for the swap's sender and goes through the same
/// checked entry points as a top-level call, so any operation on the
/// swapping pool fails with `ReentrancyGuard`.
pub trait FlashAccess {
    /// Holder the callee acts for
    fn sender(&self) -> Address;

    fn balance_of(&self, asset: &Address, holder: &Address) -> u64;

    fn allowance(&self, asset: &Address, owner: &Address, spender: &Address) -> u64;

    fn pool(&self, pool: &Address) -> Option<&PoolState>;

    fn transfer(&mut self, asset: &Address, to: &Address, amount: u64) -> Result<(), VmError>;

    fn approve(&mut self, asset: &Address, spender: &Address, amount: u64) -> Result<(), VmError>;

    fn transfer_from(
        &mut self,
        asset: &Address,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> Result<(), VmError>;

    fn mint(&mut self, pool: &Address, to: &Address) -> Result<u64, VmError>;

    fn burn(&mut self, pool: &Address, to: &Address) -> Result<(u64, u64), VmError>;

    fn swap(
        &mut self,
        pool: &Address,
        amount0_out: u64,
        amount1_out: u64,
        to: &Address,
        callee: Option<&mut dyn FlashSwapCallee>,
    ) -> Result<(), VmError>;

    fn sync(&mut self, pool: &Address) -> Result<(), VmError>;

    fn skim(&mut self, pool: &Address, to: &Address) -> Result<(u64, u64), VmError>;
}

/// Receiver of a flash swap, typically repaying the pool through `access`
pub trait FlashSwapCallee {
    fn on_flash_swap(
        &mut self,
        access: &mut dyn FlashAccess,
        swap: &FlashSwap,
    ) -> Result<(), VmError>;
}

impl<F> FlashSwapCallee for F
where
    F: FnMut(&mut dyn FlashAccess, &FlashSwap) -> Result<(), VmError>,
{
    fn on_flash_swap(
        &mut self,
        access: &mut dyn FlashAccess,
        swap: &FlashSwap,
    ) -> Result<(), VmError> {
        self(access, swap)
    }
}

/// The state as seen from inside a flash-swap callback
struct CalleeAccess<'a, S: Storage> {
    state: &'a mut ExchangeState<S>,
    ctx: CallContext,
}

impl<S: Storage> FlashAccess for CalleeAccess<'_, S> {
    fn sender(&self) -> Address {
        self.ctx.sender
    }

    fn balance_of(&self, asset: &Address, holder: &Address) -> u64 {
        self.state.balance_of(asset, holder)
    }

    fn allowance(&self, asset: &Address, owner: &Address, spender: &Address) -> u64 {
        self.state.allowance(asset, owner, spender)
    }

    fn pool(&self, pool: &Address) -> Option<&PoolState> {
        self.state.get_pool(pool)
    }

    fn transfer(&mut self, asset: &Address, to: &Address, amount: u64) -> Result<(), VmError> {
        execute_transfer(&mut *self.state, &self.ctx, asset, to, amount)
    }

    fn approve(&mut self, asset: &Address, spender: &Address, amount: u64) -> Result<(), VmError> {
        execute_approve(&mut *self.state, &self.ctx, asset, spender, amount)
    }

    fn transfer_from(
        &mut self,
        asset: &Address,
        from: &Address,
        to: &Address,
        amount: u64,
    ) -> Result<(), VmError> {
        execute_transfer_from(&mut *self.state, &self.ctx, asset, from, to, amount)
    }

    fn mint(&mut self, pool: &Address, to: &Address) -> Result<u64, VmError> {
        mint(&mut *self.state, &self.ctx, pool, to)
    }

    fn burn(&mut self, pool: &Address, to: &Address) -> Result<(u64, u64), VmError> {
        burn(&mut *self.state, &self.ctx, pool, to)
    }

    fn swap(
        &mut self,
        pool: &Address,
        amount0_out: u64,
        amount1_out: u64,
        to: &Address,
        callee: Option<&mut dyn FlashSwapCallee>,
    ) -> Result<(), VmError> {
        swap(&mut *self.state, &self.ctx, pool, amount0_out, amount1_out, to, callee)
    }

    fn sync(&mut self, pool: &Address) -> Result<(), VmError> {
        sync(&mut *self.state, &self.ctx, pool)
    }

    fn skim(&mut self, pool: &Address, to: &Address) -> Result<(u64, u64), VmError> {
        skim(&mut *self.state, &self.ctx, pool, to)
    }
}

/// Holds a pool's lock for as long as it lives and releases it on drop,
/// including on early return through `?`.
pub struct PoolGuard<'a, S: Storage> {
    state: &'a mut ExchangeState<S>,
    pool: Address,
}

impl<'a, S: Storage> PoolGuard<'a, S> {
    pub fn acquire(state: &'a mut ExchangeState<S>, pool: &Address) -> Result<Self, AmmError> {
        state
            .get_pool_mut(pool)
            .ok_or(AmmError::PoolNotFound)?
            .try_lock()?;
        trace!(%pool, "pool locked");
        Ok(PoolGuard { state, pool: *pool })
    }

    pub fn pool(&self) -> Result<&PoolState, AmmError> {
        self.state.get_pool(&self.pool).ok_or(AmmError::PoolNotFound)
    }

    pub fn pool_mut(&mut self) -> Result<&mut PoolState, AmmError> {
        self.state
            .get_pool_mut(&self.pool)
            .ok_or(AmmError::PoolNotFound)
    }

    /// Ledger balances of both pooled assets held by the pool
    fn balances(&self) -> Result<(u64, u64), AmmError> {
        let pool = self.pool()?;
        Ok((
            self.state.balance_of(&pool.token0, &pool.address),
            self.state.balance_of(&pool.token1, &pool.address),
        ))
    }

    /// Adopt new balances as reserves and record the Sync event
    fn update(&mut self, balance0: u64, balance1: u64, now: u64) -> Result<(), AmmError> {
        let pool = self.pool;
        self.pool_mut()?.update(balance0, balance1, now)?;
        self.state.emit(AmmEvent::Sync {
            pool,
            reserve0: balance0,
            reserve1: balance1,
        });
        Ok(())
    }

    fn mint_shares(&mut self, to: &Address, amount: u64) -> Result<(), VmError> {
        let pool = self.pool;
        let record = self.pool_mut()?;
        record.total_shares = record
            .total_shares
            .checked_add(amount)
            .ok_or(AmmError::ArithmeticOverflow)?;
        self.state.mint_asset(&pool, to, amount)?;
        Ok(())
    }

    fn burn_shares(&mut self, from: &Address, amount: u64) -> Result<(), VmError> {
        let pool = self.pool;
        self.state.burn_asset(&pool, from, amount)?;
        let record = self.pool_mut()?;
        record.total_shares = record
            .total_shares
            .checked_sub(amount)
            .ok_or(AmmError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Mint the protocol's cut of fee growth if the fee switch is on.
    /// Returns whether it is on.
    fn mint_fee(&mut self) -> Result<bool, VmError> {
        match self.state.registry().fee_to() {
            Some(fee_to) => {
                let liquidity = self.pool()?.protocol_fee_liquidity()?;
                if liquidity > 0 {
                    debug!(pool = %self.pool, %fee_to, liquidity, "Minted protocol fee");
                    self.mint_shares(&fee_to, liquidity)?;
                }
                Ok(true)
            }
            None => {
                let record = self.pool_mut()?;
                if record.k_last != 0 {
                    record.k_last = 0;
                }
                Ok(false)
            }
        }
    }
}

impl<S: Storage> Deref for PoolGuard<'_, S> {
    type Target = ExchangeState<S>;

    fn deref(&self) -> &Self::Target {
        self.state
    }
}

impl<S: Storage> DerefMut for PoolGuard<'_, S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.state
    }
}

impl<S: Storage> Drop for PoolGuard<'_, S> {
    fn drop(&mut self) {
        if let Some(record) = self.state.get_pool_mut(&self.pool) {
            record.unlock();
        }
        trace!(pool = %self.pool, "pool unlocked");
    }
}

/// Mint shares to `to` for the amounts transferred in since the last update
pub fn mint<S: Storage>(
    state: &mut ExchangeState<S>,
    ctx: &CallContext,
    pool: &Address,
    to: &Address,
) -> Result<u64, VmError> {
    state.transact(|state| -> Result<u64, VmError> {
        let mut guard = PoolGuard::acquire(state, pool)?;
        let (reserve0, reserve1, _) = guard.pool()?.reserves();
        let (balance0, balance1) = guard.balances()?;
        let amount0 = balance0
            .checked_sub(reserve0)
            .ok_or(AmmError::ArithmeticOverflow)?;
        let amount1 = balance1
            .checked_sub(reserve1)
            .ok_or(AmmError::ArithmeticOverflow)?;

        let fee_on = guard.mint_fee()?;
        let first_deposit = guard.pool()?.total_shares == 0;
        let liquidity = guard.pool()?.liquidity_for_deposit(amount0, amount1)?;
        if first_deposit {
            guard.mint_shares(&LOCKED_LIQUIDITY_SINK, MINIMUM_LIQUIDITY)?;
        }
        guard.mint_shares(to, liquidity)?;

        guard.update(balance0, balance1, ctx.timestamp)?;
        if fee_on {
            let record = guard.pool_mut()?;
            record.k_last = record.k();
        }

        guard.emit(AmmEvent::Mint {
            pool: *pool,
            sender: ctx.sender,
            amount0,
            amount1,
        });
        debug!(%pool, %to, amount0, amount1, liquidity, "Minted liquidity");
        Ok(liquidity)
    })
}

/// Redeem the shares held by the pool itself, paying both assets to `to`
pub fn burn<S: Storage>(
    state: &mut ExchangeState<S>,
    ctx: &CallContext,
    pool: &Address,
    to: &Address,
) -> Result<(u64, u64), VmError> {
    state.transact(|state| -> Result<(u64, u64), VmError> {
        let mut guard = PoolGuard::acquire(state, pool)?;
        let (token0, token1) = {
            let record = guard.pool()?;
            (record.token0, record.token1)
        };
        let (balance0, balance1) = guard.balances()?;
        let liquidity = guard.balance_of(pool, pool);

        let fee_on = guard.mint_fee()?;
        let (amount0, amount1) = guard
            .pool()?
            .amounts_for_shares(liquidity, balance0, balance1)?;

        guard.burn_shares(pool, liquidity)?;
        guard.transfer(&token0, pool, to, amount0)?;
        guard.transfer(&token1, pool, to, amount1)?;

        let (balance0, balance1) = guard.balances()?;
        guard.update(balance0, balance1, ctx.timestamp)?;
        if fee_on {
            let record = guard.pool_mut()?;
            record.k_last = record.k();
        }

        guard.emit(AmmEvent::Burn {
            pool: *pool,
            sender: ctx.sender,
            amount0,
            amount1,
            to: *to,
        });
        debug!(%pool, %to, amount0, amount1, liquidity, "Burned liquidity");
        Ok((amount0, amount1))
    })
}

/// Pay out the requested amounts, optionally run a flash-swap callee, then
/// require the fee-adjusted constant product to hold on the final balances.
pub fn swap<S: Storage>(
    state: &mut ExchangeState<S>,
    ctx: &CallContext,
    pool: &Address,
    amount0_out: u64,
    amount1_out: u64,
    to: &Address,
    callee: Option<&mut dyn FlashSwapCallee>,
) -> Result<(), VmError> {
    if amount0_out == 0 && amount1_out == 0 {
        return Err(AmmError::InsufficientOutputAmount.into());
    }
    state.transact(|state| -> Result<(), VmError> {
        let mut guard = PoolGuard::acquire(state, pool)?;
        let record = guard.pool()?.clone();
        if amount0_out >= record.reserve0 || amount1_out >= record.reserve1 {
            return Err(AmmError::InsufficientLiquidity.into());
        }
        if *to == record.token0 || *to == record.token1 {
            return Err(AmmError::InvalidRecipient.into());
        }

        if amount0_out > 0 {
            guard.transfer(&record.token0, pool, to, amount0_out)?;
        }
        if amount1_out > 0 {
            guard.transfer(&record.token1, pool, to, amount1_out)?;
        }
        if let Some(callee) = callee {
            let flash = FlashSwap {
                pool: *pool,
                sender: ctx.sender,
                amount0_out,
                amount1_out,
            };
            let mut access = CalleeAccess {
                state: &mut *guard,
                ctx: *ctx,
            };
            callee.on_flash_swap(&mut access, &flash)?;
        }

        let (balance0, balance1) = guard.balances()?;
        let amount0_in = balance0.saturating_sub(record.reserve0 - amount0_out);
        let amount1_in = balance1.saturating_sub(record.reserve1 - amount1_out);
        if amount0_in == 0 && amount1_in == 0 {
            return Err(AmmError::InsufficientInputAmount.into());
        }
        record.check_invariant(balance0, balance1, amount0_in, amount1_in)?;

        guard.update(balance0, balance1, ctx.timestamp)?;
        guard.emit(AmmEvent::Swap {
            pool: *pool,
            sender: ctx.sender,
            amount0_in,
            amount1_in,
            amount0_out,
            amount1_out,
            to: *to,
        });
        debug!(
            %pool, %to, amount0_in, amount1_in, amount0_out, amount1_out,
            "Swapped"
        );
        Ok(())
    })
}

/// Force reserves to match the pool's ledger balances.
///
/// A pool without shares keeps zero reserves; anything sent to it before
/// the first `mint` counts toward that deposit.
pub fn sync<S: Storage>(
    state: &mut ExchangeState<S>,
    ctx: &CallContext,
    pool: &Address,
) -> Result<(), VmError> {
    state.transact(|state| -> Result<(), VmError> {
        let mut guard = PoolGuard::acquire(state, pool)?;
        if guard.pool()?.total_shares == 0 {
            return Err(AmmError::InsufficientLiquidity.into());
        }
        let (balance0, balance1) = guard.balances()?;
        guard.update(balance0, balance1, ctx.timestamp)?;
        debug!(%pool, balance0, balance1, "Synced reserves");
        Ok(())
    })
}

/// Send any balance above the reserves to `to`
pub fn skim<S: Storage>(
    state: &mut ExchangeState<S>,
    _ctx: &CallContext,
    pool: &Address,
    to: &Address,
) -> Result<(u64, u64), VmError> {
    state.transact(|state| -> Result<(u64, u64), VmError> {
        let mut guard = PoolGuard::acquire(state, pool)?;
        let record = guard.pool()?.clone();
        let (balance0, balance1) = guard.balances()?;
        let excess0 = balance0.saturating_sub(record.reserve0);
        let excess1 = balance1.saturating_sub(record.reserve1);
        if excess0 > 0 {
            guard.transfer(&record.token0, pool, to, excess0)?;
        }
        if excess1 > 0 {
            guard.transfer(&record.token1, pool, to, excess1)?;
        }
        debug!(%pool, %to, excess0, excess1, "Skimmed");
        Ok((excess0, excess1))
    })
}
