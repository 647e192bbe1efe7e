//! Caller-facing operations composed from pool primitives.
//!
//! The router adds deadlines and slippage bounds on top of `mint`, `burn`
//! and `swap`. It acts with the caller's authority and never holds funds:
//! deposits go straight from the caller to the pool, and every hop of a
//! multi-hop swap pays the next pool directly.

use pairswap_core::{math, sort_tokens, Address, AmmError};
use pairswap_state::{ExchangeState, Ledger, Storage};
use tracing::debug;

use crate::context::CallContext;
use crate::error::VmError;
use crate::opcodes::{burn, create_pool, mint, swap};

pub use pairswap_core::math::{get_amount_in, get_amount_out, quote};

/// Reserves of the `(a, b)` pool oriented as `(reserve_a, reserve_b)`
pub fn get_reserves<S: Storage>(
    state: &ExchangeState<S>,
    asset_a: &Address,
    asset_b: &Address,
) -> Result<(u64, u64), AmmError> {
    sort_tokens(*asset_a, *asset_b)?;
    state
        .pool_for_pair(asset_a, asset_b)
        .and_then(|pool| pool.reserves_for(asset_a))
        .ok_or(AmmError::PoolNotFound)
}

fn pool_for<S: Storage>(
    state: &ExchangeState<S>,
    asset_a: &Address,
    asset_b: &Address,
) -> Result<Address, AmmError> {
    state
        .registry()
        .get_pool(asset_a, asset_b)
        .ok_or(AmmError::PoolNotFound)
}

/// Forward amounts along `path` against live reserves
pub fn get_amounts_out<S: Storage>(
    state: &ExchangeState<S>,
    amount_in: u64,
    path: &[Address],
) -> Result<Vec<u64>, AmmError> {
    math::get_amounts_out(amount_in, path, |a, b| get_reserves(state, a, b))
}

/// Backward amounts along `path` against live reserves
pub fn get_amounts_in<S: Storage>(
    state: &ExchangeState<S>,
    amount_out: u64,
    path: &[Address],
) -> Result<Vec<u64>, AmmError> {
    math::get_amounts_in(amount_out, path, |a, b| get_reserves(state, a, b))
}

/// Deposit amounts that respect the pool's current ratio
fn optimal_amounts(
    reserves: (u64, u64),
    desired: (u64, u64),
    minimum: (u64, u64),
) -> Result<(u64, u64), AmmError> {
    let (reserve_a, reserve_b) = reserves;
    let (desired_a, desired_b) = desired;
    if reserve_a == 0 && reserve_b == 0 {
        return Ok(desired);
    }

    let optimal_b = quote(desired_a, reserve_a, reserve_b)?;
    if optimal_b <= desired_b {
        if optimal_b < minimum.1 {
            return Err(AmmError::InsufficientBAmount);
        }
        return Ok((desired_a, optimal_b));
    }

    let optimal_a = quote(desired_b, reserve_b, reserve_a)?;
    if optimal_a > desired_a {
        return Err(AmmError::ExcessiveInputAmount);
    }
    if optimal_a < minimum.0 {
        return Err(AmmError::InsufficientAAmount);
    }
    Ok((optimal_a, desired_b))
}

/// Deposit into the `(asset_a, asset_b)` pool, creating it if needed.
///
/// Returns `(amount_a, amount_b, liquidity)`.
#[allow(clippy::too_many_arguments)]
pub fn add_liquidity<S: Storage>(
    state: &mut ExchangeState<S>,
    ctx: &CallContext,
    asset_a: &Address,
    asset_b: &Address,
    amount_a_desired: u64,
    amount_b_desired: u64,
    amount_a_min: u64,
    amount_b_min: u64,
    to: &Address,
    deadline: u64,
) -> Result<(u64, u64, u64), VmError> {
    ctx.ensure(deadline)?;
    state.transact(|state| -> Result<(u64, u64, u64), VmError> {
        if state.registry().get_pool(asset_a, asset_b).is_none() {
            create_pool(state, asset_a, asset_b)?;
        }
        let (amount_a, amount_b) = optimal_amounts(
            get_reserves(state, asset_a, asset_b)?,
            (amount_a_desired, amount_b_desired),
            (amount_a_min, amount_b_min),
        )?;

        let pool = pool_for(state, asset_a, asset_b)?;
        state.transfer(asset_a, &ctx.sender, &pool, amount_a)?;
        state.transfer(asset_b, &ctx.sender, &pool, amount_b)?;
        let liquidity = mint(state, ctx, &pool, to)?;

        debug!(%pool, amount_a, amount_b, liquidity, "Added liquidity");
        Ok((amount_a, amount_b, liquidity))
    })
}

/// Redeem `liquidity` shares of the `(asset_a, asset_b)` pool.
///
/// Returns `(amount_a, amount_b)`.
#[allow(clippy::too_many_arguments)]
pub fn remove_liquidity<S: Storage>(
    state: &mut ExchangeState<S>,
    ctx: &CallContext,
    asset_a: &Address,
    asset_b: &Address,
    liquidity: u64,
    amount_a_min: u64,
    amount_b_min: u64,
    to: &Address,
    deadline: u64,
) -> Result<(u64, u64), VmError> {
    ctx.ensure(deadline)?;
    state.transact(|state| -> Result<(u64, u64), VmError> {
        let pool = pool_for(state, asset_a, asset_b)?;
        state.transfer(&pool, &ctx.sender, &pool, liquidity)?;
        let (amount0, amount1) = burn(state, ctx, &pool, to)?;

        let (token0, _) = sort_tokens(*asset_a, *asset_b)?;
        let (amount_a, amount_b) = if *asset_a == token0 {
            (amount0, amount1)
        } else {
            (amount1, amount0)
        };
        if amount_a < amount_a_min {
            return Err(AmmError::InsufficientAAmount.into());
        }
        if amount_b < amount_b_min {
            return Err(AmmError::InsufficientBAmount.into());
        }

        debug!(%pool, amount_a, amount_b, liquidity, "Removed liquidity");
        Ok((amount_a, amount_b))
    })
}

/// Sell exactly `amount_in` of `path[0]` for at least `amount_out_min` of the last asset
pub fn swap_exact_tokens_for_tokens<S: Storage>(
    state: &mut ExchangeState<S>,
    ctx: &CallContext,
    amount_in: u64,
    amount_out_min: u64,
    path: &[Address],
    to: &Address,
    deadline: u64,
) -> Result<Vec<u64>, VmError> {
    ctx.ensure(deadline)?;
    state.transact(|state| -> Result<Vec<u64>, VmError> {
        let amounts = get_amounts_out(state, amount_in, path)?;
        let last = amounts.last().copied().unwrap_or(0);
        if last < amount_out_min {
            return Err(AmmError::InsufficientOutputAmount.into());
        }
        execute_path(state, ctx, &amounts, path, to)?;
        Ok(amounts)
    })
}

/// Buy exactly `amount_out` of the last asset for at most `amount_in_max` of `path[0]`
pub fn swap_tokens_for_exact_tokens<S: Storage>(
    state: &mut ExchangeState<S>,
    ctx: &CallContext,
    amount_out: u64,
    amount_in_max: u64,
    path: &[Address],
    to: &Address,
    deadline: u64,
) -> Result<Vec<u64>, VmError> {
    ctx.ensure(deadline)?;
    state.transact(|state| -> Result<Vec<u64>, VmError> {
        let amounts = get_amounts_in(state, amount_out, path)?;
        if amounts[0] > amount_in_max {
            return Err(AmmError::ExcessiveInputAmount.into());
        }
        execute_path(state, ctx, &amounts, path, to)?;
        Ok(amounts)
    })
}

/// Pay the first pool, then swap hop by hop; each hop's output goes to the
/// next pool, the last to `to`.
fn execute_path<S: Storage>(
    state: &mut ExchangeState<S>,
    ctx: &CallContext,
    amounts: &[u64],
    path: &[Address],
    to: &Address,
) -> Result<(), VmError> {
    let first_pool = pool_for(state, &path[0], &path[1])?;
    state.transfer(&path[0], &ctx.sender, &first_pool, amounts[0])?;

    for (i, hop) in path.windows(2).enumerate() {
        let (input, output) = (&hop[0], &hop[1]);
        let (token0, _) = sort_tokens(*input, *output)?;
        let amount_out = amounts[i + 1];
        let (amount0_out, amount1_out) = if *input == token0 {
            (0, amount_out)
        } else {
            (amount_out, 0)
        };
        let recipient = match path.get(i + 2) {
            Some(next) => pool_for(state, output, next)?,
            None => *to,
        };
        let pool = pool_for(state, input, output)?;
        swap(state, ctx, &pool, amount0_out, amount1_out, &recipient, None)?;
    }
    Ok(())
}
