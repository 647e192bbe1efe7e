use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::error::AmmError;
use crate::math::{encode_uq112, integer_sqrt, u128_to_u64, uq112_div};
use crate::types::address::Address;

/// Shares minted to the null address on the first deposit and never redeemable
pub const MINIMUM_LIQUIDITY: u64 = 1_000;

/// Holder of the permanently locked `MINIMUM_LIQUIDITY` shares
pub const LOCKED_LIQUIDITY_SINK: Address = Address::ZERO;

/// Mutation lock of a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
enum PoolLock {
    #[default]
    Unlocked,
    Locked,
}

/// Reserve accounting for a single canonical asset pair.
///
/// The pool's own address doubles as the ledger asset id of its liquidity
/// shares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolState {
    pub address: Address,
    pub token0: Address,
    pub token1: Address,
    pub reserve0: u64,
    pub reserve1: u64,
    pub total_shares: u64,
    /// Sum of UQ112x112 `reserve1 / reserve0` weighted by elapsed seconds
    pub price0_cumulative_last: U256,
    /// Sum of UQ112x112 `reserve0 / reserve1` weighted by elapsed seconds
    pub price1_cumulative_last: U256,
    pub last_update_timestamp: u64,
    /// `reserve0 * reserve1` as of the last liquidity event while the protocol fee is on
    pub k_last: u128,
    lock: PoolLock,
}

impl PoolState {
    pub fn new(address: Address, token0: Address, token1: Address) -> Self {
        PoolState {
            address,
            token0,
            token1,
            reserve0: 0,
            reserve1: 0,
            total_shares: 0,
            price0_cumulative_last: U256::zero(),
            price1_cumulative_last: U256::zero(),
            last_update_timestamp: 0,
            k_last: 0,
            lock: PoolLock::Unlocked,
        }
    }

    /// `(reserve0, reserve1, last_update_timestamp)`
    pub fn reserves(&self) -> (u64, u64, u64) {
        (self.reserve0, self.reserve1, self.last_update_timestamp)
    }

    /// Reserves oriented as `(reserve_of(asset), reserve_of(other))`
    pub fn reserves_for(&self, asset: &Address) -> Option<(u64, u64)> {
        if *asset == self.token0 {
            Some((self.reserve0, self.reserve1))
        } else if *asset == self.token1 {
            Some((self.reserve1, self.reserve0))
        } else {
            None
        }
    }

    pub fn is_locked(&self) -> bool {
        self.lock == PoolLock::Locked
    }

    /// Take the mutation lock; fails `ReentrancyGuard` if it is already held
    pub fn try_lock(&mut self) -> Result<(), AmmError> {
        if self.is_locked() {
            return Err(AmmError::ReentrancyGuard);
        }
        self.lock = PoolLock::Locked;
        Ok(())
    }

    pub fn unlock(&mut self) {
        self.lock = PoolLock::Unlocked;
    }

    /// Fold the current reserves into the price accumulators.
    ///
    /// Only the first update at a strictly later timestamp accumulates; an
    /// empty side skips accumulation but still advances the clock.
    pub fn accumulate_prices(&mut self, now: u64) -> Result<(), AmmError> {
        if now <= self.last_update_timestamp {
            return Ok(());
        }
        let elapsed = U256::from(now - self.last_update_timestamp);
        if self.reserve0 != 0 && self.reserve1 != 0 {
            let price0 = uq112_div(encode_uq112(self.reserve1), self.reserve0)?;
            let price1 = uq112_div(encode_uq112(self.reserve0), self.reserve1)?;
            self.price0_cumulative_last = price0
                .checked_mul(elapsed)
                .and_then(|delta| self.price0_cumulative_last.checked_add(delta))
                .ok_or(AmmError::ArithmeticOverflow)?;
            self.price1_cumulative_last = price1
                .checked_mul(elapsed)
                .and_then(|delta| self.price1_cumulative_last.checked_add(delta))
                .ok_or(AmmError::ArithmeticOverflow)?;
        }
        self.last_update_timestamp = now;
        Ok(())
    }

    /// Accumulate prices with the old reserves, then adopt the new balances
    pub fn update(&mut self, balance0: u64, balance1: u64, now: u64) -> Result<(), AmmError> {
        self.accumulate_prices(now)?;
        self.reserve0 = balance0;
        self.reserve1 = balance1;
        Ok(())
    }

    /// Shares owed for a deposit of `amount0`/`amount1` on top of the reserves.
    ///
    /// On the first deposit `MINIMUM_LIQUIDITY` is withheld from the
    /// depositor; the caller locks it in the sink.
    pub fn liquidity_for_deposit(&self, amount0: u64, amount1: u64) -> Result<u64, AmmError> {
        let liquidity = if self.total_shares == 0 {
            let root = integer_sqrt((amount0 as u128) * (amount1 as u128));
            root.checked_sub(MINIMUM_LIQUIDITY)
                .ok_or(AmmError::InsufficientLiquidityMinted)?
        } else {
            if self.reserve0 == 0 || self.reserve1 == 0 {
                return Err(AmmError::InsufficientLiquidity);
            }
            let total = self.total_shares as u128;
            let from0 = (amount0 as u128) * total / (self.reserve0 as u128);
            let from1 = (amount1 as u128) * total / (self.reserve1 as u128);
            u128_to_u64(from0.min(from1))?
        };
        if liquidity == 0 {
            return Err(AmmError::InsufficientLiquidityMinted);
        }
        Ok(liquidity)
    }

    /// Pro-rata payout for `liquidity` shares against actual balances
    pub fn amounts_for_shares(
        &self,
        liquidity: u64,
        balance0: u64,
        balance1: u64,
    ) -> Result<(u64, u64), AmmError> {
        if self.total_shares == 0 {
            return Err(AmmError::InsufficientLiquidityBurned);
        }
        let total = self.total_shares as u128;
        let amount0 = u128_to_u64((liquidity as u128) * (balance0 as u128) / total)?;
        let amount1 = u128_to_u64((liquidity as u128) * (balance1 as u128) / total)?;
        if amount0 == 0 || amount1 == 0 {
            return Err(AmmError::InsufficientLiquidityBurned);
        }
        Ok((amount0, amount1))
    }

    /// Check the fee-adjusted constant product against the stored reserves:
    /// `(b0*1000 - in0*3) * (b1*1000 - in1*3) >= r0 * r1 * 1000^2`
    pub fn check_invariant(
        &self,
        balance0: u64,
        balance1: u64,
        amount0_in: u64,
        amount1_in: u64,
    ) -> Result<(), AmmError> {
        let adjusted0 = fee_adjusted(balance0, amount0_in)?;
        let adjusted1 = fee_adjusted(balance1, amount1_in)?;
        let lhs = U256::from(adjusted0) * U256::from(adjusted1);
        let rhs = U256::from(self.reserve0)
            * U256::from(self.reserve1)
            * U256::from(1_000_000u64);
        if lhs < rhs {
            return Err(AmmError::InvariantViolation);
        }
        Ok(())
    }

    /// Protocol shares owed for growth in sqrt(k) since `k_last`:
    /// one sixth of the growth, expressed in shares.
    pub fn protocol_fee_liquidity(&self) -> Result<u64, AmmError> {
        if self.k_last == 0 {
            return Ok(0);
        }
        let root_k = integer_sqrt((self.reserve0 as u128) * (self.reserve1 as u128)) as u128;
        let root_k_last = integer_sqrt(self.k_last) as u128;
        if root_k <= root_k_last {
            return Ok(0);
        }
        let numerator = (self.total_shares as u128) * (root_k - root_k_last);
        let denominator = root_k
            .checked_mul(5)
            .and_then(|v| v.checked_add(root_k_last))
            .ok_or(AmmError::ArithmeticOverflow)?;
        u128_to_u64(numerator / denominator)
    }

    /// Current constant product
    pub fn k(&self) -> u128 {
        (self.reserve0 as u128) * (self.reserve1 as u128)
    }
}

fn fee_adjusted(balance: u64, amount_in: u64) -> Result<u128, AmmError> {
    ((balance as u128) * 1_000)
        .checked_sub((amount_in as u128) * 3)
        .ok_or(AmmError::ArithmeticOverflow)
}
