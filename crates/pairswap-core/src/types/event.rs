use serde::{Deserialize, Serialize};

use crate::types::address::Address;

/// Observable exchange events, appended in execution order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmmEvent {
    PoolCreated {
        token0: Address,
        token1: Address,
        pool: Address,
        pool_count: u64,
    },
    Mint {
        pool: Address,
        sender: Address,
        amount0: u64,
        amount1: u64,
    },
    Burn {
        pool: Address,
        sender: Address,
        amount0: u64,
        amount1: u64,
        to: Address,
    },
    Swap {
        pool: Address,
        sender: Address,
        amount0_in: u64,
        amount1_in: u64,
        amount0_out: u64,
        amount1_out: u64,
        to: Address,
    },
    /// Reserves after every reserve update
    Sync {
        pool: Address,
        reserve0: u64,
        reserve1: u64,
    },
    Transfer {
        asset: Address,
        from: Address,
        to: Address,
        amount: u64,
    },
    Approval {
        asset: Address,
        owner: Address,
        spender: Address,
        amount: u64,
    },
}

impl AmmEvent {
    /// The pool this event concerns, if any
    pub fn pool(&self) -> Option<Address> {
        match self {
            AmmEvent::PoolCreated { pool, .. }
            | AmmEvent::Mint { pool, .. }
            | AmmEvent::Burn { pool, .. }
            | AmmEvent::Swap { pool, .. }
            | AmmEvent::Sync { pool, .. } => Some(*pool),
            AmmEvent::Transfer { .. } | AmmEvent::Approval { .. } => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AmmEvent::PoolCreated { .. } => "PoolCreated",
            AmmEvent::Mint { .. } => "Mint",
            AmmEvent::Burn { .. } => "Burn",
            AmmEvent::Swap { .. } => "Swap",
            AmmEvent::Sync { .. } => "Sync",
            AmmEvent::Transfer { .. } => "Transfer",
            AmmEvent::Approval { .. } => "Approval",
        }
    }
}
