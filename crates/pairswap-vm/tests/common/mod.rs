//! Shared fixtures for exchange integration tests

#![allow(dead_code)]

use pairswap_core::{Address, GenesisConfig};
use pairswap_state::{ExchangeState, MemoryStorage};
use pairswap_vm::{router, CallContext};

pub const START_BALANCE: u64 = 100_000_000;
pub const NOW: u64 = 1_000;
pub const DEADLINE: u64 = 2_000;

/// A genesis state with three assets, a funded trader and a fee admin
pub struct Market {
    pub state: ExchangeState<MemoryStorage>,
    pub ctx: CallContext,
    pub admin: Address,
    pub a: Address,
    pub b: Address,
    pub c: Address,
}

pub fn market() -> Market {
    let alice = Address::from_label("alice");
    let admin = Address::from_label("admin");
    let (a, b, c) = (
        Address::from_label("A"),
        Address::from_label("B"),
        Address::from_label("C"),
    );
    let config = GenesisConfig {
        timestamp: 0,
        registry_salt: "integration".to_string(),
        fee_to_setter: admin,
        initial_balances: vec![
            (alice, a, START_BALANCE),
            (alice, b, START_BALANCE),
            (alice, c, START_BALANCE),
        ],
    };

    let mut state = ExchangeState::new(MemoryStorage::new());
    state.init_genesis(&config).unwrap();
    Market {
        state,
        ctx: CallContext::new(alice, NOW),
        admin,
        a,
        b,
        c,
    }
}

impl Market {
    pub fn alice(&self) -> Address {
        self.ctx.sender
    }

    /// Seed the `(x, y)` pool through the router and return the shares minted
    pub fn seed(&mut self, x: Address, y: Address, amount_x: u64, amount_y: u64) -> u64 {
        let alice = self.alice();
        let (_, _, liquidity) = router::add_liquidity(
            &mut self.state,
            &self.ctx,
            &x,
            &y,
            amount_x,
            amount_y,
            0,
            0,
            &alice,
            DEADLINE,
        )
        .unwrap();
        liquidity
    }

    pub fn pool(&self, x: Address, y: Address) -> Address {
        self.state.registry().get_pool(&x, &y).unwrap()
    }
}
