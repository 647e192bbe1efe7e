pub mod account;
pub mod address;
pub mod event;
pub mod genesis;
pub mod pool;
pub mod registry;
pub mod transaction;

pub use account::Account;
pub use address::Address;
pub use event::AmmEvent;
pub use genesis::GenesisConfig;
pub use pool::{PoolState, LOCKED_LIQUIDITY_SINK, MINIMUM_LIQUIDITY};
pub use registry::PairRegistry;
pub use transaction::{Op, Transaction};
