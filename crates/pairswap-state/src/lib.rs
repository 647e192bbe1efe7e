//! Pairswap State - Ledger balances, pool records and storage
//!
//! This crate owns the mutable exchange state: holder balances and
//! allowances, pool reserves, the pair registry and the event log, together
//! with the storage backends they are persisted to.

pub mod error;
pub mod ledger;
pub mod merkle;
pub mod state;
pub mod storage;

pub use error::StateError;
pub use ledger::Ledger;
pub use merkle::compute_state_root;
pub use state::{ExchangeState, StateSnapshot};
pub use storage::{FileStorage, MemoryStorage, Storage};
