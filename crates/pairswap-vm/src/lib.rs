//! Pairswap VM - Pool operations, routing and transaction execution
//!
//! Pool-level operations live in [`opcodes`]; the [`router`] composes them
//! into slippage- and deadline-checked user operations; the [`executor`]
//! applies signed transactions atomically.

pub mod context;
pub mod error;
pub mod executor;
pub mod opcodes;
pub mod router;
pub mod validation;

pub use context::CallContext;
pub use error::VmError;
pub use executor::{ExecutionResult, Executor};
pub use opcodes::{FlashAccess, FlashSwap, FlashSwapCallee};
pub use validation::{validate_transaction, ValidationResult};
