use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: u64, need: u64 },

    #[error("Insufficient allowance: have {have}, need {need}")]
    InsufficientAllowance { have: u64, need: u64 },

    #[error("Balance overflow")]
    BalanceOverflow,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Core error: {0}")]
    Core(#[from] pairswap_core::CoreError),
}
