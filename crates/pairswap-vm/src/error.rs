use pairswap_core::AmmError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VmError {
    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid nonce: expected {expected}, got {got}")]
    InvalidNonce { expected: u64, got: u64 },

    #[error(transparent)]
    Amm(#[from] AmmError),

    #[error("State error: {0}")]
    State(#[from] pairswap_state::StateError),

    #[error("Core error: {0}")]
    Core(#[from] pairswap_core::CoreError),
}

impl VmError {
    /// The exchange failure category, if this is one
    pub fn amm(&self) -> Option<AmmError> {
        match self {
            VmError::Amm(e) => Some(*e),
            _ => None,
        }
    }
}
