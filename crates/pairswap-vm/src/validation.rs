use pairswap_core::Transaction;
use pairswap_state::{ExchangeState, Storage};

use crate::error::VmError;

/// Transaction validation result
pub struct ValidationResult {
    pub is_valid: bool,
    pub error: Option<VmError>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        ValidationResult {
            is_valid: true,
            error: None,
        }
    }

    pub fn err(error: VmError) -> Self {
        ValidationResult {
            is_valid: false,
            error: Some(error),
        }
    }
}

/// Check the signature and nonce of a transaction before execution.
///
/// Balances are not pre-checked; operations fail atomically when funds
/// run short.
pub fn validate_transaction<S: Storage>(
    tx: &Transaction,
    state: &ExchangeState<S>,
) -> ValidationResult {
    if tx.verify_signature().is_err() {
        return ValidationResult::err(VmError::InvalidSignature);
    }

    let expected_nonce = state.nonce(&tx.sender()) + 1;
    if tx.nonce != expected_nonce {
        return ValidationResult::err(VmError::InvalidNonce {
            expected: expected_nonce,
            got: tx.nonce,
        });
    }

    ValidationResult::ok()
}
