use pairswap_core::{AmmError, Address};

/// Caller identity and clock for one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub sender: Address,
    /// Seconds; drives price accumulation and deadline checks
    pub timestamp: u64,
}

impl CallContext {
    pub fn new(sender: Address, timestamp: u64) -> Self {
        CallContext { sender, timestamp }
    }

    /// Fail `Expired` once `deadline` has passed; the deadline second itself is valid
    pub fn ensure(&self, deadline: u64) -> Result<(), AmmError> {
        if self.timestamp > deadline {
            return Err(AmmError::Expired);
        }
        Ok(())
    }
}
