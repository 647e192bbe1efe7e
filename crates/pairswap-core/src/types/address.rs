use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::{hash_domain, Hash};
use crate::error::CoreError;

/// Opaque 32-byte identity used for assets, account holders and pools.
///
/// The ordering is only used to canonicalize asset pairs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Address(pub [u8; 32]);

impl Address {
    /// The null address. Never a valid asset; holds permanently locked shares.
    pub const ZERO: Address = Address([0u8; 32]);

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        let bytes: [u8; 32] = slice.try_into().ok()?;
        Some(Address(bytes))
    }

    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let bytes = hex::decode(s.trim_start_matches("0x"))?;
        Self::from_slice(&bytes).ok_or(CoreError::InvalidAddress)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Deterministic address for a human-readable label (test assets, demo accounts)
    pub fn from_label(label: &str) -> Self {
        hash_domain(b"pairswap/label", &[label.as_bytes()]).into()
    }
}

impl From<Hash> for Address {
    fn from(hash: Hash) -> Self {
        Address(hash.0)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", &self.to_hex()[..12])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
