pub mod hash;
pub mod keys;

pub use hash::{hash_blake3, hash_domain, Hash};
pub use keys::{sign, verify, KeyPair, PublicKey, SecretKey, Sig};
