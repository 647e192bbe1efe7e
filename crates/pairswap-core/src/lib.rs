//! Pairswap Core - Core types, pricing math, cryptography, and serialization
//!
//! This crate provides the foundational types for the Pairswap constant-product
//! exchange: asset and account addresses, pool and registry state, the pure
//! pricing functions, and the categorical error set shared by every layer.

pub mod crypto;
pub mod error;
pub mod math;
pub mod serialize;
pub mod types;

pub use crypto::{hash_blake3, sign, verify, Hash, KeyPair, PublicKey, SecretKey, Sig};
pub use error::{AmmError, CoreError};
pub use math::{
    get_amount_in, get_amount_out, get_amounts_in, get_amounts_out, integer_sqrt, pair_key, quote,
    sort_tokens,
};
pub use types::*;
