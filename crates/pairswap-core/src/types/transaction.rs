use serde::{Deserialize, Serialize};

use crate::crypto::{hash_blake3, sign, verify, Hash, PublicKey, SecretKey, Sig};
use crate::error::CoreError;
use crate::serialize;
use crate::types::address::Address;

/// Operations that can be included in a transaction.
///
/// Every operation acts with the authority of the transaction sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    /// Move `amount` of `asset` to `to`
    Transfer {
        asset: Address,
        to: Address,
        amount: u64,
    },
    /// Let `spender` move up to `amount` of the sender's `asset`
    Approve {
        asset: Address,
        spender: Address,
        amount: u64,
    },
    /// Spend an allowance granted by `from`
    TransferFrom {
        asset: Address,
        from: Address,
        to: Address,
        amount: u64,
    },
    CreatePool {
        asset_a: Address,
        asset_b: Address,
    },
    AddLiquidity {
        asset_a: Address,
        asset_b: Address,
        amount_a_desired: u64,
        amount_b_desired: u64,
        amount_a_min: u64,
        amount_b_min: u64,
        to: Address,
        deadline: u64,
    },
    RemoveLiquidity {
        asset_a: Address,
        asset_b: Address,
        liquidity: u64,
        amount_a_min: u64,
        amount_b_min: u64,
        to: Address,
        deadline: u64,
    },
    SwapExactTokensForTokens {
        amount_in: u64,
        amount_out_min: u64,
        path: Vec<Address>,
        to: Address,
        deadline: u64,
    },
    SwapTokensForExactTokens {
        amount_out: u64,
        amount_in_max: u64,
        path: Vec<Address>,
        to: Address,
        deadline: u64,
    },
    /// Pool-level mint against balances already transferred in
    Mint {
        pool: Address,
        to: Address,
    },
    /// Pool-level burn of shares already transferred to the pool
    Burn {
        pool: Address,
        to: Address,
    },
    /// Pool-level swap against input already transferred in
    Swap {
        pool: Address,
        amount0_out: u64,
        amount1_out: u64,
        to: Address,
    },
    Sync {
        pool: Address,
    },
    Skim {
        pool: Address,
        to: Address,
    },
    SetFeeTo {
        fee_to: Option<Address>,
    },
    SetFeeToSetter {
        setter: Address,
    },
}

/// A signed batch of operations applied atomically
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub sender_pubkey: PublicKey,
    /// Must equal the sender's account nonce + 1
    pub nonce: u64,
    pub ops: Vec<Op>,
    /// Signature over the transaction (excluding this field)
    pub signature: Sig,
}

#[derive(Debug, Clone, Serialize)]
struct TransactionSigningData<'a> {
    sender_pubkey: &'a PublicKey,
    nonce: u64,
    ops: &'a [Op],
}

impl Transaction {
    /// Create a new unsigned transaction
    pub fn new(sender_pubkey: PublicKey, nonce: u64, ops: Vec<Op>) -> Self {
        Transaction {
            sender_pubkey,
            nonce,
            ops,
            signature: Sig::default(),
        }
    }

    /// Create a signed transaction
    pub fn new_signed(
        sender_pubkey: PublicKey,
        nonce: u64,
        ops: Vec<Op>,
        secret_key: &SecretKey,
    ) -> Result<Self, CoreError> {
        let mut tx = Self::new(sender_pubkey, nonce, ops);
        tx.sign(secret_key)?;
        Ok(tx)
    }

    pub fn sender(&self) -> Address {
        self.sender_pubkey.address()
    }

    pub fn signing_bytes(&self) -> Result<Vec<u8>, CoreError> {
        serialize::to_bytes(&TransactionSigningData {
            sender_pubkey: &self.sender_pubkey,
            nonce: self.nonce,
            ops: &self.ops,
        })
    }

    pub fn sign(&mut self, secret_key: &SecretKey) -> Result<(), CoreError> {
        let bytes = self.signing_bytes()?;
        self.signature = sign(secret_key, &bytes);
        Ok(())
    }

    pub fn verify_signature(&self) -> Result<(), CoreError> {
        let bytes = self.signing_bytes()?;
        verify(&self.sender_pubkey, &bytes, &self.signature)
    }

    pub fn hash(&self) -> Result<Hash, CoreError> {
        let bytes = serialize::to_bytes(self)?;
        Ok(hash_blake3(&bytes))
    }
}
