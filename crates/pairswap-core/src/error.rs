use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid public key")]
    InvalidPublicKey,

    #[error("Invalid address")]
    InvalidAddress,

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),
}

/// Categorical exchange failures. Every variant aborts the enclosing
/// operation with no partial effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmmError {
    #[error("Identical assets")]
    IdenticalAssets,

    #[error("Invalid asset")]
    InvalidAsset,

    #[error("Pool already exists")]
    PoolExists,

    #[error("Pool not found")]
    PoolNotFound,

    #[error("Insufficient amount")]
    InsufficientAmount,

    #[error("Insufficient liquidity")]
    InsufficientLiquidity,

    #[error("Insufficient input amount")]
    InsufficientInputAmount,

    #[error("Insufficient output amount")]
    InsufficientOutputAmount,

    #[error("Insufficient liquidity minted")]
    InsufficientLiquidityMinted,

    #[error("Insufficient liquidity burned")]
    InsufficientLiquidityBurned,

    #[error("Invalid recipient")]
    InvalidRecipient,

    #[error("Constant-product invariant violated")]
    InvariantViolation,

    #[error("Pool is locked")]
    ReentrancyGuard,

    #[error("Deadline expired")]
    Expired,

    #[error("Insufficient A amount")]
    InsufficientAAmount,

    #[error("Insufficient B amount")]
    InsufficientBAmount,

    #[error("Excessive input amount")]
    ExcessiveInputAmount,

    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    #[error("Invalid path")]
    InvalidPath,

    #[error("Forbidden")]
    Forbidden,
}
