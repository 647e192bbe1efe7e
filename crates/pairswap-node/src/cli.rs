use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Pairswap - A constant-product exchange
#[derive(Parser)]
#[command(name = "pairswap")]
#[command(about = "Pairswap exchange state tool and utilities")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new configuration
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = "config.json")]
        output: PathBuf,
    },

    /// Generate a new keypair
    Keygen {
        /// Output file for secret key
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Apply signed transactions to the persisted state
    Apply {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.json")]
        config: PathBuf,

        /// Transaction JSON file (one transaction or an array)
        #[arg(short, long)]
        file: PathBuf,

        /// Block time in unix seconds (defaults to now)
        #[arg(long)]
        timestamp: Option<u64>,
    },

    /// Quote an exact-input swap along a path
    Quote {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.json")]
        config: PathBuf,

        /// Amount of the first asset
        #[arg(long)]
        amount_in: u64,

        /// Assets (comma-separated hex or label:<name>)
        #[arg(long)]
        path: String,
    },

    /// List pools and their reserves
    Pools {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.json")]
        config: PathBuf,
    },

    /// Show a holder's balance of an asset
    Balance {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.json")]
        config: PathBuf,

        /// Holder address (hex or label:<name>)
        #[arg(long)]
        holder: String,

        /// Asset address (hex or label:<name>); a pool address gives liquidity shares
        #[arg(long)]
        asset: String,
    },

    /// Generate signed transactions
    Txgen {
        #[command(subcommand)]
        command: TxGenCommands,
    },
}

impl Commands {
    /// Configuration file the command reads, if any
    pub fn config_path(&self) -> Option<&PathBuf> {
        match self {
            Commands::Apply { config, .. }
            | Commands::Quote { config, .. }
            | Commands::Pools { config }
            | Commands::Balance { config, .. } => Some(config),
            _ => None,
        }
    }
}

#[derive(Subcommand)]
pub enum TxGenCommands {
    /// Create a TRANSFER transaction
    Transfer {
        /// Sender secret key hex
        #[arg(long)]
        from_secret: String,
        /// Asset (hex or label:<name>)
        #[arg(long)]
        asset: String,
        /// Recipient address
        #[arg(long)]
        to: String,
        /// Amount to send
        #[arg(long)]
        amount: u64,
        /// Transaction nonce
        #[arg(long)]
        nonce: u64,
        /// Output file (JSON)
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Create an APPROVE transaction
    Approve {
        /// Owner secret key hex
        #[arg(long)]
        from_secret: String,
        /// Asset (hex or label:<name>)
        #[arg(long)]
        asset: String,
        /// Spender address
        #[arg(long)]
        spender: String,
        /// Allowance; u64::MAX never decreases
        #[arg(long)]
        amount: u64,
        /// Transaction nonce
        #[arg(long)]
        nonce: u64,
        /// Output file (JSON)
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Create a CREATE_POOL transaction
    CreatePool {
        /// Sender secret key hex
        #[arg(long)]
        from_secret: String,
        /// First asset
        #[arg(long)]
        asset_a: String,
        /// Second asset
        #[arg(long)]
        asset_b: String,
        /// Transaction nonce
        #[arg(long)]
        nonce: u64,
        /// Output file (JSON)
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Create an ADD_LIQUIDITY transaction
    AddLiquidity {
        /// Sender secret key hex
        #[arg(long)]
        from_secret: String,
        /// First asset
        #[arg(long)]
        asset_a: String,
        /// Second asset
        #[arg(long)]
        asset_b: String,
        /// Desired amount of the first asset
        #[arg(long)]
        amount_a: u64,
        /// Desired amount of the second asset
        #[arg(long)]
        amount_b: u64,
        /// Minimum accepted amount of the first asset
        #[arg(long, default_value = "0")]
        min_a: u64,
        /// Minimum accepted amount of the second asset
        #[arg(long, default_value = "0")]
        min_b: u64,
        /// Deadline (unix seconds)
        #[arg(long)]
        deadline: u64,
        /// Transaction nonce
        #[arg(long)]
        nonce: u64,
        /// Output file (JSON)
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Create a REMOVE_LIQUIDITY transaction
    RemoveLiquidity {
        /// Sender secret key hex
        #[arg(long)]
        from_secret: String,
        /// First asset
        #[arg(long)]
        asset_a: String,
        /// Second asset
        #[arg(long)]
        asset_b: String,
        /// Shares to redeem
        #[arg(long)]
        liquidity: u64,
        /// Minimum amount of the first asset
        #[arg(long, default_value = "0")]
        min_a: u64,
        /// Minimum amount of the second asset
        #[arg(long, default_value = "0")]
        min_b: u64,
        /// Deadline (unix seconds)
        #[arg(long)]
        deadline: u64,
        /// Transaction nonce
        #[arg(long)]
        nonce: u64,
        /// Output file (JSON)
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Create an exact-input SWAP transaction
    SwapExactIn {
        /// Sender secret key hex
        #[arg(long)]
        from_secret: String,
        /// Assets (comma-separated)
        #[arg(long)]
        path: String,
        /// Amount in
        #[arg(long)]
        amount_in: u64,
        /// Minimum amount out
        #[arg(long)]
        min_out: u64,
        /// Deadline (unix seconds)
        #[arg(long)]
        deadline: u64,
        /// Transaction nonce
        #[arg(long)]
        nonce: u64,
        /// Output file (JSON)
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Create an exact-output SWAP transaction
    SwapExactOut {
        /// Sender secret key hex
        #[arg(long)]
        from_secret: String,
        /// Assets (comma-separated)
        #[arg(long)]
        path: String,
        /// Amount out
        #[arg(long)]
        amount_out: u64,
        /// Maximum amount in
        #[arg(long)]
        max_in: u64,
        /// Deadline (unix seconds)
        #[arg(long)]
        deadline: u64,
        /// Transaction nonce
        #[arg(long)]
        nonce: u64,
        /// Output file (JSON)
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Create a SET_FEE_TO transaction
    SetFeeTo {
        /// Fee setter secret key hex
        #[arg(long)]
        from_secret: String,
        /// Protocol fee recipient; omit to switch the fee off
        #[arg(long)]
        fee_to: Option<String>,
        /// Transaction nonce
        #[arg(long)]
        nonce: u64,
        /// Output file (JSON)
        #[arg(short, long)]
        out: PathBuf,
    },
}
