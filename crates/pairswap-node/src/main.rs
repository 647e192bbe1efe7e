use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod node;
mod txgen;

use cli::{Cli, Commands};
use config::{generate_sample_config, parse_address, unix_now, NodeConfig};
use node::Node;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise the config's level, otherwise info
    let level = cli
        .command
        .config_path()
        .and_then(|path| NodeConfig::load(path).ok())
        .map(|config| config.log_level)
        .unwrap_or_else(|| "info".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init { output } => {
            init_config(output)?;
        }
        Commands::Keygen { output } => {
            generate_keypair(output)?;
        }
        Commands::Apply {
            config,
            file,
            timestamp,
        } => {
            apply_transactions(config, file, timestamp)?;
        }
        Commands::Quote {
            config,
            amount_in,
            path,
        } => {
            let node = Node::open(&load_config(&config)?)?;
            let amounts = node.quote(amount_in, &txgen::parse_path(&path)?)?;
            println!("{}", serde_json::to_string_pretty(&amounts)?);
        }
        Commands::Pools { config } => {
            show_pools(config)?;
        }
        Commands::Balance {
            config,
            holder,
            asset,
        } => {
            let node = Node::open(&load_config(&config)?)?;
            let holder = parse_address(&holder)?;
            println!("balance: {}", node.balance(&holder, &parse_address(&asset)?));
            println!("nonce:   {}", node.nonce(&holder));
        }
        Commands::Txgen { command } => {
            txgen::handle_txgen(command)?;
        }
    }

    Ok(())
}

fn load_config(config_path: &PathBuf) -> Result<NodeConfig> {
    info!("Loading configuration from {:?}", config_path);
    if !config_path.exists() {
        error!(
            "Configuration file not found: {:?}. Run 'pairswap init' to create one.",
            config_path
        );
        return Err(anyhow::anyhow!("Configuration file not found"));
    }
    NodeConfig::load(config_path)
}

/// Initialize a new configuration file
fn init_config(output: PathBuf) -> Result<()> {
    info!("Generating sample configuration");

    let config = generate_sample_config();
    config.save(&output)?;

    info!("Configuration saved to {:?}", output);

    println!("\nConfiguration file created: {}", output.display());
    println!("The operator key in the file is funded at genesis with label:USDC and label:WETH.");
    println!("\nTo apply transactions, run:");
    println!("  pairswap apply --config {} --file tx.json", output.display());

    Ok(())
}

/// Generate a new keypair
fn generate_keypair(output: Option<PathBuf>) -> Result<()> {
    let keypair = pairswap_core::KeyPair::generate();

    println!("Generated new keypair:");
    println!("  Address:     {}", keypair.address().to_hex());
    println!("  Public key:  {}", keypair.public.to_hex());
    println!("  Secret key:  {}", keypair.secret.to_hex());

    if let Some(path) = output {
        std::fs::write(&path, keypair.secret.to_hex())?;
        info!("Secret key saved to {:?}", path);
    }

    println!("\nWARNING: Keep your secret key safe! Do not share it with anyone.");

    Ok(())
}

/// Apply a transaction file and print each result
fn apply_transactions(config_path: PathBuf, file: PathBuf, timestamp: Option<u64>) -> Result<()> {
    let config = load_config(&config_path)?;
    let txs = txgen::read_txs(&file)?;
    let mut node = Node::open(&config)?;

    let results = node.apply(&txs, timestamp.unwrap_or_else(unix_now))?;
    for result in &results {
        match &result.error {
            None => println!("{} ok ({} events)", result.tx_hash, result.events.len()),
            Some(e) => println!("{} failed: {}", result.tx_hash, e),
        }
    }
    println!("State root: {}", node.state_root()?);

    Ok(())
}

fn show_pools(config_path: PathBuf) -> Result<()> {
    let node = Node::open(&load_config(&config_path)?)?;
    let pools = node.pools();
    if pools.is_empty() {
        println!("No pools");
    }
    for pool in pools {
        let (reserve0, reserve1, updated) = pool.reserves();
        println!("Pool {}", pool.address);
        println!("  token0:   {} reserve {}", pool.token0, reserve0);
        println!("  token1:   {} reserve {}", pool.token1, reserve1);
        println!("  shares:   {}", pool.total_shares);
        println!("  updated:  {}", updated);
    }
    Ok(())
}
