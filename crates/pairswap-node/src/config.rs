use std::path::PathBuf;

use anyhow::{anyhow, Result};
use pairswap_core::{Address, GenesisConfig, KeyPair};
use serde::{Deserialize, Serialize};

/// Node configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Node data directory
    pub data_dir: PathBuf,

    /// Default tracing filter when `RUST_LOG` is unset
    pub log_level: String,

    /// Salt for the registry identity
    pub registry_salt: String,

    /// Genesis configuration
    pub genesis: GenesisConfigFile,

    /// Operator secret key (hex) - funded at genesis and allowed to set the fee recipient
    pub operator_key: Option<String>,
}

/// Genesis configuration for file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenesisConfigFile {
    pub timestamp: u64,
    /// Address (hex) allowed to change the protocol fee recipient
    pub fee_to_setter: String,
    pub initial_balances: Vec<BalanceEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceEntry {
    /// Holder address; hex or `label:<name>`
    pub holder: String,
    /// Asset address; hex or `label:<name>`
    pub asset: String,
    pub amount: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            data_dir: PathBuf::from("./pairswap-data"),
            log_level: "info".to_string(),
            registry_salt: "pairswap".to_string(),
            genesis: GenesisConfigFile::default(),
            operator_key: None,
        }
    }
}

impl NodeConfig {
    /// Load config from file
    pub fn load(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: NodeConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self, path: &PathBuf) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Path of the persisted state file
    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join("state.bin")
    }

    /// Convert genesis config to core type
    pub fn to_genesis_config(&self) -> Result<GenesisConfig> {
        let initial_balances = self
            .genesis
            .initial_balances
            .iter()
            .map(|entry| {
                Ok((
                    parse_address(&entry.holder)?,
                    parse_address(&entry.asset)?,
                    entry.amount,
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(GenesisConfig {
            timestamp: self.genesis.timestamp,
            registry_salt: self.registry_salt.clone(),
            fee_to_setter: parse_address(&self.genesis.fee_to_setter)?,
            initial_balances,
        })
    }
}

/// Parse an address given as hex or as `label:<name>`
pub fn parse_address(input: &str) -> Result<Address> {
    match input.strip_prefix("label:") {
        Some(label) => Ok(Address::from_label(label)),
        None => Address::from_hex(input).map_err(|e| anyhow!("bad address '{}': {}", input, e)),
    }
}

/// Generate a sample configuration with a funded operator and two demo assets
pub fn generate_sample_config() -> NodeConfig {
    let operator = KeyPair::generate();
    let holder = operator.address().to_hex();

    NodeConfig {
        genesis: GenesisConfigFile {
            timestamp: unix_now(),
            fee_to_setter: holder.clone(),
            initial_balances: vec![
                BalanceEntry {
                    holder: holder.clone(),
                    asset: "label:USDC".to_string(),
                    amount: 1_000_000_000_000,
                },
                BalanceEntry {
                    holder,
                    asset: "label:WETH".to_string(),
                    amount: 1_000_000_000,
                },
            ],
        },
        operator_key: Some(operator.secret.to_hex()),
        ..NodeConfig::default()
    }
}

pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NodeConfig::default();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.state_path(), PathBuf::from("./pairswap-data/state.bin"));
    }

    #[test]
    fn test_sample_config() {
        let config = generate_sample_config();
        assert_eq!(config.genesis.initial_balances.len(), 2);
        assert!(config.operator_key.is_some());
    }

    #[test]
    fn test_genesis_conversion() {
        let config = generate_sample_config();
        let genesis = config.to_genesis_config().unwrap();
        assert_eq!(genesis.registry_salt, config.registry_salt);
        assert_eq!(genesis.initial_balances[0].1, Address::from_label("USDC"));
        assert_eq!(genesis.initial_balances[0].0, genesis.fee_to_setter);
    }

    #[test]
    fn test_bad_address_rejected() {
        let mut config = generate_sample_config();
        config.genesis.fee_to_setter = "not-hex".to_string();
        assert!(config.to_genesis_config().is_err());
    }
}
