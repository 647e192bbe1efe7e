use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};

use pairswap_core::{Address, Op, SecretKey, Transaction};

use crate::cli::TxGenCommands;
use crate::config::parse_address;

pub fn handle_txgen(command: TxGenCommands) -> Result<()> {
    let (from_secret, nonce, ops, out) = match command {
        TxGenCommands::Transfer {
            from_secret,
            asset,
            to,
            amount,
            nonce,
            out,
        } => {
            let op = Op::Transfer {
                asset: parse_address(&asset)?,
                to: parse_address(&to)?,
                amount,
            };
            (from_secret, nonce, vec![op], out)
        }

        TxGenCommands::Approve {
            from_secret,
            asset,
            spender,
            amount,
            nonce,
            out,
        } => {
            let op = Op::Approve {
                asset: parse_address(&asset)?,
                spender: parse_address(&spender)?,
                amount,
            };
            (from_secret, nonce, vec![op], out)
        }

        TxGenCommands::CreatePool {
            from_secret,
            asset_a,
            asset_b,
            nonce,
            out,
        } => {
            let op = Op::CreatePool {
                asset_a: parse_address(&asset_a)?,
                asset_b: parse_address(&asset_b)?,
            };
            (from_secret, nonce, vec![op], out)
        }

        TxGenCommands::AddLiquidity {
            from_secret,
            asset_a,
            asset_b,
            amount_a,
            amount_b,
            min_a,
            min_b,
            deadline,
            nonce,
            out,
        } => {
            let sender = parse_secret(&from_secret)?.public_key().address();
            let op = Op::AddLiquidity {
                asset_a: parse_address(&asset_a)?,
                asset_b: parse_address(&asset_b)?,
                amount_a_desired: amount_a,
                amount_b_desired: amount_b,
                amount_a_min: min_a,
                amount_b_min: min_b,
                to: sender,
                deadline,
            };
            (from_secret, nonce, vec![op], out)
        }

        TxGenCommands::RemoveLiquidity {
            from_secret,
            asset_a,
            asset_b,
            liquidity,
            min_a,
            min_b,
            deadline,
            nonce,
            out,
        } => {
            let sender = parse_secret(&from_secret)?.public_key().address();
            let op = Op::RemoveLiquidity {
                asset_a: parse_address(&asset_a)?,
                asset_b: parse_address(&asset_b)?,
                liquidity,
                amount_a_min: min_a,
                amount_b_min: min_b,
                to: sender,
                deadline,
            };
            (from_secret, nonce, vec![op], out)
        }

        TxGenCommands::SwapExactIn {
            from_secret,
            path,
            amount_in,
            min_out,
            deadline,
            nonce,
            out,
        } => {
            let sender = parse_secret(&from_secret)?.public_key().address();
            let op = Op::SwapExactTokensForTokens {
                amount_in,
                amount_out_min: min_out,
                path: parse_path(&path)?,
                to: sender,
                deadline,
            };
            (from_secret, nonce, vec![op], out)
        }

        TxGenCommands::SwapExactOut {
            from_secret,
            path,
            amount_out,
            max_in,
            deadline,
            nonce,
            out,
        } => {
            let sender = parse_secret(&from_secret)?.public_key().address();
            let op = Op::SwapTokensForExactTokens {
                amount_out,
                amount_in_max: max_in,
                path: parse_path(&path)?,
                to: sender,
                deadline,
            };
            (from_secret, nonce, vec![op], out)
        }

        TxGenCommands::SetFeeTo {
            from_secret,
            fee_to,
            nonce,
            out,
        } => {
            let op = Op::SetFeeTo {
                fee_to: fee_to.as_deref().map(parse_address).transpose()?,
            };
            (from_secret, nonce, vec![op], out)
        }
    };

    let tx = build_tx(&from_secret, nonce, ops)?;
    write_tx(&tx, &out)?;
    println!("TX_HASH={}", tx.hash()?);
    Ok(())
}

fn build_tx(from_secret: &str, nonce: u64, ops: Vec<Op>) -> Result<Transaction> {
    let secret = parse_secret(from_secret)?;
    Ok(Transaction::new_signed(secret.public_key(), nonce, ops, &secret)?)
}

fn write_tx(tx: &Transaction, out: &PathBuf) -> Result<()> {
    let json = serde_json::to_string_pretty(tx)?;
    std::fs::write(out, json)?;
    Ok(())
}

fn parse_secret(hex_str: &str) -> Result<SecretKey> {
    SecretKey::from_hex(hex_str).map_err(|e| anyhow!(e))
}

/// Parse a comma-separated swap path of at least two assets
pub fn parse_path(input: &str) -> Result<Vec<Address>> {
    let path = input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_address)
        .collect::<Result<Vec<_>>>()?;
    if path.len() < 2 {
        bail!("A path needs at least two assets");
    }
    Ok(path)
}

/// Read one transaction or an array of them
pub fn read_txs(file: &PathBuf) -> Result<Vec<Transaction>> {
    let content = std::fs::read_to_string(file)?;
    if content.trim_start().starts_with('[') {
        Ok(serde_json::from_str(&content)?)
    } else {
        Ok(vec![serde_json::from_str(&content)?])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairswap_core::KeyPair;

    #[test]
    fn test_parse_path() {
        let path = parse_path("label:USDC, label:WETH").unwrap();
        assert_eq!(path, vec![Address::from_label("USDC"), Address::from_label("WETH")]);
        assert!(parse_path("label:USDC").is_err());
    }

    #[test]
    fn test_generated_tx_reads_back_signed() {
        let key = KeyPair::from_secret_bytes(&[3u8; 32]);
        let out = std::env::temp_dir().join(format!("pairswap-txgen-{}.json", std::process::id()));

        handle_txgen(TxGenCommands::SwapExactIn {
            from_secret: key.secret.to_hex(),
            path: "label:USDC,label:WETH".to_string(),
            amount_in: 1_000,
            min_out: 1,
            deadline: 10,
            nonce: 1,
            out: out.clone(),
        })
        .unwrap();

        let txs = read_txs(&out).unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].sender(), key.address());
        assert!(txs[0].verify_signature().is_ok());
        let _ = std::fs::remove_file(&out);
    }
}
