// src/config.rs

use std::str::FromStr;

use anyhow::{anyhow, Result};
use serde::Deserialize;
use solana_sdk::commitment_config::CommitmentConfig;

fn default_commitment() -> String { "confirmed".to_string() }
fn default_quote_mint() -> String { "So11111111111111111111111111111111111111112".to_string() }

#[derive(Deserialize, Debug)]
pub struct Config {
    pub solana_rpc_url: String,
    #[serde(default = "default_commitment")]
    pub rpc_commitment: String,
    // Mint B utilisé quand on ne donne qu'un mint A à la recherche de pool (WSOL par défaut).
    #[serde(default = "default_quote_mint")]
    pub quote_mint: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()?;
        Ok(config)
    }

    pub fn commitment(&self) -> Result<CommitmentConfig> {
        CommitmentConfig::from_str(&self.rpc_commitment)
            .map_err(|e| anyhow!("RPC_COMMITMENT invalide ({}): {}", self.rpc_commitment, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_commitment() {
        let vars = vec![("SOLANA_RPC_URL".to_string(), "http://localhost:8899".to_string())];
        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.rpc_commitment, "confirmed");
        assert_eq!(config.quote_mint, "So11111111111111111111111111111111111111112");
        assert_eq!(config.commitment().unwrap(), CommitmentConfig::confirmed());
    }

    #[test]
    fn test_invalid_commitment() {
        let vars = vec![
            ("SOLANA_RPC_URL".to_string(), "http://localhost:8899".to_string()),
            ("RPC_COMMITMENT".to_string(), "eventually".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();
        assert!(config.commitment().is_err());
    }
}
