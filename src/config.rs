use anyhow::{Context, Result};
use serde::Deserialize;
use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};
use std::{fs, path::Path, str::FromStr, time::Duration};

use crate::exchanges::compute_budget::{ComputeBudget, DEFAULT_COMPUTE_UNIT_LIMIT};
use crate::infrastructure::blockchain::rpc_client::DEFAULT_RPC_URL;
use crate::infrastructure::blockchain::transaction_executor::ConfirmationPolicy;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RpcCfg {
    pub url: String,
    pub commitment: String,
}

impl Default for RpcCfg {
    fn default() -> Self {
        Self {
            url: DEFAULT_RPC_URL.to_string(),
            commitment: "confirmed".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConfirmationCfg {
    pub interval_ms: u64,
    pub max_attempts: u32,
}

impl Default for ConfirmationCfg {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            max_attempts: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TradeCfg {
    /// Used when --slippage is absent; otherwise the user is prompted
    pub slippage_pct: Option<f64>,
    pub priority_fee_microlamports: Option<u64>,
    pub compute_unit_limit: u32,
}

impl Default for TradeCfg {
    fn default() -> Self {
        Self {
            slippage_pct: None,
            priority_fee_microlamports: None,
            compute_unit_limit: DEFAULT_COMPUTE_UNIT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rpc: RpcCfg,
    pub confirmation: ConfirmationCfg,
    pub trade: TradeCfg,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path.as_ref())
            .with_context(|| format!("read config {}", path.as_ref().display()))?;
        Self::from_toml(&s)
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(s).context("parse Config.toml")?;
        Ok(cfg)
    }

    pub fn commitment(&self) -> Result<CommitmentConfig> {
        let level = CommitmentLevel::from_str(&self.rpc.commitment)
            .map_err(|e| anyhow::anyhow!("invalid commitment '{}': {:?}", self.rpc.commitment, e))?;
        Ok(CommitmentConfig { commitment: level })
    }

    pub fn confirmation_policy(&self) -> ConfirmationPolicy {
        ConfirmationPolicy {
            interval: Duration::from_millis(self.confirmation.interval_ms),
            max_attempts: self.confirmation.max_attempts,
        }
    }

    pub fn compute_budget(&self) -> ComputeBudget {
        ComputeBudget::new(self.trade.compute_unit_limit, self.trade.priority_fee_microlamports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.rpc.url, "https://api.mainnet-beta.solana.com");
        assert_eq!(cfg.commitment().unwrap(), CommitmentConfig::confirmed());
        assert_eq!(cfg.confirmation_policy(), ConfirmationPolicy::default());
        assert_eq!(cfg.compute_budget(), ComputeBudget::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let cfg = Config::from_toml(
            r#"
            [rpc]
            url = "http://localhost:8899"

            [trade]
            priority_fee_microlamports = 25000
            "#,
        )
        .unwrap();
        assert_eq!(cfg.rpc.url, "http://localhost:8899");
        assert_eq!(cfg.rpc.commitment, "confirmed");
        assert_eq!(cfg.confirmation.max_attempts, 30);
        assert_eq!(cfg.compute_budget(), ComputeBudget::new(200_000, Some(25_000)));
    }

    #[test]
    fn test_bad_commitment_is_rejected() {
        let cfg = Config::from_toml("[rpc]\ncommitment = \"eventually\"").unwrap();
        assert!(cfg.commitment().is_err());
    }
}
