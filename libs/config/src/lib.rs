//! Configuration for the SimpleSwap client
//!
//! TOML-based configuration with environment variable overrides. Every
//! tunable the orchestration layer consumes lives here: RPC endpoint,
//! pool address, slippage tolerance, per-action deadlines, history
//! lookback windows, and the price poll cadence. Defaults match the
//! deployed front-end's behavior.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// JSON-RPC endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// HTTP endpoint of the node the wallet session is attached to
    pub url: String,

    /// Connection timeout in milliseconds
    pub connection_timeout_ms: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8545".to_string(),
            connection_timeout_ms: 30_000,
        }
    }
}

/// Parameters applied to every mutating pool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeConfig {
    /// Slippage tolerance as an integer percentage
    pub slippage_pct: u32,

    /// Deadline offset for swaps, in seconds
    pub swap_deadline_secs: u64,

    /// Deadline offset for add/remove liquidity, in seconds
    pub liquidity_deadline_secs: u64,

    /// Gas limit for mutating calls
    pub gas_limit: u64,
}

impl Default for TradeConfig {
    fn default() -> Self {
        Self {
            slippage_pct: 1,
            swap_deadline_secs: 60,
            liquidity_deadline_secs: 600,
            gas_limit: 300_000,
        }
    }
}

/// Block-range policy for event history queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Lookback window for the lightweight feed, in blocks
    pub default_lookback_blocks: u64,

    /// Lookback window for the full-history feed, in blocks
    pub full_lookback_blocks: u64,

    /// Client-side timeout per event-log query, in milliseconds
    pub query_timeout_ms: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            default_lookback_blocks: 5_000,
            full_lookback_blocks: 10_000,
            query_timeout_ms: 15_000,
        }
    }
}

/// Spot-price polling cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceConfig {
    /// Seconds between price re-fetches
    pub poll_interval_secs: u64,
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 10,
        }
    }
}

/// Complete client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Address of the SimpleSwap pool contract (also the LP token)
    #[serde(default = "default_pool_address")]
    pub pool_address: String,

    #[serde(default)]
    pub rpc: RpcConfig,

    #[serde(default)]
    pub trade: TradeConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub price: PriceConfig,
}

fn default_pool_address() -> String {
    "0x3f7c341Fc3AC70A4Ac9BF861dE759B0A9eE0EB55".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            pool_address: default_pool_address(),
            rpc: RpcConfig::default(),
            trade: TradeConfig::default(),
            history: HistoryConfig::default(),
            price: PriceConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist, then apply environment overrides.
    pub fn load(file_path: &Path) -> Result<Self> {
        let mut config = if file_path.exists() {
            Self::from_toml_file(file_path)?
        } else {
            debug!("config file {:?} not found, using defaults", file_path);
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(file_path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(file_path)
            .with_context(|| format!("Failed to read config file: {:?}", file_path))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {:?}", file_path))
    }

    /// Load configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse TOML configuration")
    }

    /// Apply environment variable overrides to configuration.
    pub fn apply_env_overrides(&mut self) {
        use std::env;

        if let Ok(url) = env::var("SIMPLESWAP_RPC_URL") {
            self.rpc.url = url;
        }

        if let Ok(address) = env::var("SIMPLESWAP_POOL_ADDRESS") {
            self.pool_address = address;
        }

        if let Ok(pct) = env::var("SIMPLESWAP_SLIPPAGE_PCT") {
            if let Ok(pct) = pct.parse() {
                self.trade.slippage_pct = pct;
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.rpc.url.is_empty() {
            return Err(anyhow::anyhow!("RPC URL cannot be empty"));
        }

        if !self.rpc.url.starts_with("http://") && !self.rpc.url.starts_with("https://") {
            return Err(anyhow::anyhow!("RPC URL must start with http:// or https://"));
        }

        if !self.pool_address.starts_with("0x") || self.pool_address.len() != 42 {
            return Err(anyhow::anyhow!(
                "Pool address must be a 0x-prefixed 20-byte hex string"
            ));
        }

        if self.trade.slippage_pct >= 100 {
            return Err(anyhow::anyhow!("Slippage tolerance must be below 100%"));
        }

        if self.trade.swap_deadline_secs == 0 || self.trade.liquidity_deadline_secs == 0 {
            return Err(anyhow::anyhow!("Deadline offsets must be greater than 0"));
        }

        if self.history.full_lookback_blocks < self.history.default_lookback_blocks {
            return Err(anyhow::anyhow!(
                "Full-history lookback cannot be narrower than the default window"
            ));
        }

        if self.price.poll_interval_secs == 0 {
            return Err(anyhow::anyhow!("Price poll interval must be greater than 0"));
        }

        Ok(())
    }

    /// Save configuration to a TOML file.
    pub fn save_toml_file(&self, file_path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        std::fs::write(file_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", file_path))?;

        Ok(())
    }

    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc.connection_timeout_ms)
    }

    pub fn history_query_timeout(&self) -> Duration {
        Duration::from_millis(self.history.query_timeout_ms)
    }

    pub fn price_poll_interval(&self) -> Duration {
        Duration::from_secs(self.price.poll_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_default_config_is_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.trade.slippage_pct, 1);
        assert_eq!(config.trade.swap_deadline_secs, 60);
        assert_eq!(config.trade.liquidity_deadline_secs, 600);
        assert_eq!(config.history.default_lookback_blocks, 5_000);
        assert_eq!(config.history.full_lookback_blocks, 10_000);
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config = ClientConfig::from_toml_str(
            r#"
            pool_address = "0x0000000000000000000000000000000000000001"

            [trade]
            slippage_pct = 2
            swap_deadline_secs = 30
            liquidity_deadline_secs = 300
            gas_limit = 250000
            "#,
        )
        .unwrap();

        assert_eq!(config.trade.slippage_pct, 2);
        assert_eq!(config.history.default_lookback_blocks, 5_000);
        assert_eq!(config.price.poll_interval_secs, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        env::set_var("SIMPLESWAP_RPC_URL", "https://rpc.test.example");
        env::set_var("SIMPLESWAP_SLIPPAGE_PCT", "3");

        let mut config = ClientConfig::default();
        config.apply_env_overrides();

        assert_eq!(config.rpc.url, "https://rpc.test.example");
        assert_eq!(config.trade.slippage_pct, 3);

        env::remove_var("SIMPLESWAP_RPC_URL");
        env::remove_var("SIMPLESWAP_SLIPPAGE_PCT");
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = ClientConfig::default();
        config.trade.slippage_pct = 100;
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        config.pool_address = "not-an-address".to_string();
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        config.rpc.url = "wss://wrong.scheme".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("simpleswap.toml");

        let mut config = ClientConfig::default();
        config.trade.slippage_pct = 5;
        config.save_toml_file(&path).unwrap();

        let loaded = ClientConfig::from_toml_file(&path).unwrap();
        assert_eq!(loaded.trade.slippage_pct, 5);
        assert_eq!(loaded.rpc.url, config.rpc.url);
    }
}
