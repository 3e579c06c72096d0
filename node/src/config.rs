//! Gateway configuration, loaded from TOML.
//!
//! ```toml
//! [network]
//! blockchain = "IoTeX"
//! network = "mainnet"
//! chain_id = 1
//!
//! [currency]
//! symbol = "IOTX"
//! decimals = 18
//!
//! [server]
//! port = 8080
//! metrics_port = 9100
//! rosetta_version = "1.4.10"
//!
//! [protocol]
//! pacific_block_height = 432001
//! ```
//!
//! Every section and key is optional; missing values fall back to mainnet
//! defaults.
//!
//! `server.endpoint` and `server.secure_endpoint` describe the node for
//! programs that pair [`crate::api::AppState`] with their own
//! [`iotex_rosetta::client::ChainClient`]. The stock binary has no node
//! transport and only warns when an endpoint is set.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use iotex_rosetta::config::{
    BLOCKCHAIN, MAINNET_CHAIN_ID, NATIVE_DECIMALS, NATIVE_SYMBOL, PACIFIC_BLOCK_HEIGHT,
    ROSETTA_VERSION,
};
use iotex_rosetta::ledger::{Currency, LedgerContext};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    pub network: NetworkSection,
    pub currency: CurrencySection,
    pub server: ServerSection,
    pub protocol: ProtocolSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkSection {
    pub blockchain: String,
    pub network: String,
    pub chain_id: u32,
}

impl Default for NetworkSection {
    fn default() -> Self {
        Self {
            blockchain: BLOCKCHAIN.to_string(),
            network: "mainnet".to_string(),
            chain_id: MAINNET_CHAIN_ID,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CurrencySection {
    pub symbol: String,
    pub decimals: u32,
}

impl Default for CurrencySection {
    fn default() -> Self {
        Self {
            symbol: NATIVE_SYMBOL.to_string(),
            decimals: NATIVE_DECIMALS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub port: u16,
    pub metrics_port: u16,
    pub rosetta_version: String,
    /// Node RPC endpoint, for programs that build their own chain client
    /// from this file. The stock binary only reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Whether `endpoint` is dialed over TLS. Only embedders read it.
    pub secure_endpoint: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            port: 8080,
            metrics_port: 9100,
            rosetta_version: ROSETTA_VERSION.to_string(),
            endpoint: None,
            secure_endpoint: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProtocolSection {
    /// Height at which execution gas stopped being charged twice.
    pub pacific_block_height: u64,
}

impl Default for ProtocolSection {
    fn default() -> Self {
        Self {
            pacific_block_height: PACIFIC_BLOCK_HEIGHT,
        }
    }
}

impl GatewayConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network.blockchain.trim().is_empty() {
            return Err(ConfigError::Invalid("network.blockchain is empty".into()));
        }
        if self.network.network.trim().is_empty() {
            return Err(ConfigError::Invalid("network.network is empty".into()));
        }
        if self.network.chain_id == 0 {
            return Err(ConfigError::Invalid("network.chain_id must be non-zero".into()));
        }
        if self.currency.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("currency.symbol is empty".into()));
        }
        if self.server.port == self.server.metrics_port {
            return Err(ConfigError::Invalid(format!(
                "server.port and server.metrics_port are both {}",
                self.server.port
            )));
        }
        Ok(())
    }

    pub fn currency(&self) -> Currency {
        Currency::new(self.currency.symbol.clone(), self.currency.decimals)
    }

    pub fn ledger_context(&self) -> LedgerContext {
        LedgerContext::new(self.currency(), self.protocol.pacific_block_height)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}
