//! Configuration for the Ethereum command-line client
//!
//! Configuration is assembled from one or more YAML or JSON layers (chosen by
//! file extension). Later layers are deep-merged over earlier ones: objects
//! merge key by key, while arrays and scalars replace whatever was there
//! before.

pub mod rpc;

use crate::{Error, Result};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use rpc::{resolve_provider, ETH_RPC_URL_ENV};

/// Config layers read when no `--config` flag is given
pub const DEFAULT_CONFIG_LAYERS: [&str; 2] = ["config.yaml", "config.local.yaml"];

/// Node connection settings
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Web3Config {
    /// JSON-RPC endpoint of the node
    pub provider: String,
    /// Confirmations to report after a send's receipt
    #[serde(default)]
    pub confirmations: u64,
    /// Block polls spent waiting for those confirmations before giving up
    #[serde(default = "default_confirmation_polls")]
    pub confirmation_polls: u32,
    /// Polling interval for receipts and new blocks (milliseconds)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_confirmation_polls() -> u32 {
    30
}

fn default_poll_interval_ms() -> u64 {
    1_000
}

impl Web3Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Paths to a compiled contract's artifacts
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractPaths {
    pub abi_path: PathBuf,
    pub bin_path: PathBuf,
}

/// A keystore-backed account to unlock at startup
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountConfig {
    pub name: String,
    pub key_path: PathBuf,
    pub password: SecretString,
}

/// Main configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub web3: Web3Config,
    #[serde(default)]
    pub contracts: HashMap<String, ContractPaths>,
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
}

impl Config {
    /// Load and merge every layer in order. Each layer must exist.
    pub fn load<P: AsRef<Path>>(layers: &[P]) -> Result<Self> {
        if layers.is_empty() {
            return Err(Error::Config("no configuration files given".to_string()));
        }

        let mut merged = Value::Object(Default::default());
        for layer in layers {
            let path = layer.as_ref();
            tracing::debug!(path = %path.display(), "Reading config layer");
            let content = std::fs::read_to_string(path)
                .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
            let value = parse_layer(path, &content)
                .map_err(|reason| Error::Config(format!("{}: {}", path.display(), reason)))?;
            merge(&mut merged, value);
        }

        Self::from_value(merged)
    }

    /// Build a config from an already merged JSON document
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::Config(e.to_string()))
    }

    /// Look up a named contract's artifact paths
    pub fn contract(&self, name: &str) -> Option<&ContractPaths> {
        self.contracts.get(name)
    }
}

/// `.json` layers are parsed as JSON, anything else as YAML
fn parse_layer(path: &Path, content: &str) -> std::result::Result<Value, String> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(content).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }
}

/// Deep-merge `overlay` into `base`.
///
/// Objects merge recursively; any other value in `overlay` (including arrays)
/// replaces the value in `base`.
pub fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
