//! Engine configuration file.
//!
//! ```toml
//! network_id = "tally-testnet"
//! log_level = "info"
//! log_format = "json"
//!
//! [suffrage]
//! nodes = ["<hex public key>", "..."]
//! threshold_percent = 67
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tally_currency::Suffrage;
use tally_types::{NetworkId, PublicKey};
use tally_utils::LogFormat;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(String),

    #[error("invalid suffrage node key {key}: {reason}")]
    NodeKey { key: String, reason: String },

    #[error("invalid suffrage: {0}")]
    Suffrage(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_network_id")]
    pub network_id: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    #[serde(default)]
    pub suffrage: SuffrageConfig,
}

/// Operator nodes allowed to register currencies and update policies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuffrageConfig {
    #[serde(default)]
    pub nodes: Vec<String>,

    #[serde(default = "default_threshold_percent")]
    pub threshold_percent: u32,
}

fn default_network_id() -> String {
    "tally-localnet".into()
}

fn default_log_level() -> String {
    "info".into()
}

fn default_threshold_percent() -> u32 {
    100
}

impl Default for SuffrageConfig {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            threshold_percent: default_threshold_percent(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            network_id: default_network_id(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            suffrage: SuffrageConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn network(&self) -> NetworkId {
        NetworkId::from(self.network_id.as_str())
    }

    pub fn suffrage(&self) -> Result<Suffrage, ConfigError> {
        let nodes = self
            .suffrage
            .nodes
            .iter()
            .map(|k| {
                PublicKey::from_str(k).map_err(|e| ConfigError::NodeKey {
                    key: k.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Suffrage::new(nodes, self.suffrage.threshold_percent)
            .map_err(|e| ConfigError::Suffrage(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, EngineConfig::default());
        assert_eq!(cfg.suffrage.threshold_percent, 100);
        assert!(cfg.suffrage().unwrap().nodes().is_empty());
    }

    #[test]
    fn parses_suffrage_nodes() {
        let key = hex::encode([7u8; 32]);
        let cfg = EngineConfig::from_toml_str(&format!(
            "network_id = \"net\"\nlog_format = \"json\"\n[suffrage]\nnodes = [\"{key}\"]\nthreshold_percent = 67\n"
        ))
        .unwrap();
        assert_eq!(cfg.log_format, LogFormat::Json);
        assert_eq!(cfg.network(), NetworkId::from("net"));
        let s = cfg.suffrage().unwrap();
        assert_eq!(s.nodes(), &[PublicKey([7; 32])]);
        assert_eq!(s.threshold(), 1);
    }

    #[test]
    fn bad_node_key_is_reported() {
        let cfg = EngineConfig::from_toml_str("[suffrage]\nnodes = [\"zz\"]\n").unwrap();
        assert!(matches!(cfg.suffrage(), Err(ConfigError::NodeKey { .. })));
    }

    #[test]
    fn repeated_node_key_is_reported() {
        let key = hex::encode([7u8; 32]);
        let cfg = EngineConfig::from_toml_str(&format!(
            "[suffrage]\nnodes = [\"{key}\", \"{key}\"]\nthreshold_percent = 50\n"
        ))
        .unwrap();
        assert!(matches!(cfg.suffrage(), Err(ConfigError::Suffrage(_))));
    }

    #[test]
    fn toml_roundtrip() {
        let cfg = EngineConfig::default();
        let s = cfg.to_toml_string().unwrap();
        assert_eq!(EngineConfig::from_toml_str(&s).unwrap(), cfg);
    }
}
