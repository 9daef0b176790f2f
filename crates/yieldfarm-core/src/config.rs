//! Deployment configuration for the ledger endpoint.
//!
//! The endpoint URL and contract address always come from configuration;
//! nothing here hardcodes a deployment.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::amount::{DEFAULT_DECIMALS, MAX_DECIMALS};
use crate::ledger::is_hex_address;

const DEFAULT_POLL_INTERVAL_MS: u64 = 1_000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Errors raised while loading or validating configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Configuration file not found at: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Could not determine the configuration directory")]
    ConfigDirNotFound,

    #[error("IO error: {0}")]
    Io(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("Missing required setting '{0}'")]
    Missing(&'static str),

    #[error("Invalid setting '{field}': {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(format!("{} (kind: {:?})", err, err.kind()))
    }
}

/// Where the pool contract lives and how to talk to it.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// JSON-RPC endpoint of the ledger node or wallet bridge.
    pub rpc_url: String,
    /// Address of the pool contract.
    pub contract_address: String,
    /// Fixed exponent between display units and base units.
    #[serde(default = "default_decimals")]
    pub decimals: u32,
    #[serde(default = "default_poll_interval_ms")]
    pub confirmation_poll_interval_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Upper bound on the confirmation wait. Unbounded when absent.
    #[serde(default)]
    pub confirmation_timeout_secs: Option<u64>,
}

fn default_decimals() -> u32 {
    DEFAULT_DECIMALS
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl LedgerConfig {
    pub fn new(rpc_url: impl Into<String>, contract_address: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            contract_address: contract_address.into(),
            decimals: DEFAULT_DECIMALS,
            confirmation_poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            confirmation_timeout_secs: None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rpc_url.trim().is_empty() {
            return Err(ConfigError::Missing("rpc_url"));
        }
        if !(self.rpc_url.starts_with("http://") || self.rpc_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                field: "rpc_url",
                message: format!("'{}' is not an http(s) URL", self.rpc_url),
            });
        }
        if !is_hex_address(&self.contract_address) {
            return Err(ConfigError::Invalid {
                field: "contract_address",
                message: format!("'{}' is not a 20-byte hex address", self.contract_address),
            });
        }
        if self.decimals > MAX_DECIMALS {
            return Err(ConfigError::Invalid {
                field: "decimals",
                message: format!("must be at most {MAX_DECIMALS}"),
            });
        }
        if self.confirmation_poll_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "confirmation_poll_interval_ms",
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.confirmation_poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn confirmation_timeout(&self) -> Option<Duration> {
        self.confirmation_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTRACT: &str = "0x29D2DAe17003b4D3B5C280A01193D8c8343220d0";

    #[test]
    fn test_defaults_apply_when_omitted() {
        let config: LedgerConfig = toml::from_str(&format!(
            "rpc_url = \"http://127.0.0.1:8545\"\ncontract_address = \"{CONTRACT}\"\n"
        ))
        .unwrap();

        assert_eq!(config.decimals, 18);
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.confirmation_timeout(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let mut config = LedgerConfig::new("", CONTRACT);
        assert_eq!(config.validate(), Err(ConfigError::Missing("rpc_url")));

        config.rpc_url = "ws://localhost:8546".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "rpc_url", .. })
        ));

        config.rpc_url = "http://localhost:8545".into();
        config.contract_address = "0x1234".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "contract_address",
                ..
            })
        ));

        config.contract_address = CONTRACT.into();
        config.decimals = 39;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "decimals", .. })
        ));
    }
}
