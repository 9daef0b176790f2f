//! Configuration service implementation.
//!
//! Loads [`LedgerConfig`] from `config.toml` and applies environment
//! overrides (`YIELDFARM_RPC_URL`, `YIELDFARM_CONTRACT`, `YIELDFARM_DECIMALS`).

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;
use yieldfarm_core::config::{ConfigError, LedgerConfig};

use crate::paths::YieldfarmPaths;

pub const ENV_RPC_URL: &str = "YIELDFARM_RPC_URL";
pub const ENV_CONTRACT: &str = "YIELDFARM_CONTRACT";
pub const ENV_DECIMALS: &str = "YIELDFARM_DECIMALS";

/// On-disk shape: every field optional so the environment can fill gaps.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    rpc_url: Option<String>,
    contract_address: Option<String>,
    decimals: Option<u32>,
    confirmation_poll_interval_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
    confirmation_timeout_secs: Option<u64>,
}

/// Resolves and loads the ledger configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    /// Uses the platform config file (`~/.config/yieldfarm/config.toml`).
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self::with_path(YieldfarmPaths::config_file()?))
    }

    /// Uses an explicit config file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the file, applies process environment overrides and validates.
    pub fn load(&self) -> Result<LedgerConfig, ConfigError> {
        self.load_with(|key| std::env::var(key).ok())
    }

    /// Same as [`ConfigService::load`] with an injectable environment lookup.
    ///
    /// # Returns
    ///
    /// - `Ok(LedgerConfig)`: a validated configuration
    /// - `Err(ConfigError::NotFound)`: no file and no environment overrides
    /// - `Err(ConfigError)`: unreadable, unparsable or invalid settings
    pub fn load_with<F>(&self, env: F) -> Result<LedgerConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_rpc_url = env(ENV_RPC_URL).filter(|v| !v.trim().is_empty());
        let env_contract = env(ENV_CONTRACT).filter(|v| !v.trim().is_empty());
        let env_decimals = env(ENV_DECIMALS).filter(|v| !v.trim().is_empty());

        let mut file = if self.path.exists() {
            debug!(path = %self.path.display(), "Loading configuration");
            let content = std::fs::read_to_string(&self.path)?;
            toml::from_str::<ConfigFile>(&content)?
        } else if env_rpc_url.is_some() || env_contract.is_some() {
            debug!(path = %self.path.display(), "No config file, using environment");
            ConfigFile::default()
        } else {
            return Err(ConfigError::NotFound(self.path.clone()));
        };

        if let Some(rpc_url) = env_rpc_url {
            file.rpc_url = Some(rpc_url);
        }
        if let Some(contract) = env_contract {
            file.contract_address = Some(contract);
        }
        if let Some(decimals) = env_decimals {
            let parsed = decimals.trim().parse().map_err(|_| ConfigError::Invalid {
                field: "decimals",
                message: format!("{ENV_DECIMALS}='{decimals}' is not a number"),
            })?;
            file.decimals = Some(parsed);
        }

        let mut config = LedgerConfig::new(
            file.rpc_url.ok_or(ConfigError::Missing("rpc_url"))?,
            file.contract_address
                .ok_or(ConfigError::Missing("contract_address"))?,
        );
        if let Some(decimals) = file.decimals {
            config.decimals = decimals;
        }
        if let Some(interval) = file.confirmation_poll_interval_ms {
            config.confirmation_poll_interval_ms = interval;
        }
        if let Some(timeout) = file.request_timeout_secs {
            config.request_timeout_secs = timeout;
        }
        config.confirmation_timeout_secs = file.confirmation_timeout_secs;

        config.validate()?;
        Ok(config)
    }
}
