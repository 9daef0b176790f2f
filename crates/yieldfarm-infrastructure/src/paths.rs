//! Path management for Yieldfarm configuration files.

use std::path::PathBuf;

use yieldfarm_core::config::ConfigError;

const APP_DIR: &str = "yieldfarm";
const CONFIG_FILE: &str = "config.toml";

/// Platform paths for Yieldfarm.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/yieldfarm/         # Config directory (platform default)
/// └── config.toml              # Ledger endpoint and contract location
/// ```
pub struct YieldfarmPaths;

impl YieldfarmPaths {
    /// Returns the Yieldfarm configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory (e.g., `~/.config/yieldfarm/`)
    /// - `Err(ConfigError::ConfigDirNotFound)`: The platform has no config directory
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(ConfigError::ConfigDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }
}
