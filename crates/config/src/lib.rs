//! Bodystream configuration
//!
//! Settings for streamed transfers live in a TOML file in the platform config
//! directory. Each section implements [`ConfigSection`] so it can validate
//! itself and take part in override chains.
//!
//! - Invalid values found on load are logged and kept, so a user can still fix
//!   the file by hand
//! - Invalid values are rejected on save
//! - Writes go through a temporary file and an atomic rename
//!
//! # Example
//!
//! ```rust,no_run
//! use bodystream_config::{Config, ConfigManager};
//!
//! let manager = ConfigManager::new().expect("Failed to initialize config");
//! let config = manager.load().unwrap_or_else(|e| {
//!     eprintln!("Config error: {}, using defaults", e);
//!     Config::default()
//! });
//!
//! println!("Bandwidth limit: {} B/s", config.transfer.bandwidth_limit);
//! ```

mod error;
mod manager;
mod persistence;
mod validation;

mod network_config;
mod transfer_config;

pub use error::{ConfigError, ConfigResult, ValidationError};
pub use manager::ConfigManager;
pub use validation::{ConfigSection, Validator};

pub use network_config::NetworkConfig;
pub use transfer_config::TransferConfig;

use serde::{Deserialize, Serialize};

/// Current config file format version
pub const CONFIG_VERSION: u32 = 1;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Config file format version
    pub version: u32,

    /// Rate limiting and progress settings
    pub transfer: TransferConfig,

    /// HTTP client settings
    pub network: NetworkConfig,
}

impl Config {
    /// Creates a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the entire configuration
    ///
    /// Returns all validation errors found across all sections.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(mut e) = self.transfer.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.network.validate() {
            errors.append(&mut e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Merges this config with another, preferring values from `other`
    pub fn merge(&mut self, other: Config) {
        self.transfer.merge(other.transfer);
        self.network.merge(other.network);
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            transfer: TransferConfig::default(),
            network: NetworkConfig::default(),
        }
    }
}
