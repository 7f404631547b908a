//! StorySpark Configuration System
//!
//! Each concern of the engine owns one section implementing `ConfigSection`;
//! the root [`Config`] validates and merges them together.
//!
//! # Example
//!
//! ```rust,no_run
//! use storyspark_config::{Config, ConfigManager};
//!
//! let manager = ConfigManager::new().expect("Failed to initialize config");
//! let config = manager.load().unwrap_or_else(|e| {
//!     eprintln!("Config error: {}, using defaults", e);
//!     Config::default()
//! });
//!
//! println!("Catalog: {}{}", config.network.api_base_url, config.network.catalog_path);
//! ```

mod error;
mod manager;
mod persistence;
mod validation;

// Config sections
pub mod app_config;
mod narrator_config;
mod network_config;
mod player_config;

pub use error::{ConfigError, ConfigResult, ValidationError};
pub use manager::{apply_env_overrides, ConfigManager};
pub use validation::{ConfigSection, Validator};

pub use app_config::{AppConfig, LogLevel};
pub use narrator_config::NarratorConfig;
pub use network_config::NetworkConfig;
pub use player_config::PlayerConfig;

use serde::{Deserialize, Serialize};

/// Current config file format version
pub const CONFIG_VERSION: u32 = 1;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Config file format version
    pub version: u32,

    /// Application-level settings
    pub app: AppConfig,

    /// Backend endpoints and request policy
    pub network: NetworkConfig,

    /// Playback and waveform settings
    pub player: PlayerConfig,

    /// Narrator cadence
    pub narrator: NarratorConfig,
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

        if let Err(mut e) = self.app.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.network.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.player.validate() {
            errors.append(&mut e);
        }

        if let Err(mut e) = self.narrator.validate() {
            errors.append(&mut e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// [`validate`](Self::validate) as a `ConfigError`
    pub fn check(&self) -> ConfigResult<()> {
        self.validate().map_err(ConfigError::Invalid)
    }

    /// Merges this config with another, preferring values from `other`
    pub fn merge(&mut self, other: Config) {
        self.app.merge(other.app);
        self.network.merge(other.network);
        self.player.merge(other.player);
        self.narrator.merge(other.narrator);
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            app: AppConfig::default(),
            network: NetworkConfig::default(),
            player: PlayerConfig::default(),
            narrator: NarratorConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_version_is_set() {
        let config = Config::default();
        assert_eq!(config.version, CONFIG_VERSION);
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        let mut override_config = Config::default();
        override_config.player.default_volume = 0.5;
        override_config.narrator.mood_interval_ms = 2000;

        base.merge(override_config);
        assert_eq!(base.player.default_volume, 0.5);
        assert_eq!(base.narrator.mood_interval_ms, 2000);
    }

    #[test]
    fn test_errors_collected_across_sections() {
        let mut config = Config::default();
        config.player.default_volume = 2.0;
        config.narrator.mood_change_probability = -1.0;
        config.network.api_base_url = "not a url".to_string();

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [network]
            api_base_url = "https://stories.example.com"
            "#,
        )
        .unwrap();
        assert_eq!(config.network.api_base_url, "https://stories.example.com");
        assert_eq!(config.network.catalog_path, "/api/stories");
        assert_eq!(config.player, PlayerConfig::default());
    }
}
