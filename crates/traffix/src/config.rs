//! Configuration management for traffix.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default config directory name.
const CONFIG_DIR_NAME: &str = "traffix";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `TRAFFIX_`, sections split by `__`)
/// 2. TOML config file at `~/.config/traffix/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Registry configuration.
    pub registry: RegistryConfig,
    /// Fine schedule used by the video analysis handler.
    pub fines: FinesConfig,
    /// Live feed configuration.
    pub feed: FeedConfig,
}

/// Registry-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Load the demo vehicles at startup.
    pub seed_demo_data: bool,
}

/// Fine schedule configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinesConfig {
    /// Amount issued for speeding violations.
    pub speeding_amount: u64,
    /// Amount issued for every other violation.
    pub default_amount: u64,
    /// Location recorded on fines issued from video analysis.
    pub location: String,
}

/// Live feed configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Interval between analyzed frames in milliseconds.
    pub frame_interval_ms: u64,
    /// Number of recent detections kept for display.
    pub recent_capacity: usize,
    /// Register unseen plates reported by the live feed.
    pub auto_register: bool,
    /// Confidence attached to live feed detections.
    pub default_confidence: f32,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            seed_demo_data: true,
        }
    }
}

impl Default for FinesConfig {
    fn default() -> Self {
        Self {
            speeding_amount: 150,
            default_amount: 100,
            location: "Intersection A4-Forensic".to_string(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 5_000,
            recent_capacity: 10,
            auto_register: true,
            default_confidence: 0.95,
        }
    }
}

impl FeedConfig {
    /// Time between frames as a Duration.
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

impl Config {
    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("TRAFFIX_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.feed.frame_interval_ms == 0 {
            return Err(Error::config_validation(
                "frame_interval_ms must be greater than 0",
            ));
        }

        if self.feed.recent_capacity == 0 {
            return Err(Error::config_validation(
                "recent_capacity must be greater than 0",
            ));
        }

        if !(0.0..=1.0).contains(&self.feed.default_confidence) {
            return Err(Error::config_validation(format!(
                "default_confidence ({}) must be between 0 and 1",
                self.feed.default_confidence
            )));
        }

        if self.fines.location.trim().is_empty() {
            return Err(Error::config_validation("fine location cannot be empty"));
        }

        Ok(())
    }
}
