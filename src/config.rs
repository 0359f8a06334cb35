//! Configuration file support.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/fittrack/config.toml`,
//! falling back to defaults for any missing section.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Data storage settings
    #[serde(default)]
    pub data: DataConfig,

    /// Periodic refresh settings
    #[serde(default)]
    pub refresh: RefreshConfig,
}

/// Data storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding the JSON record files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            data_dir: default_data_dir(),
        }
    }
}

/// Periodic refresh configuration.
///
/// The engine itself has no timer; the host UI re-runs the refresh on this
/// cadence so rolling goal windows slide forward even when nothing is logged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Seconds between periodic progress refreshes
    #[serde(default = "default_refresh_interval_secs")]
    pub interval_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        RefreshConfig {
            interval_secs: default_refresh_interval_secs(),
        }
    }
}

impl RefreshConfig {
    /// Refresh cadence as a `Duration`, for host timer setup
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.interval_secs)
    }
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let path = default_config_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", path);
            Ok(Config::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = default_config_path();
        self.save_to(&path)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

/// Default config file path: `$XDG_CONFIG_HOME/fittrack/config.toml`
pub fn default_config_path() -> PathBuf {
    let config_dir = dirs::config_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".config")
    });
    config_dir.join("fittrack").join("config.toml")
}

fn default_data_dir() -> PathBuf {
    let data_dir = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local").join("share")
    });
    data_dir.join("fittrack")
}

fn default_refresh_interval_secs() -> u64 {
    60
}
