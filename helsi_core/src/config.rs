//! Configuration file support for Helsi.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/helsi/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub exclusions: ExclusionConfig,

    #[serde(default)]
    pub progression: ProgressionConfig,

    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Planned catalog; `<data_dir>/workouts.json` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_file: Option<PathBuf>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            catalog_file: None,
        }
    }
}

impl DataConfig {
    pub fn catalog_path(&self) -> PathBuf {
        self.catalog_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("workouts.json"))
    }

    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join("log.json")
    }
}

/// Interchangeable exercise pairs
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExclusionConfig {
    #[serde(default = "default_exclusion_pairs")]
    pub pairs: Vec<[String; 2]>,
}

impl Default for ExclusionConfig {
    fn default() -> Self {
        Self {
            pairs: default_exclusion_pairs(),
        }
    }
}

/// Progression report parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressionConfig {
    /// Lookback for the baseline instance and the monthly counter
    #[serde(default = "default_window_months")]
    pub window_months: u32,

    #[serde(default = "default_week_days")]
    pub week_days: i64,

    /// How many improvements the summary shows
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            window_months: default_window_months(),
            week_days: default_week_days(),
            top_n: default_top_n(),
        }
    }
}

/// Input collection configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct InputConfig {
    /// Attempts per value before giving up; unbounded when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
}

/// HTTP server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("helsi")
}

fn default_exclusion_pairs() -> Vec<[String; 2]> {
    crate::exclusion::DEFAULT_PAIRS
        .iter()
        .map(|(a, b)| [a.to_string(), b.to_string()])
        .collect()
}

fn default_window_months() -> u32 {
    1
}

fn default_week_days() -> i64 {
    7
}

fn default_top_n() -> usize {
    3
}

fn default_bind() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    8080
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        match Self::default_config_path() {
            Some(config_path) if config_path.exists() => Self::load_from(&config_path),
            config_path => {
                tracing::info!(
                    "No config file found at {:?}, using defaults",
                    config_path
                );
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        let base = dirs::config_dir().or_else(|| dirs::home_dir().map(|h| h.join(".config")))?;
        Some(base.join("helsi").join("config.toml"))
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.progression.window_months == 0 {
            return Err(Error::Config("progression.window_months must be at least 1".into()));
        }
        if self.progression.week_days <= 0 {
            return Err(Error::Config("progression.week_days must be positive".into()));
        }
        if self.input.max_attempts == Some(0) {
            return Err(Error::Config("input.max_attempts must be at least 1".into()));
        }
        for [a, b] in &self.exclusions.pairs {
            if a == b {
                return Err(Error::Config(format!(
                    "exclusion pair pairs '{}' with itself",
                    a
                )));
            }
        }
        Ok(())
    }
}
