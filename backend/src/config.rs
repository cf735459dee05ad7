//! # Configuration
//!
//! Settings for the debt tracker, stored as a single YAML file.
//!
//! ## YAML Format
//!
//! ```yaml
//! annual_rate: 0.15
//! initial_balance: 100000.0
//! max_history: 10
//! animation_duration_ms: 800
//! database_url: null
//! bind_address: "127.0.0.1:3000"
//! allowed_origin: "http://localhost:8080"
//! ```
//!
//! Every field is optional; missing fields take their default. A missing file
//! means "all defaults".

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::domain::accrual::DEFAULT_ANNUAL_RATE;
use crate::domain::ledger_state::{DEFAULT_INITIAL_BALANCE, DEFAULT_MAX_HISTORY};

const APP_DIRECTORY: &str = "debt-tracker";
const CONFIG_FILE_NAME: &str = "config.yaml";
const DATABASE_FILE_NAME: &str = "ledger.db";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Yearly interest rate as a fraction (0.15 = 15%)
    pub annual_rate: f64,
    /// Balance of a ledger that has never been saved
    pub initial_balance: f64,
    /// Number of undo steps kept
    pub max_history: usize,
    /// Length of the balance counter animation
    pub animation_duration_ms: u64,
    /// SQLite URL; defaults to a file in the platform data directory
    pub database_url: Option<String>,
    /// Address the REST server listens on
    pub bind_address: String,
    /// Origin allowed to call the REST API from a browser
    pub allowed_origin: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            annual_rate: DEFAULT_ANNUAL_RATE,
            initial_balance: DEFAULT_INITIAL_BALANCE,
            max_history: DEFAULT_MAX_HISTORY,
            animation_duration_ms: 800,
            database_url: None,
            bind_address: "127.0.0.1:3000".to_string(),
            allowed_origin: "http://localhost:8080".to_string(),
        }
    }
}

impl LedgerConfig {
    /// Load and validate the config at `path`
    pub fn load(path: &Path) -> Result<Self> {
        let yaml_content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: LedgerConfig = serde_yaml::from_str(&yaml_content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Load the config at `path`, or the defaults if the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            info!("No config file at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Write the config as YAML, replacing any existing file atomically
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
                info!("Created config directory: {:?}", parent);
            }
        }

        let yaml_content = serde_yaml::to_string(self)?;
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, yaml_content)?;
        fs::rename(&temp_path, path)?;

        debug!("Saved config to {:?}", path);
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !self.annual_rate.is_finite() || self.annual_rate < 0.0 {
            return Err(anyhow!("annual_rate must be a non-negative number, got {}", self.annual_rate));
        }
        if !self.initial_balance.is_finite() || self.initial_balance < 0.0 {
            return Err(anyhow!(
                "initial_balance must be a non-negative number, got {}",
                self.initial_balance
            ));
        }
        if self.max_history == 0 {
            return Err(anyhow!("max_history must be at least 1"));
        }
        Ok(())
    }

    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_duration_ms)
    }

    /// The configured database URL, or a SQLite file in the data directory
    pub fn database_url(&self) -> Result<String> {
        match &self.database_url {
            Some(url) => Ok(url.clone()),
            None => {
                let path = default_database_path()?;
                Ok(format!("sqlite:{}", path.display()))
            }
        }
    }
}

/// `<config dir>/debt-tracker/config.yaml`, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIRECTORY).join(CONFIG_FILE_NAME))
}

/// `<data dir>/debt-tracker/ledger.db`, creating the directory if needed.
/// Falls back to the working directory when the platform has no data dir.
pub fn default_database_path() -> Result<PathBuf> {
    match dirs::data_dir() {
        Some(data_dir) => {
            let app_dir = data_dir.join(APP_DIRECTORY);
            if !app_dir.exists() {
                fs::create_dir_all(&app_dir)?;
                info!("Created data directory: {:?}", app_dir);
            }
            Ok(app_dir.join(DATABASE_FILE_NAME))
        }
        None => Ok(PathBuf::from(DATABASE_FILE_NAME)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = LedgerConfig::default();
        assert_eq!(config.annual_rate, 0.15);
        assert_eq!(config.initial_balance, 100000.0);
        assert_eq!(config.max_history, 10);
        assert_eq!(config.animation_duration(), Duration::from_millis(800));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = LedgerConfig::load_or_default(&temp_dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config, LedgerConfig::default());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(&path, "annual_rate: 0.2\nmax_history: 3\n").unwrap();

        let config = LedgerConfig::load_or_default(&path).unwrap();
        assert_eq!(config.annual_rate, 0.2);
        assert_eq!(config.max_history, 3);
        assert_eq!(config.initial_balance, 100000.0);
        assert_eq!(config.bind_address, "127.0.0.1:3000");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");

        fs::write(&path, "max_history: 0\n").unwrap();
        assert!(LedgerConfig::load(&path).is_err());

        fs::write(&path, "annual_rate: -0.1\n").unwrap();
        assert!(LedgerConfig::load(&path).is_err());

        fs::write(&path, "annual_rate: [not, a, number]\n").unwrap();
        assert!(LedgerConfig::load(&path).is_err());
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.yaml");

        let config = LedgerConfig {
            annual_rate: 0.18,
            database_url: Some("sqlite::memory:".to_string()),
            ..LedgerConfig::default()
        };
        config.save(&path).unwrap();

        assert_eq!(LedgerConfig::load(&path).unwrap(), config);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_explicit_database_url_wins() {
        let config = LedgerConfig {
            database_url: Some("sqlite:custom.db".to_string()),
            ..LedgerConfig::default()
        };
        assert_eq!(config.database_url().unwrap(), "sqlite:custom.db");
    }
}
