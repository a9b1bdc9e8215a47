//! Configuration for the facelog CLI.
//!
//! Configuration is stored in ~/.facelog/config.yaml. Every field is
//! optional; missing fields take the defaults below.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use facelog_attendance::{FlusherConfig, DEFAULT_LOG_LIST};
use facelog_faceid::{MatcherConfig, RegistrationConfig, DEFAULT_MIN_SAMPLES, DEFAULT_NAMESPACE, DEFAULT_THRESHOLD};
use serde::{Deserialize, Serialize};

/// Default base configuration directory name.
pub const DEFAULT_BASE_DIR: &str = ".facelog";
/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
/// Default database filename, next to the config file.
pub const DEFAULT_DB_FILE: &str = "facelog.redb";

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database file. Defaults to ~/.facelog/facelog.redb.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,

    /// Embedding dimension produced by the face model.
    pub dim: usize,

    /// Minimum cosine similarity for a match.
    pub threshold: f32,

    /// Samples required to enroll a person.
    pub min_samples: usize,

    /// Seconds between attendance flushes.
    pub flush_interval_secs: u64,

    /// Seconds to wait for one database write.
    pub store_timeout_secs: u64,

    /// Hash holding registrations.
    pub register_namespace: String,

    /// List holding attendance records.
    pub log_list: String,

    /// Path to the config file (not serialized).
    #[serde(skip)]
    config_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: None,
            dim: 512,
            threshold: DEFAULT_THRESHOLD,
            min_samples: DEFAULT_MIN_SAMPLES,
            flush_interval_secs: 30,
            store_timeout_secs: 10,
            register_namespace: DEFAULT_NAMESPACE.to_string(),
            log_list: DEFAULT_LOG_LIST.to_string(),
            config_path: PathBuf::new(),
        }
    }
}

impl Config {
    /// Gets the default config directory.
    pub fn default_config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(DEFAULT_BASE_DIR))
    }

    /// Gets the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        Self::default_config_dir().map(|dir| dir.join(DEFAULT_CONFIG_FILE))
    }

    /// Returns the config file path.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Resolves the database path: explicit setting, else next to the config file.
    pub fn db_path(&self) -> PathBuf {
        match &self.db_path {
            Some(p) => p.clone(),
            None => self
                .config_path
                .parent()
                .map(|dir| dir.join(DEFAULT_DB_FILE))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE)),
        }
    }

    /// Checks values that would otherwise panic or silently misbehave.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.dim == 0 {
            anyhow::bail!("dim must be positive");
        }
        if !(-1.0..=1.0).contains(&self.threshold) {
            anyhow::bail!("threshold must be within [-1, 1], got {}", self.threshold);
        }
        if self.flush_interval_secs == 0 {
            anyhow::bail!("flush_interval_secs must be positive");
        }
        if self.store_timeout_secs == 0 {
            anyhow::bail!("store_timeout_secs must be positive");
        }
        if self.register_namespace.is_empty() || self.log_list.is_empty() {
            anyhow::bail!("register_namespace and log_list must not be empty");
        }
        Ok(())
    }

    pub fn matcher(&self) -> MatcherConfig {
        MatcherConfig {
            threshold: self.threshold,
        }
    }

    pub fn registration(&self) -> RegistrationConfig {
        RegistrationConfig {
            dim: self.dim,
            min_samples: self.min_samples,
        }
    }

    pub fn flusher(&self) -> FlusherConfig {
        FlusherConfig {
            interval: Duration::from_secs(self.flush_interval_secs),
            store_timeout: self.store_timeout(),
        }
    }

    /// Bound on one database call.
    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }

    /// Saves the configuration to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&self.config_path, content)?;
        Ok(())
    }
}

/// Loads configuration. A missing file yields the defaults.
pub fn load_config(custom_path: Option<&str>) -> anyhow::Result<Config> {
    let config_path = match custom_path {
        Some(p) => PathBuf::from(p),
        None => Config::default_config_path()
            .ok_or_else(|| anyhow::anyhow!("cannot determine config path"))?,
    };

    let mut cfg: Config = if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("read {}", config_path.display()))?;
        serde_yaml::from_str(&content).with_context(|| format!("parse {}", config_path.display()))?
    } else {
        Config::default()
    };

    cfg.config_path = config_path;
    Ok(cfg)
}
