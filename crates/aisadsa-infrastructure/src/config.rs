//! Application configuration loaded from `config.toml`.
//!
//! Every field is defaulted, so a missing or partial file is valid. Two
//! environment variables override the file: `AISADSA_BASE_URL` and
//! `AISADSA_DATA_DIR`.

use crate::paths::AisadsaPaths;
use aisadsa_core::error::Result;
use aisadsa_core::flow::FlowConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub const BASE_URL_ENV: &str = "AISADSA_BASE_URL";
pub const DATA_DIR_ENV: &str = "AISADSA_DATA_DIR";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
    /// Client-side bound on every request; expiry surfaces as a network error.
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ServerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root of tab sessions and logs. Empty means the platform data dir.
    pub root_dir: String,
}

/// Root of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub flow: FlowConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    /// Loads the file at `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Loads the file and applies the process environment on top.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_overrides(
            std::env::var(BASE_URL_ENV).ok(),
            std::env::var(DATA_DIR_ENV).ok(),
        );
        Ok(config)
    }

    /// Applies override values; blank values are ignored.
    pub fn apply_overrides(&mut self, base_url: Option<String>, data_dir: Option<String>) {
        if let Some(base_url) = base_url.filter(|v| !v.trim().is_empty()) {
            self.server.base_url = base_url;
        }
        if let Some(data_dir) = data_dir.filter(|v| !v.trim().is_empty()) {
            self.storage.root_dir = data_dir;
        }
    }

    /// Configured data root, if one was set.
    pub fn data_dir(&self) -> Option<PathBuf> {
        let root = self.storage.root_dir.trim();
        (!root.is_empty()).then(|| PathBuf::from(root))
    }

    /// Applies the configured data root to resolved paths.
    pub fn apply_to_paths(&self, paths: AisadsaPaths) -> AisadsaPaths {
        match self.data_dir() {
            Some(dir) => paths.with_data_dir(dir),
            None => paths,
        }
    }
}
