//! Unified path management for AISADSA configuration and session files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/aisadsa/           # Config directory
//! ├── config.toml              # Application configuration
//! └── credentials.json         # Signed-in identity (0600)
//!
//! ~/.local/share/aisadsa/      # Data directory
//! ├── tabs/                    # One directory per tab session
//! │   └── <tab-id>/
//! │       ├── flow.json
//! │       └── chat.json
//! └── logs/
//!     └── aisadsa.log.YYYY-MM-DD
//! ```

use aisadsa_core::error::{AssessmentError, Result};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "aisadsa";

/// Resolved locations of every file the client touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AisadsaPaths {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl AisadsaPaths {
    /// Platform defaults (XDG on Linux, the native locations elsewhere).
    pub fn resolve() -> Result<Self> {
        Ok(Self {
            config_dir: Self::default_config_dir()?,
            data_dir: Self::default_data_dir()?,
        })
    }

    pub fn new(config_dir: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            data_dir: data_dir.into(),
        }
    }

    /// Returns a copy with the data directory replaced.
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn default_config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| AssessmentError::config("Cannot find config directory"))
    }

    pub fn default_data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| AssessmentError::config("Cannot find data directory"))
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Path to the credential file.
    ///
    /// # Security Note
    ///
    /// Written with 600 permissions on Unix.
    pub fn credentials_file(&self) -> PathBuf {
        self.config_dir.join("credentials.json")
    }

    pub fn tabs_dir(&self) -> PathBuf {
        self.data_dir.join("tabs")
    }

    pub fn tab_dir(&self, tab_id: &str) -> PathBuf {
        self.tabs_dir().join(tab_id)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}
