//! Configuration schema for prebuilt
//!
//! Configuration is stored in `.prebuilt.toml` at the repository root.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Build record storage
    pub storage: StorageConfig,

    /// Applications in the repository
    pub apps: Vec<AppConfig>,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Build record storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory of build records, relative to the repository root.
    /// Defaults to the user data directory.
    pub path: Option<PathBuf>,

    /// Default number of builds shown by `ls`
    pub list_limit: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            list_limit: 10,
        }
    }
}

/// An application entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application name
    pub name: String,

    /// Command that builds the application
    pub build_command: Vec<String>,

    /// Input files, relative to the repository root
    pub inputs: Vec<PathBuf>,

    /// Only reuse the most recent build, not any build with equal inputs
    pub use_last_build: bool,
}
