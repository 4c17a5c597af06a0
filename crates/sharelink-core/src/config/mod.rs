//! Configuration and root path handling

mod paths;

pub use paths::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Configuration for a sharelink run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SyncConfig {
    /// Destination tree that receives the links
    pub project_root: PathBuf,
    /// Shared-storage tree whose contents are mirrored
    pub share_directory: PathBuf,
    /// Top-level names eligible for synchronization
    pub target_directories: Vec<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            share_directory: PathBuf::from(DEFAULT_SHARE_DIRECTORY),
            target_directories: DEFAULT_TARGET_DIRECTORIES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl SyncConfig {
    /// Create a config for the given roots with the default target set
    pub fn new(project_root: impl Into<PathBuf>, share_directory: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            share_directory: share_directory.into(),
            ..Default::default()
        }
    }

    /// Replace the target set, dropping duplicates while keeping order
    pub fn with_targets<I, S>(mut self, targets: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = normalize_targets(targets)?;
        self.target_directories = names;
        Ok(self)
    }

    /// Default config file location
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("sharelink").join("config.json"))
    }

    /// Load config from the default location, falling back to defaults
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| Self::load_from(&path).ok())
            .unwrap_or_default()
    }

    /// Load config from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        // Re-run target validation on whatever the file contained
        let targets = config.target_directories.clone();
        config.with_targets(targets)
    }

    /// Save config to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        match Self::config_path() {
            Some(path) => self.save_to(&path),
            None => Err(Error::Config(
                "no per-user config directory on this system".to_string(),
            )),
        }
    }
}
