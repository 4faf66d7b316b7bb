//! Configuration Management
//!
//! Handles persistent configuration storage for sinkscout.

use crate::emit::DEFAULT_FALLBACK_LOCATION;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File the interactive mode offers to write the tfvars snippet to
pub const DEFAULT_TFVARS_PATH: &str = "client_tfvars_suggestion.tfvars";

/// User configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Last used organization ID
    #[serde(default)]
    pub org_id: Option<String>,
    /// Dataset location assumed when metadata cannot be read
    #[serde(default)]
    pub fallback_location: Option<String>,
    /// Where generated tfvars snippets are saved
    #[serde(default)]
    pub tfvars_path: Option<PathBuf>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("sinkscout").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from a specific file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {}: {}", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                tracing::warn!("Could not read config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(())
    }

    /// Get effective organization (CLI > config)
    pub fn effective_org_id(&self, cli: Option<&str>) -> Option<String> {
        cli.map(String::from).or_else(|| self.org_id.clone())
    }

    /// Get effective fallback location (CLI > config > built-in default)
    pub fn effective_fallback_location(&self, cli: Option<&str>) -> String {
        cli.map(String::from)
            .or_else(|| self.fallback_location.clone())
            .unwrap_or_else(|| DEFAULT_FALLBACK_LOCATION.to_string())
    }

    /// Get effective tfvars output path (config > built-in default)
    pub fn effective_tfvars_path(&self) -> PathBuf {
        self.tfvars_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TFVARS_PATH))
    }
}
