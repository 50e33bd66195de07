//! `templist.config.json` loading and saving.
//!
//! Every field has a default, so a missing `templist.config.json` in the
//! working directory is not an error: commands fall back to
//! [`TemplistConfig::default`]. A config path given explicitly must exist,
//! and a file that exists but does not parse is always reported.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TemplistError};

/// Default name of the catalog document.
pub const DEFAULT_CATALOG: &str = "TEMPLATES.md";

/// Default name of the configuration file.
pub const CONFIG_FILE: &str = "templist.config.json";

/// Settings that affect `check`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// URL schemes accepted in link definitions.
    pub allowed_schemes: Vec<String>,
    /// Report definitions that no entry refers to.
    pub warn_unused: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            allowed_schemes: vec!["http".into(), "https".into()],
            warn_unused: true,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplistConfig {
    /// Catalog path, relative to the config file's directory.
    pub catalog: PathBuf,
    pub validation: ValidationConfig,
    /// Sort entries by name whenever the catalog is written.
    pub sort_on_write: bool,
}

impl Default for TemplistConfig {
    fn default() -> Self {
        Self {
            catalog: PathBuf::from(DEFAULT_CATALOG),
            validation: ValidationConfig::default(),
            sort_on_write: false,
        }
    }
}

impl TemplistConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| TemplistError::ConfigNotFound {
                path: path.to_path_buf(),
                source: e,
            })?;
        serde_json::from_str(&contents).map_err(|e| TemplistError::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load `path` if it exists, otherwise return the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| TemplistError::ConfigWrite {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json + "\n")?;
        Ok(())
    }

    /// Catalog path resolved against the directory holding the config file.
    pub fn catalog_path(&self, config_path: &Path) -> PathBuf {
        if self.catalog.is_absolute() {
            return self.catalog.clone();
        }
        match config_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.join(&self.catalog),
            _ => self.catalog.clone(),
        }
    }
}
