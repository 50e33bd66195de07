//! CLI command implementations for templist.
//!
//! Each module corresponds to a subcommand (`templist <command>`).

pub mod add;
pub mod check;
pub mod export;
pub mod fmt;
pub mod init;
pub mod list;
pub mod remove;
pub mod show;

use std::path::{Path, PathBuf};

use anyhow::Result;

use templist_core::config::{TemplistConfig, CONFIG_FILE};
use templist_core::{parser, project, Catalog};

/// Resolved config and catalog location shared by every command but `init`.
pub struct Workspace {
    pub config: TemplistConfig,
    pub catalog_path: PathBuf,
}

impl Workspace {
    /// Resolve the config and catalog. An explicit `config_path` must exist;
    /// without one, `./templist.config.json` is used if present.
    pub fn open(config_path: Option<&Path>, catalog_override: Option<&Path>) -> Result<Self> {
        let (config, config_path) = match config_path {
            Some(path) => (TemplistConfig::load(path)?, path),
            None => {
                let path = Path::new(CONFIG_FILE);
                (TemplistConfig::load_or_default(path)?, path)
            }
        };
        let catalog_path = match catalog_override {
            Some(path) => path.to_path_buf(),
            None => config.catalog_path(config_path),
        };
        tracing::debug!(catalog = %catalog_path.display(), "opened workspace");
        Ok(Self {
            config,
            catalog_path,
        })
    }

    pub fn load(&self) -> Result<Catalog> {
        Ok(parser::load(&self.catalog_path)?)
    }

    pub fn save(&self, catalog: &mut Catalog) -> Result<()> {
        project::write_catalog(&self.catalog_path, catalog, &self.config)?;
        Ok(())
    }
}
