//! Catalog file creation and write-back.
//!
//! `init` lays out a directory like this:
//! ```text
//! <dir>/
//! ├── TEMPLATES.md            # seed catalog
//! └── templist.config.json    # TemplistConfig
//! ```
//!
//! Commands that edit the catalog write it back through [`write_catalog`] so
//! the file always ends up in canonical form.

use std::path::{Path, PathBuf};

use crate::catalog::Catalog;
use crate::config::{TemplistConfig, CONFIG_FILE};
use crate::error::{Result, TemplistError};
use crate::templates::{embedded, renderer};

/// Write the seed catalog and a default config into `dir`.
///
/// Returns the catalog and config paths. Existing files are only replaced
/// when `force` is set.
pub fn init_project(dir: &Path, force: bool) -> Result<(PathBuf, PathBuf)> {
    let config = TemplistConfig::default();
    let config_path = dir.join(CONFIG_FILE);
    let catalog_path = dir.join(&config.catalog);

    if !force {
        for path in [&catalog_path, &config_path] {
            if path.exists() {
                return Err(TemplistError::CatalogExists(path.clone()));
            }
        }
    }

    std::fs::create_dir_all(dir)?;
    let seed = renderer::format(embedded::DEFAULT_CATALOG)?;
    std::fs::write(&catalog_path, seed)?;
    config.save(&config_path)?;

    tracing::info!(catalog = %catalog_path.display(), "initialized catalog");
    Ok((catalog_path, config_path))
}

/// Render `catalog` canonically (sorted if configured) and write it to `path`.
pub fn write_catalog(path: &Path, catalog: &mut Catalog, config: &TemplistConfig) -> Result<()> {
    if config.sort_on_write {
        catalog.sort();
    }
    let rendered = renderer::render_catalog(catalog)?;
    std::fs::write(path, rendered)?;
    tracing::debug!(path = %path.display(), entries = catalog.entries.len(), "wrote catalog");
    Ok(())
}
