use anyhow::Result;

use templist_core::templates::renderer;
use templist_core::{parser, TemplistError};

use super::Workspace;
use crate::output;

/// Rewrite the catalog in canonical form, or with `check` only report
/// whether it already is.
pub fn run(ws: &Workspace, check: bool, sort: bool) -> Result<()> {
    let source = std::fs::read_to_string(&ws.catalog_path).map_err(|e| {
        TemplistError::CatalogNotFound {
            path: ws.catalog_path.clone(),
            source: e,
        }
    })?;
    let mut catalog = parser::parse(&source);
    if sort || ws.config.sort_on_write {
        catalog.sort();
    }
    let formatted = renderer::render_catalog(&catalog)?;

    if formatted == source {
        output::print_success(&format!("{} is formatted", ws.catalog_path.display()));
        return Ok(());
    }

    if check {
        output::print_error(&format!("{} is not formatted", ws.catalog_path.display()));
        anyhow::bail!("run `templist fmt` to rewrite {}", ws.catalog_path.display());
    }

    std::fs::write(&ws.catalog_path, formatted)?;
    output::print_success(&format!("Formatted {}", ws.catalog_path.display()));
    Ok(())
}
