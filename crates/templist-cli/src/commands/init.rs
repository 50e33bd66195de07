use std::path::Path;

use anyhow::Result;

use templist_core::project;

use crate::output;

/// Write a seed `TEMPLATES.md` and a default `templist.config.json` into `dir`.
pub fn run(dir: &Path, force: bool) -> Result<()> {
    output::print_header(&format!("templist init: {}", dir.display()));

    let (catalog_path, config_path) = project::init_project(dir, force)?;

    output::print_success("Catalog created");
    output::print_key_value("Catalog", &catalog_path.display().to_string());
    output::print_key_value("Config", &config_path.display().to_string());
    println!();
    println!("  Next steps:");
    println!("    templist add <name> --url <repository>");
    println!("    templist check");
    println!();

    Ok(())
}
