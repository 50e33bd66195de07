use anyhow::Result;

use templist_core::validate;

use super::Workspace;
use crate::output;

/// Validate the catalog and fail when any error-severity issue is found.
///
/// Checks that every `[label]` an entry uses is defined, that every
/// definition is a valid URL with an allowed scheme, and that no two
/// entries share a name. Linked repositories are not contacted.
pub fn run(ws: &Workspace, json: bool) -> Result<()> {
    let catalog = ws.load()?;
    let report = validate::validate(&catalog, &ws.config.validation);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        output::print_header(&format!("templist check: {}", ws.catalog_path.display()));
        output::print_key_value("Templates", &catalog.entries.len().to_string());
        output::print_key_value("Links", &catalog.links.len().to_string());
        for issue in &report.issues {
            output::print_issue(issue);
        }
    }

    let errors = report.errors().count();
    let warnings = report.warnings().count();
    if errors > 0 {
        anyhow::bail!("{errors} error(s), {warnings} warning(s) in {}", ws.catalog_path.display());
    }
    if !json {
        output::print_success(&format!("Catalog is valid ({warnings} warning(s))"));
    }
    Ok(())
}
