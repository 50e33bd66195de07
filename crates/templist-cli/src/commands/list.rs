use anyhow::Result;

use super::Workspace;
use crate::output;

/// List templates, optionally filtered by a case-insensitive search.
pub fn run(ws: &Workspace, filter: Option<&str>, json: bool) -> Result<()> {
    let catalog = ws.load()?;
    let matches = catalog.search(filter.unwrap_or_default());

    if json {
        let resolved: Vec<_> = matches.iter().map(|e| catalog.resolve(e)).collect();
        println!("{}", serde_json::to_string_pretty(&resolved)?);
        return Ok(());
    }

    let title = if catalog.title.is_empty() {
        "templist list"
    } else {
        catalog.title.as_str()
    };
    output::print_header(title);
    if matches.is_empty() {
        output::print_warning("No templates match");
        return Ok(());
    }
    for entry in &matches {
        output::print_entry(&entry.name, &entry.author, &entry.description);
    }
    println!();
    println!("  {} of {} template(s)", matches.len(), catalog.entries.len());
    Ok(())
}
