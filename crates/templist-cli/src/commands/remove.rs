use anyhow::Result;

use super::Workspace;
use crate::output;

/// Remove a template and the link definitions no other entry needs.
pub fn run(ws: &Workspace, name: &str) -> Result<()> {
    let mut catalog = ws.load()?;
    let removed = catalog.remove(name)?;
    ws.save(&mut catalog)?;

    output::print_success(&format!(
        "Removed [{}] from {}",
        removed.name,
        ws.catalog_path.display()
    ));
    Ok(())
}
