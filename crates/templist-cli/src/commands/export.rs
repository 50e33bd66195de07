use std::path::Path;

use anyhow::Result;

use super::Workspace;
use crate::output;

/// Export the title and resolved entries as JSON.
pub fn run(ws: &Workspace, output_path: Option<&Path>) -> Result<()> {
    let catalog = ws.load()?;
    let json = catalog.to_json()?;

    match output_path {
        Some(path) => {
            std::fs::write(path, json + "\n")?;
            output::print_success(&format!(
                "Exported {} template(s) to {}",
                catalog.entries.len(),
                path.display()
            ));
        }
        None => println!("{json}"),
    }
    Ok(())
}
