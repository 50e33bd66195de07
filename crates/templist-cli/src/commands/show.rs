use anyhow::Result;

use templist_core::templates::renderer::TemplateRenderer;
use templist_core::TemplistError;

use super::Workspace;
use crate::output;

const GENERATE_HINT: &str = "cargo generate --git {{url}}";

/// Show one template with both of its links resolved.
pub fn run(ws: &Workspace, name: &str) -> Result<()> {
    let catalog = ws.load()?;
    let entry = catalog
        .find(name)
        .ok_or_else(|| TemplistError::TemplateNotFound(name.to_string()))?;
    let resolved = catalog.resolve(entry);

    output::print_header(&format!("Template: {}", resolved.name));
    output::print_key_value("Description", &resolved.description);
    output::print_key_value("Author", &resolved.author);
    output::print_key_value("Line", &entry.line.to_string());

    match &resolved.url {
        Some(url) => output::print_key_value("Repository", url),
        None => output::print_error(&format!("[{}] is not defined", resolved.name)),
    }
    match &resolved.author_url {
        Some(url) => output::print_key_value("Author profile", url),
        None => output::print_error(&format!("[{}] is not defined", resolved.author)),
    }

    if let Some(url) = &resolved.url {
        let hint = TemplateRenderer::new()?.render(GENERATE_HINT, &serde_json::json!({ "url": url }))?;
        println!();
        println!("  Use it:");
        println!("    {hint}");
    }
    println!();
    Ok(())
}
