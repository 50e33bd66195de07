use anyhow::{Context, Result};
use dialoguer::Input;

use templist_core::validate::check_url;
use templist_core::TemplateEntry;

use super::Workspace;
use crate::output;

/// Fields for a new entry; anything left `None` is prompted for.
pub struct AddArgs {
    pub name: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub url: Option<String>,
    pub author_url: Option<String>,
}

/// Add a template entry and its link definitions, then write the catalog back.
///
/// When the author is already defined in the catalog, `--author-url` may be
/// omitted and the existing definition is reused.
pub fn run(ws: &Workspace, args: AddArgs) -> Result<()> {
    let mut catalog = ws.load()?;

    let name = field(args.name, "Template name")?;
    let description = field(args.description, "Description")?;
    let author = field(args.author, "Author")?;
    let url = field(args.url, "Repository URL")?;
    let author_url = match args.author_url {
        Some(url) => url.trim().to_string(),
        None => match catalog.link(&author) {
            Some(existing) => existing.url.clone(),
            None => field(None, "Author URL")?,
        },
    };

    let schemes = &ws.config.validation.allowed_schemes;
    for (label, value) in [(&name, &url), (&author, &author_url)] {
        check_url(value, schemes)
            .map_err(|reason| anyhow::anyhow!("invalid URL for [{label}]: {reason}"))?;
    }

    catalog.add(
        TemplateEntry::new(name.as_str(), description.as_str(), author.as_str()),
        &url,
        &author_url,
    )?;
    ws.save(&mut catalog)?;

    output::print_success(&format!("Added [{name}] to {}", ws.catalog_path.display()));
    output::print_key_value("Repository", &url);
    output::print_key_value("Author", &format!("{author} ({author_url})"));
    Ok(())
}

/// Use `value` if given, otherwise prompt (only when a user is at the terminal).
fn field(value: Option<String>, prompt: &str) -> Result<String> {
    if let Some(value) = value {
        return Ok(value.trim().to_string());
    }
    if !console::user_attended() {
        anyhow::bail!("missing {}; pass it as an argument", prompt.to_lowercase());
    }
    let value = Input::<String>::new()
        .with_prompt(prompt)
        .interact_text()
        .with_context(|| format!("failed to read {}", prompt.to_lowercase()))?;
    Ok(value.trim().to_string())
}
