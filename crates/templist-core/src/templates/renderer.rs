//! Handlebars-based renderer for catalog documents.
//!
//! Wraps [`handlebars::Handlebars`] with **strict mode** on and HTML escaping
//! off. Strict mode turns a layout variable missing from the view into an
//! error instead of an empty string. Escaping is off because the output is
//! markdown: `<url>` and `&` must come through unchanged.
//!
//! ## Usage
//!
//! ```ignore
//! use templist_core::templates::renderer::{format, render_catalog};
//!
//! let canonical = format(&std::fs::read_to_string("TEMPLATES.md")?)?;
//! ```

use handlebars::Handlebars;
use serde::Serialize;
use serde_json::Value;

use crate::catalog::{Catalog, LinkDefinition, TemplateEntry};
use crate::error::{Result, TemplistError};
use crate::parser;
use crate::templates::embedded;

const CATALOG: &str = "catalog";

/// Template renderer for markdown output.
pub struct TemplateRenderer {
    hbs: Handlebars<'static>,
}

impl TemplateRenderer {
    /// Create a renderer with strict mode on and the catalog layout registered.
    pub fn new() -> Result<Self> {
        let mut hbs = Handlebars::new();
        hbs.set_strict_mode(true);
        hbs.register_escape_fn(handlebars::no_escape);
        hbs.register_template_string(CATALOG, embedded::CATALOG_LAYOUT)
            .map_err(|e| TemplistError::TemplateRender(e.to_string()))?;
        Ok(Self { hbs })
    }

    /// Render an ad hoc template string with the given data context.
    pub fn render(&self, template: &str, data: &Value) -> Result<String> {
        self.hbs
            .render_template(template, data)
            .map_err(|e| TemplistError::TemplateRender(e.to_string()))
    }

    pub fn render_catalog(&self, catalog: &Catalog) -> Result<String> {
        let body = body(catalog);
        let view = CatalogView {
            title: &catalog.title,
            preamble: &catalog.preamble,
            links_gap: !catalog.links.is_empty() && body.last().is_some_and(|i| i.block.is_none()),
            body,
            links: catalog.canonical_links(),
        };
        self.hbs
            .render(CATALOG, &view)
            .map_err(|e| TemplistError::TemplateRender(e.to_string()))
    }
}

#[derive(Serialize)]
struct CatalogView<'a> {
    title: &'a str,
    preamble: &'a [String],
    body: Vec<BodyItem<'a>>,
    links_gap: bool,
    links: Vec<&'a LinkDefinition>,
}

/// One line or block of the list. Exactly one of the options is set; all
/// three are always serialized so strict mode sees them.
#[derive(Serialize, Default)]
struct BodyItem<'a> {
    entry: Option<&'a TemplateEntry>,
    raw: Option<&'a str>,
    block: Option<&'a str>,
    gap: bool,
}

/// Entries with notes and malformed items put back where they were found.
fn body(catalog: &Catalog) -> Vec<BodyItem<'_>> {
    let len = catalog.entries.len();
    let mut anchored: Vec<(usize, usize, BodyItem<'_>)> = catalog
        .notes
        .iter()
        .map(|n| {
            let item = BodyItem {
                block: Some(n.text.as_str()),
                ..BodyItem::default()
            };
            (n.after.min(len), n.line, item)
        })
        .chain(catalog.malformed.iter().map(|m| {
            let item = BodyItem {
                raw: Some(m.text.as_str()),
                ..BodyItem::default()
            };
            (m.after.min(len), m.line, item)
        }))
        .collect();
    anchored.sort_by_key(|(after, line, _)| (*after, *line));

    let mut anchored = anchored.into_iter().peekable();
    let mut items = Vec::with_capacity(len + anchored.len());
    for index in 0..=len {
        while let Some((_, _, item)) = anchored.next_if(|(after, _, _)| *after == index) {
            items.push(item);
        }
        if let Some(entry) = catalog.entries.get(index) {
            items.push(BodyItem {
                entry: Some(entry),
                ..BodyItem::default()
            });
        }
    }

    // A block right after a list line needs a blank line, or markdown would
    // read it as a continuation of the item.
    let mut after_list_line = false;
    for item in &mut items {
        if item.block.is_some() {
            item.gap = after_list_line;
            after_list_line = false;
        } else {
            after_list_line = true;
        }
    }
    items
}

/// Render a catalog in canonical form.
pub fn render_catalog(catalog: &Catalog) -> Result<String> {
    TemplateRenderer::new()?.render_catalog(catalog)
}

/// Parse `source` and render it back in canonical form.
pub fn format(source: &str) -> Result<String> {
    render_catalog(&parser::parse(source))
}
