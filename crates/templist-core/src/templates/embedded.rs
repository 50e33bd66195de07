//! Compile-time embedded documents.
//!
//! Paths are relative to this source file
//! (`crates/templist-core/src/templates/embedded.rs`). Moving a file under
//! `templates/` without updating the path here breaks the build.

/// Seed catalog written by `templist init`.
pub const DEFAULT_CATALOG: &str = include_str!("../../../../templates/catalog/TEMPLATES.md");

/// Handlebars layout of a catalog document.
pub const CATALOG_LAYOUT: &str = include_str!("../../../../templates/catalog/catalog.md.hbs");
