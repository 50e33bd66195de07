//! Embedded documents and the catalog renderer.
//!
//! Files under the workspace `templates/` directory are compiled into the
//! binary via [`include_str!`] in the [`embedded`] module and rendered at
//! runtime with [Handlebars](https://handlebarsjs.com/) via
//! [`renderer::TemplateRenderer`].
//!
//! ## Layout variables
//!
//! `catalog.md.hbs` receives:
//! - `{{title}}`: heading text
//! - `{{preamble}}`: verbatim blocks before the list
//! - `{{body}}`: the list in source order; each item has one of `entry`
//!   (`name`, `description`, `author`), `raw` (a malformed item) or `block`
//!   (a verbatim note), plus `gap` when a blank line must open the block
//! - `{{links_gap}}`: whether a blank line must precede the definitions
//! - `{{links}}`: `label`, `url` per definition, in canonical order
//!
//! **Warning**: the layout and [`renderer::render_catalog`] must stay in sync.
//! The formatter relies on `parse(render(c))` describing the same catalog as `c`.

pub mod embedded;
pub mod renderer;
