//! Core library for templist.
//!
//! A template catalog is a markdown document listing project templates for
//! cargo-generate, one `* [name]: description, [author]` item per template,
//! with link-reference definitions giving each name and author a URL.
//!
//! This crate provides the [`catalog::Catalog`] model, the [`parser`] that
//! reads the document, the [`validate`] checks (every reference defined,
//! every URL valid, every name unique), the canonical [`templates::renderer`],
//! and [`config`] loading. Linked repositories are never fetched.

pub mod catalog;
pub mod config;
pub mod error;
pub mod parser;
pub mod project;
pub mod templates;
pub mod validate;

pub use catalog::{Catalog, LinkDefinition, LinkReference, Note, ResolvedTemplate, TemplateEntry};
pub use error::{Result, TemplistError};
