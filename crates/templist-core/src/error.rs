//! Unified error types for templist.

use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur while loading, editing, or writing a catalog.
#[derive(Error, Debug)]
pub enum TemplistError {
    // --- Catalog ---

    /// The catalog document (usually `TEMPLATES.md`) could not be read.
    #[error("catalog not found at {path}")]
    CatalogNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `init` was asked to write a catalog over an existing file.
    #[error("catalog already exists: {0} (use --force to overwrite)")]
    CatalogExists(PathBuf),

    /// No entry with this name exists in the catalog.
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// An entry with this name is already listed.
    #[error("template already listed: {0}")]
    DuplicateTemplate(String),

    /// A link label is already defined with a different destination.
    #[error("link [{label}] already points to {existing}, refusing to redefine it as {requested}")]
    ConflictingLink {
        label: String,
        existing: String,
        requested: String,
    },

    /// A URL supplied for a new entry is not usable.
    #[error("invalid URL for [{label}]: {reason}")]
    InvalidUrl { label: String, reason: String },

    /// A field of a new entry cannot be written as `* [name]: description, [author]`.
    #[error("invalid template {field} `{value}`: {reason}")]
    InvalidEntry {
        field: &'static str,
        value: String,
        reason: String,
    },

    // --- Configuration ---

    /// The configuration file could not be read. Only reported when the file
    /// was asked for explicitly; a missing default config means defaults.
    #[error("config file not found at {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file exists but contains invalid JSON.
    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The configuration could not be serialized for writing.
    #[error("failed to write config to {path}")]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // --- Rendering ---

    /// Handlebars rendering of the catalog layout failed.
    #[error("template rendering failed: {0}")]
    TemplateRender(String),

    // --- General ---

    /// A filesystem I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A catch-all for errors from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Alias for `Result<T, TemplistError>`.
pub type Result<T> = std::result::Result<T, TemplistError>;
