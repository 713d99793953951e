//! Error types for render requests

use thiserror::Error;

/// Result type alias for render operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving, rendering or delivering a document
#[derive(Error, Debug)]
pub enum Error {
    /// No template is registered under the given name
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// The template engine failed to produce HTML
    #[error("Template rendering failed: {0}")]
    Template(String),

    /// Failed to fetch URL-valued content
    #[error("Failed to fetch URL: {0}")]
    Fetch(String),

    /// The renderer failed to produce output
    #[error("Rendering failed: {0}")]
    Render(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A storage backend refused or failed a write
    #[error("Storage error: {0}")]
    Storage(String),

    /// Underlying I/O failure
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

