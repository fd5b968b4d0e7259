//! Error types and handling for the PII redaction library

use std::{io, result::Result as StdResult};

use thiserror::Error;

/// Custom result type for redaction and anonymization operations
pub type Result<T> = StdResult<T, Error>;

/// Core error type for redaction and anonymization operations
#[derive(Error, Debug)]
#[non_exhaustive]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Document error: {0}")]
    DocumentError(#[from] DocumentError),

    #[error("Overlay error: {0}")]
    OverlayError(#[from] OverlayError),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

// -------------------- Sub-Error Categories --------------------

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DocumentError {
    #[error("Document has no page tree: {0}")]
    MissingPages(String),

    #[error("Invalid page geometry on page {page}: {reason}")]
    InvalidGeometry { page: usize, reason: String },

    #[error("No token source available: {0}")]
    MissingTokens(String),
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum OverlayError {
    #[error("Overlay content encoding failed: {0}")]
    Encoding(String),

    #[error("Page {0} has an unsupported /Contents entry")]
    UnsupportedContents(u32),

    #[error("Page {0} has an unsupported /Resources entry")]
    UnsupportedResources(u32),
}
