//! Fatal input and configuration errors.
//!
//! Per-image download failures are not errors: they are reported as
//! [`crate::fetch::InvalidUrl`] values and never abort a run.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Hash list could not be loaded.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot open hash list {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("hash list line {line}: expected `<id> <hash>`, got {content:?}")]
    Malformed { line: usize, content: String },
    #[error(transparent)]
    Read(#[from] io::Error),
}

/// Annotation table could not be loaded or does not match the hash list.
#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("cannot open annotation table {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("annotation table line {line}: expected 3 tab-separated columns, got {columns}")]
    Malformed { line: usize, columns: usize },
    #[error("image {id} (from {url}) has no entry in the hash list")]
    UnknownIdentifier { id: String, url: String },
    #[error(transparent)]
    Read(#[from] io::Error),
}

/// Invalid values in `config.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("url_template {0:?} has no {{id}} placeholder")]
    MissingPlaceholder(String),
    #[error("url_template {template:?} does not render to a valid URL: {source}")]
    InvalidTemplate {
        template: String,
        #[source]
        source: url::ParseError,
    },
    #[error("min_body_bytes must be at least 1")]
    ZeroMinBody,
}
