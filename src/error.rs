//! Error types for the about-libraries core.
//!
//! Most failures in a resolution pass never reach callers: builders and the
//! detection cache log them and fall back to `None`, empty lists or a cache
//! miss. `LibsError` surfaces only from the explicit loading and export
//! entry points, and internally between providers and the builder.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LibsError {
    /// The resource provider could not answer a lookup.
    #[error("Failed to read resource '{key}': {reason}")]
    Resource { key: String, reason: String },

    /// A resource bundle was not a flat JSON object of strings.
    #[error("Malformed resource bundle: {0}")]
    MalformedBundle(String),

    #[error("Cache I/O failed for {path:?}")]
    CacheIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No platform cache directory could be derived from the environment.
    #[error("Cannot locate cache directory: {var} environment variable not set")]
    NoCacheDir { var: &'static str },

    #[error("JSON (de)serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid options: {0}")]
    Options(String),

    #[error("Export failed for {path:?}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, LibsError>;
