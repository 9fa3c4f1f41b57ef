//! Error type shared by the extractor, store and matcher

use std::path::PathBuf;

/// Errors surfaced by the core
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed arguments: zero sample rate, empty query, unusable id
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No fingerprints available at the requested location
    #[error("not found: {0}")]
    NotFound(String),

    /// A persisted record could not be decoded
    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Record encoding or writing failed
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
