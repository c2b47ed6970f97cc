//! Error types for artifact file operations.

use std::path::PathBuf;

/// Errors raised by a [`FileLayer`](crate::FileLayer).
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    /// An I/O error occurred while reading, writing or deleting an artifact.
    #[error("artifact I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
