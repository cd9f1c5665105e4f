//! Error types for cache operations.

use std::path::PathBuf;

/// Errors that can occur while writing cache artifacts.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while creating the cache directory or writing a file.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A write was requested with no content. The target is left untouched.
    #[error("refusing to write 0 bytes to {path}")]
    EmptyArtifact {
        /// The artifact that would have been written.
        path: PathBuf,
    },
}
