//! Error types for session-state handling.

use std::path::PathBuf;

/// Errors raised while resetting, restoring, or capturing session state.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The state file could not be read, written, or removed.
    #[error("session state I/O error at {path}: {source}")]
    Io {
        /// The state file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
