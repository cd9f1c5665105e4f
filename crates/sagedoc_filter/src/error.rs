//! The filter's error type.

use sagedoc_cache::CacheError;
use sagedoc_engine::EngineError;
use sagedoc_pandoc::PandocError;
use sagedoc_session::SessionError;

/// Anything that can go wrong while computing a node.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    /// A cache artifact could not be written.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// An external tool failed, timed out, or was cancelled.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Session state could not be reset, restored, or captured.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The document itself is malformed.
    #[error(transparent)]
    Pandoc(#[from] PandocError),
}

impl FilterError {
    /// Errors that stop the run even under the best-effort policy.
    ///
    /// A malformed document cannot be walked further, and a cancelled run
    /// has been asked to stop.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            FilterError::Pandoc(_) | FilterError::Engine(EngineError::Cancelled { .. })
        )
    }
}
