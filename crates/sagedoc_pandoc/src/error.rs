//! Error types for reading and writing pandoc JSON.

/// Errors raised while decoding or encoding a pandoc document.
#[derive(Debug, thiserror::Error)]
pub enum PandocError {
    /// The input is not valid JSON, or the output could not be written.
    #[error("invalid pandoc JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A node has the right tag but the wrong shape.
    #[error("malformed {node} node: {reason}")]
    Malformed {
        /// The node tag, e.g. `CodeBlock`.
        node: String,
        /// What was wrong with it.
        reason: String,
    },
}
