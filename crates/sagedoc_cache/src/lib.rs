//! Content-addressed artifact cache for generated scripts and rendered images.
//!
//! Artifacts live flat in one directory as `<sha1>.<ext>`. Presence of a file
//! is the only existence check: nothing is ever invalidated, so a script
//! generated on the first run is replayed verbatim on every later run.

#![warn(missing_docs)]

pub mod artifact;
pub mod error;

pub use artifact::{ArtifactKind, ArtifactStore, WriteOutcome};
pub use error::CacheError;
