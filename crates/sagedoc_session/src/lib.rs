//! Session threading across independent engine processes.
//!
//! Each computation unit runs in a fresh engine process. To make a sequence
//! of blocks behave like one interactive session, every script is wrapped in
//! an [`Envelope`] that loads the saved state, runs the unit, and saves the
//! state again. Block N's save is block N+1's load, so units must execute
//! strictly in document order.
//!
//! [`SessionContext`] owns the state for one filter run and delegates where
//! that state lives between runs to a [`StatePersistence`] strategy.

#![warn(missing_docs)]

pub mod context;
pub mod envelope;
pub mod error;
pub mod persistence;

pub use context::SessionContext;
pub use envelope::Envelope;
pub use error::SessionError;
pub use persistence::{FileState, MemoryState, StatePersistence};
