//! External process invocation for the computation engine and its helpers.
//!
//! Every subprocess runs as a task on a single-threaded tokio runtime so that
//! it can be bounded by a timeout and cancelled through a shared
//! [`CancellationToken`](tokio_util::sync::CancellationToken). Calls still
//! block the caller until the child exits: units must run one at a time, in
//! document order, for session state to thread correctly.
//!
//! [`Toolchain`] bundles the three external tools the filter needs behind
//! the [`ExternalTools`] trait: the engine, the TeX-to-SVG typesetter, and
//! the markup converter that turns engine output back into document blocks.

#![warn(missing_docs)]

pub mod error;
pub mod runner;
pub mod toolchain;

pub use error::EngineError;
pub use runner::{ExecutionResult, Invocation, ProcessRunner};
pub use toolchain::{ExternalTools, Toolchain};
