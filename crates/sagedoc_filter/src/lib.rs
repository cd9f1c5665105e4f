//! The sagedoc pandoc filter.
//!
//! [`Filter`] walks a pandoc document in order and rewrites the nodes that
//! ask for computation:
//!
//! - code blocks classed `sagesilent`, `sageblock`, `sageplot` or `latex`
//!   are routed by the block dispatcher ([`BlockRole`]),
//! - `\sage{...}` directives inside math and raw inline spans are replaced
//!   by the engine's output ([`inline`]).
//!
//! Every execution goes through the content-addressed script cache and the
//! session envelope, so blocks share bindings in document order.

#![warn(missing_docs)]

pub mod dispatch;
pub mod error;
pub mod filter;
pub mod inline;
pub mod plot;
pub mod report;
pub mod unit;

#[cfg(test)]
mod testing;

pub use dispatch::BlockRole;
pub use error::FilterError;
pub use filter::Filter;
pub use plot::{PlotBlock, PlotDirective};
pub use report::{Diagnostic, Report};
pub use unit::{ComputationUnit, UnitKind};
