//! Minimal typed view of the pandoc JSON AST.
//!
//! The filter only rewrites three node types (`CodeBlock`, `Math` and
//! `RawInline`) and only builds a handful more (`Plain`, `Para`, `Image`).
//! Everything else stays as untyped JSON and passes through unchanged, which
//! keeps the filter independent of the pandoc API version.

#![warn(missing_docs)]

pub mod document;
pub mod error;
pub mod node;
pub mod walk;

pub use document::Document;
pub use error::PandocError;
pub use node::{Attr, CodeBlock, InlineText, MathType};
pub use walk::{BlockAction, Visitor};
