//! Shared foundational types used across the sagedoc filter.
//!
//! Currently this is the content hash that names every cached artifact.

#![warn(missing_docs)]

pub mod hash;

pub use hash::ContentHash;
