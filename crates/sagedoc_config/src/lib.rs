//! Parsing and validation of `sagedoc.toml` configuration files.
//!
//! Every section is optional. A missing file yields the built-in defaults,
//! which reproduce a stock SageMath + pdflatex + pandoc setup.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, validate_config, CONFIG_FILE};
pub use types::*;
