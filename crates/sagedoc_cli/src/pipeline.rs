//! Reads the document, runs the filter, writes the document.

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};
use sagedoc_config::{
    load_config, load_config_file, validate_config, ConfigError, FailurePolicy, FilterConfig,
};
use sagedoc_filter::Filter;
use sagedoc_pandoc::Document;

use crate::Cli;

/// Filters stdin to stdout.
///
/// Returns exit code 0 once a document has been written. Under the abort
/// policy the first failure is returned as an error and nothing is written.
pub fn run(cli: &Cli) -> Result<i32, Box<dyn std::error::Error>> {
    let config = resolve_config(cli)?;
    if let Some(format) = &cli.format {
        info!("filtering for {format}");
    }

    let mut document = Document::from_reader(io::stdin().lock())?;
    let mut filter = Filter::from_config(&config)?;
    filter.run(&mut document)?;

    let report = filter.into_report();
    if report.has_failures() {
        warn!("{}", report.summary());
    } else {
        info!("{}", report.summary());
    }

    let mut out = BufWriter::new(io::stdout().lock());
    document.to_writer(&mut out)?;
    out.flush()?;
    Ok(0)
}

/// Loads the configuration file (explicit, or `sagedoc.toml` in the working
/// directory if present) and applies command-line overrides on top.
pub fn resolve_config(cli: &Cli) -> Result<FilterConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config_file(Path::new(path))?,
        None => load_config(Path::new("."))?,
    };
    apply_overrides(&mut config, cli);
    validate_config(&config)?;
    Ok(config)
}

fn apply_overrides(config: &mut FilterConfig, cli: &Cli) {
    if let Some(engine) = &cli.engine {
        config.engine.program = engine.clone();
    }
    if let Some(secs) = cli.timeout {
        config.engine.timeout_secs = Some(secs);
    }
    if let Some(dir) = &cli.cache_dir {
        config.cache.dir = PathBuf::from(dir);
    }
    if cli.abort_on_error {
        config.filter.on_error = FailurePolicy::Abort;
    }
}
