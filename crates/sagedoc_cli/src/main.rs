//! sagedoc: a pandoc filter that evaluates SageMath code in documents.
//!
//! Pandoc runs the filter as `sagedoc <FORMAT>`, feeding the document as
//! JSON on stdin and reading the rewritten document from stdout. Logging
//! goes to stderr.

#![warn(missing_docs)]

mod pipeline;

use std::process;

use clap::Parser;

/// Evaluate `sagesilent`, `sageblock`, `sageplot` and `latex` code blocks and
/// inline `\sage{...}` directives in a pandoc JSON document.
#[derive(Parser, Debug)]
#[command(name = "sagedoc", version, about = "Pandoc filter for SageMath")]
pub struct Cli {
    /// Output format pandoc is producing (supplied by pandoc).
    pub format: Option<String>,

    /// Only log errors.
    #[arg(short, long)]
    pub quiet: bool,

    /// Log every unit as it runs.
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to a `sagedoc.toml` configuration file.
    #[arg(long)]
    pub config: Option<String>,

    /// Per-invocation engine time limit in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Stop at the first failing node instead of degrading it.
    #[arg(long)]
    pub abort_on_error: bool,

    /// Directory holding cached scripts and images.
    #[arg(long)]
    pub cache_dir: Option<String>,

    /// Engine binary to run scripts with.
    #[arg(long)]
    pub engine: Option<String>,
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        log::LevelFilter::Error
    } else if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    match pipeline::run(&cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
