//! The external tools the filter drives, and their invocation conventions.

use std::path::{Path, PathBuf};

use log::{debug, info};
use sagedoc_config::FilterConfig;
use serde_json::Value;

use crate::error::EngineError;
use crate::runner::{ExecutionResult, Invocation, ProcessRunner};

/// Operations the filter needs from the outside world.
///
/// [`Toolchain`] implements this with real subprocesses; tests substitute
/// recording fakes.
pub trait ExternalTools {
    /// Runs `<engine> <script>` in `work_dir` and returns its output.
    ///
    /// A non-zero exit is an [`EngineError::EngineFailure`].
    fn run_script(&self, script: &Path, work_dir: &Path) -> Result<ExecutionResult, EngineError>;

    /// Compiles `tex` to PDF next to it and converts the PDF to SVG.
    ///
    /// Returns the SVG path by convention (same stem) without checking the
    /// converter wrote it.
    fn typeset(&self, tex: &Path) -> Result<PathBuf, EngineError>;

    /// Parses `markup` into pandoc JSON blocks.
    fn convert(&self, markup: &str) -> Result<Vec<Value>, EngineError>;
}

/// Real subprocess-backed implementation of [`ExternalTools`].
#[derive(Debug)]
pub struct Toolchain {
    runner: ProcessRunner,
    engine: String,
    compiler: String,
    converter: String,
    pandoc: String,
    markup_format: String,
}

impl Toolchain {
    /// Builds a toolchain from configuration around an existing runner.
    pub fn new(config: &FilterConfig, runner: ProcessRunner) -> Self {
        Self {
            runner,
            engine: config.engine.program.clone(),
            compiler: config.typeset.compiler.clone(),
            converter: config.typeset.converter.clone(),
            pandoc: config.convert.program.clone(),
            markup_format: config.convert.from.clone(),
        }
    }

    /// Builds a toolchain with a fresh runner using the configured timeout.
    pub fn from_config(config: &FilterConfig) -> Result<Self, EngineError> {
        let runner = ProcessRunner::new()?.with_timeout(config.engine.timeout());
        Ok(Self::new(config, runner))
    }

    /// The runner shared by all tools.
    pub fn runner(&self) -> &ProcessRunner {
        &self.runner
    }

    fn typeset_step(&self, invocation: Invocation) -> Result<(), EngineError> {
        let result = self.runner.run(&invocation)?;
        if result.success() {
            return Ok(());
        }
        // TeX reports errors on stdout.
        let output = if result.stderr.trim().is_empty() {
            result.stdout
        } else {
            result.stderr
        };
        Err(EngineError::TypesetFailure {
            program: invocation.program,
            code: result.code,
            output,
        })
    }
}

impl ExternalTools for Toolchain {
    fn run_script(&self, script: &Path, work_dir: &Path) -> Result<ExecutionResult, EngineError> {
        // The child runs in work_dir, so a relative script path would no longer resolve.
        let script = std::path::absolute(script).map_err(|e| EngineError::Io {
            program: self.engine.clone(),
            source: e,
        })?;
        let invocation = Invocation::new(&self.engine)
            .arg(script.as_os_str())
            .current_dir(work_dir);
        let result = self.runner.run(&invocation)?;
        if !result.success() {
            return Err(EngineError::EngineFailure {
                program: self.engine.clone(),
                code: result.code,
                stderr: result.stderr,
            });
        }
        debug!("{} produced {} bytes", script.display(), result.stdout.len());
        Ok(result)
    }

    fn typeset(&self, tex: &Path) -> Result<PathBuf, EngineError> {
        let out_dir = match tex.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        self.typeset_step(
            Invocation::new(&self.compiler)
                .arg("-output-directory")
                .arg(out_dir.as_os_str())
                .arg(tex.as_os_str()),
        )?;

        let pdf = tex.with_extension("pdf");
        let svg = tex.with_extension("svg");
        self.typeset_step(
            Invocation::new(&self.converter)
                .arg("-svg")
                .arg(pdf.as_os_str())
                .arg(svg.as_os_str()),
        )?;
        info!("rendered {}", svg.display());
        Ok(svg)
    }

    fn convert(&self, markup: &str) -> Result<Vec<Value>, EngineError> {
        let invocation = Invocation::new(&self.pandoc)
            .arg("--from")
            .arg(&self.markup_format)
            .arg("--to")
            .arg("json")
            .stdin(markup.as_bytes());
        let result = self.runner.run(&invocation)?;
        if !result.success() {
            return Err(EngineError::EngineFailure {
                program: self.pandoc.clone(),
                code: result.code,
                stderr: result.stderr,
            });
        }
        parse_blocks(&self.pandoc, &result.stdout)
    }
}

/// Extracts the top-level `blocks` array from a pandoc JSON document.
fn parse_blocks(program: &str, json: &str) -> Result<Vec<Value>, EngineError> {
    let malformed = |reason: String| EngineError::Malformed {
        program: program.to_string(),
        reason,
    };
    let document: Value = serde_json::from_str(json).map_err(|e| malformed(e.to_string()))?;
    match document.get("blocks") {
        Some(Value::Array(blocks)) => Ok(blocks.clone()),
        _ => Err(malformed("document has no `blocks` array".to_string())),
    }
}
