//! Per-run record of executions and degraded nodes.

use std::fmt;

use sagedoc_common::ContentHash;

use crate::error::FilterError;
use crate::unit::{ComputationUnit, UnitKind};

/// A unit that failed and was degraded under the best-effort policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// What kind of node failed.
    pub kind: UnitKind,
    /// Cache key of the failing unit's source.
    pub key: ContentHash,
    /// First line of the failing source.
    pub excerpt: String,
    /// The error message.
    pub message: String,
}

impl Diagnostic {
    /// Records `error` against `unit`.
    pub fn new(unit: &ComputationUnit, error: &FilterError) -> Self {
        Self {
            kind: unit.kind(),
            key: unit.hash(),
            excerpt: unit.excerpt(),
            message: error.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} `{}`: {}", self.kind, self.excerpt, self.message)
    }
}

/// Accumulates what happened during one filter run.
#[derive(Debug, Default)]
pub struct Report {
    diagnostics: Vec<Diagnostic>,
    executions: usize,
    unresolved: usize,
}

impl Report {
    /// Creates an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a degraded unit.
    pub fn record(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Counts one engine execution.
    pub fn note_execution(&mut self) {
        self.executions += 1;
    }

    /// Counts inline directives left as written.
    pub fn note_unresolved(&mut self, count: usize) {
        self.unresolved += count;
    }

    /// Returns `true` if any unit was degraded.
    pub fn has_failures(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Number of degraded units.
    pub fn failure_count(&self) -> usize {
        self.diagnostics.len()
    }

    /// Number of engine executions started.
    pub fn executions(&self) -> usize {
        self.executions
    }

    /// Number of inline directives left unresolved.
    pub fn unresolved(&self) -> usize {
        self.unresolved
    }

    /// The recorded diagnostics in the order they occurred.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Takes all diagnostics, leaving the counters untouched.
    pub fn take_all(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// One-line summary for the end of a run.
    pub fn summary(&self) -> String {
        format!(
            "{} executions, {} failed, {} directives unresolved",
            self.executions,
            self.failure_count(),
            self.unresolved
        )
    }
}
