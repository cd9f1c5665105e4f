//! Per-run session state owner.

use std::path::{Path, PathBuf};

use log::debug;
use sagedoc_config::{Persistence, SessionConfig};

use crate::envelope::Envelope;
use crate::error::SessionError;
use crate::persistence::{FileState, MemoryState, StatePersistence};

/// Owns the session state for one filter run.
///
/// Call [`start`](Self::start) once before the first unit, then bracket every
/// engine invocation with [`before_run`](Self::before_run) and
/// [`after_run`](Self::after_run).
pub struct SessionContext {
    name: String,
    suffix: String,
    work_dir: PathBuf,
    envelope: Envelope,
    persistence: Box<dyn StatePersistence>,
}

impl SessionContext {
    /// Creates a context with the default SageMath envelope and file persistence.
    pub fn new(name: impl Into<String>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            suffix: ".sobj".to_string(),
            work_dir: work_dir.into(),
            envelope: Envelope::sage(),
            persistence: Box::new(FileState),
        }
    }

    /// Builds a context from the `[session]` configuration section.
    pub fn from_config(config: &SessionConfig) -> Self {
        let persistence: Box<dyn StatePersistence> = match config.persistence {
            Persistence::File => Box::new(FileState),
            Persistence::Memory => Box::new(MemoryState::new()),
        };
        Self::new(config.name.clone(), config.work_dir.clone())
            .with_suffix(config.suffix.clone())
            .with_envelope(Envelope::with_overrides(
                config.prologue.as_deref(),
                config.epilogue.as_deref(),
            ))
            .with_persistence(persistence)
    }

    /// Sets the suffix the engine appends to the state name when saving.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Replaces the script envelope.
    pub fn with_envelope(mut self, envelope: Envelope) -> Self {
        self.envelope = envelope;
        self
    }

    /// Replaces the persistence strategy.
    pub fn with_persistence(mut self, persistence: Box<dyn StatePersistence>) -> Self {
        self.persistence = persistence;
        self
    }

    /// The state name handed to the engine's load/save calls.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory the engine must run in for the state name to resolve.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// The state object the engine writes: `<work_dir>/<name><suffix>`.
    pub fn state_file(&self) -> PathBuf {
        self.work_dir.join(format!("{}{}", self.name, self.suffix))
    }

    /// Starts a clean session by discarding any state from earlier runs.
    pub fn start(&mut self) -> Result<(), SessionError> {
        let state = self.state_file();
        debug!("resetting session state {}", state.display());
        self.persistence.reset(&state)
    }

    /// Wraps a unit's source in the load/execute/save envelope.
    pub fn wrap(&self, source: &str) -> String {
        self.envelope.wrap(&self.name, source)
    }

    /// Must be called right before an engine invocation.
    pub fn before_run(&mut self) -> Result<(), SessionError> {
        let state = self.state_file();
        self.persistence.restore(&state)
    }

    /// Must be called right after an engine invocation, even a failed one.
    pub fn after_run(&mut self) -> Result<(), SessionError> {
        let state = self.state_file();
        self.persistence.capture(&state)
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("name", &self.name)
            .field("suffix", &self.suffix)
            .field("work_dir", &self.work_dir)
            .finish_non_exhaustive()
    }
}
