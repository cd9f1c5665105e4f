//! Strategies for keeping session state between engine invocations.
//!
//! The engine always loads and saves a file named after the session in its
//! working directory. A strategy decides what happens to that file around
//! each invocation.

use std::io::ErrorKind;
use std::path::Path;

use log::debug;

use crate::error::SessionError;

/// Where session state lives between engine invocations.
pub trait StatePersistence {
    /// Forgets all state, including any stale state file left on disk.
    fn reset(&mut self, state_file: &Path) -> Result<(), SessionError>;

    /// Prepares `state_file` so the next invocation loads the current state.
    fn restore(&mut self, state_file: &Path) -> Result<(), SessionError>;

    /// Captures whatever the last invocation saved to `state_file`.
    fn capture(&mut self, state_file: &Path) -> Result<(), SessionError>;
}

/// The state file on disk is the state.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileState;

impl StatePersistence for FileState {
    fn reset(&mut self, state_file: &Path) -> Result<(), SessionError> {
        remove_if_present(state_file)
    }

    fn restore(&mut self, _state_file: &Path) -> Result<(), SessionError> {
        Ok(())
    }

    fn capture(&mut self, _state_file: &Path) -> Result<(), SessionError> {
        Ok(())
    }
}

/// State is held in memory; the file only exists while the engine runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryState {
    snapshot: Option<Vec<u8>>,
}

impl MemoryState {
    /// Creates an empty in-memory state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the captured state bytes, if any invocation has saved state.
    pub fn snapshot(&self) -> Option<&[u8]> {
        self.snapshot.as_deref()
    }
}

impl StatePersistence for MemoryState {
    fn reset(&mut self, state_file: &Path) -> Result<(), SessionError> {
        self.snapshot = None;
        remove_if_present(state_file)
    }

    fn restore(&mut self, state_file: &Path) -> Result<(), SessionError> {
        match &self.snapshot {
            Some(bytes) => std::fs::write(state_file, bytes).map_err(|e| io_error(state_file, e)),
            None => remove_if_present(state_file),
        }
    }

    fn capture(&mut self, state_file: &Path) -> Result<(), SessionError> {
        match std::fs::read(state_file) {
            Ok(bytes) => {
                debug!("captured {} bytes of session state", bytes.len());
                self.snapshot = Some(bytes);
                remove_if_present(state_file)
            }
            // The unit did not get far enough to save; keep the previous state.
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(state_file, e)),
        }
    }
}

fn remove_if_present(path: &Path) -> Result<(), SessionError> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!("removed session state {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_error(path, e)),
    }
}

fn io_error(path: &Path, source: std::io::Error) -> SessionError {
    SessionError::Io {
        path: path.to_path_buf(),
        source,
    }
}
