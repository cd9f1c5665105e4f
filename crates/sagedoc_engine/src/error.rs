//! Error types for external process invocation.

use std::time::Duration;

/// Errors raised while running an external tool.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The async runtime backing process tasks could not be created.
    #[error("failed to start process runtime: {0}")]
    Runtime(#[source] std::io::Error),

    /// The program could not be launched at all.
    #[error("failed to launch `{program}`: {source}")]
    Spawn {
        /// The program that was invoked.
        program: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Communication with a running child failed.
    #[error("I/O error while running `{program}`: {source}")]
    Io {
        /// The program that was running.
        program: String,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The computation engine exited unsuccessfully.
    #[error("`{program}` failed with {}: {}", describe_exit(.code), trimmed(.stderr))]
    EngineFailure {
        /// The engine binary.
        program: String,
        /// Exit code, or `None` when terminated by a signal.
        code: Option<i32>,
        /// Captured standard error.
        stderr: String,
    },

    /// The TeX compiler or PDF converter exited unsuccessfully.
    #[error("typesetting with `{program}` failed with {}: {}", describe_exit(.code), trimmed(.output))]
    TypesetFailure {
        /// The tool that failed.
        program: String,
        /// Exit code, or `None` when terminated by a signal.
        code: Option<i32>,
        /// Captured diagnostics (stdout for TeX, stderr otherwise).
        output: String,
    },

    /// The child ran past the configured time limit and was killed.
    #[error("`{program}` timed out after {after:?}")]
    Timeout {
        /// The program that was killed.
        program: String,
        /// The configured limit.
        after: Duration,
    },

    /// The run was cancelled before or while the child executed.
    #[error("`{program}` was cancelled")]
    Cancelled {
        /// The program that was cancelled.
        program: String,
    },

    /// The tool succeeded but its output could not be interpreted.
    #[error("unexpected output from `{program}`: {reason}")]
    Malformed {
        /// The program whose output was rejected.
        program: String,
        /// Why the output was rejected.
        reason: String,
    },
}

fn trimmed(text: &str) -> &str {
    text.trim()
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "a signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_failure_display() {
        let err = EngineError::EngineFailure {
            program: "sage".to_string(),
            code: Some(1),
            stderr: "NameError: name 'y' is not defined\n".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "`sage` failed with exit code 1: NameError: name 'y' is not defined"
        );
    }

    #[test]
    fn signal_exit_display() {
        let err = EngineError::TypesetFailure {
            program: "pdflatex".to_string(),
            code: None,
            output: String::new(),
        };
        assert!(err.to_string().contains("a signal"));
    }

    #[test]
    fn timeout_display() {
        let err = EngineError::Timeout {
            program: "sage".to_string(),
            after: Duration::from_millis(1500),
        };
        assert_eq!(err.to_string(), "`sage` timed out after 1.5s");
    }

    #[test]
    fn cancelled_display() {
        let err = EngineError::Cancelled {
            program: "pandoc".to_string(),
        };
        assert_eq!(err.to_string(), "`pandoc` was cancelled");
    }
}
