//! Subprocess tasks with timeout and cancellation.

use std::ffi::OsString;
use std::future::pending;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use log::debug;
use tokio::io::AsyncWriteExt;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use crate::error::EngineError;

/// Captured output of a finished subprocess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Standard output, decoded as UTF-8 (lossy).
    pub stdout: String,
    /// Standard error, decoded as UTF-8 (lossy).
    pub stderr: String,
    /// Exit code, or `None` when the child was terminated by a signal.
    pub code: Option<i32>,
}

impl ExecutionResult {
    /// Returns `true` if the child exited with code 0.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// A fully described subprocess call.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Program to run, resolved through `PATH`.
    pub program: String,
    /// Arguments, in order.
    pub args: Vec<OsString>,
    /// Working directory for the child, or the current one if `None`.
    pub current_dir: Option<PathBuf>,
    /// Bytes fed to standard input. Standard input is closed when `None`.
    pub stdin: Option<Vec<u8>>,
}

impl Invocation {
    /// Starts describing a call to `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            stdin: None,
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Sets the child's working directory.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Feeds `input` to the child's standard input.
    pub fn stdin(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(input.into());
        self
    }
}

/// Runs subprocesses one at a time, each bounded by an optional timeout.
///
/// Once the cancellation token fires, the running child is killed and every
/// later call fails immediately with [`EngineError::Cancelled`].
pub struct ProcessRunner {
    runtime: Runtime,
    timeout: Option<Duration>,
    cancel: CancellationToken,
    interruptible: bool,
}

impl ProcessRunner {
    /// Creates a runner with no timeout and a fresh cancellation token.
    pub fn new() -> Result<Self, EngineError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(EngineError::Runtime)?;
        Ok(Self {
            runtime,
            timeout: None,
            cancel: CancellationToken::new(),
            interruptible: false,
        })
    }

    /// Bounds every call by `timeout`. `None` waits forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Shares an externally owned cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Cancels the token when Ctrl-C arrives while a child is running.
    pub fn cancel_on_interrupt(mut self, enabled: bool) -> Self {
        self.interruptible = enabled;
        self
    }

    /// Returns a handle to the token that cancels this runner.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Returns the configured timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Runs `invocation` to completion, blocking the caller.
    ///
    /// The exit status is reported, not judged: callers decide whether a
    /// non-zero code is a failure.
    pub fn run(&self, invocation: &Invocation) -> Result<ExecutionResult, EngineError> {
        let program = invocation.program.clone();
        if self.cancel.is_cancelled() {
            return Err(EngineError::Cancelled { program });
        }
        debug!("running {} {:?}", program, invocation.args);

        self.runtime.block_on(async {
            let mut command = tokio::process::Command::new(&invocation.program);
            command
                .args(&invocation.args)
                .stdin(if invocation.stdin.is_some() {
                    Stdio::piped()
                } else {
                    Stdio::null()
                })
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true);
            if let Some(dir) = &invocation.current_dir {
                command.current_dir(dir);
            }

            let mut child = command.spawn().map_err(|e| EngineError::Spawn {
                program: program.clone(),
                source: e,
            })?;

            let stdin = child.stdin.take();
            let feed = async move {
                if let (Some(mut pipe), Some(input)) = (stdin, invocation.stdin.as_deref()) {
                    // A child that exits without reading its input is not an error here.
                    if let Err(e) = pipe.write_all(input).await {
                        debug!("stdin for {} closed early: {e}", invocation.program);
                    }
                }
            };
            let task = async move {
                let (_, output) = tokio::join!(feed, child.wait_with_output());
                output
            };

            let deadline = async {
                match self.timeout {
                    Some(limit) => tokio::time::sleep(limit).await,
                    None => pending::<()>().await,
                }
            };
            let interrupt = async {
                if !self.interruptible {
                    return pending::<()>().await;
                }
                if tokio::signal::ctrl_c().await.is_err() {
                    pending::<()>().await;
                }
            };

            tokio::select! {
                output = task => {
                    let output = output.map_err(|e| EngineError::Io {
                        program: program.clone(),
                        source: e,
                    })?;
                    Ok(ExecutionResult {
                        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                        code: output.status.code(),
                    })
                }
                _ = deadline => Err(EngineError::Timeout {
                    program: program.clone(),
                    after: self.timeout.unwrap_or_default(),
                }),
                _ = self.cancel.cancelled() => Err(EngineError::Cancelled {
                    program: program.clone(),
                }),
                _ = interrupt => {
                    self.cancel.cancel();
                    Err(EngineError::Cancelled { program: program.clone() })
                }
            }
        })
    }
}

impl std::fmt::Debug for ProcessRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessRunner")
            .field("timeout", &self.timeout)
            .field("cancelled", &self.cancel.is_cancelled())
            .field("interruptible", &self.interruptible)
            .finish()
    }
}
