//! The external lint tool boundary.
//!
//! [`LintBackend`] hides how the tool is started so the checker can be
//! exercised with canned output. [`PylintBackend`] is the process-backed
//! implementation: it runs `pylint` with JSON output, drains both pipes on
//! reader threads, and kills the child when the timeout elapses.

use camino::Utf8Path;
use log::{debug, trace};
use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;
use wait_timeout::ChildExt;

/// Pylint's exit status for command-line usage errors.
const USAGE_ERROR_STATUS: i32 = 32;

/// Errors raised while invoking the lint tool.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The program could not be started (typically not installed).
    #[error("`{program}` could not be started: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying spawn error.
        #[source]
        source: io::Error,
    },

    /// The program did not finish in time and was killed.
    #[error("`{program}` did not finish within {timeout_secs} seconds")]
    Timeout {
        /// Program that overran.
        program: String,
        /// Configured timeout.
        timeout_secs: u64,
    },

    /// The program ran but reported a failure of its own.
    #[error("`{program}` failed ({status}): {stderr}")]
    Failed {
        /// Program that failed.
        program: String,
        /// Exit status as reported by the OS.
        status: String,
        /// Trimmed standard error output.
        stderr: String,
    },

    /// Reading the program's output failed.
    #[error("I/O error while running `{program}`: {source}")]
    Io {
        /// Program whose pipes failed.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Rule selection passed through to the tool unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LintOptions {
    /// Message categories or identifiers to enable.
    pub enable: Vec<String>,
    /// Message categories or identifiers to disable.
    pub disable: Vec<String>,
    /// Further arguments placed before the file name.
    pub extra_args: Vec<String>,
}

impl LintOptions {
    /// Builds the pylint command line for `file`.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use pylint_checker::backend::LintOptions;
    ///
    /// let options = LintOptions {
    ///     disable: vec!["C0114".to_owned(), "C0116".to_owned()],
    ///     ..LintOptions::default()
    /// };
    /// assert_eq!(
    ///     options.arguments(Utf8Path::new("app.py")),
    ///     ["--output-format=json", "--disable=C0114,C0116", "app.py"]
    /// );
    /// ```
    #[must_use]
    pub fn arguments(&self, file: &Utf8Path) -> Vec<String> {
        let mut args = vec!["--output-format=json".to_owned()];
        if !self.enable.is_empty() {
            args.push(format!("--enable={}", self.enable.join(",")));
        }
        if !self.disable.is_empty() {
            args.push(format!("--disable={}", self.disable.join(",")));
        }
        args.extend(self.extra_args.iter().cloned());
        args.push(file.as_str().to_owned());
        args
    }
}

/// Runs an external lint tool over a file.
#[cfg_attr(test, mockall::automock)]
pub trait LintBackend {
    /// Returns the tool's name for log messages.
    fn name(&self) -> &'static str;

    /// Checks that the tool can be started at all.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the tool is missing or broken.
    fn probe(&self) -> Result<(), BackendError>;

    /// Lints `file` and returns the tool's raw standard output.
    ///
    /// A non-zero exit caused by findings is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the tool cannot be started, overruns
    /// its timeout, or fails for reasons unrelated to findings.
    fn run(&self, file: &Utf8Path, options: &LintOptions) -> Result<String, BackendError>;
}

/// Invokes a `pylint` executable as a child process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PylintBackend {
    program: String,
    timeout: Duration,
}

impl PylintBackend {
    /// Creates a backend for `program` with the given per-run timeout.
    #[must_use]
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Returns the configured executable.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns the per-run timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    fn execute(&self, args: &[String]) -> Result<Captured, BackendError> {
        trace!(target: "pylint", "running {} {}", self.program, args.join(" "));
        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| BackendError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let Some(status) = self.wait(&mut child)? else {
            // The reader threads finish once the killed child's pipes close.
            let _ = child.kill();
            let _ = child.wait();
            debug!(target: "pylint", "{} killed after {:?}", self.program, self.timeout);
            return Err(BackendError::Timeout {
                program: self.program.clone(),
                timeout_secs: self.timeout.as_secs(),
            });
        };

        Ok(Captured {
            status,
            stdout: self.collect(stdout)?,
            stderr: self.collect(stderr)?,
        })
    }

    fn wait(&self, child: &mut Child) -> Result<Option<ExitStatus>, BackendError> {
        child.wait_timeout(self.timeout).map_err(|source| self.io_error(source))
    }

    fn collect(&self, reader: Option<JoinHandle<io::Result<Vec<u8>>>>) -> Result<String, BackendError> {
        let Some(handle) = reader else {
            return Ok(String::new());
        };
        let bytes = handle
            .join()
            .map_err(|_| io::Error::other("output reader panicked"))
            .and_then(|result| result)
            .map_err(|source| self.io_error(source))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn io_error(&self, source: io::Error) -> BackendError {
        BackendError::Io {
            program: self.program.clone(),
            source,
        }
    }

    fn failure(&self, captured: &Captured) -> BackendError {
        BackendError::Failed {
            program: self.program.clone(),
            status: captured.status.to_string(),
            stderr: captured.stderr.trim().to_owned(),
        }
    }
}

impl Default for PylintBackend {
    fn default() -> Self {
        Self::new("pylint", Duration::from_secs(30))
    }
}

struct Captured {
    status: ExitStatus,
    stdout: String,
    stderr: String,
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        pipe.read_to_end(&mut buffer)?;
        Ok(buffer)
    })
}

impl LintBackend for PylintBackend {
    fn name(&self) -> &'static str {
        "pylint"
    }

    fn probe(&self) -> Result<(), BackendError> {
        let captured = self.execute(&["--version".to_owned()])?;
        if captured.status.success() {
            Ok(())
        } else {
            Err(self.failure(&captured))
        }
    }

    fn run(&self, file: &Utf8Path, options: &LintOptions) -> Result<String, BackendError> {
        let captured = self.execute(&options.arguments(file))?;
        // Pylint encodes finding categories as bits of a non-zero status;
        // only a usage error or a signal means the run itself failed.
        match captured.status.code() {
            Some(code) if code != USAGE_ERROR_STATUS => Ok(captured.stdout),
            _ => Err(self.failure(&captured)),
        }
    }
}
