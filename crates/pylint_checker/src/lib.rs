//! Checker that delegates Python linting to an external tool.
//!
//! The artefact is written to a scoped temporary directory, the
//! [`LintBackend`] runs over it, and the tool's JSON report is mapped onto
//! diagnostics. Tool failures never escape as errors: a missing binary, a
//! crash or unreadable output becomes a blocking
//! [`DiagnosticKind::ToolInvocationError`], and an overrun becomes a
//! [`DiagnosticKind::ToolTimeout`].

pub mod backend;
pub mod output;

use crate::backend::{BackendError, LintBackend, LintOptions, PylintBackend};
use crate::output::parse_messages;
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, warn};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use vetting_common::{
    CheckContext, CheckResult, Checker, Diagnostic, DiagnosticKind, Language, SourceArtifact,
    report,
};

/// Name recorded on every diagnostic this checker emits.
pub const CHECKER_NAME: &str = "pylint";

/// File name used when the artefact carries no path.
pub const DEFAULT_FILE_NAME: &str = "artefact.py";

/// Configuration for [`PylintChecker`].
///
/// # TOML Configuration
///
/// ```toml
/// [pylint]
/// program = "/opt/venv/bin/pylint"
/// timeout_secs = 10
/// disable = ["C0114", "C0116"]
/// require_tool = true
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PylintConfig {
    /// Whether the checker runs at all.
    pub enabled: bool,
    /// Executable to invoke.
    pub program: String,
    /// Seconds a single run may take before it is killed.
    pub timeout_secs: u64,
    /// Categories or message identifiers to enable.
    pub enable: Vec<String>,
    /// Categories or message identifiers to disable.
    pub disable: Vec<String>,
    /// Further command-line arguments.
    pub extra_args: Vec<String>,
    /// Whether pipeline assembly fails when the tool cannot be started.
    pub require_tool: bool,
}

impl Default for PylintConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: "pylint".to_owned(),
            timeout_secs: 30,
            enable: Vec::new(),
            disable: Vec::new(),
            extra_args: Vec::new(),
            require_tool: false,
        }
    }
}

impl PylintConfig {
    /// Returns the per-run timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Lint checker backed by a [`LintBackend`].
#[derive(Clone, Debug)]
pub struct PylintChecker<B = PylintBackend> {
    config: PylintConfig,
    backend: B,
}

impl PylintChecker {
    /// Creates a checker that runs the configured `pylint` executable.
    #[must_use]
    pub fn new(config: PylintConfig) -> Self {
        let backend = PylintBackend::new(config.program.clone(), config.timeout());
        Self { config, backend }
    }
}

impl Default for PylintChecker {
    fn default() -> Self {
        Self::new(PylintConfig::default())
    }
}

impl<B: LintBackend> PylintChecker<B> {
    /// Creates a checker with an injected backend.
    #[must_use]
    pub const fn with_backend(config: PylintConfig, backend: B) -> Self {
        Self { config, backend }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &PylintConfig {
        &self.config
    }

    /// Checks that the backend can be started.
    ///
    /// # Errors
    ///
    /// Returns the backend's error when the tool is unavailable.
    pub fn probe(&self) -> Result<(), BackendError> {
        self.backend.probe()
    }

    /// Combines configured rule selection with the caller's categories.
    fn options(&self, context: &CheckContext) -> LintOptions {
        let mut enable = self.config.enable.clone();
        enable.extend(
            context
                .enabled_categories()
                .iter()
                .filter(|category| !self.config.enable.contains(*category))
                .cloned(),
        );
        LintOptions {
            enable,
            disable: self.config.disable.clone(),
            extra_args: self.config.extra_args.clone(),
        }
    }

    fn lint(
        &self,
        artifact: &SourceArtifact,
        context: &CheckContext,
    ) -> Result<Vec<Diagnostic>, Diagnostic> {
        // Dropping the directory removes the file on every return path.
        let workspace = TempDir::new().map_err(|error| {
            invocation_error(format!("failed to create a temporary directory: {error}"))
        })?;
        let file = artefact_file(workspace.path(), artifact)?;
        fs::write(&file, artifact.content())
            .map_err(|error| invocation_error(format!("failed to write {file}: {error}")))?;

        let stdout = self
            .backend
            .run(&file, &self.options(context))
            .map_err(|error| self.backend_failure(&error))?;
        let messages = parse_messages(&stdout).map_err(|error| {
            invocation_error(format!(
                "{} produced unreadable output: {error}",
                self.backend.name()
            ))
        })?;

        Ok(messages
            .iter()
            .map(|message| message.to_diagnostic(CHECKER_NAME))
            .collect())
    }

    fn backend_failure(&self, error: &BackendError) -> Diagnostic {
        warn!(target: CHECKER_NAME, "{} run failed: {error}", self.backend.name());
        let kind = match error {
            BackendError::Timeout { .. } => DiagnosticKind::ToolTimeout,
            _ => DiagnosticKind::ToolInvocationError,
        };
        report(CHECKER_NAME, kind, error.to_string()).build()
    }
}

fn invocation_error(message: String) -> Diagnostic {
    warn!(target: CHECKER_NAME, "{message}");
    report(CHECKER_NAME, DiagnosticKind::ToolInvocationError, message).build()
}

/// Places the artefact under `dir`, keeping its own file name when it has one.
fn artefact_file(dir: &Path, artifact: &SourceArtifact) -> Result<Utf8PathBuf, Diagnostic> {
    let dir = Utf8Path::from_path(dir).ok_or_else(|| {
        invocation_error(format!(
            "temporary directory {} is not valid UTF-8",
            dir.display()
        ))
    })?;
    let name = artifact
        .path()
        .and_then(Utf8Path::file_name)
        .unwrap_or(DEFAULT_FILE_NAME);
    Ok(dir.join(name))
}

impl<B: LintBackend + Send + Sync> Checker for PylintChecker<B> {
    fn name(&self) -> &'static str {
        CHECKER_NAME
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn check(&self, artifact: &SourceArtifact, context: &CheckContext) -> CheckResult {
        if !self.config.enabled || artifact.language() != Language::Python {
            return CheckResult::pass();
        }

        let diagnostics = self
            .lint(artifact, context)
            .unwrap_or_else(|failure| vec![failure]);
        debug!(
            target: CHECKER_NAME,
            "{} message(s) from {}",
            diagnostics.len(),
            self.backend.name()
        );
        CheckResult::from_diagnostics(diagnostics)
    }
}
