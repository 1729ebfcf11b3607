//! The capability shared by every checker and the result it produces.

use crate::artefact::SourceArtifact;
use crate::context::CheckContext;
use crate::diagnostics::{Diagnostic, Severity};
use serde::Serialize;

/// Outcome of checking one artefact.
///
/// `passed` is false exactly when some contributing checker reported a
/// blocking diagnostic. Diagnostics keep checker-invocation order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    passed: bool,
    diagnostics: Vec<Diagnostic>,
}

impl CheckResult {
    /// A passing result with no diagnostics.
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            passed: true,
            diagnostics: Vec::new(),
        }
    }

    /// Builds a result whose verdict follows from the diagnostics.
    ///
    /// # Examples
    ///
    /// ```
    /// use vetting_common::CheckResult;
    /// use vetting_common::diagnostics::{DiagnosticKind, report};
    ///
    /// let hint = report("pylint", DiagnosticKind::LintFinding, "C0114").informational().build();
    /// assert!(CheckResult::from_diagnostics(vec![hint]).passed());
    ///
    /// let error = report("syntax", DiagnosticKind::ParseError, "invalid syntax").build();
    /// assert!(!CheckResult::from_diagnostics(vec![error]).passed());
    /// ```
    #[must_use]
    pub fn from_diagnostics(diagnostics: Vec<Diagnostic>) -> Self {
        let passed = !diagnostics.iter().any(Diagnostic::is_blocking);
        Self {
            passed,
            diagnostics,
        }
    }

    /// Returns the overall verdict.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.passed
    }

    /// Returns the diagnostics in report order.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consumes the result, returning its diagnostics.
    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Counts diagnostics of the given severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity() == severity)
            .count()
    }

    /// Folds another result into this one: verdicts are AND-ed and the other
    /// result's diagnostics are appended after this one's.
    pub fn absorb(&mut self, other: Self) {
        self.passed &= other.passed;
        self.diagnostics.extend(other.diagnostics);
    }

    /// Appends a diagnostic, failing the result if it is blocking.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.passed &= !diagnostic.is_blocking();
        self.diagnostics.push(diagnostic);
    }
}

impl Default for CheckResult {
    fn default() -> Self {
        Self::pass()
    }
}

/// A static verification step over one artefact.
///
/// Implementations are configured at construction and never mutated
/// afterwards. `check` must not fail for content-originated problems: a
/// malformed artefact yields blocking diagnostics instead. Any temporary
/// resource a checker acquires is released before `check` returns.
pub trait Checker: Send + Sync {
    /// Stable identifier recorded as the origin of every diagnostic.
    fn name(&self) -> &'static str;

    /// Reports whether the checker is switched on by its configuration.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Checks `artifact` in `context`.
    fn check(&self, artifact: &SourceArtifact, context: &CheckContext) -> CheckResult;
}
