//! Test doubles shared across vetting crates.
//!
//! Enabled by the `test-support` feature. Pipeline tests use
//! [`StubChecker`] to stand in for real checkers with a canned outcome.

use crate::artefact::SourceArtifact;
use crate::checker::{CheckResult, Checker};
use crate::context::CheckContext;
use crate::diagnostics::{DiagnosticKind, Severity, report};
use std::sync::atomic::{AtomicUsize, Ordering};

/// A checker that reports a fixed set of findings and counts its calls.
#[derive(Debug)]
pub struct StubChecker {
    name: &'static str,
    findings: Vec<(Severity, String)>,
    enabled: bool,
    panics: bool,
    calls: AtomicUsize,
}

impl StubChecker {
    /// A checker that always passes with no findings.
    #[must_use]
    pub const fn passing(name: &'static str) -> Self {
        Self {
            name,
            findings: Vec::new(),
            enabled: true,
            panics: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// A checker that always reports one blocking finding with `message`.
    #[must_use]
    pub fn failing(name: &'static str, message: &str) -> Self {
        Self::passing(name).with_finding(Severity::Blocking, message)
    }

    /// A checker whose `check` panics.
    #[must_use]
    pub fn panicking(name: &'static str) -> Self {
        Self {
            panics: true,
            ..Self::passing(name)
        }
    }

    /// Adds a finding to every report.
    #[must_use]
    pub fn with_finding(mut self, severity: Severity, message: &str) -> Self {
        self.findings.push((severity, message.to_owned()));
        self
    }

    /// Switches the checker off.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Returns how many times `check` ran.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Checker for StubChecker {
    fn name(&self) -> &'static str {
        self.name
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn check(&self, _artifact: &SourceArtifact, _context: &CheckContext) -> CheckResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(!self.panics, "stub checker `{}` asked to panic", self.name);
        CheckResult::from_diagnostics(
            self.findings
                .iter()
                .map(|(severity, message)| {
                    report(self.name, DiagnosticKind::LintFinding, message.as_str())
                        .severity(*severity)
                        .build()
                })
                .collect(),
        )
    }
}
