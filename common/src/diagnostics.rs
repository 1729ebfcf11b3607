//! Diagnostics produced by checkers and builders for assembling them.

use crate::span::SourceLocation;
use serde::{Serialize, Serializer};
use std::fmt;

/// Severity tier of a finding.
///
/// Only blocking findings flip a [`crate::CheckResult`] to failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The artefact must not be accepted while this finding stands.
    Blocking,
    /// Reported for context; acceptance is unaffected.
    Informational,
}

impl Severity {
    /// Returns the lowercase label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Blocking => "blocking",
            Self::Informational => "informational",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classification of what a diagnostic reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// The artefact does not conform to its grammar.
    ParseError,
    /// An imported module could not be resolved.
    UnresolvedImport,
    /// An attribute is absent from the inferred type of its receiver.
    UnknownAttribute,
    /// A finding reported by an external lint backend.
    LintFinding,
    /// The external tool failed to run at all.
    ToolInvocationError,
    /// The external tool exceeded its time budget.
    ToolTimeout,
    /// The run was cut short at a checker boundary.
    Cancelled,
    /// A checker failed internally.
    InternalError,
}

/// A single reported finding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    checker: String,
    kind: DiagnosticKind,
    severity: Severity,
    message: String,
    location: Option<SourceLocation>,
}

impl Diagnostic {
    /// Returns the name of the checker that produced the finding.
    #[must_use]
    pub fn checker(&self) -> &str {
        &self.checker
    }

    /// Returns the finding's classification.
    #[must_use]
    pub const fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    /// Returns the severity tier.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// Returns `true` when the finding blocks acceptance.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Blocking
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the source location, when known.
    #[must_use]
    pub const fn location(&self) -> Option<SourceLocation> {
        self.location
    }
}

#[derive(Serialize)]
struct DiagnosticRecord<'a> {
    checker: &'a str,
    kind: DiagnosticKind,
    severity: Severity,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    column: Option<usize>,
}

impl Serialize for Diagnostic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        DiagnosticRecord {
            checker: &self.checker,
            kind: self.kind,
            severity: self.severity,
            message: &self.message,
            line: self.location.map(SourceLocation::line),
            column: self.location.map(SourceLocation::column),
        }
        .serialize(serializer)
    }
}

/// Builder for [`Diagnostic`] instances.
pub struct DiagnosticBuilder {
    diagnostic: Diagnostic,
}

impl DiagnosticBuilder {
    fn new(checker: impl Into<String>, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            diagnostic: Diagnostic {
                checker: checker.into(),
                kind,
                severity: Severity::Blocking,
                message: message.into(),
                location: None,
            },
        }
    }

    /// Overrides the severity (blocking by default).
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.diagnostic.severity = severity;
        self
    }

    /// Marks the finding as informational.
    #[must_use]
    pub fn informational(self) -> Self {
        self.severity(Severity::Informational)
    }

    /// Attaches a source location.
    #[must_use]
    pub fn at(mut self, location: SourceLocation) -> Self {
        self.diagnostic.location = Some(location);
        self
    }

    /// Attaches a source location when one is available.
    #[must_use]
    pub fn at_opt(mut self, location: Option<SourceLocation>) -> Self {
        self.diagnostic.location = location;
        self
    }

    /// Completes the builder and returns the diagnostic.
    #[must_use]
    pub fn build(self) -> Diagnostic {
        self.diagnostic
    }
}

/// Starts building a blocking diagnostic for the named checker.
///
/// # Examples
///
/// ```
/// use vetting_common::diagnostics::{DiagnosticKind, Severity, report};
/// use vetting_common::span::SourceLocation;
///
/// let diagnostic = report("imports", DiagnosticKind::UnresolvedImport, "module `x` not found")
///     .at(SourceLocation::new(2, 8))
///     .build();
/// assert_eq!(diagnostic.checker(), "imports");
/// assert_eq!(diagnostic.severity(), Severity::Blocking);
/// assert_eq!(diagnostic.location().map(|l| l.line()), Some(2));
/// ```
#[must_use]
pub fn report(
    checker: impl Into<String>,
    kind: DiagnosticKind,
    message: impl Into<String>,
) -> DiagnosticBuilder {
    DiagnosticBuilder::new(checker, kind, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn builds_informational_diagnostic() {
        let diagnostic = report("attributes", DiagnosticKind::UnknownAttribute, "no `foo`")
            .informational()
            .at(SourceLocation::new(3, 1))
            .build();

        assert_eq!(diagnostic.severity(), Severity::Informational);
        assert!(!diagnostic.is_blocking());
        assert_eq!(diagnostic.kind(), DiagnosticKind::UnknownAttribute);
    }

    #[rstest]
    fn serialises_location_as_flat_fields() {
        let diagnostic = report("syntax", DiagnosticKind::ParseError, "invalid syntax")
            .at(SourceLocation::new(1, 7))
            .build();

        let value = serde_json::to_value(&diagnostic).expect("diagnostic serialises");

        assert_eq!(
            value,
            serde_json::json!({
                "checker": "syntax",
                "kind": "parse-error",
                "severity": "blocking",
                "message": "invalid syntax",
                "line": 1,
                "column": 7,
            })
        );
    }

    #[rstest]
    fn omits_unknown_location() {
        let diagnostic = report("pylint", DiagnosticKind::ToolTimeout, "timed out").build();

        let value = serde_json::to_value(&diagnostic).expect("diagnostic serialises");

        assert!(value.get("line").is_none());
        assert!(value.get("column").is_none());
    }
}
