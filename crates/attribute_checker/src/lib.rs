//! Best-effort checker for attribute access on inferable Python values.
//!
//! The checker infers types only where the artefact makes them obvious:
//! literals, constructor calls, annotations and `self` inside methods. An
//! attribute read on such a value that the type's attribute table does not
//! contain becomes a [`DiagnosticKind::UnknownAttribute`] finding, graded by
//! how certain the inference is. The checker is disabled by default because
//! a dynamic language always leaves room for false positives.

pub mod builtins;
pub mod classes;
pub mod infer;
pub mod nodes;

use crate::classes::ClassTable;
use crate::infer::{Analyzer, Finding};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use vetting_common::{
    CheckContext, CheckResult, Checker, DiagnosticKind, Language, Severity, SourceArtifact, parse,
    report,
};

/// Name recorded on every diagnostic this checker emits.
pub const CHECKER_NAME: &str = "attributes";

/// How certain an inferred receiver type is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// The receiver's class has an incomplete attribute table.
    Low,
    /// Annotations, builtin constructor calls and `self`.
    Medium,
    /// Literals and constructor calls of local classes.
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        })
    }
}

/// Configuration for [`AttributeChecker`].
///
/// # TOML Configuration
///
/// ```toml
/// [attributes]
/// enabled = true
/// blocking_confidence = "medium"
/// report_confidence = "low"
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AttributeConfig {
    /// Whether the checker runs at all.
    pub enabled: bool,
    /// Findings at or above this confidence block.
    pub blocking_confidence: Confidence,
    /// Findings below this confidence are dropped.
    pub report_confidence: Confidence,
}

impl Default for AttributeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            blocking_confidence: Confidence::High,
            report_confidence: Confidence::Medium,
        }
    }
}

impl AttributeConfig {
    /// Maps a finding's confidence to a severity, or `None` to drop it.
    #[must_use]
    pub fn severity_for(&self, confidence: Confidence) -> Option<Severity> {
        if confidence >= self.blocking_confidence {
            Some(Severity::Blocking)
        } else if confidence >= self.report_confidence {
            Some(Severity::Informational)
        } else {
            None
        }
    }
}

/// Attribute existence checker.
#[derive(Clone, Debug, Default)]
pub struct AttributeChecker {
    config: AttributeConfig,
}

impl AttributeChecker {
    /// Creates a checker with the given configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use attribute_checker::{AttributeChecker, AttributeConfig};
    /// use vetting_common::{CheckContext, Checker, SourceArtifact};
    ///
    /// let checker = AttributeChecker::new(AttributeConfig {
    ///     enabled: true,
    ///     ..AttributeConfig::default()
    /// });
    /// let artefact = SourceArtifact::python("items = []\nitems.apend(1)\n");
    ///
    /// let result = checker.check(&artefact, &CheckContext::new());
    /// assert!(!result.passed());
    /// ```
    #[must_use]
    pub const fn new(config: AttributeConfig) -> Self {
        Self { config }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &AttributeConfig {
        &self.config
    }
}

fn describe(finding: &Finding) -> String {
    let mut message = format!(
        "`{}` ({}) has no attribute `{}`",
        finding.receiver, finding.receiver_type, finding.attribute
    );
    if let Some(suggestion) = &finding.suggestion {
        message.push_str(&format!("; did you mean `{suggestion}`?"));
    }
    message
}

impl Checker for AttributeChecker {
    fn name(&self) -> &'static str {
        CHECKER_NAME
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn check(&self, artifact: &SourceArtifact, _context: &CheckContext) -> CheckResult {
        if !self.config.enabled || artifact.language() != Language::Python {
            return CheckResult::pass();
        }

        let source = artifact.content();
        let tree = match parse(Language::Python, source) {
            Ok(tree) => tree,
            Err(failure) => {
                warn!(target: CHECKER_NAME, "{failure}");
                return CheckResult::from_diagnostics(vec![
                    report(CHECKER_NAME, DiagnosticKind::InternalError, failure.to_string())
                        .build(),
                ]);
            }
        };

        let root = tree.root_node();
        let classes = ClassTable::collect(root, source);
        let findings = Analyzer::new(source, &classes).run(root);
        let found = findings.len();
        let diagnostics: Vec<_> = findings
            .iter()
            .filter_map(|finding| {
                let severity = self.config.severity_for(finding.confidence)?;
                Some(
                    report(CHECKER_NAME, DiagnosticKind::UnknownAttribute, describe(finding))
                        .severity(severity)
                        .at(finding.location)
                        .build(),
                )
            })
            .collect();

        debug!(
            target: CHECKER_NAME,
            "{found} finding(s), {} reported",
            diagnostics.len()
        );
        CheckResult::from_diagnostics(diagnostics)
    }
}
