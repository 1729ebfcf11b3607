//! Decoding of pylint's JSON report.

use serde::Deserialize;
use vetting_common::{Diagnostic, DiagnosticKind, Severity, SourceLocation, report};

/// One entry of `pylint --output-format=json`.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct PylintMessage {
    /// Message category: `fatal`, `error`, `warning`, `convention`,
    /// `refactor` or `info`.
    #[serde(rename = "type")]
    pub category: String,
    /// One-based line, when the message has a position.
    #[serde(default)]
    pub line: Option<usize>,
    /// Zero-based column, when the message has a position.
    #[serde(default)]
    pub column: Option<usize>,
    /// Symbolic rule name, such as `unused-import`.
    pub symbol: String,
    /// Human-readable text.
    pub message: String,
    /// Rule identifier, such as `W0611`.
    #[serde(rename = "message-id")]
    pub message_id: String,
}

impl PylintMessage {
    /// Maps pylint's categories onto the two severity tiers.
    ///
    /// `fatal` and `error` block; everything else is informational.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self.category.as_str() {
            "fatal" | "error" => Severity::Blocking,
            _ => Severity::Informational,
        }
    }

    /// Converts the message into a diagnostic attributed to `checker`.
    #[must_use]
    pub fn to_diagnostic(&self, checker: &'static str) -> Diagnostic {
        let location = self
            .line
            .filter(|line| *line > 0)
            .map(|line| SourceLocation::new(line, self.column.unwrap_or_default() + 1));
        report(
            checker,
            DiagnosticKind::LintFinding,
            format!("{} ({}): {}", self.message_id, self.symbol, self.message),
        )
        .severity(self.severity())
        .at_opt(location)
        .build()
    }
}

/// Parses the tool's standard output.
///
/// # Errors
///
/// Returns the JSON error when the output is not a pylint message array.
pub fn parse_messages(stdout: &str) -> Result<Vec<PylintMessage>, serde_json::Error> {
    serde_json::from_str(stdout.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const REPORT: &str = r#"[
        {
            "type": "warning",
            "module": "artefact",
            "obj": "",
            "line": 1,
            "column": 0,
            "endLine": 1,
            "endColumn": 9,
            "path": "artefact.py",
            "symbol": "unused-import",
            "message": "Unused import os",
            "message-id": "W0611"
        },
        {
            "type": "error",
            "module": "artefact",
            "obj": "",
            "line": 3,
            "column": 4,
            "path": "artefact.py",
            "symbol": "undefined-variable",
            "message": "Undefined variable 'y'",
            "message-id": "E0602"
        }
    ]"#;

    #[rstest]
    fn decodes_pylint_json() {
        let messages = parse_messages(REPORT).expect("valid report");

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].symbol, "unused-import");
        assert_eq!(messages[1].message_id, "E0602");
    }

    #[rstest]
    fn converts_to_diagnostics() {
        let messages = parse_messages(REPORT).expect("valid report");

        let error = messages[1].to_diagnostic("pylint");

        assert_eq!(
            error.message(),
            "E0602 (undefined-variable): Undefined variable 'y'"
        );
        assert_eq!(error.severity(), Severity::Blocking);
        assert_eq!(error.location(), Some(SourceLocation::new(3, 5)));
        assert_eq!(messages[0].to_diagnostic("pylint").severity(), Severity::Informational);
    }

    #[rstest]
    #[case("fatal", Severity::Blocking)]
    #[case("error", Severity::Blocking)]
    #[case("warning", Severity::Informational)]
    #[case("convention", Severity::Informational)]
    #[case("refactor", Severity::Informational)]
    #[case("info", Severity::Informational)]
    fn maps_categories(#[case] category: &str, #[case] expected: Severity) {
        let message = PylintMessage {
            category: category.to_owned(),
            line: None,
            column: None,
            symbol: "x".to_owned(),
            message: "x".to_owned(),
            message_id: "X0000".to_owned(),
        };

        assert_eq!(message.severity(), expected);
        assert_eq!(message.to_diagnostic("pylint").location(), None);
    }

    #[rstest]
    #[case("")]
    #[case("Traceback (most recent call last):")]
    #[case("{\"type\": \"error\"}")]
    fn rejects_unexpected_output(#[case] stdout: &str) {
        assert!(parse_messages(stdout).is_err());
    }

    #[rstest]
    fn clean_runs_produce_no_messages() {
        assert!(parse_messages("[]\n").expect("valid report").is_empty());
    }
}
