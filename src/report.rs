//! Rendering of check results for people and for machines.
//!
//! The human report is plain text meant to be pasted back into a
//! regeneration prompt: a summary line, then one line per diagnostic in
//! pipeline order.

use vetting_common::{CheckResult, Diagnostic, Severity};

/// Renders `result` as plain text.
///
/// # Examples
///
/// ```
/// use vetting::report::render_human;
/// use vetting_common::{CheckResult, DiagnosticKind, SourceLocation, report};
///
/// let diagnostic = report("imports", DiagnosticKind::UnresolvedImport, "module `x` could not be resolved")
///     .at(SourceLocation::new(2, 8))
///     .build();
/// let text = render_human(&CheckResult::from_diagnostics(vec![diagnostic]));
///
/// assert_eq!(
///     text,
///     "failed: 1 blocking, 0 informational\n[blocking] imports:2:8: module `x` could not be resolved\n"
/// );
/// ```
#[must_use]
pub fn render_human(result: &CheckResult) -> String {
    let mut text = summary(result);
    text.push('\n');
    for diagnostic in result.diagnostics() {
        text.push_str(&render_diagnostic(diagnostic));
        text.push('\n');
    }
    text
}

/// Renders `result` as JSON: `{"passed": .., "diagnostics": [..]}`.
///
/// # Errors
///
/// Returns the serialiser's error, which does not occur for well-formed
/// results.
pub fn render_json(result: &CheckResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(result)
}

fn summary(result: &CheckResult) -> String {
    if result.passed() {
        "passed".to_owned()
    } else {
        format!(
            "failed: {} blocking, {} informational",
            result.count(Severity::Blocking),
            result.count(Severity::Informational)
        )
    }
}

/// `[severity] checker:line:column: message`, dropping the position when
/// the checker could not attribute one.
fn render_diagnostic(diagnostic: &Diagnostic) -> String {
    let severity = diagnostic.severity();
    let checker = diagnostic.checker();
    let message = diagnostic.message();
    match diagnostic.location() {
        Some(location) => format!(
            "[{severity}] {checker}:{}:{}: {message}",
            location.line(),
            location.column()
        ),
        None => format!("[{severity}] {checker}: {message}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use vetting_common::{DiagnosticKind, SourceLocation, report};

    fn mixed() -> CheckResult {
        CheckResult::from_diagnostics(vec![
            report("syntax", DiagnosticKind::ParseError, "missing ')'")
                .at(SourceLocation::new(1, 7))
                .build(),
            report("pylint", DiagnosticKind::ToolTimeout, "pylint timed out after 30s").build(),
            report(
                "pylint",
                DiagnosticKind::LintFinding,
                "C0114 (missing-module-docstring): Missing module docstring",
            )
            .informational()
            .at(SourceLocation::new(1, 1))
            .build(),
        ])
    }

    #[rstest]
    fn clean_results_render_a_bare_summary() {
        assert_eq!(render_human(&CheckResult::pass()), "passed\n");
    }

    #[rstest]
    fn informational_only_results_still_pass() {
        let hint = report("pylint", DiagnosticKind::LintFinding, "hint")
            .informational()
            .build();

        let text = render_human(&CheckResult::from_diagnostics(vec![hint]));

        assert_eq!(text, "passed\n[informational] pylint: hint\n");
    }

    #[rstest]
    fn failures_list_every_diagnostic_in_order() {
        let text = render_human(&mixed());

        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines,
            [
                "failed: 2 blocking, 1 informational",
                "[blocking] syntax:1:7: missing ')'",
                "[blocking] pylint: pylint timed out after 30s",
                "[informational] pylint:1:1: C0114 (missing-module-docstring): Missing module docstring",
            ]
        );
    }

    #[rstest]
    fn json_reports_carry_the_verdict_and_locations() {
        let json = render_json(&mixed()).expect("serialises");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid JSON");

        assert_eq!(value["passed"], false);
        assert_eq!(value["diagnostics"][0]["kind"], "parse-error");
        assert_eq!(value["diagnostics"][0]["line"], 1);
        assert_eq!(value["diagnostics"][0]["column"], 7);
        assert!(value["diagnostics"][1].get("line").is_none());
        assert_eq!(value["diagnostics"][2]["severity"], "informational");
    }
}
