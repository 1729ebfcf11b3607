//! Unit tests for the syntax checker.

use super::*;
use rstest::{fixture, rstest};
use vetting_common::{Language, Severity};

#[fixture]
fn checker() -> SyntaxChecker {
    SyntaxChecker::default()
}

#[fixture]
fn context() -> CheckContext {
    CheckContext::new()
}

#[rstest]
fn empty_artefact_passes(checker: SyntaxChecker, context: CheckContext) {
    let result = checker.check(&SourceArtifact::python(""), &context);

    assert!(result.passed());
    assert!(result.diagnostics().is_empty());
}

#[rstest]
fn broken_signature_fails_on_line_one(checker: SyntaxChecker, context: CheckContext) {
    let result = checker.check(&SourceArtifact::python("def f(:"), &context);

    assert!(!result.passed());
    assert!(!result.diagnostics().is_empty());
    let first = &result.diagnostics()[0];
    assert_eq!(first.checker(), CHECKER_NAME);
    assert_eq!(first.kind(), DiagnosticKind::ParseError);
    assert_eq!(first.severity(), Severity::Blocking);
    assert_eq!(first.location().map(|location| location.line()), Some(1));
}

#[rstest]
fn reports_the_line_of_a_later_error(checker: SyntaxChecker, context: CheckContext) {
    let source = "import os\n\nx = (1,\n";
    let result = checker.check(&SourceArtifact::python(source), &context);

    assert!(!result.passed());
    assert!(
        result
            .diagnostics()
            .iter()
            .filter_map(|diagnostic| diagnostic.location())
            .all(|location| location.line() >= 3)
    );
}

#[rstest]
#[case(Language::JavaScript, "const greet = (name) => `hi ${name}`;")]
#[case(Language::Css, "body { margin: 0 auto; }")]
#[case(Language::Python, "class A:\n    def f(self):\n        return 1\n")]
fn well_formed_artefacts_pass(
    checker: SyntaxChecker,
    context: CheckContext,
    #[case] language: Language,
    #[case] source: &str,
) {
    let result = checker.check(&SourceArtifact::new(source, language), &context);

    assert!(result.passed(), "unexpected diagnostics: {:?}", result.diagnostics());
}

#[rstest]
#[case::python_two_print("print \"hello\"\n")]
#[case::python_two_exec("exec \"x = 1\"\n")]
#[case::unexpected_indent("x = 1\n  y = 2\n")]
#[case::missing_block("def f():\nreturn 1\n")]
#[case::mismatched_dedent("if x:\n    pass\n  else:\n    pass\n")]
#[case::bare_walrus_statement("x := 1\n")]
#[case::python_two_raise("raise E, 'msg'\n")]
#[case::legacy_octal("x = 0777\n")]
#[case::diamond_operator("a <> b\n")]
fn rejects_sources_cpython_rejects(
    checker: SyntaxChecker,
    context: CheckContext,
    #[case] source: &str,
) {
    let result = checker.check(&SourceArtifact::python(source), &context);

    assert!(!result.passed(), "accepted {source:?}");
    let first = &result.diagnostics()[0];
    assert_eq!(first.kind(), DiagnosticKind::ParseError);
    assert!(first.location().is_some());
}

#[rstest]
fn reports_indentation_faults_on_the_offending_line(checker: SyntaxChecker, context: CheckContext) {
    let result = checker.check(&SourceArtifact::python("import os\n    x = 1\n"), &context);

    assert!(!result.passed());
    assert_eq!(
        result.diagnostics()[0].location().map(|location| location.line()),
        Some(2)
    );
}

#[rstest]
fn zero_error_budget_still_fails_broken_artefacts(context: CheckContext) {
    let checker = SyntaxChecker::new(SyntaxConfig {
        max_errors: 0,
        ..SyntaxConfig::default()
    });

    let result = checker.check(&SourceArtifact::python("print \"hello\"\n"), &context);

    assert!(!result.passed());
    assert_eq!(result.diagnostics().len(), 1);
}

#[rstest]
fn caps_the_number_of_reported_errors(context: CheckContext) {
    let checker = SyntaxChecker::new(SyntaxConfig {
        max_errors: 1,
        ..SyntaxConfig::default()
    });
    let source = "def f(:\n    pass\ndef g(:\n    pass\n";

    let result = checker.check(&SourceArtifact::python(source), &context);

    assert!(!result.passed());
    assert_eq!(result.diagnostics().len(), 1);
}

#[rstest]
fn disabled_checker_passes_everything(context: CheckContext) {
    let checker = SyntaxChecker::new(SyntaxConfig {
        enabled: false,
        ..SyntaxConfig::default()
    });

    let result = checker.check(&SourceArtifact::python("def f(:"), &context);

    assert!(!checker.is_enabled());
    assert!(result.passed());
}

#[rstest]
fn repeated_checks_are_identical(checker: SyntaxChecker, context: CheckContext) {
    let artefact = SourceArtifact::python("if True\n    pass\n");

    assert_eq!(checker.check(&artefact, &context), checker.check(&artefact, &context));
}

#[rstest]
fn deserialises_partial_configuration() {
    let config: SyntaxConfig = toml::from_str("max_errors = 3\n").expect("valid TOML");

    assert!(config.enabled);
    assert_eq!(config.max_errors, 3);
}

#[rstest]
fn rejects_unknown_configuration_keys() {
    let outcome: Result<SyntaxConfig, _> = toml::from_str("max_error = 3\n");

    assert!(outcome.is_err());
}
