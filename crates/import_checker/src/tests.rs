//! Checker-level tests for import resolution.

use super::*;
use camino::Utf8PathBuf;
use rstest::{fixture, rstest};
use std::fs;
use tempfile::TempDir;
use vetting_common::Severity;

#[fixture]
fn checker() -> ImportChecker {
    ImportChecker::default()
}

#[fixture]
fn context() -> CheckContext {
    CheckContext::new().with_available_modules(["os", "json"])
}

fn messages(result: &CheckResult) -> Vec<&str> {
    result.diagnostics().iter().map(Diagnostic::message).collect()
}

#[rstest]
fn flags_exactly_the_unknown_module(checker: ImportChecker, context: CheckContext) {
    let artefact = SourceArtifact::python("import os\nimport made_up_pkg\n");

    let result = checker.check(&artefact, &context);

    assert!(!result.passed());
    assert_eq!(result.diagnostics().len(), 1);
    let diagnostic = &result.diagnostics()[0];
    assert!(diagnostic.message().contains("made_up_pkg"));
    assert_eq!(diagnostic.kind(), DiagnosticKind::UnresolvedImport);
    assert_eq!(diagnostic.severity(), Severity::Blocking);
    assert_eq!(diagnostic.location().map(|location| location.line()), Some(2));
}

#[rstest]
fn stdlib_and_declared_modules_pass(checker: ImportChecker) {
    let context = CheckContext::new().with_available_modules(["requests"]);
    let artefact = SourceArtifact::python(
        "import sys\nfrom collections import OrderedDict\nimport requests.adapters\n",
    );

    let result = checker.check(&artefact, &context);

    assert!(result.passed(), "unexpected: {:?}", messages(&result));
}

#[rstest]
fn suggests_close_declared_names(checker: ImportChecker) {
    let context = CheckContext::new().with_available_modules(["requests"]);

    let result = checker.check(&SourceArtifact::python("import reqeusts\n"), &context);

    assert_eq!(
        messages(&result),
        ["module `reqeusts` could not be resolved; did you mean `requests`?"]
    );
}

#[rstest]
fn suggests_close_stdlib_names(checker: ImportChecker, context: CheckContext) {
    let result = checker.check(&SourceArtifact::python("import jsn\n"), &context);

    assert_eq!(messages(&result).len(), 1);
    assert!(messages(&result)[0].ends_with("did you mean `json`?"));
}

#[rstest]
fn no_suggestion_beyond_the_configured_distance(context: CheckContext) {
    let checker = ImportChecker::new(ImportConfig {
        suggestion_distance: 0,
        ..ImportConfig::default()
    });

    let result = checker.check(&SourceArtifact::python("import jsn\n"), &context);

    assert_eq!(messages(&result), ["module `jsn` could not be resolved"]);
}

#[rstest]
fn each_unresolved_reference_is_reported(checker: ImportChecker, context: CheckContext) {
    let artefact = SourceArtifact::python("import ghost\n\ndef f():\n    import ghost\n");

    let result = checker.check(&artefact, &context);

    assert_eq!(result.diagnostics().len(), 2);
}

#[rstest]
fn guarded_imports_are_informational(checker: ImportChecker, context: CheckContext) {
    let artefact =
        SourceArtifact::python("try:\n    import ujson as json\nexcept ImportError:\n    import json\n");

    let result = checker.check(&artefact, &context);

    assert!(result.passed());
    assert_eq!(result.diagnostics().len(), 1);
    assert_eq!(result.diagnostics()[0].severity(), Severity::Informational);
}

#[rstest]
fn relative_imports_without_a_path_do_not_block(checker: ImportChecker, context: CheckContext) {
    let result = checker.check(&SourceArtifact::python("from . import views\n"), &context);

    assert!(result.passed());
    assert_eq!(result.diagnostics().len(), 1);
    assert!(result.diagnostics()[0].message().contains("`.views`"));
}

#[rstest]
fn resolves_project_files(checker: ImportChecker) {
    let dir = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp path");
    fs::create_dir_all(root.join("shop")).expect("create package");
    fs::write(root.join("shop/cart.py"), "").expect("write module");
    fs::write(root.join("shop/__init__.py"), "").expect("write init");
    fs::write(root.join("config.py"), "").expect("write config");
    let context = CheckContext::new().with_project_root(root);
    let artefact = SourceArtifact::python(
        "import config\nfrom shop import cart\nfrom .cart import Cart\nfrom . import cart\n",
    )
    .with_path("shop/checkout.py");

    let result = checker.check(&artefact, &context);

    assert!(result.passed(), "unexpected: {:?}", messages(&result));
    assert!(result.diagnostics().is_empty());
}

#[rstest]
fn missing_name_from_a_package_with_an_init_is_informational(checker: ImportChecker) {
    let dir = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp path");
    fs::create_dir_all(root.join("shop")).expect("create package");
    fs::write(root.join("shop/__init__.py"), "").expect("write init");
    let context = CheckContext::new().with_project_root(root);
    let artefact =
        SourceArtifact::python("from . import missing_mod\n").with_path("shop/checkout.py");

    let result = checker.check(&artefact, &context);

    assert!(result.passed());
    assert_eq!(result.diagnostics().len(), 1);
    assert_eq!(result.diagnostics()[0].severity(), Severity::Informational);
    assert!(result.diagnostics()[0].message().contains("`.missing_mod`"));
}

#[rstest]
fn missing_name_from_a_directory_without_an_init_blocks(checker: ImportChecker) {
    let dir = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp path");
    fs::create_dir_all(root.join("shop")).expect("create package");
    let context = CheckContext::new().with_project_root(root);
    let artefact =
        SourceArtifact::python("from . import missing_mod\n").with_path("shop/checkout.py");

    let result = checker.check(&artefact, &context);

    assert!(!result.passed());
    assert_eq!(messages(&result), ["module `.missing_mod` could not be resolved"]);
}

#[rstest]
fn relative_imports_skip_the_filesystem_when_local_resolution_is_off() {
    let checker = ImportChecker::new(ImportConfig {
        resolve_local_files: false,
        ..ImportConfig::default()
    });
    let dir = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp path");
    let context = CheckContext::new().with_project_root(root);
    let artefact = SourceArtifact::python("from .forms import Form\n").with_path("views.py");

    let result = checker.check(&artefact, &context);

    assert!(result.passed());
    assert_eq!(
        messages(&result),
        ["relative import `.forms` cannot be resolved with local file resolution disabled"]
    );
}

#[rstest]
fn missing_relative_module_blocks(checker: ImportChecker) {
    let dir = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp path");
    let context = CheckContext::new().with_project_root(root);
    let artefact = SourceArtifact::python("from .forms import Form\n").with_path("views.py");

    let result = checker.check(&artefact, &context);

    assert!(!result.passed());
    assert_eq!(messages(&result), ["module `.forms` could not be resolved"]);
}

#[rstest]
fn contexts_do_not_leak_between_runs(checker: ImportChecker) {
    let artefact = SourceArtifact::python("import numpy\n");
    let with_numpy = CheckContext::new().with_available_modules(["numpy"]);
    let without = CheckContext::new();

    assert!(checker.check(&artefact, &with_numpy).passed());
    assert!(!checker.check(&artefact, &without).passed());
    assert!(checker.check(&artefact, &with_numpy).passed());
}

#[rstest]
fn non_python_artefacts_are_skipped(checker: ImportChecker, context: CheckContext) {
    let artefact = SourceArtifact::new("import x from 'y';", Language::JavaScript);

    assert_eq!(checker.check(&artefact, &context), CheckResult::pass());
}

#[rstest]
fn unparsable_artefacts_still_report_what_parses(checker: ImportChecker, context: CheckContext) {
    let result = checker.check(&SourceArtifact::python("import ghost\ndef f(:\n"), &context);

    assert!(messages(&result).iter().any(|message| message.contains("ghost")));
}

#[rstest]
fn deserialises_configuration() {
    let config: ImportConfig =
        toml::from_str("suggestion_distance = 1\nresolve_local_files = false\n").expect("valid TOML");

    assert!(config.enabled);
    assert_eq!(config.suggestion_distance, 1);
    assert!(!config.resolve_local_files);
}
