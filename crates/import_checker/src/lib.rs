//! Checker that resolves every module a Python artefact imports.
//!
//! Each reference is classified as standard library, declared available by
//! the caller, a local project file, or unresolved. A name imported from a
//! local package that is not a submodule is informational when the
//! package's `__init__.py` could define it. Unresolved references
//! are blocking [`DiagnosticKind::UnresolvedImport`] findings, with a
//! suggestion when a known module name is a small edit away. Everything the
//! checker consults arrives through the artefact and its [`CheckContext`].

pub mod extract;
pub mod resolve;
pub mod stdlib;

use crate::extract::{ImportReference, collect_imports};
use crate::resolve::{Resolution, Resolver};
use crate::stdlib::stdlib_modules;
use log::{debug, warn};
use serde::Deserialize;
use vetting_common::{
    CheckContext, CheckResult, Checker, Diagnostic, DiagnosticKind, Language, SourceArtifact,
    parse, report, suggest::closest_match,
};

/// Name recorded on every diagnostic this checker emits.
pub const CHECKER_NAME: &str = "imports";

/// Configuration for [`ImportChecker`].
///
/// # TOML Configuration
///
/// ```toml
/// [imports]
/// suggestion_distance = 1
/// resolve_local_files = false
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ImportConfig {
    /// Whether the checker runs at all.
    pub enabled: bool,
    /// Largest edit distance at which a known module is suggested.
    pub suggestion_distance: usize,
    /// Whether imports may resolve to files below the project root or the
    /// artefact's directory.
    pub resolve_local_files: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            suggestion_distance: 2,
            resolve_local_files: true,
        }
    }
}

/// Module resolution checker.
#[derive(Clone, Debug, Default)]
pub struct ImportChecker {
    config: ImportConfig,
}

impl ImportChecker {
    /// Creates a checker with the given configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use import_checker::{ImportChecker, ImportConfig};
    /// use vetting_common::{CheckContext, Checker, SourceArtifact};
    ///
    /// let checker = ImportChecker::new(ImportConfig::default());
    /// let context = CheckContext::new().with_available_modules(["os", "json"]);
    /// let artefact = SourceArtifact::python("import os\nimport made_up_pkg\n");
    ///
    /// let result = checker.check(&artefact, &context);
    /// assert!(!result.passed());
    /// assert_eq!(result.diagnostics().len(), 1);
    /// assert!(result.diagnostics()[0].message().contains("made_up_pkg"));
    /// ```
    #[must_use]
    pub const fn new(config: ImportConfig) -> Self {
        Self { config }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &ImportConfig {
        &self.config
    }

    fn diagnose(
        &self,
        reference: &ImportReference,
        resolution: Resolution,
        context: &CheckContext,
    ) -> Option<Diagnostic> {
        let name = reference.display_name();
        let diagnostic = match resolution {
            Resolution::Stdlib | Resolution::Declared | Resolution::Local(_) => return None,
            Resolution::Undecidable(reason) => report(
                CHECKER_NAME,
                DiagnosticKind::UnresolvedImport,
                format!("relative import `{name}` cannot be resolved {reason}"),
            )
            .informational(),
            Resolution::PossiblyDefined(init) => report(
                CHECKER_NAME,
                DiagnosticKind::UnresolvedImport,
                format!("`{name}` is not a module; it may be defined in {init}"),
            )
            .informational(),
            Resolution::Unresolved if reference.guarded => report(
                CHECKER_NAME,
                DiagnosticKind::UnresolvedImport,
                format!("optional module `{name}` could not be resolved"),
            )
            .informational(),
            Resolution::Unresolved => {
                let mut message = format!("module `{name}` could not be resolved");
                if let Some(candidate) = self.suggestion(reference, context) {
                    message.push_str(&format!("; did you mean `{candidate}`?"));
                }
                report(CHECKER_NAME, DiagnosticKind::UnresolvedImport, message)
            }
        };
        Some(diagnostic.at(reference.location).build())
    }

    fn suggestion<'c>(
        &self,
        reference: &ImportReference,
        context: &'c CheckContext,
    ) -> Option<&'c str> {
        if reference.level > 0 {
            return None;
        }
        let candidates = context
            .available_modules()
            .iter()
            .map(String::as_str)
            .chain(stdlib_modules().map(widen));
        closest_match(
            reference.top_level(),
            candidates,
            self.config.suggestion_distance,
        )
    }
}

fn widen<'c>(module: &'static str) -> &'c str {
    module
}

impl Checker for ImportChecker {
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

        let references = collect_imports(tree.root_node(), source);
        let resolver = Resolver::new(artifact, context, self.config.resolve_local_files);
        let diagnostics: Vec<_> = references
            .iter()
            .filter_map(|reference| self.diagnose(reference, resolver.resolve(reference), context))
            .collect();

        debug!(
            target: CHECKER_NAME,
            "{} import(s), {} finding(s)",
            references.len(),
            diagnostics.len()
        );
        CheckResult::from_diagnostics(diagnostics)
    }
}

#[cfg(test)]
mod tests;
