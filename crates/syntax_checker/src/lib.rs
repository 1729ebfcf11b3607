//! Checker that parses an artefact against the grammar for its language.
//!
//! Every `ERROR` or `MISSING` node the parser produces becomes a blocking
//! [`DiagnosticKind::ParseError`], positioned where recovery began. An
//! empty artefact is an empty module and passes.
//!
//! Python artefacts must also parse as Python 3. That verdict decides the
//! outcome: when it fails, its error leads and tree-sitter findings on later
//! lines follow it.

mod python;

use log::{debug, warn};
use serde::Deserialize;
use vetting_common::{
    CheckContext, CheckResult, Checker, Diagnostic, DiagnosticKind, Language, SourceArtifact,
    SourceLocation, parse, report, syntax_errors,
};

/// Name recorded on every diagnostic this checker emits.
pub const CHECKER_NAME: &str = "syntax";

/// Configuration for [`SyntaxChecker`].
///
/// # TOML Configuration
///
/// ```toml
/// [syntax]
/// max_errors = 5
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SyntaxConfig {
    /// Whether the checker runs at all.
    pub enabled: bool,
    /// Upper bound on reported errors per artefact.
    pub max_errors: usize,
}

impl Default for SyntaxConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_errors: 10,
        }
    }
}

/// Grammar conformance checker.
#[derive(Clone, Debug, Default)]
pub struct SyntaxChecker {
    config: SyntaxConfig,
}

impl SyntaxChecker {
    /// Creates a checker with the given configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use syntax_checker::{SyntaxChecker, SyntaxConfig};
    /// use vetting_common::{CheckContext, Checker, SourceArtifact};
    ///
    /// let checker = SyntaxChecker::new(SyntaxConfig::default());
    /// let result = checker.check(&SourceArtifact::python("def f(:\n"), &CheckContext::new());
    /// assert!(!result.passed());
    /// ```
    #[must_use]
    pub const fn new(config: SyntaxConfig) -> Self {
        Self { config }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &SyntaxConfig {
        &self.config
    }
}

impl Checker for SyntaxChecker {
    fn name(&self) -> &'static str {
        CHECKER_NAME
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn check(&self, artifact: &SourceArtifact, _context: &CheckContext) -> CheckResult {
        if !self.config.enabled {
            return CheckResult::pass();
        }

        let source = artifact.content();
        let tree = match parse(artifact.language(), source) {
            Ok(tree) => tree,
            Err(failure) => {
                warn!(target: CHECKER_NAME, "{failure}");
                return CheckResult::from_diagnostics(vec![
                    report(CHECKER_NAME, DiagnosticKind::ParseError, failure.to_string()).build(),
                ]);
            }
        };

        // A failing artefact always reports at least one error.
        let limit = self.config.max_errors.max(1);
        let tree_errors = syntax_errors(&tree, source, limit)
            .into_iter()
            .map(|error| (error.location(), error.to_string()));
        let diagnostics: Vec<_> = if artifact.language() == Language::Python {
            python_diagnostics(artifact, tree_errors, limit)
        } else {
            tree_errors.map(parse_error).collect()
        };

        debug!(
            target: CHECKER_NAME,
            "{} artefact produced {} syntax error(s)",
            artifact.language(),
            diagnostics.len()
        );
        CheckResult::from_diagnostics(diagnostics)
    }
}

fn parse_error((location, message): (SourceLocation, String)) -> Diagnostic {
    report(CHECKER_NAME, DiagnosticKind::ParseError, message)
        .at(location)
        .build()
}

fn python_diagnostics(
    artifact: &SourceArtifact,
    tree_errors: impl Iterator<Item = (SourceLocation, String)>,
    limit: usize,
) -> Vec<Diagnostic> {
    let path = artifact
        .path()
        .map_or_else(|| "<artefact>".to_owned(), ToString::to_string);
    let Some(first) = python::first_error(artifact.content(), &path) else {
        return Vec::new();
    };

    let first_line = first.location.line();
    std::iter::once((first.location, first.message))
        .chain(tree_errors.filter(|(location, _)| location.line() > first_line))
        .take(limit)
        .map(parse_error)
        .collect()
}

#[cfg(test)]
mod tests;
