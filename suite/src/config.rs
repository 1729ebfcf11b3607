//! Suite configuration and pipeline assembly.

use crate::checkers::{CheckerKind, UnknownChecker, suite_checker_names};
use crate::pipeline::CheckerPipeline;
use attribute_checker::{AttributeChecker, AttributeConfig};
use import_checker::{ImportChecker, ImportConfig};
use log::debug;
use pylint_checker::backend::BackendError;
use pylint_checker::{PylintChecker, PylintConfig};
use serde::Deserialize;
use std::sync::Arc;
use syntax_checker::{SyntaxChecker, SyntaxConfig};
use thiserror::Error;
use vetting_common::Checker;

/// Configuration for a whole pipeline.
///
/// # TOML Configuration
///
/// ```toml
/// fail_fast = true
/// checkers = ["syntax", "imports", "pylint"]
///
/// [imports]
/// suggestion_distance = 1
///
/// [pylint]
/// disable = ["C0114"]
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SuiteConfig {
    /// Stop at the first failing checker.
    pub fail_fast: bool,
    /// Checker names in run order. Names may repeat.
    pub checkers: Vec<String>,
    /// Settings for the syntax checker.
    pub syntax: SyntaxConfig,
    /// Settings for the import checker.
    pub imports: ImportConfig,
    /// Settings for the attribute checker.
    pub attributes: AttributeConfig,
    /// Settings for the lint checker.
    pub pylint: PylintConfig,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            checkers: suite_checker_names().map(str::to_owned).collect(),
            syntax: SyntaxConfig::default(),
            imports: ImportConfig::default(),
            attributes: AttributeConfig::default(),
            pylint: PylintConfig::default(),
        }
    }
}

/// Configuration problems detected while assembling a pipeline.
#[derive(Debug, Error)]
pub enum SuiteError {
    /// A configured checker name is not registered.
    #[error(transparent)]
    UnknownChecker(#[from] UnknownChecker),
    /// A required external tool could not be started.
    #[error("required tool for checker `{checker}` is unavailable")]
    ToolUnavailable {
        /// Checker that needs the tool.
        checker: &'static str,
        /// Underlying backend failure.
        #[source]
        source: BackendError,
    },
}

/// Assembles the pipeline described by `config`.
///
/// Disabled checkers are still placed in the pipeline so its order mirrors
/// the configuration; the pipeline skips them at run time.
///
/// # Errors
///
/// Returns [`SuiteError::UnknownChecker`] for an unregistered name and
/// [`SuiteError::ToolUnavailable`] when `pylint.require_tool` is set and the
/// tool cannot be started.
///
/// # Examples
///
/// ```
/// use vetting_suite::{SuiteConfig, build_pipeline};
///
/// let config = SuiteConfig {
///     checkers: vec!["syntax".to_owned(), "imports".to_owned()],
///     ..SuiteConfig::default()
/// };
/// let pipeline = build_pipeline(&config).expect("known checkers");
/// assert_eq!(pipeline.checker_names(), ["syntax", "imports"]);
/// ```
pub fn build_pipeline(config: &SuiteConfig) -> Result<CheckerPipeline, SuiteError> {
    let kinds = config
        .checkers
        .iter()
        .map(|name| name.parse::<CheckerKind>())
        .collect::<Result<Vec<_>, _>>()?;

    let mut checkers = Vec::with_capacity(kinds.len());
    for kind in kinds {
        checkers.push(instantiate(kind, config)?);
    }

    let mut pipeline = CheckerPipeline::new().with_fail_fast(config.fail_fast);
    pipeline.add(checkers);
    debug!(
        target: "vetting_suite",
        "assembled pipeline {:?} (fail_fast: {})",
        pipeline.checker_names(),
        config.fail_fast
    );
    Ok(pipeline)
}

fn instantiate(kind: CheckerKind, config: &SuiteConfig) -> Result<Arc<dyn Checker>, SuiteError> {
    let checker: Arc<dyn Checker> = match kind {
        CheckerKind::Syntax => Arc::new(SyntaxChecker::new(config.syntax.clone())),
        CheckerKind::Imports => Arc::new(ImportChecker::new(config.imports.clone())),
        CheckerKind::Attributes => Arc::new(AttributeChecker::new(config.attributes.clone())),
        CheckerKind::Pylint => {
            let checker = PylintChecker::new(config.pylint.clone());
            if config.pylint.enabled && config.pylint.require_tool {
                checker
                    .probe()
                    .map_err(|source| SuiteError::ToolUnavailable {
                        checker: kind.name(),
                        source,
                    })?;
            }
            Arc::new(checker)
        }
    };
    Ok(checker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use vetting_common::{CheckContext, SourceArtifact};

    fn names(config: &SuiteConfig) -> Vec<&'static str> {
        build_pipeline(config)
            .expect("pipeline assembles")
            .checker_names()
    }

    #[rstest]
    fn defaults_follow_the_registry() {
        let config = SuiteConfig::default();

        assert!(!config.fail_fast);
        assert!(!config.attributes.enabled);
        assert_eq!(names(&config), ["syntax", "imports", "attributes", "pylint"]);
    }

    #[rstest]
    fn configured_order_and_duplicates_are_kept() {
        let config = SuiteConfig {
            checkers: vec!["imports".into(), "syntax".into(), "imports".into()],
            ..SuiteConfig::default()
        };

        assert_eq!(names(&config), ["imports", "syntax", "imports"]);
    }

    #[rstest]
    fn unknown_names_are_configuration_errors() {
        let config = SuiteConfig {
            checkers: vec!["syntax".into(), "mypy".into()],
            ..SuiteConfig::default()
        };

        let error = build_pipeline(&config).expect_err("mypy is not registered");

        assert!(matches!(
            error,
            SuiteError::UnknownChecker(UnknownChecker(ref name)) if name == "mypy"
        ));
    }

    #[rstest]
    fn missing_required_tools_fail_assembly() {
        let mut config = SuiteConfig {
            checkers: vec!["pylint".into()],
            ..SuiteConfig::default()
        };
        config.pylint.program = "vetting-no-such-linter".into();
        config.pylint.require_tool = true;

        let error = build_pipeline(&config).expect_err("tool is missing");

        assert!(matches!(
            error,
            SuiteError::ToolUnavailable {
                checker: "pylint",
                ..
            }
        ));
    }

    #[rstest]
    fn missing_optional_tools_surface_at_check_time() {
        let mut config = SuiteConfig {
            checkers: vec!["pylint".into()],
            ..SuiteConfig::default()
        };
        config.pylint.program = "vetting-no-such-linter".into();

        let pipeline = build_pipeline(&config).expect("tool is optional");
        let result = pipeline.run(&SourceArtifact::python("x = 1\n"), &CheckContext::new());

        assert!(!result.passed());
        assert_eq!(result.diagnostics()[0].checker(), "pylint");
    }

    #[rstest]
    fn assembled_pipelines_run_the_real_checkers() {
        let config = SuiteConfig {
            checkers: vec!["syntax".into(), "imports".into()],
            ..SuiteConfig::default()
        };
        let pipeline = build_pipeline(&config).expect("pipeline assembles");
        let artefact = SourceArtifact::python("import os\nimport made_up_pkg\n");

        let result = pipeline.run(&artefact, &CheckContext::new());

        assert!(!result.passed());
        assert_eq!(result.diagnostics().len(), 1);
        assert_eq!(result.diagnostics()[0].checker(), "imports");
    }

    #[rstest]
    fn deserialises_nested_tables() {
        let config: SuiteConfig = toml::from_str(
            r#"
fail_fast = true
checkers = ["syntax", "attributes"]

[attributes]
enabled = true
blocking_confidence = "medium"

[pylint]
disable = ["C0114"]
"#,
        )
        .expect("valid TOML");

        assert!(config.fail_fast);
        assert_eq!(config.checkers, ["syntax", "attributes"]);
        assert!(config.attributes.enabled);
        assert_eq!(config.pylint.disable, ["C0114"]);
        assert_eq!(config.imports, ImportConfig::default());
    }

    #[rstest]
    fn rejects_unknown_keys() {
        let error = toml::from_str::<SuiteConfig>("fail_fats = true\n").expect_err("typo");

        assert!(error.to_string().contains("fail_fats"));
    }
}
