//! Execution of the `vetting` subcommands.
//!
//! Reports go to the supplied writer so tests can capture them; the binary
//! passes standard output.

use crate::cli::{CheckArgs, Cli, Command, WebArgs};
use crate::config::{ConfigError, load_config};
use crate::report::{render_human, render_json};
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::error::Error as _;
use std::fmt::Write as _;
use std::fs;
use std::io::{self, Write};
use thiserror::Error;
use vetting_common::{CheckContext, Language, SourceArtifact};
use vetting_suite::{SuiteConfig, SuiteError, build_pipeline};
use web_validators::{WebAssetKind, is_valid_web_asset};

/// Errors that stop a command before it produces a verdict.
#[derive(Debug, Error)]
pub enum CliError {
    /// The input file could not be read.
    #[error("failed to read {path}")]
    Read {
        /// File that was requested.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The language was neither given nor inferable.
    #[error("cannot infer the language of {path}; pass --language")]
    UnknownLanguage {
        /// File whose extension was not recognised.
        path: Utf8PathBuf,
    },
    /// The web asset kind was neither given nor inferable.
    #[error("cannot infer the asset kind of {path}; pass --kind")]
    UnknownWebKind {
        /// File whose extension was not recognised.
        path: Utf8PathBuf,
    },
    /// The configuration file is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The configuration names an impossible pipeline.
    #[error(transparent)]
    Suite(#[from] SuiteError),
    /// The JSON report could not be produced.
    #[error("failed to render the report")]
    Render(#[from] serde_json::Error),
    /// The report could not be written.
    #[error("failed to write the report")]
    Write(#[source] io::Error),
}

/// Verdict of a completed command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The artefact was accepted.
    Passed,
    /// The artefact was rejected.
    Failed,
}

impl Outcome {
    const fn from_passed(passed: bool) -> Self {
        if passed { Self::Passed } else { Self::Failed }
    }

    /// Returns the process exit code for the verdict.
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Passed => 0,
            Self::Failed => 1,
        }
    }
}

/// Exit code for errors that prevent a verdict.
pub const ERROR_EXIT_CODE: i32 = 2;

/// Runs the parsed command, writing its report to `stdout`.
///
/// # Errors
///
/// Returns a [`CliError`] for I/O and configuration failures. A rejected
/// artefact is an [`Outcome::Failed`], not an error.
pub fn run(cli: &Cli, stdout: &mut dyn Write) -> Result<Outcome, CliError> {
    match &cli.command {
        Command::Check(args) => run_check(args, stdout),
        Command::Web(args) => run_web(args, stdout),
    }
}

/// Maps a command result onto an exit code, reporting errors on `stderr`.
#[must_use]
pub fn exit_code_for(result: Result<Outcome, CliError>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(outcome) => outcome.exit_code(),
        Err(err) => {
            write_error_chain(stderr, &err);
            ERROR_EXIT_CODE
        }
    }
}

fn write_error_chain(stderr: &mut dyn Write, err: &CliError) {
    let mut message = format!("error: {err}");
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(message, "\n  caused by: {cause}");
        source = cause.source();
    }
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort reporting; nothing else can be done.
    }
}

fn run_check(args: &CheckArgs, stdout: &mut dyn Write) -> Result<Outcome, CliError> {
    let content = read(&args.file)?;
    let language = args
        .language
        .or_else(|| Language::from_path(&args.file))
        .ok_or_else(|| CliError::UnknownLanguage {
            path: args.file.clone(),
        })?;

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => SuiteConfig::default(),
    };
    config.fail_fast |= args.fail_fast;
    let pipeline = build_pipeline(&config)?;

    let artefact = SourceArtifact::new(content, language).with_path(absolute(&args.file));
    let mut context = CheckContext::new()
        .with_available_modules(args.available_modules.iter().cloned())
        .with_enabled_categories(args.enabled_categories.iter().cloned());
    if let Some(root) = &args.project_root {
        context = context.with_project_root(absolute(root));
    }

    let result = pipeline.run(&artefact, &context);
    debug!(
        target: "vetting",
        "{} checked: passed={} diagnostics={}",
        args.file,
        result.passed(),
        result.diagnostics().len()
    );

    let report = if args.json {
        let mut json = render_json(&result)?;
        json.push('\n');
        json
    } else {
        render_human(&result)
    };
    stdout
        .write_all(report.as_bytes())
        .map_err(CliError::Write)?;
    Ok(Outcome::from_passed(result.passed()))
}

fn run_web(args: &WebArgs, stdout: &mut dyn Write) -> Result<Outcome, CliError> {
    let content = read(&args.file)?;
    let kind = args
        .kind
        .map(WebAssetKind::from)
        .or_else(|| WebAssetKind::from_path(&args.file))
        .ok_or_else(|| CliError::UnknownWebKind {
            path: args.file.clone(),
        })?;

    let valid = is_valid_web_asset(kind, &content);
    let verdict = if valid { "valid" } else { "invalid" };
    writeln!(stdout, "{kind}: {verdict}").map_err(CliError::Write)?;
    Ok(Outcome::from_passed(valid))
}

fn read(path: &Utf8Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_owned(),
        source,
    })
}

/// Anchors `path` at the working directory so relative paths keep their
/// meaning when a separate project root is given.
fn absolute(path: &Utf8Path) -> Utf8PathBuf {
    std::path::absolute(path)
        .ok()
        .and_then(|absolute| Utf8PathBuf::from_path_buf(absolute).ok())
        .unwrap_or_else(|| path.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    struct Workspace {
        _dir: TempDir,
        root: Utf8PathBuf,
    }

    impl Workspace {
        fn write(&self, name: &str, content: &str) -> Utf8PathBuf {
            let path = self.root.join(name);
            fs::write(&path, content).expect("write fixture");
            path
        }
    }

    #[fixture]
    fn workspace() -> Workspace {
        let dir = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp path");
        Workspace { _dir: dir, root }
    }

    /// A configuration that avoids the external lint tool.
    fn offline_config(workspace: &Workspace) -> Utf8PathBuf {
        workspace.write("vetting.toml", "checkers = [\"syntax\", \"imports\"]\n")
    }

    fn run_args(args: &[&str]) -> (Result<Outcome, CliError>, String) {
        let cli = Cli::try_parse_from(std::iter::once("vetting").chain(args.iter().copied()))
            .expect("arguments parse");
        let mut stdout = Vec::new();
        let result = run(&cli, &mut stdout);
        (result, String::from_utf8(stdout).expect("utf-8 output"))
    }

    #[rstest]
    fn clean_files_pass(workspace: Workspace) {
        let config = offline_config(&workspace);
        let file = workspace.write("app.py", "import os\n\nprint(os.getcwd())\n");

        let (result, stdout) = run_args(&["check", file.as_str(), "--config", config.as_str()]);

        assert_eq!(result.expect("no error"), Outcome::Passed);
        assert_eq!(stdout, "passed\n");
    }

    #[rstest]
    fn failing_files_report_each_finding(workspace: Workspace) {
        let config = offline_config(&workspace);
        let file = workspace.write("app.py", "import os\nimport made_up_pkg\n");

        let (result, stdout) = run_args(&["check", file.as_str(), "--config", config.as_str()]);

        assert_eq!(result.expect("no error"), Outcome::Failed);
        assert!(stdout.starts_with("failed: 1 blocking, 0 informational\n"));
        assert!(stdout.contains("[blocking] imports:2:8: module `made_up_pkg` could not be resolved"));
    }

    #[rstest]
    fn declared_modules_resolve(workspace: Workspace) {
        let config = offline_config(&workspace);
        let file = workspace.write("app.py", "import made_up_pkg\n");

        let (result, _) = run_args(&[
            "check",
            file.as_str(),
            "--config",
            config.as_str(),
            "--available-module",
            "made_up_pkg",
        ]);

        assert_eq!(result.expect("no error"), Outcome::Passed);
    }

    #[rstest]
    fn json_reports_are_machine_readable(workspace: Workspace) {
        let config = offline_config(&workspace);
        let file = workspace.write("app.py", "def f(:\n");

        let (result, stdout) =
            run_args(&["check", file.as_str(), "--config", config.as_str(), "--json"]);

        assert_eq!(result.expect("no error"), Outcome::Failed);
        let value: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
        assert_eq!(value["passed"], false);
        assert_eq!(value["diagnostics"][0]["checker"], "syntax");
    }

    #[rstest]
    fn unknown_extensions_need_a_language(workspace: Workspace) {
        let file = workspace.write("snippet.txt", "x = 1\n");

        let (result, _) = run_args(&["check", file.as_str()]);

        assert!(matches!(result, Err(CliError::UnknownLanguage { .. })));
    }

    #[rstest]
    fn configuration_errors_are_reported(workspace: Workspace) {
        let config = workspace.write("vetting.toml", "checkers = [\"mypy\"]\n");
        let file = workspace.write("app.py", "x = 1\n");

        let (result, _) = run_args(&["check", file.as_str(), "--config", config.as_str()]);

        assert!(matches!(result, Err(CliError::Suite(_))));
    }

    #[rstest]
    fn missing_files_are_read_errors(workspace: Workspace) {
        let file = workspace.root.join("absent.py");

        let (result, _) = run_args(&["check", file.as_str()]);

        assert!(matches!(result, Err(CliError::Read { .. })));
    }

    #[rstest]
    #[case("site.css", "a { color: red; }\n", "css: valid\n", Outcome::Passed)]
    #[case("site.css", "a { color: red;\n", "css: invalid\n", Outcome::Failed)]
    #[case("app.js", "export const x = 1;\n", "javascript: invalid\n", Outcome::Failed)]
    fn web_validates_by_extension(
        workspace: Workspace,
        #[case] name: &str,
        #[case] content: &str,
        #[case] expected_stdout: &str,
        #[case] expected: Outcome,
    ) {
        let file = workspace.write(name, content);

        let (result, stdout) = run_args(&["web", file.as_str()]);

        assert_eq!(result.expect("no error"), expected);
        assert_eq!(stdout, expected_stdout);
    }

    #[rstest]
    fn web_needs_a_kind_for_unknown_extensions(workspace: Workspace) {
        let file = workspace.write("page.txt", "<html></html>");

        let (result, _) = run_args(&["web", file.as_str()]);

        assert!(matches!(result, Err(CliError::UnknownWebKind { .. })));
    }

    #[rstest]
    fn exit_codes_follow_the_outcome() {
        let mut stderr = Vec::new();

        assert_eq!(exit_code_for(Ok(Outcome::Passed), &mut stderr), 0);
        assert_eq!(exit_code_for(Ok(Outcome::Failed), &mut stderr), 1);
        assert!(stderr.is_empty());
    }

    #[rstest]
    fn errors_print_their_cause_chain() {
        let err = CliError::Read {
            path: Utf8PathBuf::from("gone.py"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        let mut stderr = Vec::new();

        let code = exit_code_for(Err(err), &mut stderr);

        assert_eq!(code, ERROR_EXIT_CODE);
        let text = String::from_utf8(stderr).expect("utf-8 stderr");
        assert_eq!(text, "error: failed to read gone.py\n  caused by: no such file\n");
    }
}
