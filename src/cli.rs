//! Command-line argument definitions for `vetting`.
//!
//! Parsing lives here so the binary stays a thin wrapper around
//! [`crate::commands::run`].

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand, ValueEnum};
use vetting_common::Language;
use web_validators::WebAssetKind;

/// Statically verify generated source artefacts.
#[derive(Parser, Debug)]
#[command(name = "vetting")]
#[command(version, about)]
#[command(after_help = concat!(
    "EXIT STATUS:\n",
    "  0  the artefact passed\n",
    "  1  the artefact failed\n",
    "  2  usage, I/O or configuration error\n\n",
    "EXAMPLES:\n",
    "  Check a generated module, declaring a third-party dependency:\n",
    "    $ vetting check out/app.py --available-module requests\n\n",
    "  Validate a style sheet:\n",
    "    $ vetting web out/site.css\n",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the checker pipeline over a source file.
    Check(CheckArgs),

    /// Validate a CSS, HTML or JavaScript file.
    Web(WebArgs),
}

/// Arguments for the check command.
#[derive(Parser, Debug, Clone)]
pub struct CheckArgs {
    /// Source file to check.
    #[arg(value_name = "FILE")]
    pub file: Utf8PathBuf,

    /// Grammar to parse with [default: inferred from the extension].
    #[arg(short, long, value_name = "LANG")]
    pub language: Option<Language>,

    /// Configuration file [default: built-in defaults].
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Module the artefact may import (can be repeated).
    #[arg(long = "available-module", value_name = "MODULE")]
    pub available_modules: Vec<String>,

    /// Directory searched for local modules.
    #[arg(long, value_name = "DIR")]
    pub project_root: Option<Utf8PathBuf>,

    /// Extra lint category to enable (can be repeated).
    #[arg(long = "enable-category", value_name = "CATEGORY")]
    pub enabled_categories: Vec<String>,

    /// Stop at the first failing checker.
    #[arg(long)]
    pub fail_fast: bool,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the web command.
#[derive(Parser, Debug, Clone)]
pub struct WebArgs {
    /// Asset to validate.
    #[arg(value_name = "FILE")]
    pub file: Utf8PathBuf,

    /// Asset kind [default: inferred from the extension].
    #[arg(short, long, value_enum)]
    pub kind: Option<WebKind>,
}

/// Web asset kinds accepted on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum WebKind {
    /// Style sheet.
    Css,
    /// HTML document.
    Html,
    /// Classic script.
    Javascript,
}

impl From<WebKind> for WebAssetKind {
    fn from(kind: WebKind) -> Self {
        match kind {
            WebKind::Css => Self::Css,
            WebKind::Html => Self::Html,
            WebKind::Javascript => Self::JavaScript,
        }
    }
}
