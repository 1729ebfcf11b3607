//! Shared data model for vetting checkers.
//!
//! This crate defines the artefact and context a checker receives, the
//! diagnostics and results it produces, the [`Checker`] capability itself,
//! the tree-sitter grammars every checker parses with, and the edit-distance
//! helper behind "did you mean" suggestions.

pub mod artefact;
pub mod checker;
pub mod context;
pub mod diagnostics;
pub mod grammar;
pub mod span;
pub mod suggest;
#[cfg(feature = "test-support")]
pub mod test_support;

pub use artefact::{Language, SourceArtifact, UnknownLanguage};
pub use checker::{CheckResult, Checker};
pub use context::CheckContext;
pub use diagnostics::{Diagnostic, DiagnosticBuilder, DiagnosticKind, Severity, report};
pub use grammar::{ParseFailure, SyntaxError, SyntaxProblem, node_text, parse, syntax_errors};
pub use span::SourceLocation;
