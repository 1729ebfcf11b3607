//! Tree-sitter grammars and shared parse helpers.
//!
//! Tree-sitter never rejects input outright: a malformed artefact still
//! yields a tree, with `ERROR` and `MISSING` nodes marking where recovery
//! happened. [`syntax_errors`] turns those nodes into positioned findings.

use crate::artefact::Language;
use crate::span::SourceLocation;
use std::fmt;
use thiserror::Error;
use tree_sitter::{Language as Grammar, LanguageError, Node, Parser, Tree};

const SNIPPET_CHARS: usize = 40;

/// Failures of the parsing machinery itself, as opposed to malformed input.
#[derive(Debug, Error)]
pub enum ParseFailure {
    /// The bundled grammar is incompatible with the linked tree-sitter runtime.
    #[error("failed to load the {language} grammar: {source}")]
    Grammar {
        /// Language whose grammar failed to load.
        language: Language,
        /// Underlying version mismatch.
        #[source]
        source: LanguageError,
    },
    /// The parser returned no tree.
    #[error("the {0} parser produced no syntax tree")]
    NoTree(Language),
}

/// Returns the tree-sitter grammar for `language`.
#[must_use]
pub fn grammar(language: Language) -> Grammar {
    match language {
        Language::Python => tree_sitter_python::LANGUAGE.into(),
        Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        Language::Css => tree_sitter_css::LANGUAGE.into(),
        Language::Html => tree_sitter_html::LANGUAGE.into(),
    }
}

/// Parses `source` with the grammar for `language`.
///
/// # Errors
///
/// Returns [`ParseFailure`] when the grammar cannot be loaded or the parser
/// yields no tree. Malformed source is not an error; inspect the tree with
/// [`syntax_errors`].
///
/// # Examples
///
/// ```
/// use vetting_common::Language;
/// use vetting_common::grammar::parse;
///
/// let tree = parse(Language::Python, "x = 1\n")?;
/// assert_eq!(tree.root_node().kind(), "module");
/// # Ok::<(), vetting_common::grammar::ParseFailure>(())
/// ```
pub fn parse(language: Language, source: &str) -> Result<Tree, ParseFailure> {
    let mut parser = Parser::new();
    parser
        .set_language(&grammar(language))
        .map_err(|source| ParseFailure::Grammar { language, source })?;
    parser
        .parse(source, None)
        .ok_or(ParseFailure::NoTree(language))
}

/// Returns the source text covered by `node`.
#[must_use]
pub fn node_text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or_default()
}

/// What went wrong at a syntax error site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyntaxProblem {
    /// The parser skipped over text it could not place.
    Unexpected(String),
    /// The parser inserted a token the source lacks.
    Missing(String),
}

/// A positioned grammar violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntaxError {
    location: SourceLocation,
    problem: SyntaxProblem,
}

impl SyntaxError {
    /// Returns the one-based start of the offending region.
    #[must_use]
    pub const fn location(&self) -> SourceLocation {
        self.location
    }

    /// Returns the kind of violation.
    #[must_use]
    pub const fn problem(&self) -> &SyntaxProblem {
        &self.problem
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.problem {
            SyntaxProblem::Missing(token) => write!(f, "missing '{token}'"),
            SyntaxProblem::Unexpected(snippet) if snippet.is_empty() => f.write_str("invalid syntax"),
            SyntaxProblem::Unexpected(snippet) => write!(f, "invalid syntax near '{snippet}'"),
        }
    }
}

/// Collects up to `limit` syntax errors from `tree` in source order.
///
/// Errors nested inside an already reported `ERROR` node are skipped. A tree
/// flagged as erroneous always yields at least one entry when `limit > 0`.
///
/// # Examples
///
/// ```
/// use vetting_common::Language;
/// use vetting_common::grammar::{parse, syntax_errors};
///
/// let source = "def f(:\n";
/// let tree = parse(Language::Python, source)?;
/// let errors = syntax_errors(&tree, source, 10);
/// assert!(!errors.is_empty());
/// assert_eq!(errors[0].location().line(), 1);
/// # Ok::<(), vetting_common::grammar::ParseFailure>(())
/// ```
#[must_use]
pub fn syntax_errors(tree: &Tree, source: &str, limit: usize) -> Vec<SyntaxError> {
    let root = tree.root_node();
    let mut errors = Vec::new();
    if !root.has_error() || limit == 0 {
        return errors;
    }

    collect_errors(root, source, limit, &mut errors);
    if errors.is_empty() {
        errors.push(SyntaxError {
            location: SourceLocation::of_node(root),
            problem: SyntaxProblem::Unexpected(String::new()),
        });
    }
    errors
}

fn collect_errors(node: Node<'_>, source: &str, limit: usize, errors: &mut Vec<SyntaxError>) {
    if errors.len() >= limit {
        return;
    }
    if node.is_missing() {
        errors.push(SyntaxError {
            location: SourceLocation::of_node(node),
            problem: SyntaxProblem::Missing(node.kind().to_owned()),
        });
        return;
    }
    if node.is_error() {
        errors.push(SyntaxError {
            location: SourceLocation::of_node(node),
            problem: SyntaxProblem::Unexpected(snippet(node_text(node, source))),
        });
        return;
    }
    if !node.has_error() {
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_errors(child, source, limit, errors);
    }
}

fn snippet(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or_default().trim();
    first_line.chars().take(SNIPPET_CHARS).collect()
}
