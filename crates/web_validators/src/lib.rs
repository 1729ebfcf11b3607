//! Coarse validity gates for generated web assets.
//!
//! Each `is_valid_*` predicate answers a single question, whether the asset
//! may be accepted, and never panics or returns an error. The `validate_*`
//! companions carry the reason as a [`Rejection`]; the predicates log it
//! and collapse it to `false`.

mod css;
mod html;
mod javascript;

use camino::Utf8Path;
use log::{debug, warn};
use std::any::Any;
use std::fmt;
use std::panic;
use thiserror::Error;
use tree_sitter::{Node, Tree};
use vetting_common::{Language, SourceLocation, parse, syntax_errors};

const LOG_TARGET: &str = "web_validators";

/// Why an asset was rejected.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Rejection {
    /// The asset has no content.
    #[error("content is empty")]
    Empty,

    /// The grammar could not account for part of the content.
    #[error("syntax error at line {line}, column {column}")]
    Syntax {
        /// One-based line of the first error.
        line: usize,
        /// One-based column of the first error.
        column: usize,
    },

    /// A structurally required HTML element is absent.
    #[error("required <{0}> element is missing")]
    MissingElement(&'static str),

    /// `import`, `export` or `import.meta` in a classic script.
    #[error("module syntax is not allowed in a script (line {line})")]
    ModuleSyntax {
        /// One-based line of the offending statement.
        line: usize,
    },

    /// A script that parses but breaks a static rule of the language.
    #[error("{reason} at line {line}, column {column}")]
    EarlyError {
        /// One-based line of the offending construct.
        line: usize,
        /// One-based column of the offending construct.
        column: usize,
        /// The rule that was broken.
        reason: &'static str,
    },

    /// JSX markup, which no browser executes directly.
    #[error("JSX markup is not JavaScript (line {line})")]
    Jsx {
        /// One-based line of the markup.
        line: usize,
    },

    /// The validator itself failed; the content was not judged.
    #[error("validator failure: {0}")]
    Internal(String),
}

impl Rejection {
    /// Returns `true` when the rejection reflects a validator fault rather
    /// than a property of the content.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }

    fn syntax_at(location: SourceLocation) -> Self {
        Self::Syntax {
            line: location.line(),
            column: location.column(),
        }
    }
}

/// The kinds of web asset with a validator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WebAssetKind {
    /// Cascading style sheet.
    Css,
    /// HTML document.
    Html,
    /// Classic (non-module) script.
    JavaScript,
}

impl WebAssetKind {
    /// Infers the kind from a file extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use web_validators::WebAssetKind;
    ///
    /// assert_eq!(WebAssetKind::from_path(Utf8Path::new("site/index.HTML")), Some(WebAssetKind::Html));
    /// assert_eq!(WebAssetKind::from_path(Utf8Path::new("app.py")), None);
    /// ```
    #[must_use]
    pub fn from_path(path: &Utf8Path) -> Option<Self> {
        match Language::from_path(path)? {
            Language::Css => Some(Self::Css),
            Language::Html => Some(Self::Html),
            Language::JavaScript => Some(Self::JavaScript),
            Language::Python => None,
        }
    }

    const fn language(self) -> Language {
        match self {
            Self::Css => Language::Css,
            Self::Html => Language::Html,
            Self::JavaScript => Language::JavaScript,
        }
    }
}

impl fmt::Display for WebAssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.language().fmt(f)
    }
}

/// Validates a style sheet.
///
/// # Errors
///
/// Returns the first [`Rejection`] found.
pub fn validate_css(content: &str) -> Result<(), Rejection> {
    guarded(WebAssetKind::Css, content)
}

/// Validates an HTML document, which must spell out `html`, `head` and
/// `body` elements.
///
/// # Errors
///
/// Returns the first [`Rejection`] found.
pub fn validate_html(content: &str) -> Result<(), Rejection> {
    guarded(WebAssetKind::Html, content)
}

/// Validates a classic script.
///
/// # Errors
///
/// Returns the first [`Rejection`] found.
pub fn validate_javascript(content: &str) -> Result<(), Rejection> {
    guarded(WebAssetKind::JavaScript, content)
}

/// Returns `true` when `content` is a well-formed style sheet.
///
/// # Examples
///
/// ```
/// use web_validators::is_valid_css;
///
/// assert!(is_valid_css("a { color: red; }"));
/// assert!(!is_valid_css("a { color: }"));
/// ```
#[must_use]
pub fn is_valid_css(content: &str) -> bool {
    is_valid_web_asset(WebAssetKind::Css, content)
}

/// Returns `true` when `content` is an HTML document with explicit `html`,
/// `head` and `body` elements.
///
/// # Examples
///
/// ```
/// use web_validators::is_valid_html;
///
/// assert!(is_valid_html("<html><head></head><body></body></html>"));
/// assert!(!is_valid_html(""));
/// ```
#[must_use]
pub fn is_valid_html(content: &str) -> bool {
    is_valid_web_asset(WebAssetKind::Html, content)
}

/// Returns `true` when `content` parses as a classic script.
///
/// # Examples
///
/// ```
/// use web_validators::is_valid_javascript;
///
/// assert!(is_valid_javascript("let x = 1;"));
/// assert!(!is_valid_javascript("let x = ;"));
/// ```
#[must_use]
pub fn is_valid_javascript(content: &str) -> bool {
    is_valid_web_asset(WebAssetKind::JavaScript, content)
}

/// Dispatches to the validator for `kind`, logging any rejection.
#[must_use]
pub fn is_valid_web_asset(kind: WebAssetKind, content: &str) -> bool {
    match guarded(kind, content) {
        Ok(()) => true,
        Err(rejection) if rejection.is_internal() => {
            warn!(target: LOG_TARGET, "{kind} validation failed: {rejection}");
            false
        }
        Err(rejection) => {
            debug!(target: LOG_TARGET, "{kind} rejected: {rejection}");
            false
        }
    }
}

fn guarded(kind: WebAssetKind, content: &str) -> Result<(), Rejection> {
    panic::catch_unwind(|| validate(kind, content))
        .unwrap_or_else(|payload| Err(Rejection::Internal(panic_message(payload.as_ref()))))
}

fn validate(kind: WebAssetKind, content: &str) -> Result<(), Rejection> {
    match kind {
        WebAssetKind::Css => css::validate(content),
        WebAssetKind::Html => html::validate(content),
        WebAssetKind::JavaScript => javascript::validate(content),
    }
}

/// Parses `content`, tolerating whatever the grammar recovered from.
fn parse_lenient(kind: WebAssetKind, content: &str) -> Result<Tree, Rejection> {
    parse(kind.language(), content).map_err(|failure| Rejection::Internal(failure.to_string()))
}

/// Parses `content` and rejects it at the first syntax error.
fn parse_strict(kind: WebAssetKind, content: &str) -> Result<Tree, Rejection> {
    let tree = parse_lenient(kind, content)?;
    match syntax_errors(&tree, content, 1).first() {
        Some(error) => Err(Rejection::syntax_at(error.location())),
        None => Ok(tree),
    }
}

/// Finds the first node in `root`, in document order, matching `predicate`.
fn find_node<'t>(root: Node<'t>, predicate: &impl Fn(Node<'t>) -> bool) -> Option<Node<'t>> {
    if predicate(root) {
        return Some(root);
    }
    let mut cursor = root.walk();
    let children: Vec<_> = root.named_children(&mut cursor).collect();
    children.into_iter().find_map(|child| find_node(child, predicate))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic with a non-string payload".to_owned())
}
