//! Source artefacts submitted for verification.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Grammar tag of an artefact.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Python 3 source.
    Python,
    /// JavaScript in script mode.
    JavaScript,
    /// CSS stylesheets.
    Css,
    /// HTML documents.
    Html,
}

impl Language {
    /// Every supported language in a stable order.
    pub const ALL: [Self; 4] = [Self::Python, Self::JavaScript, Self::Css, Self::Html];

    /// Returns the lowercase tag for the language.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::Css => "css",
            Self::Html => "html",
        }
    }

    /// Infers the language from a file extension, ignoring case.
    ///
    /// # Examples
    ///
    /// ```
    /// use vetting_common::Language;
    ///
    /// assert_eq!(Language::from_extension("PY"), Some(Language::Python));
    /// assert_eq!(Language::from_extension("mjs"), Some(Language::JavaScript));
    /// assert_eq!(Language::from_extension("rs"), None);
    /// ```
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "py" | "pyi" => Some(Self::Python),
            "js" | "mjs" | "cjs" => Some(Self::JavaScript),
            "css" => Some(Self::Css),
            "htm" | "html" => Some(Self::Html),
            _ => None,
        }
    }

    /// Infers the language from a path's extension.
    #[must_use]
    pub fn from_path(path: &Utf8Path) -> Option<Self> {
        path.extension().and_then(Self::from_extension)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Error returned when a language tag is not recognised.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown language `{0}`; expected one of python, javascript, css, html")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let tag = input.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|language| language.tag() == tag || (tag == "js" && *language == Self::JavaScript))
            .ok_or_else(|| UnknownLanguage(input.to_owned()))
    }
}

/// An immutable unit of source text submitted for verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceArtifact {
    content: String,
    language: Language,
    path: Option<Utf8PathBuf>,
}

impl SourceArtifact {
    /// Creates an artefact without a path.
    ///
    /// # Examples
    ///
    /// ```
    /// use vetting_common::{Language, SourceArtifact};
    ///
    /// let artefact = SourceArtifact::new("import os\n", Language::Python);
    /// assert_eq!(artefact.language(), Language::Python);
    /// assert!(artefact.path().is_none());
    /// ```
    #[must_use]
    pub fn new(content: impl Into<String>, language: Language) -> Self {
        Self {
            content: content.into(),
            language,
            path: None,
        }
    }

    /// Creates a Python artefact.
    #[must_use]
    pub fn python(content: impl Into<String>) -> Self {
        Self::new(content, Language::Python)
    }

    /// Returns a copy of the artefact identified by `path`.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Returns the artefact text.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the grammar tag.
    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    /// Returns the path or identifier, when one was supplied.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8Path> {
        self.path.as_deref()
    }
}
