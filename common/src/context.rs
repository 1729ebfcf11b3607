//! Caller-supplied context accompanying an artefact.
//!
//! The context carries everything a checker may consult beyond the artefact
//! text itself. Checkers only read it; nothing here is cached between runs,
//! so one pipeline can serve unrelated projects without cross-contamination.

use camino::{Utf8Path, Utf8PathBuf};
use std::collections::BTreeSet;

/// Immutable verification context owned by the caller.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckContext {
    available_modules: BTreeSet<String>,
    project_root: Option<Utf8PathBuf>,
    enabled_categories: BTreeSet<String>,
}

impl CheckContext {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares module names that are installed or otherwise resolvable.
    ///
    /// # Examples
    ///
    /// ```
    /// use vetting_common::CheckContext;
    ///
    /// let context = CheckContext::new().with_available_modules(["requests", "numpy"]);
    /// assert!(context.is_available("numpy"));
    /// assert!(!context.is_available("pandas"));
    /// ```
    #[must_use]
    pub fn with_available_modules<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.available_modules
            .extend(modules.into_iter().map(Into::into));
        self
    }

    /// Sets the project root used for local module resolution.
    #[must_use]
    pub fn with_project_root(mut self, root: impl Into<Utf8PathBuf>) -> Self {
        self.project_root = Some(root.into());
        self
    }

    /// Enables additional rule categories for lint backends.
    #[must_use]
    pub fn with_enabled_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enabled_categories
            .extend(categories.into_iter().map(Into::into));
        self
    }

    /// Returns the declared-available module names.
    #[must_use]
    pub const fn available_modules(&self) -> &BTreeSet<String> {
        &self.available_modules
    }

    /// Returns `true` when `module` was declared available.
    #[must_use]
    pub fn is_available(&self, module: &str) -> bool {
        self.available_modules.contains(module)
    }

    /// Returns the project root, when supplied.
    #[must_use]
    pub fn project_root(&self) -> Option<&Utf8Path> {
        self.project_root.as_deref()
    }

    /// Returns the extra rule categories to enable.
    #[must_use]
    pub const fn enabled_categories(&self) -> &BTreeSet<String> {
        &self.enabled_categories
    }
}
