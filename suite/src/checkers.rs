//! Registry of the checkers the suite can assemble.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The closed set of checker variants.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CheckerKind {
    /// Grammar conformance.
    Syntax,
    /// Module resolution.
    Imports,
    /// Attribute existence on inferable values.
    Attributes,
    /// External lint tool.
    Pylint,
}

/// Minimal metadata describing a registered checker.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CheckerDescriptor {
    /// Variant the descriptor belongs to.
    pub kind: CheckerKind,
    /// Stable name used in configuration and diagnostics.
    pub name: &'static str,
    /// Crate that implements the checker.
    pub crate_name: &'static str,
    /// Whether the checker runs when its table does not say otherwise.
    pub enabled_by_default: bool,
}

/// Every checker the suite knows, in default pipeline order.
pub const SUITE_CHECKERS: &[CheckerDescriptor] = &[
    CheckerDescriptor {
        kind: CheckerKind::Syntax,
        name: syntax_checker::CHECKER_NAME,
        crate_name: "syntax_checker",
        enabled_by_default: true,
    },
    CheckerDescriptor {
        kind: CheckerKind::Imports,
        name: import_checker::CHECKER_NAME,
        crate_name: "import_checker",
        enabled_by_default: true,
    },
    CheckerDescriptor {
        kind: CheckerKind::Attributes,
        name: attribute_checker::CHECKER_NAME,
        crate_name: "attribute_checker",
        enabled_by_default: false,
    },
    CheckerDescriptor {
        kind: CheckerKind::Pylint,
        name: pylint_checker::CHECKER_NAME,
        crate_name: "pylint_checker",
        enabled_by_default: true,
    },
];

impl CheckerKind {
    /// Returns the registry entry for this variant.
    #[must_use]
    pub const fn descriptor(self) -> &'static CheckerDescriptor {
        // `SUITE_CHECKERS` lists the variants in declaration order.
        &SUITE_CHECKERS[self as usize]
    }

    /// Returns the stable checker name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        self.descriptor().name
    }
}

impl fmt::Display for CheckerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a configured checker name is not registered.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error(
    "unknown checker `{}`; expected one of {}",
    .0,
    suite_checker_names().collect::<Vec<_>>().join(", ")
)]
pub struct UnknownChecker(pub String);

impl FromStr for CheckerKind {
    type Err = UnknownChecker;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        SUITE_CHECKERS
            .iter()
            .find(|descriptor| descriptor.name == name)
            .map(|descriptor| descriptor.kind)
            .ok_or_else(|| UnknownChecker(name.to_owned()))
    }
}

/// Returns the checker names in default pipeline order.
///
/// # Examples
///
/// ```
/// use vetting_suite::suite_checker_names;
///
/// let names: Vec<_> = suite_checker_names().collect();
/// assert_eq!(names, ["syntax", "imports", "attributes", "pylint"]);
/// ```
#[must_use = "Discarding the iterator hides suite wiring errors"]
pub fn suite_checker_names() -> impl Iterator<Item = &'static str> {
    SUITE_CHECKERS.iter().map(|descriptor| descriptor.name)
}
