//! Source positions reported alongside diagnostics.

use tree_sitter::{Node, Point};

/// Represents a location in source text using one-based line and column numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceLocation {
    line: usize,
    column: usize,
}

impl SourceLocation {
    /// Builds a new location.
    ///
    /// # Examples
    ///
    /// ```
    /// use vetting_common::span::SourceLocation;
    ///
    /// let location = SourceLocation::new(3, 5);
    /// assert_eq!(location.line(), 3);
    /// assert_eq!(location.column(), 5);
    /// ```
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Converts a zero-based tree-sitter point into a one-based location.
    ///
    /// # Examples
    ///
    /// ```
    /// use tree_sitter::Point;
    /// use vetting_common::span::SourceLocation;
    ///
    /// let location = SourceLocation::from_point(Point::new(0, 4));
    /// assert_eq!(location, SourceLocation::new(1, 5));
    /// ```
    #[must_use]
    pub const fn from_point(point: Point) -> Self {
        Self::new(point.row + 1, point.column + 1)
    }

    /// Converts a byte offset into `source` into a one-based location.
    ///
    /// Offsets past the end clamp to the end of the text. Columns count
    /// bytes, matching [`SourceLocation::from_point`].
    ///
    /// # Examples
    ///
    /// ```
    /// use vetting_common::span::SourceLocation;
    ///
    /// assert_eq!(SourceLocation::at_offset("ab\ncd", 4), SourceLocation::new(2, 2));
    /// ```
    #[must_use]
    pub fn at_offset(source: &str, offset: usize) -> Self {
        let before = source
            .as_bytes()
            .get(..offset.min(source.len()))
            .unwrap_or_default();
        let line = before.iter().filter(|&&byte| byte == b'\n').count() + 1;
        let line_start = before
            .iter()
            .rposition(|&byte| byte == b'\n')
            .map_or(0, |newline| newline + 1);
        Self::new(line, before.len() - line_start + 1)
    }

    /// Returns the start location of a syntax node.
    #[must_use]
    pub fn of_node(node: Node<'_>) -> Self {
        Self::from_point(node.start_position())
    }

    /// Returns the one-based line number.
    #[must_use]
    pub const fn line(self) -> usize {
        self.line
    }

    /// Returns the one-based column number.
    #[must_use]
    pub const fn column(self) -> usize {
        self.column
    }
}
