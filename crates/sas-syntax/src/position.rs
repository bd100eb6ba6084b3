//! One-based source positions.
//!
//! Tree-sitter positions are zero-based. Matches are reported to users, so
//! every position stored in a [`SourceTree`](crate::SourceTree) is one-based.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A one-based line and column. Columns count bytes within the line.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
    /// One-based line number.
    pub line: u32,
    /// One-based column number.
    pub column: u32,
}

impl Position {
    /// Creates a position.
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Returns the one-based line number.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// Returns the one-based column number.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The start and end positions of a node. Ordering sorts by start first.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Extent {
    /// Inclusive start.
    pub start: Position,
    /// Exclusive end.
    pub end: Position,
}

impl Extent {
    /// Creates an extent.
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Returns the start position.
    #[must_use]
    pub const fn start(&self) -> Position {
        self.start
    }

    /// Returns the end position.
    #[must_use]
    pub const fn end(&self) -> Position {
        self.end
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Converts a Tree-sitter point (zero-based) to a one-based position.
#[must_use]
pub(crate) fn point_to_position(point: tree_sitter::Point) -> Position {
    // Line/column numbers will realistically never exceed u32::MAX.
    let line = u32::try_from(point.row.saturating_add(1)).unwrap_or(u32::MAX);
    let column = u32::try_from(point.column.saturating_add(1)).unwrap_or(u32::MAX);
    Position::new(line, column)
}

/// Returns the one-based extent of a Tree-sitter node.
#[must_use]
pub(crate) fn node_extent(node: tree_sitter::Node<'_>) -> Extent {
    Extent::new(
        point_to_position(node.start_position()),
        point_to_position(node.end_position()),
    )
}
