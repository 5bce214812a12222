//! Line/column source locations.
//!
//! Lines are 1-based and columns are 0-based, the convention the syntax tree
//! collaborator uses. Editor consumers translate to their own convention.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A point in a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// 1-indexed line number
    pub line: u32,
    /// 0-indexed column
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then(self.column.cmp(&other.column))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A half-open source range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SourceLocation {
    pub start: Position,
    pub end: Position,
}

impl SourceLocation {
    pub const fn new(start: Position, end: Position) -> Self {
        SourceLocation { start, end }
    }

    /// Build a location from raw `(line, column)` pairs.
    pub const fn from_coords(start: (u32, u32), end: (u32, u32)) -> Self {
        SourceLocation {
            start: Position::new(start.0, start.1),
            end: Position::new(end.0, end.1),
        }
    }

    /// Location spanning from the start of `self` to the end of `other`.
    #[must_use]
    pub fn to(self, other: SourceLocation) -> Self {
        SourceLocation {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Whether `position` falls inside this range (start inclusive, end exclusive).
    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position < self.end
    }

    /// Whether `other` lies entirely inside this range.
    pub fn encloses(&self, other: &SourceLocation) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Rough size used to order nested ranges: smaller means more specific.
    pub fn extent(&self) -> (u32, u32) {
        let lines = self.end.line.saturating_sub(self.start.line);
        let columns = if lines == 0 {
            self.end.column.saturating_sub(self.start.column)
        } else {
            self.end.column
        };
        (lines, columns)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
#[path = "../tests/position_tests.rs"]
mod position_tests;
