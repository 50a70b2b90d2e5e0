//! Source coordinates inside a template.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A position in template text: the row and column of the most recently
/// consumed character.
///
/// Rows and columns both start at 1. A newline moves to the next row and
/// resets the column, so the first character of a line is column 1.
///
/// # Examples
///
/// ```
/// use sout_core::Position;
///
/// let position = Position::new(3, 14);
/// assert_eq!(position.to_string(), "3:14");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// The 1-based row.
    pub row: usize,
    /// The 1-based column.
    pub column: usize,
}

impl Position {
    /// The position before any character has been read.
    pub const START: Self = Self { row: 1, column: 0 };

    /// Creates a new position.
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }

    /// Returns the position after consuming `c`.
    #[must_use]
    pub const fn advance(self, c: char) -> Self {
        if c == '\n' {
            Self {
                row: self.row + 1,
                column: 0,
            }
        } else {
            Self {
                row: self.row,
                column: self.column + 1,
            }
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.column)
    }
}
