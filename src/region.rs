use serde::Serialize;
use std::{
    cmp::{max, min},
    fmt::Display,
    ops::Range,
};

/// Represents an area within source text.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Default, Serialize)]
pub struct Region {
    /// The beginning of the range, inclusive.
    pub begin: usize,
    /// The ending of the range, exclusive.
    pub end: usize,
}

impl Region {
    /// Create a new Region from the given range.
    pub fn new(position: Range<usize>) -> Self {
        Self {
            begin: position.start,
            end: position.end,
        }
    }

    /// Combine will merge the indices of two [`Region`] instances.
    pub fn combine(self, other: Self) -> Self {
        Self {
            begin: min(self.begin, other.begin),
            end: max(self.end, other.end),
        }
    }

    /// Access the literal value of a [`Region`].
    ///
    /// Returns an empty string when the `Region` is out of bounds in the
    /// given source text.
    pub fn literal<'source>(&self, source: &'source str) -> &'source str {
        source.get(self.begin..self.end).unwrap_or_default()
    }
}

impl From<Range<usize>> for Region {
    fn from(value: Range<usize>) -> Self {
        Self {
            begin: value.start,
            end: value.end,
        }
    }
}

/// A human readable location within source text.
///
/// Line and column are one indexed, offset is the zero indexed byte offset.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            line: 1,
            column: 1,
            offset: 0,
        }
    }
}

impl Position {
    /// Locate the given byte offset within the source text.
    pub fn locate(source: &str, offset: usize) -> Self {
        Locator::new(source).locate(offset)
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Converts byte offsets into [`Position`] instances.
///
/// Offsets handed to `locate` are expected to be ascending, which lets the
/// `Locator` scan each character of the source at most once. A smaller
/// offset restarts the scan from the beginning.
#[derive(Debug)]
pub struct Locator<'source> {
    source: &'source str,
    last: Position,
}

impl<'source> Locator<'source> {
    /// Create a new [`Locator`] over the given source text.
    #[inline]
    pub fn new(source: &'source str) -> Self {
        Self {
            source,
            last: Position::default(),
        }
    }

    /// Return the [`Position`] of the given byte offset.
    ///
    /// Offsets beyond the end of the source are clamped to the end.
    pub fn locate(&mut self, offset: usize) -> Position {
        let offset = min(offset, self.source.len());
        if offset < self.last.offset {
            self.last = Position::default();
        }

        let Position {
            mut line,
            mut column,
            offset: from,
        } = self.last;

        for (index, char) in self.source[from..].char_indices() {
            if from + index >= offset {
                break;
            }
            if char == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }

        self.last = Position {
            line,
            column,
            offset,
        };

        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine() {
        let combined = Region::new(5..10).combine(Region::new(8..15));

        assert_eq!(combined.begin, 5);
        assert_eq!(combined.end, 15);
    }

    #[test]
    fn test_literal() {
        let source = "Hello, {{name}}!";
        let region = Region::new(7..15);

        assert_eq!(region.literal(source), "{{name}}");
    }

    #[test]
    fn test_out_of_bounds_literal() {
        let source = "Hello, {{name}}!";

        assert_eq!(Region::new(7..30).literal(source), "");
    }

    #[test]
    fn test_locate_lines() {
        let source = "one\ntwo {{three}}\nfour";
        let mut locator = Locator::new(source);

        assert_eq!(
            locator.locate(0),
            Position {
                line: 1,
                column: 1,
                offset: 0
            }
        );
        assert_eq!(
            locator.locate(8),
            Position {
                line: 2,
                column: 5,
                offset: 8
            }
        );
        assert_eq!(
            locator.locate(source.len()),
            Position {
                line: 3,
                column: 5,
                offset: 22
            }
        );
    }

    #[test]
    fn test_locate_backwards() {
        let source = "a\nb\nc";
        let mut locator = Locator::new(source);
        locator.locate(4);

        assert_eq!(locator.locate(2).line, 2);
    }
}
