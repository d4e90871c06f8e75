//! Source positions.
//!
//! Tokens, AST nodes and errors all point back into the source through a
//! [`Span`]. Lines and columns are 0-based; columns count characters, the
//! offset counts bytes.

use std::fmt;

/// A point between two characters of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    /// Byte offset into the source.
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Pos {
    pub const fn new(offset: usize, line: usize, column: usize) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    pub const fn origin() -> Self {
        Self::new(0, 0, 0)
    }

    /// The position just after `c`.
    pub fn advance(self, c: char) -> Self {
        let offset = self.offset + c.len_utf8();
        match c {
            '\n' => Self::new(offset, self.line + 1, 0),
            _ => Self::new(offset, self.line, self.column + 1),
        }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A half-open region `start..end` of the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub const fn new(start: Pos, end: Pos) -> Self {
        Self { start, end }
    }

    /// Zero-width span, used for EOF and the implicit receiver.
    pub const fn point(pos: Pos) -> Self {
        Self::new(pos, pos)
    }

    /// Smallest span covering both.
    pub fn merge(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_counts_characters_and_bytes() {
        let pos = Pos::origin().advance('é').advance('\n').advance('x');
        assert_eq!(pos, Pos::new(4, 1, 1));
    }

    #[test]
    fn merge_orders_endpoints() {
        let a = Span::new(Pos::new(4, 0, 4), Pos::new(6, 0, 6));
        let b = Span::new(Pos::new(0, 0, 0), Pos::new(2, 0, 2));
        let merged = a.merge(b);
        assert_eq!(merged, Span::new(b.start, a.end));
        assert_eq!(merged, b.merge(a));
    }

    #[test]
    fn point_is_empty() {
        assert!(Span::point(Pos::new(3, 0, 3)).is_empty());
    }

    #[test]
    fn display_is_line_colon_column() {
        let span = Span::new(Pos::new(0, 0, 0), Pos::new(5, 1, 2));
        assert_eq!(span.to_string(), "0:0-1:2");
    }
}
