//! Byte-offset spans into a diagram description.

use std::{fmt, ops::Range};

/// A half-open byte range `start..end` into the validated source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    /// Create a span from a byte range.
    ///
    /// A reversed range is normalized to an empty span at `range.start`.
    pub fn new(range: Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end.max(range.start),
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Move the span by `offset` bytes.
    ///
    /// Statement parsers work on a single line and produce line-relative
    /// spans; this turns them into document-relative ones.
    pub fn shift(self, offset: usize) -> Self {
        Self::new(self.start + offset..self.end + offset)
    }

    /// Smallest span covering both `self` and `other`.
    pub fn union(self, other: Span) -> Span {
        Self::new(self.start.min(other.start)..self.end.max(other.end))
    }

    /// One-based `(line, column)` of the span start within `source`.
    ///
    /// Columns count characters, not bytes. Offsets past the end of the
    /// source resolve to the position just after the last character.
    pub fn line_col(&self, source: &str) -> (usize, usize) {
        let offset = self.start.min(source.len());
        let prefix = source.get(..offset).unwrap_or(source);
        let line = prefix.matches('\n').count() + 1;
        let line_start = prefix.rfind('\n').map_or(0, |idx| idx + 1);
        let column = prefix[line_start..].chars().count() + 1;
        (line, column)
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(range)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_and_union() {
        let span = Span::new(2..5).shift(10);
        assert_eq!(span, Span::new(12..15));
        assert_eq!(span.union(Span::new(3..4)), Span::new(3..15));
    }

    #[test]
    fn test_reversed_range_is_empty() {
        let span = Span::new(7..3);
        assert!(span.is_empty());
        assert_eq!(span.start(), 7);
    }

    #[test]
    fn test_line_col() {
        let source = "graph TD\n  A-->B\n  é-->";
        assert_eq!(Span::new(0..1).line_col(source), (1, 1));
        assert_eq!(Span::new(11..12).line_col(source), (2, 3));
        let tail = source.len();
        assert_eq!(Span::new(tail..tail).line_col(source), (3, 7));
    }
}
