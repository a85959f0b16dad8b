//! Source location spans.
//!
//! Nodes synthesized by passes (or by legacy converters) have no meaningful
//! source position; they carry [`Span::SYNTHESIZED`].

use std::fmt;

/// Source location span.
///
/// Layout: 8 bytes total
/// - start: u32 - byte offset from file start
/// - end: u32 - byte offset (exclusive)
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(C)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Marker for nodes that have no source position.
    pub const SYNTHESIZED: Span = Span {
        start: u32::MAX,
        end: u32::MAX,
    };

    /// Create a new span.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// Whether this span was produced by a pass rather than the parser.
    #[inline]
    pub const fn is_synthesized(&self) -> bool {
        self.start == u32::MAX && self.end == u32::MAX
    }

    /// Length of the span in bytes (zero for synthesized spans).
    #[inline]
    pub const fn len(&self) -> u32 {
        if self.is_synthesized() {
            0
        } else {
            self.end - self.start
        }
    }

    /// Check if span is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Merge two spans to create one covering both.
    ///
    /// A synthesized span absorbs nothing: merging with it yields the other span.
    #[inline]
    #[must_use]
    pub fn merge(self, other: Span) -> Span {
        if self.is_synthesized() {
            return other;
        }
        if other.is_synthesized() {
            return self;
        }
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl Default for Span {
    fn default() -> Self {
        Span::SYNTHESIZED
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_synthesized() {
            write!(f, "synthesized")
        } else {
            write!(f, "{}..{}", self.start, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_basic() {
        let span = Span::new(10, 20);
        assert_eq!(span.len(), 10);
        assert!(!span.is_empty());
        assert!(!span.is_synthesized());
    }

    #[test]
    fn test_span_merge() {
        let merged = Span::new(10, 20).merge(Span::new(15, 30));
        assert_eq!(merged, Span::new(10, 30));
    }

    #[test]
    fn test_synthesized_merge() {
        let real = Span::new(4, 8);
        assert_eq!(Span::SYNTHESIZED.merge(real), real);
        assert_eq!(real.merge(Span::SYNTHESIZED), real);
        assert_eq!(Span::SYNTHESIZED.len(), 0);
        assert_eq!(Span::SYNTHESIZED.to_string(), "synthesized");
    }
}
