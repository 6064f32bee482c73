//! Character positions within a scanned line.

/// A span of characters in a line.
///
/// Offsets count characters, not bytes, so that messages shown to an
/// observer match what they typed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Span {
    /// Character offset where this span starts (0-based).
    pub start: usize,
    /// Character offset where this span ends (exclusive).
    pub end: usize,
}

impl Span {
    /// Creates a new span.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the 1-based position of the first character.
    #[must_use]
    pub const fn first(&self) -> usize {
        self.start + 1
    }

    /// Returns the 1-based position of the last character.
    #[must_use]
    pub const fn last(&self) -> usize {
        self.end
    }

    /// Returns the number of characters covered.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if this span is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }
}
