//! Half-open byte ranges over a specification text.

use serde::{Deserialize, Serialize};

/// A `[offset, offset + len)` range of UTF-8 byte offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Range {
    pub offset: usize,
    pub len: usize,
}

impl Range {
    pub fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// Build a range from absolute start and end positions
    pub fn from_bounds(start: usize, end: usize) -> Self {
        Self {
            offset: start,
            len: end.saturating_sub(start),
        }
    }

    pub fn start(&self) -> usize {
        self.offset
    }

    /// Exclusive end position, saturating at `usize::MAX`
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.len)
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Two ranges intersect iff they share at least one position.
    ///
    /// Empty ranges never intersect anything.
    pub fn intersects(&self, other: &Range) -> bool {
        self.start().max(other.start()) < self.end().min(other.end())
    }

    /// Clamp a position into this range
    pub fn clip(&self, position: usize) -> usize {
        position.clamp(self.start(), self.end())
    }

    /// Slice `text` by this range.
    ///
    /// Returns `None` when the range runs past the end of the text or does not
    /// fall on UTF-8 character boundaries.
    pub fn slice<'a>(&self, text: &'a str) -> Option<&'a str> {
        let end = self.offset.checked_add(self.len)?;
        text.get(self.start()..end)
    }
}

impl std::fmt::Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.start(), self.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersects_overlapping() {
        let a = Range::new(4, 5);
        let b = Range::new(8, 3);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_adjacent_ranges_do_not_intersect() {
        let a = Range::new(0, 4);
        let b = Range::new(4, 5);
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));
    }

    #[test]
    fn test_contained_range_intersects() {
        let outer = Range::new(0, 19);
        let inner = Range::new(16, 3);
        assert!(outer.intersects(&inner));
    }

    #[test]
    fn test_empty_range_never_intersects() {
        let empty = Range::new(5, 0);
        let wide = Range::new(0, 10);
        assert!(!empty.intersects(&wide));
        assert!(!wide.intersects(&empty));
    }

    #[test]
    fn test_slice_respects_char_boundaries() {
        let text = "héllo";
        assert_eq!(Range::new(0, 1).slice(text), Some("h"));
        assert_eq!(Range::new(1, 1).slice(text), None);
        assert_eq!(Range::new(1, 2).slice(text), Some("é"));
        assert_eq!(Range::new(4, 10).slice(text), None);
    }

    #[test]
    fn test_range_near_usize_max() {
        let range = Range::new(usize::MAX, 5);
        assert_eq!(range.end(), usize::MAX);
        assert_eq!(range.slice("The quick brown fox"), None);
        assert!(!range.intersects(&Range::new(0, 19)));
    }

    #[test]
    fn test_clip() {
        let range = Range::from_bounds(10, 19);
        assert_eq!(range.clip(4), 10);
        assert_eq!(range.clip(16), 16);
        assert_eq!(range.clip(25), 19);
    }
}
