use std::{
    cmp::Ordering,
    ops::{Bound, Range, RangeBounds},
};

/// an interval in document offsets, [start, end]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

/// Orders by start, then end.
pub(crate) fn interval_cmp(a_start: i64, a_end: i64, b_start: i64, b_end: i64) -> Ordering {
    match a_start.cmp(&b_start) {
        Ordering::Equal => a_end.cmp(&b_end),
        ord => ord,
    }
}

impl Ord for TextRange {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.start.cmp(&other.start) {
            Ordering::Less => Ordering::Less,
            Ordering::Equal => self.end.cmp(&other.end),
            Ordering::Greater => Ordering::Greater,
        }
    }
}

impl PartialOrd for TextRange {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl RangeBounds<usize> for TextRange {
    fn start_bound(&self) -> Bound<&usize> {
        Bound::Included(&self.start)
    }

    fn end_bound(&self) -> Bound<&usize> {
        Bound::Excluded(&self.end)
    }
}

impl From<Range<usize>> for TextRange {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl From<(usize, usize)> for TextRange {
    fn from((start, end): (usize, usize)) -> Self {
        Self::new(start, end)
    }
}

impl TextRange {
    /// swaps the bounds if `start > end`
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// a zero-width range, e.g. a cursor
    pub fn collapsed(position: usize) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Overlap test used by searches: both bounds are inclusive, so ranges
    /// sharing a single boundary point touch.
    pub fn touches(&self, other: Self) -> bool {
        self.start <= other.end && self.end >= other.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_swaps_inverted_bounds() {
        let r = TextRange::new(9, 4);
        assert_eq!(r, TextRange { start: 4, end: 9 });
        assert_eq!(r.len(), 5);
    }

    #[test]
    fn ordering_is_start_then_end() {
        let mut ranges = vec![
            TextRange::new(5, 8),
            TextRange::new(0, 3),
            TextRange::new(5, 6),
            TextRange::collapsed(5),
        ];
        ranges.sort();
        assert_eq!(
            ranges,
            vec![
                TextRange::new(0, 3),
                TextRange::new(5, 5),
                TextRange::new(5, 6),
                TextRange::new(5, 8),
            ]
        );
    }

    #[test]
    fn touching_boundaries_overlap() {
        let r = TextRange::new(6, 10);
        assert!(r.touches(TextRange::new(10, 15)));
        assert!(r.touches(TextRange::new(0, 6)));
        assert!(!r.touches(TextRange::new(11, 15)));
        assert!(TextRange::collapsed(7).touches(r));
    }
}
