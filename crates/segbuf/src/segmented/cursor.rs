//! `(segment, offset)` cursors and cross-segment search.
//!
//! A cursor names one unit of a buffer by the segment holding it and the
//! offset inside that segment, together with its logical position. Cursors
//! are always normalized: `offset` is inside the segment, or the cursor is
//! past the last segment (`segment == segments.len()`, offset `0`). Zero-length
//! segments are skipped over.

use super::{Segment, SegmentedBuffer};
use crate::unit::Unit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cursor {
    pub(crate) segment: usize,
    pub(crate) offset: usize,
    pub(crate) position: usize,
}

impl Cursor {
    /// Cursor on the unit at logical `position` (or past the end).
    pub(crate) fn at<T: Unit>(segments: &[Segment<T>], position: usize) -> Self {
        Self {
            segment: 0,
            offset: position,
            position,
        }
        .normalized(segments)
    }

    /// Carries an offset that ran past its segment into the following ones.
    pub(crate) fn normalized<T: Unit>(mut self, segments: &[Segment<T>]) -> Self {
        while let Some(segment) = segments.get(self.segment) {
            if self.offset < segment.len() {
                return self;
            }
            self.offset -= segment.len();
            self.segment += 1;
        }
        // Past the end, any overshoot stays accounted for in `position`.
        self.offset = 0;
        self
    }

    pub(crate) fn is_end<T: Unit>(&self, segments: &[Segment<T>]) -> bool {
        self.segment >= segments.len()
    }

    pub(crate) fn get<T: Unit>(&self, segments: &[Segment<T>]) -> Option<T> {
        segments
            .get(self.segment)
            .map(|segment| segment.char_at(self.offset))
    }

    pub(crate) fn advance<T: Unit>(&mut self, segments: &[Segment<T>]) {
        self.offset += 1;
        self.position += 1;
        *self = self.normalized(segments);
    }

    /// Moves within the current segment to `offset`, then normalizes.
    pub(crate) fn jump_to<T: Unit>(&mut self, segments: &[Segment<T>], offset: usize) {
        self.position = self.position + offset - self.offset;
        self.offset = offset;
        *self = self.normalized(segments);
    }

    /// Skips the rest of the current segment.
    fn next_segment<T: Unit>(&mut self, segments: &[Segment<T>]) {
        let len = segments[self.segment].len();
        self.jump_to(segments, len);
    }
}

/// Walks `pattern` from `cursor`, returning the cursor just past the match.
pub(crate) fn match_at<T: Unit>(
    segments: &[Segment<T>],
    mut cursor: Cursor,
    pattern: &[T],
) -> Option<Cursor> {
    for &unit in pattern {
        if cursor.get(segments)? != unit {
            return None;
        }
        cursor.advance(segments);
    }
    Some(cursor)
}

/// Next occurrence of `unit` at or after `cursor`.
pub(crate) fn find_unit<T: Unit>(
    segments: &[Segment<T>],
    mut cursor: Cursor,
    unit: T,
) -> Option<Cursor> {
    while !cursor.is_end(segments) {
        match segments[cursor.segment].index_of(unit, cursor.offset) {
            Some(offset) => {
                cursor.jump_to(segments, offset);
                return Some(cursor);
            }
            None => cursor.next_segment(segments),
        }
    }
    None
}

/// Next occurrence of a non-empty `pattern` at or after `cursor`, as the
/// cursors on its first unit and just past its last unit. The match may
/// straddle any number of segments.
pub(crate) fn find_pattern<T: Unit>(
    segments: &[Segment<T>],
    mut cursor: Cursor,
    pattern: &[T],
) -> Option<(Cursor, Cursor)> {
    let (&first, _) = pattern.split_first()?;
    loop {
        cursor = find_unit(segments, cursor, first)?;
        if let Some(after) = match_at(segments, cursor, pattern) {
            return Some((cursor, after));
        }
        cursor.advance(segments);
    }
}

impl<T: Unit> SegmentedBuffer<T> {
    /// Position of the first `unit` at or after `from`.
    #[must_use]
    pub fn index_of(&self, unit: T, from: usize) -> Option<usize> {
        let segments = self.segments.as_slice();
        find_unit(segments, Cursor::at(segments, from), unit).map(|c| c.position)
    }

    /// Position of the first occurrence of `pattern` at or after `from`,
    /// found without copying even when it spans several segments.
    ///
    /// An empty pattern matches at `from` when `from <= self.len()`.
    #[must_use]
    pub fn index_of_slice(&self, pattern: &[T], from: usize) -> Option<usize> {
        if pattern.is_empty() {
            return (from <= self.len()).then_some(from);
        }
        let segments = self.segments.as_slice();
        find_pattern(segments, Cursor::at(segments, from), pattern).map(|(c, _)| c.position)
    }

    #[must_use]
    pub fn contains(&self, pattern: &[T]) -> bool {
        self.index_of_slice(pattern, 0).is_some()
    }

    #[must_use]
    pub fn starts_with(&self, prefix: &[T]) -> bool {
        let segments = self.segments.as_slice();
        match_at(segments, Cursor::at(segments, 0), prefix).is_some()
    }

    #[must_use]
    pub fn ends_with(&self, suffix: &[T]) -> bool {
        let segments = self.segments.as_slice();
        let Some(start) = self.len().checked_sub(suffix.len()) else {
            return false;
        };
        match_at(segments, Cursor::at(segments, start), suffix).is_some()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::BufferOptions;

    fn one_char_segments(text: &str) -> SegmentedBuffer {
        let mut buffer = SegmentedBuffer::with_options(BufferOptions {
            initial_segment_capacity: 1,
            ..BufferOptions::default()
        });
        for c in text.chars() {
            buffer.append(c);
        }
        buffer
    }

    #[test]
    fn cursor_normalization_skips_empty_segments() {
        let segments: [Segment<char>; 3] =
            [Segment::from_str("ab"), Segment::new(), Segment::from_str("c")];
        assert_eq!(
            Cursor::at(&segments, 2),
            Cursor { segment: 2, offset: 0, position: 2 }
        );
        let end = Cursor::at(&segments, 3);
        assert!(end.is_end(&segments));
        assert_eq!(end.get(&segments), None);
    }

    #[test]
    fn pattern_spanning_many_segments() {
        let buffer = one_char_segments("xxabcdefxx");
        assert_eq!(buffer.segment_count(), 10);
        assert_eq!(buffer.index_of_slice(&['a', 'b', 'c', 'd', 'e', 'f'], 0), Some(2));
        assert_eq!(buffer.index_of_slice(&['f', 'x', 'x'], 0), Some(7));
        assert_eq!(buffer.index_of_slice(&['f', 'x', 'x', 'x'], 0), None);
    }

    #[test]
    fn partial_match_restarts_one_unit_later() {
        let buffer = one_char_segments("aaab");
        assert_eq!(buffer.index_of_slice(&['a', 'a', 'b'], 0), Some(1));
    }

    #[rstest]
    #[case('a', 0, Some(0))]
    #[case('a', 1, Some(3))]
    #[case('c', 0, Some(2))]
    #[case('z', 0, None)]
    #[case('a', 9, None)]
    fn index_of_unit(#[case] unit: char, #[case] from: usize, #[case] expected: Option<usize>) {
        let mut buffer = SegmentedBuffer::from("ab");
        buffer.append_segment(Segment::from_str("ca"));
        assert_eq!(buffer.index_of(unit, from), expected);
    }

    #[test]
    fn empty_pattern_matches_in_range_only() {
        let buffer = one_char_segments("abc");
        assert_eq!(buffer.index_of_slice(&[], 3), Some(3));
        assert_eq!(buffer.index_of_slice(&[], 4), None);
    }

    #[test]
    fn affixes_across_segments() {
        let buffer = one_char_segments("prefix-suffix");
        assert!(buffer.starts_with(&['p', 'r', 'e']));
        assert!(buffer.ends_with(&['f', 'i', 'x']));
        assert!(!buffer.ends_with(&['p'; 20]));
        assert!(buffer.contains(&['x', '-', 's']));
    }
}
