//! Range splicing and the substitution scans built on it.
//!
//! Splicing `[start, end)` rewrites only the reference list:
//!
//! ```text
//! before: [ s0 ][ s1 ....|xx][ s2 xxxx ][ xx|.... s3 ][ s4 ]
//! after:  [ s0 ][ s1 ....][ r0 ][ r1 ][ .... s3 ][ s4 ]
//!               head rem.   replacement  tail rem.
//! ```
//!
//! The head and tail remainders are aliases of the boundary segments, so no
//! characters are copied. A remainder is only emitted when it is non-empty,
//! which keeps splices on segment boundaries from leaving zero-length
//! segments behind.

use alloc::vec::Vec;

use super::{Cursor, SegmentedBuffer, cursor::find_pattern};
use crate::unit::Unit;

impl<T: Unit> SegmentedBuffer<T> {
    /// Replaces `[start, end)` with `replacement`, whose segments are moved
    /// into this buffer without copying.
    ///
    /// `start == end` inserts.
    ///
    /// # Panics
    ///
    /// Panics unless `start <= end <= self.len()`.
    pub fn replace_range(&mut self, start: usize, end: usize, replacement: impl Into<Self>) {
        self.splice(start, end, replacement.into());
    }

    /// Replaces every occurrence of `search` with a fresh copy of
    /// `replacement` and returns the number of replacements. Inserted text is
    /// never searched again.
    pub fn replace_all(&mut self, search: &[T], replacement: &[T]) -> usize {
        let mut replaced = 0;
        let mut cursor = Cursor::at(self.segments.as_slice(), 0);
        while let Some((found, after)) = find_pattern(self.segments.as_slice(), cursor, search) {
            cursor = self.splice(found.position, after.position, Self::from_slice(replacement));
            replaced += 1;
        }
        replaced
    }

    /// Substitutes every `start_marker … end_marker` span with the value
    /// `provider` computes for the enclosed text.
    ///
    /// The scan is a single forward pass. After a substitution it resumes
    /// right after the inserted value, so values are never rescanned even if
    /// they contain a start marker. A start marker without a matching end
    /// marker ends the scan and leaves the rest of the buffer untouched.
    ///
    /// ```rust
    /// use segbuf::SegmentedBuffer;
    ///
    /// let mut text = SegmentedBuffer::<char>::from("Hello ${name}!");
    /// text.search_and_replace(&['$', '{'], &['}'], |name| {
    ///     assert_eq!(*name, "name");
    ///     "World"
    /// });
    /// assert_eq!(text, "Hello World!");
    /// ```
    pub fn search_and_replace<F, R>(&mut self, start_marker: &[T], end_marker: &[T], mut provider: F)
    where
        F: FnMut(&Self) -> R,
        R: Into<Self>,
    {
        if start_marker.is_empty() || end_marker.is_empty() {
            return;
        }
        let mut cursor = Cursor::at(self.segments.as_slice(), 0);
        loop {
            let segments = self.segments.as_slice();
            let Some((open, body)) = find_pattern(segments, cursor, start_marker) else {
                return;
            };
            let Some((close, after)) = find_pattern(segments, body, end_marker) else {
                log::debug!("unterminated marker at {}, scan stopped", open.position);
                return;
            };
            let variable = self.substring(body.position, close.position);
            let value = provider(&variable).into();
            cursor = self.splice(open.position, after.position, value);
        }
    }

    /// The splicing primitive. Returns a cursor on the first unit after the
    /// inserted replacement, valid for the updated segment list.
    pub(crate) fn splice(&mut self, start: usize, end: usize, replacement: Self) -> Cursor {
        let len = self.len();
        assert!(
            start <= end && end <= len,
            "replace range {start}..{end} out of range for length {len}"
        );
        let inserted = replacement.len();
        let incoming: Vec<_> = replacement
            .segments
            .into_vec()
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();

        let segments = self.segments.as_slice();
        let first = Cursor::at(segments, start);
        let (removed, head, tail) = if first.is_end(segments) || (start == end && first.offset == 0)
        {
            // Insertion on a segment boundary touches no existing segment.
            (first.segment..first.segment, None, None)
        } else {
            let (last_segment, tail_from) = if start == end {
                (first.segment, first.offset)
            } else {
                let last = Cursor::at(segments, end - 1);
                (last.segment, last.offset + 1)
            };
            let head = (first.offset > 0)
                .then(|| segments[first.segment].substring(0, first.offset));
            let tail_segment = &segments[last_segment];
            let tail = (tail_from < tail_segment.len())
                .then(|| tail_segment.substring_from(tail_from));
            (first.segment..last_segment + 1, head, tail)
        };

        let resume_segment = first.segment + usize::from(head.is_some()) + incoming.len();
        let mut middle = Vec::with_capacity(incoming.len() + 2);
        middle.extend(head);
        middle.extend(incoming);
        middle.extend(tail);

        let margin = self.slots_increment();
        let list = self.segments.list_mut(middle.len().max(margin));
        let spliced_len = list.len() - removed.len() + middle.len();
        if spliced_len > list.capacity() {
            list.reserve_exact(spliced_len - list.len() + margin);
        }
        list.splice(removed, middle);

        let cursor = Cursor {
            segment: resume_segment,
            offset: 0,
            position: start + inserted,
        }
        .normalized(list);
        self.segments.settle();
        cursor
    }
}

impl SegmentedBuffer<char> {
    /// [`search_and_replace`](Self::search_and_replace) with string markers.
    pub fn search_and_replace_str<F, R>(&mut self, start_marker: &str, end_marker: &str, provider: F)
    where
        F: FnMut(&Self) -> R,
        R: Into<Self>,
    {
        let start: Vec<char> = start_marker.chars().collect();
        let end: Vec<char> = end_marker.chars().collect();
        self.search_and_replace(&start, &end, provider);
    }
}
