//! Rope-like text made of an ordered list of [`Segment`]s.
//!
//! Overview
//! - A [`SegmentedBuffer`] never copies characters to concatenate or slice:
//!   appending another buffer copies its segment references, and
//!   [`SegmentedBuffer::substring`] re-slices only the two boundary segments.
//! - Small appends go into the spare capacity of the trailing segment. When
//!   it is full a new trailing segment is allocated, sized by
//!   [`BufferOptions`]. Segments held by a buffer are never grown in place.
//! - Prepending always shifts the reference list by one slot. There is no
//!   head room, so `add_first` is O(segments) while `append` is amortized
//!   O(1).
//! - Splicing, template substitution and search live in the `cursor` and
//!   `splice` submodules and operate on `(segment, offset)` cursors instead
//!   of materializing a contiguous copy.
//!
//! Segment references are shared between buffers only when one buffer is
//! appended to another, cloned, or sliced. Such aliases have no spare
//! capacity, so appending to either buffer never writes into characters the
//! other one shows.

mod cursor;
#[cfg(any(test, feature = "serde"))]
mod serde_impls;
mod splice;

use alloc::{string::String, vec::Vec};
use core::{cell::Ref, fmt, mem};

pub(crate) use cursor::Cursor;

use crate::{options::BufferOptions, segment::Segment, unit::Unit};

/// The reference list of a buffer.
///
/// `Empty` means no segment was ever allocated (or all were removed), which
/// is distinct from a list holding one zero-length segment.
#[derive(Debug, Clone, Default)]
enum Segments<T: Unit> {
    #[default]
    Empty,
    NonEmpty(Vec<Segment<T>>),
}

impl<T: Unit> Segments<T> {
    fn as_slice(&self) -> &[Segment<T>] {
        match self {
            Self::Empty => &[],
            Self::NonEmpty(list) => list,
        }
    }

    fn as_mut_slice(&mut self) -> &mut [Segment<T>] {
        match self {
            Self::Empty => &mut [],
            Self::NonEmpty(list) => list,
        }
    }

    /// Returns the list, allocating `slots` references if there is none yet.
    fn list_mut(&mut self, slots: usize) -> &mut Vec<Segment<T>> {
        if let Self::Empty = self {
            *self = Self::NonEmpty(Vec::with_capacity(slots));
        }
        match self {
            Self::NonEmpty(list) => list,
            Self::Empty => unreachable!("segment list was just allocated"),
        }
    }

    /// Falls back to `Empty` once the last segment has been removed.
    fn settle(&mut self) {
        if matches!(self, Self::NonEmpty(list) if list.is_empty()) {
            *self = Self::Empty;
        }
    }

    fn into_vec(self) -> Vec<Segment<T>> {
        match self {
            Self::Empty => Vec::new(),
            Self::NonEmpty(list) => list,
        }
    }
}

/// A mutable string stored as an ordered list of segments.
///
/// ```rust
/// use segbuf::SegmentedBuffer;
///
/// let mut greeting = SegmentedBuffer::<char>::from("Hello, ");
/// let name = SegmentedBuffer::<char>::from("world");
/// greeting.append_buffer(&name);
/// greeting.append('!');
///
/// assert_eq!(greeting, "Hello, world!");
/// assert_eq!(greeting.segment_count(), 3);
/// assert_eq!(greeting.index_of_slice(&[',', ' ', 'w'], 0), Some(5));
/// ```
pub struct SegmentedBuffer<T: Unit = char> {
    segments: Segments<T>,
    options: BufferOptions,
}

/// Segmented buffer of byte-packed ISO-8859-1 text.
pub type CompactSegmentedBuffer = SegmentedBuffer<u8>;

impl<T: Unit> SegmentedBuffer<T> {
    /// Creates a buffer without any segment.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(BufferOptions::default())
    }

    #[must_use]
    pub fn with_options(options: BufferOptions) -> Self {
        Self {
            segments: Segments::Empty,
            options,
        }
    }

    /// Creates a buffer holding one empty segment of `capacity` units.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut buffer = Self::new();
        buffer.push_segment(Segment::with_capacity(capacity));
        buffer
    }

    /// Copies `units` into a single segment.
    #[must_use]
    pub fn from_slice(units: &[T]) -> Self {
        Self::from(Segment::from_slice(units))
    }

    /// Takes ownership of `units` without copying.
    #[must_use]
    pub fn from_vec(units: Vec<T>) -> Self {
        Self::from(Segment::from_vec(units))
    }

    #[must_use]
    pub fn options(&self) -> BufferOptions {
        self.options
    }

    /// Total number of units. O(segments).
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.as_slice().iter().map(Segment::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.as_slice().iter().all(Segment::is_empty)
    }

    /// The segments in order.
    #[must_use]
    pub fn segments(&self) -> &[Segment<T>] {
        self.segments.as_slice()
    }

    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.as_slice().len()
    }

    /// Whether no segment has been allocated yet.
    #[must_use]
    pub fn has_no_segments(&self) -> bool {
        matches!(self.segments, Segments::Empty)
    }

    /// Iterates over the units in order.
    pub fn units(&self) -> impl Iterator<Item = T> + '_ {
        self.segments
            .as_slice()
            .iter()
            .flat_map(|segment| (0..segment.len()).map(move |i| segment.char_at(i)))
    }

    /// Borrows every segment window in order, without copying. This is the
    /// hand-off used by encoders.
    pub fn windows(&self) -> impl Iterator<Item = Ref<'_, [T]>> + '_ {
        self.segments.as_slice().iter().map(Segment::as_slice)
    }

    /// Returns the unit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[must_use]
    pub fn char_at(&self, index: usize) -> T {
        let segments = self.segments.as_slice();
        let cursor = Cursor::at(segments, index);
        cursor
            .get(segments)
            .unwrap_or_else(|| panic!("index {index} out of range for length {}", self.len()))
    }

    /// Overwrites the unit at `index`, visible through every alias of the
    /// segment holding it.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn set_char_at(&mut self, index: usize, unit: T) {
        let cursor = Cursor::at(self.segments.as_slice(), index);
        let len = self.len();
        match self.segments.as_mut_slice().get_mut(cursor.segment) {
            Some(segment) => segment.set_char_at(cursor.offset, unit),
            None => panic!("index {index} out of range for length {len}"),
        }
    }

    #[must_use]
    pub fn first_char(&self) -> Option<T> {
        self.segments.as_slice().iter().find_map(Segment::first_char)
    }

    #[must_use]
    pub fn last_char(&self) -> Option<T> {
        self.segments
            .as_slice()
            .iter()
            .rev()
            .find_map(Segment::last_char)
    }

    /// Appends one unit into the trailing segment's spare capacity, or into a
    /// newly allocated trailing segment.
    pub fn append(&mut self, unit: T) {
        if let Some(last) = self.trailing_with_room() {
            last.append(unit);
            return;
        }
        let mut segment = Segment::with_capacity(self.options.new_segment_capacity(1));
        segment.append(unit);
        self.push_segment(segment);
    }

    /// Copies `units` into the trailing spare capacity, then into one new
    /// segment for the remainder.
    pub fn append_slice(&mut self, units: &[T]) {
        let mut rest = units;
        if let Some(last) = self.trailing_with_room() {
            let fits = last.spare_capacity().min(rest.len());
            last.append_slice(&rest[..fits]);
            rest = &rest[fits..];
        }
        if rest.is_empty() {
            return;
        }
        let mut segment = Segment::with_capacity(self.options.new_segment_capacity(rest.len()));
        segment.append_slice(rest);
        self.push_segment(segment);
    }

    /// Appends the characters of `text`, converting each into a unit.
    pub fn append_str(&mut self, text: &str) {
        let mut pending = text.chars().count();
        let mut units = text.chars().map(T::from_char);
        if let Some(last) = self.trailing_with_room() {
            let fits = last.spare_capacity().min(pending);
            for unit in units.by_ref().take(fits) {
                last.append(unit);
            }
            pending -= fits;
        }
        if pending == 0 {
            return;
        }
        let mut segment = Segment::with_capacity(self.options.new_segment_capacity(pending));
        for unit in units {
            segment.append(unit);
        }
        self.push_segment(segment);
    }

    /// Appends `segment` as a new trailing segment without copying it.
    ///
    /// Empty segments are ignored.
    pub fn append_segment(&mut self, segment: Segment<T>) {
        if !segment.is_empty() {
            self.push_segment(segment);
        }
    }

    /// Appends every segment of `other` by reference.
    pub fn append_buffer(&mut self, other: &Self) {
        self.append_segments(other.segments.as_slice().iter().cloned());
    }

    /// Appends every segment of `other`, taking them over without aliasing.
    pub fn append_owned(&mut self, other: Self) {
        self.append_segments(other.segments.into_vec());
    }

    fn append_segments(&mut self, incoming: impl IntoIterator<Item = Segment<T>>) {
        let incoming: Vec<_> = incoming.into_iter().filter(|s| !s.is_empty()).collect();
        if incoming.is_empty() {
            return;
        }
        let increment = self.slots_increment();
        let list = self.segments.list_mut(incoming.len().max(increment));
        let free = list.capacity() - list.len();
        if free < incoming.len() {
            let wanted = (incoming.len() - free).div_ceil(increment) * increment;
            log::debug!("segment list grown by {wanted} slots for a bulk append");
            list.reserve_exact(free + wanted);
        }
        list.extend(incoming);
    }

    /// Prepends one unit as a new leading segment.
    ///
    /// The reference list has no head room, so this shifts every segment.
    pub fn add_first(&mut self, unit: T) {
        self.insert_segment(0, Segment::from_slice(&[unit]));
    }

    /// Prepends `segment`, shifting every existing segment.
    pub fn add_first_segment(&mut self, segment: Segment<T>) {
        if !segment.is_empty() {
            self.insert_segment(0, segment);
        }
    }

    /// Returns `[start, end)` as a new buffer. Interior segments are shared
    /// by reference and only the boundary segments are re-sliced.
    ///
    /// `end <= start` yields an empty buffer.
    ///
    /// # Panics
    ///
    /// Panics if `end > self.len()` for a non-empty range.
    #[must_use]
    pub fn substring(&self, start: usize, end: usize) -> Self {
        let mut result = Self::with_options(self.options);
        if end <= start {
            return result;
        }
        let len = self.len();
        assert!(end <= len, "substring end {end} out of range for length {len}");

        let segments = self.segments.as_slice();
        let first = Cursor::at(segments, start);
        let last = Cursor::at(segments, end - 1);
        if first.segment == last.segment {
            result.push_segment(segments[first.segment].substring(first.offset, last.offset + 1));
            return result;
        }
        result.push_segment(segments[first.segment].substring_from(first.offset));
        for segment in &segments[first.segment + 1..last.segment] {
            result.append_segment(segment.clone());
        }
        result.push_segment(segments[last.segment].substring(0, last.offset + 1));
        result
    }

    /// Returns `[start, len)` as a new buffer.
    ///
    /// # Panics
    ///
    /// Panics if `start > self.len()`.
    #[must_use]
    pub fn substring_from(&self, start: usize) -> Self {
        let len = self.len();
        assert!(start <= len, "substring start {start} out of range for length {len}");
        self.substring(start, len)
    }

    pub fn trim_beginning(&mut self) {
        let Segments::NonEmpty(list) = &mut self.segments else {
            return;
        };
        let mut emptied = 0;
        for segment in list.iter_mut() {
            segment.trim_beginning();
            if !segment.is_empty() {
                break;
            }
            emptied += 1;
        }
        list.drain(..emptied);
        self.segments.settle();
    }

    pub fn trim_end(&mut self) {
        let Segments::NonEmpty(list) = &mut self.segments else {
            return;
        };
        while let Some(last) = list.last_mut() {
            last.trim_end();
            if !last.is_empty() {
                break;
            }
            list.pop();
        }
        self.segments.settle();
    }

    pub fn trim(&mut self) {
        self.trim_beginning();
        self.trim_end();
    }

    /// Drops up to `count` units from the front.
    pub fn remove_start_chars(&mut self, mut count: usize) {
        let Segments::NonEmpty(list) = &mut self.segments else {
            return;
        };
        let mut dropped = 0;
        for segment in list.iter_mut() {
            if count < segment.len() {
                segment.remove_start_chars(count);
                break;
            }
            count -= segment.len();
            dropped += 1;
        }
        list.drain(..dropped);
        self.segments.settle();
    }

    /// Drops up to `count` units from the end.
    pub fn remove_end_chars(&mut self, mut count: usize) {
        let Segments::NonEmpty(list) = &mut self.segments else {
            return;
        };
        while count > 0 {
            let Some(last) = list.last_mut() else {
                break;
            };
            if count < last.len() {
                last.remove_end_chars(count);
                break;
            }
            count -= last.len();
            list.pop();
        }
        self.segments.settle();
    }

    /// Replaces every `old` unit with `new` in place.
    pub fn replace_char(&mut self, old: T, new: T) {
        for segment in self.segments.as_mut_slice() {
            segment.replace_char(old, new);
        }
    }

    pub fn to_lower_case(&mut self) {
        for segment in self.segments.as_mut_slice() {
            segment.to_lower_case();
        }
    }

    pub fn to_upper_case(&mut self) {
        for segment in self.segments.as_mut_slice() {
            segment.to_upper_case();
        }
    }

    /// Compacts every segment into an exactly sized array, drops empty
    /// segments and releases unused reference slots.
    pub fn trim_to_size(&mut self) {
        let Segments::NonEmpty(list) = &mut self.segments else {
            return;
        };
        list.retain(|segment| !segment.is_empty());
        for segment in list.iter_mut() {
            segment.trim_to_size();
        }
        list.shrink_to_fit();
        self.segments.settle();
    }

    /// Removes every segment.
    pub fn clear(&mut self) {
        self.segments = Segments::Empty;
    }

    /// Cuts the buffer at every `separator`. Runs inside one segment are
    /// taken as a single alias before moving on to the next segment.
    ///
    /// `n` separators always yield `n + 1` pieces, empty ones included.
    #[must_use]
    pub fn split(&self, separator: T) -> Vec<Self> {
        let mut pieces = Vec::new();
        let mut current = Self::with_options(self.options);
        for segment in self.segments.as_slice() {
            let mut from = 0;
            while let Some(at) = segment.index_of(separator, from) {
                current.append_segment(segment.substring(from, at));
                pieces.push(mem::replace(&mut current, Self::with_options(self.options)));
                from = at + 1;
            }
            current.append_segment(segment.substring_from(from));
        }
        pieces.push(current);
        pieces
    }

    /// Copies the content into the front of `dest` and returns the number of
    /// units written.
    ///
    /// # Panics
    ///
    /// Panics if `dest` is shorter than the buffer.
    pub fn fill(&self, dest: &mut [T]) -> usize {
        let mut written = 0;
        for segment in self.segments.as_slice() {
            written += segment.fill(&mut dest[written..]);
        }
        written
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len());
        for window in self.windows() {
            out.extend_from_slice(&window);
        }
        out
    }

    /// Deep copy into one exactly sized segment.
    #[must_use]
    pub fn copy(&self) -> Self {
        let mut copy = Self::with_options(self.options);
        copy.append_segment(Segment::from_vec(self.to_vec()));
        copy
    }

    #[cfg(any(test, feature = "fuzzing"))]
    /// Checks the structural invariants, panicking on the first violation.
    pub fn check_invariants(&self) {
        if let Segments::NonEmpty(list) = &self.segments {
            assert!(!list.is_empty(), "NonEmpty list without segments");
        }
        let total: usize = self.segments.as_slice().iter().map(Segment::len).sum();
        assert_eq!(total, self.units().count());
    }

    fn slots_increment(&self) -> usize {
        self.options.segment_slots_increment.max(1)
    }

    fn trailing_with_room(&mut self) -> Option<&mut Segment<T>> {
        match &mut self.segments {
            Segments::Empty => None,
            Segments::NonEmpty(list) => list.last_mut().filter(|s| s.spare_capacity() > 0),
        }
    }

    fn push_segment(&mut self, segment: Segment<T>) {
        let len = self.segment_count();
        self.insert_segment(len, segment);
    }

    fn insert_segment(&mut self, index: usize, segment: Segment<T>) {
        let increment = self.slots_increment();
        let list = self.segments.list_mut(increment);
        if list.len() == list.capacity() {
            log::debug!("segment list full at {} slots, adding {increment}", list.len());
            list.reserve_exact(increment);
        }
        log::trace!(
            "segment of {} units (capacity {}) inserted at {index}",
            segment.len(),
            segment.capacity()
        );
        list.insert(index, segment);
    }
}

impl SegmentedBuffer<char> {
    /// Copies the characters of `text` into a single segment.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &str) -> Self {
        Self::from(Segment::from_str(text))
    }
}

impl<T: Unit> Default for SegmentedBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloning aliases every segment; use [`SegmentedBuffer::copy`] for a deep
/// copy.
impl<T: Unit> Clone for SegmentedBuffer<T> {
    fn clone(&self) -> Self {
        Self {
            segments: self.segments.clone(),
            options: self.options,
        }
    }
}

impl<T: Unit> fmt::Debug for SegmentedBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SegmentedBuffer")
            .field(&self.segments.as_slice())
            .finish()
    }
}

impl<T: Unit> fmt::Display for SegmentedBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in self.segments.as_slice() {
            fmt::Display::fmt(segment, f)?;
        }
        Ok(())
    }
}

/// Content equality, independent of how either side is segmented.
impl<T: Unit> PartialEq for SegmentedBuffer<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.units().eq(other.units())
    }
}

impl<T: Unit> Eq for SegmentedBuffer<T> {}

impl<T: Unit> PartialEq<str> for SegmentedBuffer<T> {
    fn eq(&self, other: &str) -> bool {
        self.units().map(Unit::to_char).eq(other.chars())
    }
}

impl<T: Unit> PartialEq<&str> for SegmentedBuffer<T> {
    fn eq(&self, other: &&str) -> bool {
        PartialEq::<str>::eq(self, *other)
    }
}

impl<T: Unit> From<Segment<T>> for SegmentedBuffer<T> {
    fn from(segment: Segment<T>) -> Self {
        let mut buffer = Self::new();
        buffer.append_segment(segment);
        buffer
    }
}

impl<T: Unit> From<&str> for SegmentedBuffer<T> {
    fn from(text: &str) -> Self {
        Self::from(Segment::from_str(text))
    }
}

impl From<String> for SegmentedBuffer<char> {
    fn from(text: String) -> Self {
        Self::from(Segment::from(text))
    }
}

impl<T: Unit> From<&[T]> for SegmentedBuffer<T> {
    fn from(units: &[T]) -> Self {
        Self::from_slice(units)
    }
}

impl<T: Unit> From<Vec<T>> for SegmentedBuffer<T> {
    fn from(units: Vec<T>) -> Self {
        Self::from_vec(units)
    }
}

impl<T: Unit> FromIterator<T> for SegmentedBuffer<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut buffer = Self::new();
        buffer.extend(iter);
        buffer
    }
}

/// Unit-by-unit fallback for sources without a bulk path.
impl<T: Unit> Extend<T> for SegmentedBuffer<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for unit in iter {
            self.append(unit);
        }
    }
}
