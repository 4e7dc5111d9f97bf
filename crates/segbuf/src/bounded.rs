//! A [`SegmentedBuffer`] that never grows past a maximum length.
//!
//! Every mutation behaves like the unbounded operation followed by cutting
//! the result down to `max_size` units from the tail. Appends get there by
//! clamping the incoming content to the remaining budget before delegating;
//! operations that may both remove and insert (range replace, substitution,
//! prepend) delegate first and truncate the overflow afterwards.
//!
//! The buffer dereferences to [`SegmentedBuffer`] for read access only, so
//! the bound cannot be bypassed.

use core::{fmt, ops::Deref};

use crate::{options::BufferOptions, segment::Segment, segmented::SegmentedBuffer, unit::Unit};

pub struct BoundedSegmentedBuffer<T: Unit = char> {
    inner: SegmentedBuffer<T>,
    max_size: usize,
    size: usize,
}

impl<T: Unit> BoundedSegmentedBuffer<T> {
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self::with_options(max_size, BufferOptions::default())
    }

    #[must_use]
    pub fn with_options(max_size: usize, options: BufferOptions) -> Self {
        Self {
            inner: SegmentedBuffer::with_options(options),
            max_size,
            size: 0,
        }
    }

    /// Wraps `buffer`, truncating it to `max_size` units.
    #[must_use]
    pub fn from_buffer(buffer: SegmentedBuffer<T>, max_size: usize) -> Self {
        let size = buffer.len();
        let mut bounded = Self {
            inner: buffer,
            max_size,
            size,
        };
        bounded.truncate_overflow();
        bounded
    }

    #[must_use]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Current length, tracked without walking the segments.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Units that can still be added.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.max_size - self.size
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.size == self.max_size
    }

    #[must_use]
    pub fn into_inner(self) -> SegmentedBuffer<T> {
        self.inner
    }

    /// Appends `unit` if there is room for it.
    pub fn append(&mut self, unit: T) {
        if self.is_full() {
            log::trace!("bounded buffer full at {}, unit dropped", self.max_size);
            return;
        }
        self.inner.append(unit);
        self.size += 1;
    }

    pub fn append_slice(&mut self, units: &[T]) {
        let admitted = &units[..units.len().min(self.remaining())];
        self.inner.append_slice(admitted);
        self.size += admitted.len();
    }

    pub fn append_str(&mut self, text: &str) {
        let budget = self.remaining();
        let admitted = text
            .char_indices()
            .nth(budget)
            .map_or(text, |(cut, _)| &text[..cut]);
        self.inner.append_str(admitted);
        self.size += admitted.chars().count();
    }

    pub fn append_segment(&mut self, segment: Segment<T>) {
        let admitted = if segment.len() > self.remaining() {
            segment.substring(0, self.remaining())
        } else {
            segment
        };
        self.size += admitted.len();
        self.inner.append_segment(admitted);
    }

    /// Appends the admissible prefix of `other` by reference.
    pub fn append_buffer(&mut self, other: &SegmentedBuffer<T>) {
        let incoming = other.len();
        let budget = self.remaining();
        if incoming <= budget {
            self.inner.append_buffer(other);
            self.size += incoming;
        } else {
            self.inner.append_buffer(&other.substring(0, budget));
            self.size += budget;
        }
    }

    /// Prepends `unit`, pushing the last unit out when full.
    pub fn add_first(&mut self, unit: T) {
        if self.max_size == 0 {
            return;
        }
        self.inner.add_first(unit);
        self.size += 1;
        self.truncate_overflow();
    }

    pub fn add_first_segment(&mut self, segment: Segment<T>) {
        let added = segment.len();
        self.inner.add_first_segment(segment);
        self.size += added;
        self.truncate_overflow();
    }

    /// See [`SegmentedBuffer::set_char_at`].
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.size()`.
    pub fn set_char_at(&mut self, index: usize, unit: T) {
        self.inner.set_char_at(index, unit);
    }

    pub fn replace_char(&mut self, old: T, new: T) {
        self.inner.replace_char(old, new);
    }

    pub fn to_lower_case(&mut self) {
        self.inner.to_lower_case();
    }

    pub fn to_upper_case(&mut self) {
        self.inner.to_upper_case();
    }

    pub fn remove_start_chars(&mut self, count: usize) {
        self.inner.remove_start_chars(count);
        self.size -= count.min(self.size);
    }

    pub fn remove_end_chars(&mut self, count: usize) {
        self.inner.remove_end_chars(count);
        self.size -= count.min(self.size);
    }

    pub fn trim_beginning(&mut self) {
        self.inner.trim_beginning();
        self.size = self.inner.len();
    }

    pub fn trim_end(&mut self) {
        self.inner.trim_end();
        self.size = self.inner.len();
    }

    pub fn trim(&mut self) {
        self.inner.trim();
        self.size = self.inner.len();
    }

    pub fn trim_to_size(&mut self) {
        self.inner.trim_to_size();
    }

    pub fn clear(&mut self) {
        self.inner.clear();
        self.size = 0;
    }

    /// See [`SegmentedBuffer::replace_range`]; overflow is cut from the tail.
    ///
    /// # Panics
    ///
    /// Panics unless `start <= end <= self.size()`.
    pub fn replace_range(&mut self, start: usize, end: usize, replacement: impl Into<SegmentedBuffer<T>>) {
        let replacement = replacement.into();
        let inserted = replacement.len();
        self.inner.replace_range(start, end, replacement);
        self.size = self.size - (end - start) + inserted;
        self.truncate_overflow();
    }

    /// See [`SegmentedBuffer::replace_all`]; overflow is cut from the tail.
    pub fn replace_all(&mut self, search: &[T], replacement: &[T]) -> usize {
        let before = self.size;
        let replaced = self.inner.replace_all(search, replacement);
        self.size = before + replaced * replacement.len() - replaced * search.len();
        self.truncate_overflow();
        replaced
    }

    /// See [`SegmentedBuffer::search_and_replace`]; overflow is cut from the
    /// tail once the scan is complete.
    pub fn search_and_replace<F, R>(&mut self, start_marker: &[T], end_marker: &[T], provider: F)
    where
        F: FnMut(&SegmentedBuffer<T>) -> R,
        R: Into<SegmentedBuffer<T>>,
    {
        let before = self.size;
        self.inner.search_and_replace(start_marker, end_marker, provider);
        let after = self.inner.len();
        log::trace!("substitution changed length from {before} to {after}");
        self.size = after;
        self.truncate_overflow();
    }

    fn truncate_overflow(&mut self) {
        if self.size > self.max_size {
            let overflow = self.size - self.max_size;
            log::debug!("bounded buffer truncated by {overflow} units");
            self.inner.remove_end_chars(overflow);
            self.size = self.max_size;
        }
    }
}

impl<T: Unit> Deref for BoundedSegmentedBuffer<T> {
    type Target = SegmentedBuffer<T>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T: Unit> Extend<T> for BoundedSegmentedBuffer<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for unit in iter.into_iter().take(self.remaining()) {
            self.append(unit);
        }
    }
}

impl<T: Unit> fmt::Debug for BoundedSegmentedBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedSegmentedBuffer")
            .field("max_size", &self.max_size)
            .field("size", &self.size)
            .field("content", &self.inner)
            .finish()
    }
}

impl<T: Unit> fmt::Display for BoundedSegmentedBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}
