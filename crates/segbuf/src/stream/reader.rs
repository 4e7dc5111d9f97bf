use alloc::boxed::Box;

use super::{Priority, Scheduler};
use crate::{error::EndOfData, segmented::{Cursor, SegmentedBuffer}, unit::Unit};

/// Forward reader over a borrowed buffer.
///
/// ```rust
/// use segbuf::{BufferReader, EndOfData, SegmentedBuffer};
///
/// let text = SegmentedBuffer::<char>::from("key=value");
/// let mut reader = BufferReader::new(&text);
/// let mut key = SegmentedBuffer::new();
/// assert!(reader.read_until('=', &mut key));
/// assert_eq!(key, "key");
/// assert_eq!(reader.read(), Ok('v'));
/// reader.back('V');
/// assert_eq!(reader.by_ref().collect::<String>(), "Value");
/// assert_eq!(reader.read(), Err(EndOfData));
/// ```
pub struct BufferReader<'a, T: Unit = char> {
    buffer: &'a SegmentedBuffer<T>,
    cursor: Cursor,
    pushback: Option<T>,
}

impl<'a, T: Unit> BufferReader<'a, T> {
    #[must_use]
    pub fn new(buffer: &'a SegmentedBuffer<T>) -> Self {
        Self {
            buffer,
            cursor: Cursor::at(buffer.segments(), 0),
            pushback: None,
        }
    }

    /// Units left to read, counting a pushed-back unit.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.cursor.position + usize::from(self.pushback.is_some())
    }

    /// Reads the next unit.
    ///
    /// # Errors
    ///
    /// Returns [`EndOfData`] once the buffer is exhausted.
    pub fn read(&mut self) -> Result<T, EndOfData> {
        if let Some(unit) = self.pushback.take() {
            return Ok(unit);
        }
        let segments = self.buffer.segments();
        let unit = self.cursor.get(segments).ok_or(EndOfData)?;
        self.cursor.advance(segments);
        Ok(unit)
    }

    /// Fills `dest` with as many units as are available, reading across
    /// segment boundaries, and returns the number of units read.
    ///
    /// # Errors
    ///
    /// Returns [`EndOfData`] when `dest` is not empty and nothing is left.
    pub fn read_into(&mut self, dest: &mut [T]) -> Result<usize, EndOfData> {
        if dest.is_empty() {
            return Ok(0);
        }
        let mut filled = 0;
        if let Some(unit) = self.pushback.take() {
            dest[0] = unit;
            filled = 1;
        }
        let segments = self.buffer.segments();
        while filled < dest.len() && !self.cursor.is_end(segments) {
            let segment = &segments[self.cursor.segment];
            let count = (segment.len() - self.cursor.offset).min(dest.len() - filled);
            let from = self.cursor.offset;
            dest[filled..filled + count].copy_from_slice(&segment.as_slice()[from..from + count]);
            filled += count;
            self.cursor.jump_to(segments, from + count);
        }
        if filled == 0 {
            return Err(EndOfData);
        }
        Ok(filled)
    }

    /// Pushes `unit` back so the next read returns it. There is a single
    /// slot; a second push replaces the pending unit.
    pub fn back(&mut self, unit: T) {
        self.pushback = Some(unit);
    }

    /// Appends units to `sink` up to `delimiter` or the end of the buffer.
    /// The delimiter is consumed but not appended. Returns whether it was
    /// found.
    pub fn read_until(&mut self, delimiter: T, sink: &mut SegmentedBuffer<T>) -> bool {
        if let Some(unit) = self.pushback.take() {
            if unit == delimiter {
                return true;
            }
            sink.append(unit);
        }
        let segments = self.buffer.segments();
        while !self.cursor.is_end(segments) {
            let segment = &segments[self.cursor.segment];
            let from = self.cursor.offset;
            let found = segment.index_of(delimiter, from);
            let to = found.unwrap_or(segment.len());
            // `sink` may share this segment's storage.
            let units = segment.as_slice()[from..to].to_vec();
            sink.append_slice(&units);
            if found.is_some() {
                self.cursor.jump_to(segments, to + 1);
                return true;
            }
            self.cursor.jump_to(segments, to);
        }
        false
    }

    /// [`read`](Self::read) routed through `scheduler`.
    ///
    /// # Errors
    ///
    /// Returns [`EndOfData`] once the buffer is exhausted.
    pub async fn read_async(
        &mut self,
        scheduler: &impl Scheduler,
        priority: Priority,
    ) -> Result<T, EndOfData> {
        scheduler.schedule(priority, Box::new(|| self.read())).await
    }

    /// [`read_into`](Self::read_into) routed through `scheduler`.
    ///
    /// # Errors
    ///
    /// Returns [`EndOfData`] when `dest` is not empty and nothing is left.
    pub async fn read_into_async(
        &mut self,
        dest: &mut [T],
        scheduler: &impl Scheduler,
        priority: Priority,
    ) -> Result<usize, EndOfData> {
        scheduler
            .schedule(priority, Box::new(|| self.read_into(dest)))
            .await
    }

    /// [`read_until`](Self::read_until) routed through `scheduler`.
    pub async fn read_until_async(
        &mut self,
        delimiter: T,
        sink: &mut SegmentedBuffer<T>,
        scheduler: &impl Scheduler,
        priority: Priority,
    ) -> bool {
        scheduler
            .schedule(priority, Box::new(|| self.read_until(delimiter, sink)))
            .await
    }
}

impl<T: Unit> Iterator for BufferReader<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.read().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}
