use core::fmt;

use crate::{segmented::SegmentedBuffer, unit::Unit};

/// Appending writer over an exclusively borrowed buffer.
///
/// Character buffers also implement [`core::fmt::Write`], so `write!` works:
///
/// ```rust
/// use core::fmt::Write;
/// use segbuf::{BufferWriter, SegmentedBuffer};
///
/// let mut log_line = SegmentedBuffer::<char>::new();
/// let mut writer = BufferWriter::new(&mut log_line);
/// write!(writer, "{} of {}", 3, 7).unwrap();
/// writer.write('.');
/// assert_eq!(writer.written(), 7);
/// assert_eq!(log_line, "3 of 7.");
/// ```
pub struct BufferWriter<'a, T: Unit = char> {
    buffer: &'a mut SegmentedBuffer<T>,
    written: usize,
}

impl<'a, T: Unit> BufferWriter<'a, T> {
    pub fn new(buffer: &'a mut SegmentedBuffer<T>) -> Self {
        Self { buffer, written: 0 }
    }

    /// Units written through this writer.
    #[must_use]
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn write(&mut self, unit: T) {
        self.buffer.append(unit);
        self.written += 1;
    }

    pub fn write_slice(&mut self, units: &[T]) {
        self.buffer.append_slice(units);
        self.written += units.len();
    }

    /// Appends `text`; characters outside the unit's range are mapped as in
    /// [`SegmentedBuffer::append_str`].
    pub fn write_str(&mut self, text: &str) {
        self.buffer.append_str(text);
        self.written += text.chars().count();
    }

    /// Appends are visible as soon as they are made; there is nothing to
    /// flush.
    pub fn flush(&mut self) {}
}

impl fmt::Write for BufferWriter<'_, char> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        BufferWriter::write_str(self, s);
        Ok(())
    }

    fn write_char(&mut self, c: char) -> fmt::Result {
        self.write(c);
        Ok(())
    }
}
