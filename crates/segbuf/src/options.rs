/// Allocation policy of a [`SegmentedBuffer`](crate::SegmentedBuffer).
///
/// These options control how large newly allocated trailing segments are and
/// how the segment-reference list grows. They never change the logical
/// content of a buffer, only how it is laid out in memory.
///
/// # Examples
///
/// ```rust
/// use segbuf::{BufferOptions, SegmentedBuffer};
///
/// let mut buffer = SegmentedBuffer::<char>::with_options(BufferOptions {
///     initial_segment_capacity: 4,
///     ..Default::default()
/// });
/// buffer.append_str("hello world");
/// assert_eq!(buffer.to_string(), "hello world");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferOptions {
    /// Capacity of a trailing segment allocated for a small append.
    ///
    /// # Default
    ///
    /// `32`
    pub initial_segment_capacity: usize,

    /// Number of pending units above which a new trailing segment is sized
    /// for the whole pending content plus `initial_segment_capacity`.
    ///
    /// # Default
    ///
    /// `50`
    pub large_append_threshold: usize,

    /// Number of slots added to the segment-reference list when it is full.
    ///
    /// # Default
    ///
    /// `8`
    pub segment_slots_increment: usize,
}

impl BufferOptions {
    /// Capacity for a new trailing segment that must hold `pending` units.
    #[must_use]
    pub fn new_segment_capacity(&self, pending: usize) -> usize {
        let base = self.initial_segment_capacity.max(1);
        if pending > self.large_append_threshold {
            pending + base
        } else {
            base.max(pending)
        }
    }
}

impl Default for BufferOptions {
    fn default() -> Self {
        Self {
            initial_segment_capacity: 32,
            large_append_threshold: 50,
            segment_slots_increment: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BufferOptions;

    #[test]
    fn large_appends_get_room_to_spare() {
        let options = BufferOptions::default();
        assert_eq!(options.new_segment_capacity(1), 32);
        assert_eq!(options.new_segment_capacity(50), 50);
        assert_eq!(options.new_segment_capacity(51), 83);
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let options = BufferOptions {
            initial_segment_capacity: 0,
            ..BufferOptions::default()
        };
        assert_eq!(options.new_segment_capacity(0), 1);
    }
}
