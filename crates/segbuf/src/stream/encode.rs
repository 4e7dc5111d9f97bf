//! Draining a buffer into a byte sink, one segment at a time.

use alloc::{boxed::Box, vec::Vec};
use core::convert::Infallible;

use futures::future::{self, FutureExt, LocalBoxFuture};

use super::{Priority, Scheduler};
use crate::{
    error::{EncodeError, EncodingError},
    segmented::SegmentedBuffer,
    unit::Unit,
};

/// Converts windows of units to bytes.
///
/// An encoder sees the windows of one buffer in order and may keep state
/// across calls; `end_of_input` is set on the last window.
pub trait CharsetEncoder<T: Unit> {
    /// Appends the encoding of `window` to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError`] when a unit has no representation in the
    /// target charset.
    fn encode(
        &mut self,
        window: &[T],
        out: &mut Vec<u8>,
        end_of_input: bool,
    ) -> Result<(), EncodingError>;
}

/// Destination of encoded bytes.
pub trait ByteSink {
    type Error;

    /// Writes one chunk. The pipeline waits for the returned future before
    /// producing the next chunk.
    fn write(&mut self, bytes: Vec<u8>) -> LocalBoxFuture<'_, Result<(), Self::Error>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Utf8Encoder;

impl<T: Unit> CharsetEncoder<T> for Utf8Encoder {
    fn encode(&mut self, window: &[T], out: &mut Vec<u8>, _: bool) -> Result<(), EncodingError> {
        let mut scratch = [0; 4];
        for unit in window {
            out.extend_from_slice(unit.to_char().encode_utf8(&mut scratch).as_bytes());
        }
        Ok(())
    }
}

/// Encodes one byte per character up to `limit`, substituting or failing
/// above it.
#[derive(Debug, Clone, Copy)]
struct SingleByte {
    charset: &'static str,
    limit: u32,
    strict: bool,
    position: usize,
}

impl SingleByte {
    fn encode<T: Unit>(&mut self, window: &[T], out: &mut Vec<u8>) -> Result<(), EncodingError> {
        out.reserve(window.len());
        for unit in window {
            let character = unit.to_char();
            match u8::try_from(u32::from(character)) {
                Ok(byte) if u32::from(byte) <= self.limit => out.push(byte),
                _ if self.strict => {
                    return Err(EncodingError::Unmappable {
                        character,
                        position: self.position,
                        charset: self.charset,
                    });
                }
                _ => out.push(b'?'),
            }
            self.position += 1;
        }
        Ok(())
    }
}

/// ISO-8859-1 encoder.
///
/// Characters above U+00FF become `?`, or fail the encode when strict.
#[derive(Debug, Clone, Copy)]
pub struct Latin1Encoder(SingleByte);

impl Latin1Encoder {
    #[must_use]
    pub fn lenient() -> Self {
        Self::with_strictness(false)
    }

    #[must_use]
    pub fn strict() -> Self {
        Self::with_strictness(true)
    }

    fn with_strictness(strict: bool) -> Self {
        Self(SingleByte {
            charset: "ISO-8859-1",
            limit: 0xFF,
            strict,
            position: 0,
        })
    }
}

impl Default for Latin1Encoder {
    fn default() -> Self {
        Self::lenient()
    }
}

impl<T: Unit> CharsetEncoder<T> for Latin1Encoder {
    fn encode(&mut self, window: &[T], out: &mut Vec<u8>, _: bool) -> Result<(), EncodingError> {
        self.0.encode(window, out)
    }
}

/// US-ASCII encoder; like [`Latin1Encoder`] with U+007F as the limit.
#[derive(Debug, Clone, Copy)]
pub struct AsciiEncoder(SingleByte);

impl AsciiEncoder {
    #[must_use]
    pub fn lenient() -> Self {
        Self::with_strictness(false)
    }

    #[must_use]
    pub fn strict() -> Self {
        Self::with_strictness(true)
    }

    fn with_strictness(strict: bool) -> Self {
        Self(SingleByte {
            charset: "US-ASCII",
            limit: 0x7F,
            strict,
            position: 0,
        })
    }
}

impl Default for AsciiEncoder {
    fn default() -> Self {
        Self::lenient()
    }
}

impl<T: Unit> CharsetEncoder<T> for AsciiEncoder {
    fn encode(&mut self, window: &[T], out: &mut Vec<u8>, _: bool) -> Result<(), EncodingError> {
        self.0.encode(window, out)
    }
}

/// Collects every chunk in memory.
#[derive(Debug, Clone, Default)]
pub struct VecSink {
    bytes: Vec<u8>,
    writes: usize,
}

impl VecSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of chunks received.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl ByteSink for VecSink {
    type Error = Infallible;

    fn write(&mut self, bytes: Vec<u8>) -> LocalBoxFuture<'_, Result<(), Infallible>> {
        self.bytes.extend_from_slice(&bytes);
        self.writes += 1;
        future::ready(Ok(())).boxed_local()
    }
}

/// Encodes `buffer` segment by segment into `sink` and returns the number of
/// bytes written.
///
/// Each segment is encoded as a task on `scheduler` at `priority`, and the
/// next segment is only encoded once the sink has accepted the previous
/// chunk. Empty chunks are not written.
///
/// # Errors
///
/// The first encoder or sink failure aborts the remaining segments and is
/// returned as is. Nothing is retried.
pub async fn encode<T, E, K, S>(
    buffer: &SegmentedBuffer<T>,
    encoder: &mut E,
    sink: &mut K,
    scheduler: &S,
    priority: Priority,
) -> Result<usize, EncodeError<K::Error>>
where
    T: Unit,
    E: CharsetEncoder<T>,
    K: ByteSink,
    S: Scheduler,
{
    let segments = buffer.segments();
    let mut written = 0;
    for (index, segment) in segments.iter().enumerate() {
        let end_of_input = index + 1 == segments.len();
        let bytes = scheduler
            .schedule(
                priority,
                Box::new(|| {
                    let mut out = Vec::with_capacity(segment.len());
                    encoder
                        .encode(&segment.as_slice(), &mut out, end_of_input)
                        .map(|()| out)
                }),
            )
            .await?;
        log::trace!(
            "segment {index}: {} units encoded to {} bytes",
            segment.len(),
            bytes.len()
        );
        if bytes.is_empty() {
            continue;
        }
        written += bytes.len();
        if let Err(error) = sink.write(bytes).await {
            log::warn!("byte sink failed on segment {index}, remaining segments skipped");
            return Err(EncodeError::Sink(error));
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use alloc::{vec, vec::Vec};

    use futures::executor::block_on;

    use super::*;
    use crate::{CompactSegmentedBuffer, Segment, stream::InlineScheduler, stream::test_support::RecordingScheduler};

    /// Accepts `budget` chunks, then fails.
    struct FailingSink {
        budget: usize,
        chunks: Vec<Vec<u8>>,
    }

    impl ByteSink for FailingSink {
        type Error = &'static str;

        fn write(&mut self, bytes: Vec<u8>) -> LocalBoxFuture<'_, Result<(), &'static str>> {
            let result = if self.chunks.len() < self.budget {
                self.chunks.push(bytes);
                Ok(())
            } else {
                Err("disk full")
            };
            future::ready(result).boxed_local()
        }
    }

    fn three_segments() -> SegmentedBuffer {
        let mut buffer = SegmentedBuffer::from("gr");
        buffer.append_segment(Segment::from_str("\u{fc}\u{df}"));
        buffer.append_segment(Segment::from_str(" \u{20ac}"));
        buffer
    }

    #[test]
    fn utf8_encodes_in_segment_order() {
        let buffer = three_segments();
        let scheduler = RecordingScheduler::default();
        let mut sink = VecSink::new();
        let written = block_on(encode(
            &buffer,
            &mut Utf8Encoder,
            &mut sink,
            &scheduler,
            Priority::LessImportant,
        ));
        assert_eq!(written, Ok(10));
        assert_eq!(sink.bytes(), "gr\u{fc}\u{df} \u{20ac}".as_bytes());
        assert_eq!(sink.writes(), 3);
        assert_eq!(*scheduler.priorities.borrow(), vec![Priority::LessImportant; 3]);
    }

    #[test]
    fn lenient_single_byte_encoders_substitute() {
        let buffer = three_segments();
        let mut latin1 = VecSink::new();
        let mut ascii = VecSink::new();
        block_on(async {
            encode(&buffer, &mut Latin1Encoder::lenient(), &mut latin1, &InlineScheduler, Priority::Normal)
                .await
                .unwrap();
            encode(&buffer, &mut AsciiEncoder::lenient(), &mut ascii, &InlineScheduler, Priority::Normal)
                .await
                .unwrap();
        });
        assert_eq!(latin1.into_bytes(), b"gr\xfc\xdf ?");
        assert_eq!(ascii.into_bytes(), b"gr?? ?");
    }

    #[test]
    fn strict_encoder_reports_position_and_stops() {
        let buffer = three_segments();
        let mut sink = VecSink::new();
        let result = block_on(encode(
            &buffer,
            &mut Latin1Encoder::strict(),
            &mut sink,
            &InlineScheduler,
            Priority::Normal,
        ));
        assert_eq!(
            result,
            Err(EncodeError::Encoding(EncodingError::Unmappable {
                character: '\u{20ac}',
                position: 5,
                charset: "ISO-8859-1",
            }))
        );
        assert_eq!(sink.writes(), 2);
    }

    #[test]
    fn first_sink_failure_aborts_remaining_segments() {
        let buffer = three_segments();
        let scheduler = RecordingScheduler::default();
        let mut sink = FailingSink {
            budget: 1,
            chunks: Vec::new(),
        };
        let result = block_on(encode(&buffer, &mut Utf8Encoder, &mut sink, &scheduler, Priority::Normal));
        assert_eq!(result, Err(EncodeError::Sink("disk full")));
        assert_eq!(sink.chunks, [b"gr".to_vec()]);
        // The third segment was never scheduled.
        assert_eq!(scheduler.priorities.borrow().len(), 2);
    }

    #[test]
    fn compact_buffers_encode_as_latin1_or_utf8() {
        let buffer = CompactSegmentedBuffer::from_slice(b"\xe9t\xe9");
        let mut latin1 = VecSink::new();
        let mut utf8 = VecSink::new();
        block_on(async {
            encode(&buffer, &mut Latin1Encoder::strict(), &mut latin1, &InlineScheduler, Priority::Normal)
                .await
                .unwrap();
            encode(&buffer, &mut Utf8Encoder, &mut utf8, &InlineScheduler, Priority::Normal)
                .await
                .unwrap();
        });
        assert_eq!(latin1.bytes(), b"\xe9t\xe9");
        assert_eq!(utf8.bytes(), "\u{e9}t\u{e9}".as_bytes());
    }

    #[test]
    fn empty_buffer_writes_nothing() {
        let buffer = SegmentedBuffer::<char>::with_capacity(16);
        let mut sink = VecSink::new();
        let written = block_on(encode(&buffer, &mut Utf8Encoder, &mut sink, &InlineScheduler, Priority::Normal));
        assert_eq!(written, Ok(0));
        assert_eq!(sink.writes(), 0);
    }
}
