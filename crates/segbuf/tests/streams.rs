#![expect(missing_docs)]

use std::{
    cell::RefCell,
    future::Future,
    pin::Pin,
    rc::Rc,
    task::{Context, Poll},
};

use futures::{
    executor::block_on,
    future::{FutureExt, LocalBoxFuture},
};
use segbuf::{
    BufferReader, ByteSink, CompactSegmentedBuffer, EncodeError, EncodingError, EndOfData,
    InlineScheduler, Latin1Encoder, Priority, Segment, SegmentedBuffer, Utf8Encoder, VecSink,
    encode,
};

/// Returns `Pending` once, waking itself, then completes.
struct YieldOnce(bool);

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            return Poll::Ready(());
        }
        self.0 = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

/// Records every chunk, completing each write only after a yield.
#[derive(Clone, Default)]
struct SharedSink {
    chunks: Rc<RefCell<Vec<Vec<u8>>>>,
}

impl ByteSink for SharedSink {
    type Error = std::io::Error;

    fn write(&mut self, bytes: Vec<u8>) -> LocalBoxFuture<'_, Result<(), std::io::Error>> {
        let chunks = Rc::clone(&self.chunks);
        async move {
            YieldOnce(false).await;
            chunks.borrow_mut().push(bytes);
            Ok(())
        }
        .boxed_local()
    }
}

fn document() -> SegmentedBuffer {
    let mut buffer = SegmentedBuffer::new();
    for part in ["line one\n", "line two\nline", " three\n"] {
        buffer.append_segment(Segment::from_str(part));
    }
    buffer
}

#[test]
fn reads_lines_across_segments() {
    let buffer = document();
    let mut reader = BufferReader::new(&buffer);
    let mut lines = Vec::new();
    loop {
        let mut line = SegmentedBuffer::new();
        if !reader.read_until('\n', &mut line) {
            assert!(line.is_empty());
            break;
        }
        lines.push(line.to_string());
    }
    assert_eq!(lines, ["line one", "line two", "line three"]);
    assert_eq!(reader.read(), Err(EndOfData));
}

#[test]
fn encode_waits_for_each_deferred_write() {
    let buffer = document();
    let sink = SharedSink::default();
    let written = block_on(encode(
        &buffer,
        &mut Utf8Encoder,
        &mut sink.clone(),
        &InlineScheduler,
        Priority::Normal,
    ))
    .unwrap();
    assert_eq!(written, buffer.len());
    let chunks = sink.chunks.borrow();
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks.concat(), b"line one\nline two\nline three\n");
}

#[test]
fn strict_latin1_stops_before_the_offending_segment_is_written() {
    let mut buffer = CompactSegmentedBuffer::from_slice(b"na\xefve ");
    buffer.append_str("caf\u{e9}");
    let mut text = SegmentedBuffer::<char>::from(buffer.to_string().as_str());
    text.append_segment(Segment::from_str(" \u{2603}"));

    let mut sink = VecSink::new();
    let result = block_on(encode(
        &text,
        &mut Latin1Encoder::strict(),
        &mut sink,
        &InlineScheduler,
        Priority::Background,
    ));
    let Err(EncodeError::Encoding(EncodingError::Unmappable { character, position, .. })) = result
    else {
        panic!("expected an unmappable character, got {result:?}");
    };
    assert_eq!((character, position), ('\u{2603}', 11));
    assert_eq!(sink.bytes(), b"na\xefve caf\xe9");
}
