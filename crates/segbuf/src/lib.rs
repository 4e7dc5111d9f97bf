//! Mutable text buffers made of shared, aliasing segments.
//!
//! A [`SegmentedBuffer`] is an ordered list of [`Segment`]s, each a window
//! over a reference-counted backing array. Concatenation, substring and range
//! replacement rearrange windows instead of copying characters, and template
//! substitution scans across segment boundaries in place.
//!
//! ```rust
//! use segbuf::SegmentedBuffer;
//!
//! let mut page = SegmentedBuffer::<char>::from("<h1>${title}</h1>");
//! page.search_and_replace_str("${", "}", |_| "Segments");
//! assert_eq!(page, "<h1>Segments</h1>");
//! ```
//!
//! Units are either `char` or, for [`CompactSegment`] and
//! [`CompactSegmentedBuffer`], ISO-8859-1 bytes. [`BoundedSegmentedBuffer`]
//! caps the total length, and the `streams` feature adds readers, writers
//! and an async encode pipeline.

#![no_std]
#![allow(missing_docs)]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod bounded;
mod error;
mod options;
mod segment;
mod segmented;
#[cfg(feature = "streams")]
mod stream;
mod unit;

#[cfg(test)]
mod tests;

pub use bounded::BoundedSegmentedBuffer;
pub use error::{EncodeError, EncodingError, EndOfData};
pub use options::BufferOptions;
pub use segment::{CompactSegment, Segment};
pub use segmented::{CompactSegmentedBuffer, SegmentedBuffer};
#[cfg(feature = "streams")]
pub use stream::{
    AsciiEncoder, BufferReader, BufferWriter, ByteSink, CharsetEncoder, InlineScheduler,
    Latin1Encoder, Priority, Scheduler, Utf8Encoder, VecSink, encode,
};
pub use unit::Unit;
