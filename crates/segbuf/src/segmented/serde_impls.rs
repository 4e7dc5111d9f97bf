// Character buffers are (de)serialized as strings and byte buffers as byte
// strings, independent of how the content is segmented.

use alloc::{
    string::{String, ToString},
    vec::Vec,
};
use core::fmt;

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{Error, SeqAccess, Visitor},
};

use super::SegmentedBuffer;

impl Serialize for SegmentedBuffer<char> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl Serialize for SegmentedBuffer<u8> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(&self.to_vec())
    }
}

struct TextVisitor;

impl Visitor<'_> for TextVisitor {
    type Value = SegmentedBuffer<char>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a string")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: Error,
    {
        Ok(SegmentedBuffer::from(value))
    }

    fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
    where
        E: Error,
    {
        Ok(SegmentedBuffer::from(value))
    }
}

impl<'de> Deserialize<'de> for SegmentedBuffer<char> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_string(TextVisitor)
    }
}

struct BytesVisitor;

impl<'de> Visitor<'de> for BytesVisitor {
    type Value = SegmentedBuffer<u8>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a byte string")
    }

    fn visit_bytes<E>(self, value: &[u8]) -> Result<Self::Value, E>
    where
        E: Error,
    {
        Ok(SegmentedBuffer::from_slice(value))
    }

    fn visit_byte_buf<E>(self, value: Vec<u8>) -> Result<Self::Value, E>
    where
        E: Error,
    {
        Ok(SegmentedBuffer::from_vec(value))
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: Error,
    {
        Ok(SegmentedBuffer::from(value))
    }

    // Formats without a byte type (JSON among them) write bytes as a sequence.
    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut bytes = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(byte) = seq.next_element::<u8>()? {
            bytes.push(byte);
        }
        Ok(SegmentedBuffer::from_vec(bytes))
    }
}

impl<'de> Deserialize<'de> for SegmentedBuffer<u8> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_byte_buf(BytesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CompactSegmentedBuffer, Segment};

    #[test]
    fn text_is_a_json_string_whatever_the_layout() {
        let mut buffer: SegmentedBuffer = SegmentedBuffer::from("multi");
        buffer.append_segment(Segment::from_str("-segment \"text\""));
        let json = serde_json::to_string(&buffer).unwrap();
        assert_eq!(json, r#""multi-segment \"text\"""#);

        let back: SegmentedBuffer = serde_json::from_str(&json).unwrap();
        assert_eq!(back, buffer);
        assert_eq!(back.segment_count(), 1);
    }

    #[test]
    fn bytes_round_trip_through_json_arrays() {
        let mut buffer = CompactSegmentedBuffer::from_slice(b"\x00\xff");
        buffer.append_segment(Segment::from_slice(b"ok"));
        let json = serde_json::to_string(&buffer).unwrap();
        assert_eq!(json, "[0,255,111,107]");

        let back: CompactSegmentedBuffer = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to_vec(), b"\x00\xffok");
    }

    #[test]
    fn non_strings_are_rejected() {
        let error = serde_json::from_str::<SegmentedBuffer>("42").unwrap_err();
        assert!(error.to_string().contains("a string"));
    }
}
