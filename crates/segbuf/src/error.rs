use thiserror::Error;

/// Signals that a reader has no more data.
///
/// This is the expected outcome of reading past the end of a buffer, not a
/// failure of the buffer itself.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("end of data")]
pub struct EndOfData;

/// A character could not be represented by a charset encoder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("character {character:?} at position {position} cannot be encoded in {charset}")]
    Unmappable {
        character: char,
        position: usize,
        charset: &'static str,
    },
}

/// Failure of the encode pipeline.
///
/// `E` is the error type of the byte sink the buffer is drained into.
#[derive(Error, Debug, PartialEq)]
pub enum EncodeError<E> {
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),
    #[error("sink error: {0}")]
    Sink(E),
}
