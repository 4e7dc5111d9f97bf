//! Element types a [`Segment`](crate::Segment) can hold.
//!
//! Full text is stored as `char`. The compact representation stores one
//! ISO-8859-1 code point per `u8`, which keeps ASCII and Latin-1 content four
//! times denser; characters outside Latin-1 are replaced with `?` when they
//! are converted into a byte unit.

use core::fmt;

mod sealed {
    pub trait Sealed {}

    impl Sealed for char {}
    impl Sealed for u8 {}
}

/// A single storage element of a segment.
///
/// The trait is sealed: segments are implemented for `char` and `u8` only.
pub trait Unit: sealed::Sealed + Copy + Default + Eq + fmt::Debug + 'static {
    /// Converts a character into this unit, replacing what cannot be
    /// represented.
    fn from_char(c: char) -> Self;

    /// Widens this unit back into a character.
    fn to_char(self) -> char;

    /// Whether the unit is whitespace for the purpose of trimming.
    fn is_whitespace(self) -> bool;

    /// Single-unit lowercase mapping; returns `self` when the mapping would
    /// expand or leave the unit's range.
    fn to_lower(self) -> Self;

    /// Single-unit uppercase mapping; see [`Unit::to_lower`].
    fn to_upper(self) -> Self;

    /// Writes a window of units for `Debug` output.
    ///
    /// # Errors
    ///
    /// Propagates formatter errors.
    fn fmt_window(window: &[Self], f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl Unit for char {
    #[inline]
    fn from_char(c: char) -> Self {
        c
    }

    #[inline]
    fn to_char(self) -> char {
        self
    }

    #[inline]
    fn is_whitespace(self) -> bool {
        char::is_whitespace(self)
    }

    fn to_lower(self) -> Self {
        single(self.to_lowercase()).unwrap_or(self)
    }

    fn to_upper(self) -> Self {
        single(self.to_uppercase()).unwrap_or(self)
    }

    fn fmt_window(window: &[Self], f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write;

        f.write_char('"')?;
        for c in window {
            for e in c.escape_debug() {
                f.write_char(e)?;
            }
        }
        f.write_char('"')
    }
}

impl Unit for u8 {
    #[inline]
    fn from_char(c: char) -> Self {
        u8::try_from(u32::from(c)).unwrap_or(b'?')
    }

    #[inline]
    fn to_char(self) -> char {
        char::from(self)
    }

    #[inline]
    fn is_whitespace(self) -> bool {
        // Latin-1 whitespace is ASCII whitespace plus NEL and NBSP.
        self.is_ascii_whitespace() || self == 0x0B || self == 0x85 || self == 0xA0
    }

    fn to_lower(self) -> Self {
        Self::from_char(char::from(self).to_lower())
    }

    fn to_upper(self) -> Self {
        let upper = char::from(self).to_upper();
        // ÿ and µ uppercase outside Latin-1.
        u8::try_from(u32::from(upper)).unwrap_or(self)
    }

    fn fmt_window(window: &[Self], f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(bstr::BStr::new(window), f)
    }
}

fn single(mut mapping: impl Iterator<Item = char>) -> Option<char> {
    let first = mapping.next()?;
    mapping.next().is_none().then_some(first)
}
