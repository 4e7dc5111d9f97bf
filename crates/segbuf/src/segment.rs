//! Single contiguous windows over a shared backing array.
//!
//! A [`Segment`] owns nothing but a reference to its storage and three
//! indices. Substrings, clones and the pieces returned by
//! [`Segment::split`] all point into the same array, so creating them never
//! copies characters:
//!
//! ```text
//! storage:  h e l l o ␣ w o r l d · · · ·
//!           ^start                ^end    ^usable_end
//! substring(6, 11) ───────▶ [w o r l d]   (same array)
//! ```
//!
//! Aliasing rules
//! - An in-place mutation (`set_char_at`, `replace_char`, casing) is visible
//!   through every alias whose window overlaps the mutated position.
//! - Aliases made by `substring`, `split` and `clone` have no spare capacity,
//!   so appending to them always moves them to a fresh array first.
//! - Growth allocates a fresh array and copies only the live window. Every
//!   other alias keeps the old array and no longer observes mutations made
//!   through the grown segment.
//! - Storage is guarded by a `RefCell`. An append into an array that is
//!   currently borrowed through [`Segment::as_slice`] moves the appending
//!   segment to a fresh array. In-place mutations of a borrowed array panic
//!   instead of observing a torn write.

use alloc::{rc::Rc, string::String, vec, vec::Vec};
use core::{
    cell::{Ref, RefCell},
    fmt,
};

use crate::unit::Unit;

/// Capacities below this grow by [`GROWTH_STEP`], larger ones by half.
const GROWTH_LIMIT: usize = 1024;
const GROWTH_STEP: usize = 512;

type Storage<T> = Rc<RefCell<Vec<T>>>;

/// A growable window over a backing array that may be shared with other
/// segments.
///
/// `Segment<char>` holds arbitrary text; [`CompactSegment`] stores one
/// ISO-8859-1 character per byte.
pub struct Segment<T: Unit = char> {
    storage: Storage<T>,
    start: usize,
    end: usize,
    usable_end: usize,
}

/// Byte-packed ISO-8859-1 segment.
pub type CompactSegment = Segment<u8>;

/// New capacity for a window of `capacity` units that must hold `required`.
pub(crate) fn grown_capacity(capacity: usize, required: usize) -> usize {
    let grown = if capacity < GROWTH_LIMIT {
        capacity + GROWTH_STEP
    } else {
        capacity + capacity / 2
    };
    grown.max(required)
}

impl<T: Unit> Segment<T> {
    /// Creates an empty segment without storage.
    #[must_use]
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Creates an empty segment able to hold `capacity` units before growing.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: Rc::new(RefCell::new(vec![T::default(); capacity])),
            start: 0,
            end: 0,
            usable_end: capacity,
        }
    }

    /// Copies `units` into a new, exactly sized segment.
    #[must_use]
    pub fn from_slice(units: &[T]) -> Self {
        Self::from_vec(units.to_vec())
    }

    /// Takes ownership of `units` without copying.
    ///
    /// The vector's unused capacity becomes the segment's spare capacity.
    #[must_use]
    pub fn from_vec(mut units: Vec<T>) -> Self {
        let len = units.len();
        let capacity = units.capacity();
        units.resize(capacity, T::default());
        Self {
            storage: Rc::new(RefCell::new(units)),
            start: 0,
            end: len,
            usable_end: capacity,
        }
    }

    /// Copies the characters of `text`, converting each into a unit.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &str) -> Self {
        Self::from_vec(text.chars().map(T::from_char).collect())
    }

    /// Number of units in the window.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the window is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    /// Units the window can hold before the next append reallocates.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.usable_end - self.start
    }

    /// Units that can be appended in place.
    #[inline]
    #[must_use]
    pub fn spare_capacity(&self) -> usize {
        self.usable_end - self.end
    }

    /// Whether `self` and `other` are windows over the same array.
    #[must_use]
    pub fn shares_storage(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.storage, &other.storage)
    }

    /// Returns the unit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[must_use]
    pub fn char_at(&self, index: usize) -> T {
        self.check_index(index);
        self.storage.borrow()[self.start + index]
    }

    /// Overwrites the unit at `index`, visible through every overlapping
    /// alias.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn set_char_at(&mut self, index: usize, unit: T) {
        self.check_index(index);
        self.storage.borrow_mut()[self.start + index] = unit;
    }

    #[must_use]
    pub fn first_char(&self) -> Option<T> {
        (!self.is_empty()).then(|| self.storage.borrow()[self.start])
    }

    #[must_use]
    pub fn last_char(&self) -> Option<T> {
        (!self.is_empty()).then(|| self.storage.borrow()[self.end - 1])
    }

    /// Borrows the live window without copying.
    ///
    /// # Panics
    ///
    /// Panics if the storage is being written through another alias.
    #[must_use]
    pub fn as_slice(&self) -> Ref<'_, [T]> {
        Ref::map(self.storage.borrow(), |units| &units[self.start..self.end])
    }

    /// Copies the window into a new vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.as_slice().to_vec()
    }

    /// Copies the window into the front of `dest` and returns the number of
    /// units written.
    ///
    /// # Panics
    ///
    /// Panics if `dest` is shorter than the segment.
    pub fn fill(&self, dest: &mut [T]) -> usize {
        let len = self.len();
        dest[..len].copy_from_slice(&self.as_slice());
        len
    }

    /// Appends one unit, growing the storage when there is no spare room.
    pub fn append(&mut self, unit: T) {
        self.reserve(1);
        self.storage.borrow_mut()[self.end] = unit;
        self.end += 1;
    }

    /// Appends a slice of units.
    ///
    /// `units` may be a window borrowed from this segment's own storage.
    pub fn append_slice(&mut self, units: &[T]) {
        if units.is_empty() {
            return;
        }
        self.reserve(units.len());
        let end = self.end + units.len();
        self.storage.borrow_mut()[self.end..end].copy_from_slice(units);
        self.end = end;
    }

    /// Appends the characters of `text`, converting each into a unit.
    pub fn append_str(&mut self, text: &str) {
        self.reserve(text.chars().count());
        for c in text.chars() {
            self.append(T::from_char(c));
        }
    }

    /// Makes room for `additional` units, moving the live window to a fresh
    /// array when the current one is too small or is borrowed elsewhere.
    pub fn reserve(&mut self, additional: usize) {
        if self.spare_capacity() >= additional && self.storage.try_borrow_mut().is_ok() {
            return;
        }
        let len = self.len();
        let capacity = grown_capacity(self.capacity(), len + additional);
        let mut fresh = Vec::with_capacity(capacity);
        fresh.extend_from_slice(&self.as_slice());
        fresh.resize(capacity, T::default());
        log::trace!("segment grown from {} to {capacity} units", self.capacity());
        self.storage = Rc::new(RefCell::new(fresh));
        self.start = 0;
        self.end = len;
        self.usable_end = capacity;
    }

    /// Returns an alias of the window `[start, end)`. No units are copied.
    ///
    /// `end <= start` yields an empty segment.
    ///
    /// # Panics
    ///
    /// Panics if `end > self.len()` for a non-empty range.
    #[must_use]
    pub fn substring(&self, start: usize, end: usize) -> Self {
        if end <= start {
            return Self::new();
        }
        assert!(
            end <= self.len(),
            "substring end {end} out of range for length {}",
            self.len()
        );
        Self {
            storage: Rc::clone(&self.storage),
            start: self.start + start,
            end: self.start + end,
            usable_end: self.start + end,
        }
    }

    /// Returns an alias of the window from `start` to the end.
    ///
    /// # Panics
    ///
    /// Panics if `start > self.len()`.
    #[must_use]
    pub fn substring_from(&self, start: usize) -> Self {
        assert!(
            start <= self.len(),
            "substring start {start} out of range for length {}",
            self.len()
        );
        self.substring(start, self.len())
    }

    pub fn trim_beginning(&mut self) {
        let storage = self.storage.borrow();
        while self.start < self.end && storage[self.start].is_whitespace() {
            self.start += 1;
        }
    }

    pub fn trim_end(&mut self) {
        {
            let storage = self.storage.borrow();
            while self.end > self.start && storage[self.end - 1].is_whitespace() {
                self.end -= 1;
            }
        }
        self.release_tail();
    }

    pub fn trim(&mut self) {
        self.trim_beginning();
        self.trim_end();
    }

    /// Replaces every `old` unit with `new` in place.
    pub fn replace_char(&mut self, old: T, new: T) {
        for unit in &mut self.storage.borrow_mut()[self.start..self.end] {
            if *unit == old {
                *unit = new;
            }
        }
    }

    /// Drops up to `count` units from the front of the window.
    pub fn remove_start_chars(&mut self, count: usize) {
        self.start += count.min(self.len());
    }

    /// Drops up to `count` units from the end of the window.
    pub fn remove_end_chars(&mut self, count: usize) {
        self.end -= count.min(self.len());
        self.release_tail();
    }

    /// Positions dropped from the end become spare capacity only while no
    /// other alias can still show them.
    fn release_tail(&mut self) {
        if Rc::strong_count(&self.storage) > 1 {
            self.usable_end = self.end;
        }
    }

    /// Advances the window start past `count` consumed units.
    ///
    /// # Panics
    ///
    /// Panics if `count > self.len()`.
    pub fn move_forward(&mut self, count: usize) {
        assert!(
            count <= self.len(),
            "cannot move forward {count} units over a window of {}",
            self.len()
        );
        self.start += count;
    }

    /// Moves the window into an exactly sized array, detaching it from every
    /// alias.
    pub fn trim_to_size(&mut self) {
        let compact = self.to_vec();
        let len = compact.len();
        self.storage = Rc::new(RefCell::new(compact));
        self.start = 0;
        self.end = len;
        self.usable_end = len;
    }

    pub fn to_lower_case(&mut self) {
        for unit in &mut self.storage.borrow_mut()[self.start..self.end] {
            *unit = unit.to_lower();
        }
    }

    pub fn to_upper_case(&mut self) {
        for unit in &mut self.storage.borrow_mut()[self.start..self.end] {
            *unit = unit.to_upper();
        }
    }

    /// Position of the first `unit` at or after `from`.
    #[must_use]
    pub fn index_of(&self, unit: T, from: usize) -> Option<usize> {
        let window = self.as_slice();
        window
            .get(from..)?
            .iter()
            .position(|u| *u == unit)
            .map(|i| i + from)
    }

    /// Position of the first occurrence of `pattern` at or after `from`.
    ///
    /// An empty pattern matches at `from` when `from <= self.len()`.
    #[must_use]
    pub fn index_of_slice(&self, pattern: &[T], from: usize) -> Option<usize> {
        let window = self.as_slice();
        let tail = window.get(from..)?;
        if pattern.is_empty() {
            return Some(from);
        }
        tail.windows(pattern.len())
            .position(|w| w == pattern)
            .map(|i| i + from)
    }

    #[must_use]
    pub fn contains(&self, pattern: &[T]) -> bool {
        self.index_of_slice(pattern, 0).is_some()
    }

    #[must_use]
    pub fn starts_with(&self, prefix: &[T]) -> bool {
        self.as_slice().starts_with(prefix)
    }

    #[must_use]
    pub fn ends_with(&self, suffix: &[T]) -> bool {
        self.as_slice().ends_with(suffix)
    }

    /// Cuts the window at every `separator`, returning aliases of the pieces.
    ///
    /// `n` separators always yield `n + 1` pieces, empty ones included.
    #[must_use]
    pub fn split(&self, separator: T) -> Vec<Self> {
        let mut pieces = Vec::new();
        let mut from = 0;
        while let Some(at) = self.index_of(separator, from) {
            pieces.push(self.substring(from, at));
            from = at + 1;
        }
        pieces.push(self.substring(from, self.len()));
        pieces
    }

    /// Deep copy into a new, exactly sized array.
    #[must_use]
    pub fn copy(&self) -> Self {
        Self::from_slice(&self.as_slice())
    }

    /// Copies the window into a segment of another unit type.
    #[must_use]
    pub fn convert<U: Unit>(&self) -> Segment<U> {
        Segment::from_vec(
            self.as_slice()
                .iter()
                .map(|u| U::from_char(u.to_char()))
                .collect(),
        )
    }

    fn check_index(&self, index: usize) {
        assert!(
            index < self.len(),
            "index {index} out of range for segment of length {}",
            self.len()
        );
    }
}

impl CompactSegment {
    /// Borrows the window as a byte string.
    #[must_use]
    pub fn as_bstr(&self) -> Ref<'_, bstr::BStr> {
        Ref::map(self.as_slice(), bstr::BStr::new)
    }

    /// Substring search backed by `bstr`'s vectorized finder.
    #[must_use]
    pub fn find_bytes(&self, needle: &[u8], from: usize) -> Option<usize> {
        use bstr::ByteSlice;

        let window = self.as_slice();
        window.get(from..)?.find(needle).map(|i| i + from)
    }
}

impl<T: Unit> Default for Segment<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloning creates an alias: same array, same window, no spare capacity.
impl<T: Unit> Clone for Segment<T> {
    fn clone(&self) -> Self {
        Self {
            storage: Rc::clone(&self.storage),
            start: self.start,
            end: self.end,
            usable_end: self.end,
        }
    }
}

impl<T: Unit> fmt::Debug for Segment<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Segment(")?;
        T::fmt_window(&self.as_slice(), f)?;
        f.write_str(")")
    }
}

impl<T: Unit> fmt::Display for Segment<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use fmt::Write;

        for unit in self.as_slice().iter() {
            f.write_char(unit.to_char())?;
        }
        Ok(())
    }
}

impl<T: Unit> PartialEq for Segment<T> {
    fn eq(&self, other: &Self) -> bool {
        *self.as_slice() == *other.as_slice()
    }
}

impl<T: Unit> Eq for Segment<T> {}

impl<T: Unit> PartialEq<str> for Segment<T> {
    fn eq(&self, other: &str) -> bool {
        self.as_slice()
            .iter()
            .map(|u| u.to_char())
            .eq(other.chars())
    }
}

impl<T: Unit> PartialEq<&str> for Segment<T> {
    fn eq(&self, other: &&str) -> bool {
        PartialEq::<str>::eq(self, *other)
    }
}

impl<T: Unit> From<&str> for Segment<T> {
    fn from(text: &str) -> Self {
        Self::from_str(text)
    }
}

impl<T: Unit> From<&[T]> for Segment<T> {
    fn from(units: &[T]) -> Self {
        Self::from_slice(units)
    }
}

impl<T: Unit> From<Vec<T>> for Segment<T> {
    fn from(units: Vec<T>) -> Self {
        Self::from_vec(units)
    }
}

impl From<String> for Segment<char> {
    fn from(text: String) -> Self {
        Self::from_vec(text.chars().collect())
    }
}
