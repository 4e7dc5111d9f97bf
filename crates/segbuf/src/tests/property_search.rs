use alloc::{
    string::{String, ToString},
    vec::Vec,
};

use quickcheck::QuickCheck;

use super::{
    model::{Text, chunked},
    quickcheck_tests,
};
use crate::BufferOptions;

/// Char index of the first match of `needle` in `haystack` at or after
/// `from`, computed on the flat text.
fn flat_index_of(haystack: &[char], needle: &[char], from: usize) -> Option<usize> {
    if from > haystack.len() {
        return None;
    }
    if needle.is_empty() {
        return Some(from);
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| i + from)
}

/// Property: searching a segmented buffer agrees with searching the flat
/// text, however the text is cut into segments.
#[test]
fn search_across_boundaries_matches_flat_search() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(text: Text, splits: Vec<usize>, needle: Text, from: usize) -> bool {
        let buffer = chunked(&text.0, &splits);
        let haystack: Vec<char> = text.0.chars().collect();
        let needle: Vec<char> = needle.0.chars().take(3).collect();
        let from = from % (haystack.len() + 2);
        buffer.index_of_slice(&needle, from) == flat_index_of(&haystack, &needle, from)
            && buffer.contains(&needle) == flat_index_of(&haystack, &needle, 0).is_some()
            && buffer.starts_with(&needle) == haystack.starts_with(&needle)
            && buffer.ends_with(&needle) == haystack.ends_with(&needle)
    }

    QuickCheck::new()
        .tests(quickcheck_tests())
        .quickcheck(prop as fn(Text, Vec<usize>, Text, usize) -> bool);
}

/// Property: `split` yields the same pieces as `str::split`, and the pieces
/// rejoined with the separator give the original text.
#[test]
fn split_matches_str_split() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(text: Text, splits: Vec<usize>) -> bool {
        let buffer = chunked(&text.0, &splits);
        let pieces: Vec<String> = buffer.split(' ').iter().map(ToString::to_string).collect();
        let expected: Vec<&str> = text.0.split(' ').collect();
        pieces == expected
    }

    QuickCheck::new()
        .tests(quickcheck_tests())
        .quickcheck(prop as fn(Text, Vec<usize>) -> bool);
}

/// A pattern straddling three one-unit segments is found without copying.
#[test]
fn search_over_single_unit_segments() {
    let mut buffer = crate::SegmentedBuffer::with_options(BufferOptions {
        initial_segment_capacity: 1,
        ..BufferOptions::default()
    });
    "needle in a haystack".chars().for_each(|c| buffer.append(c));
    assert!(buffer.segment_count() >= 20);
    assert_eq!(buffer.index_of_slice(&['h', 'a', 'y'], 0), Some(12));
    assert_eq!(buffer.index_of_slice(&['e', 'd', 'l'], 2), Some(2));
    assert_eq!(buffer.index_of_slice(&['e', 'd', 'l'], 3), None);
}
