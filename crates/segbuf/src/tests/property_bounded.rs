use alloc::{
    string::{String, ToString},
    vec::Vec,
};

use quickcheck::QuickCheck;

use super::{
    model::{Op, model_string, small_options},
    quickcheck_tests,
};
use crate::BoundedSegmentedBuffer;

/// Property: a bounded buffer behaves like the unbounded model truncated to
/// `max_size` after every step, and its tracked size never drifts.
#[test]
fn bounded_buffer_is_a_truncated_model() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(max_size: u8, ops: Vec<Op>) -> bool {
        let max_size = usize::from(max_size % 24);
        let mut buffer = BoundedSegmentedBuffer::with_options(max_size, small_options());
        let mut model = Vec::new();
        for op in &ops {
            op.apply_bounded(&mut buffer);
            op.apply_model(&mut model);
            model.truncate(max_size);
            buffer.check_invariants();
            if buffer.size() != buffer.len()
                || buffer.size() > max_size
                || buffer.to_string() != model_string(&model)
            {
                return false;
            }
        }
        true
    }

    QuickCheck::new()
        .tests(quickcheck_tests())
        .quickcheck(prop as fn(u8, Vec<Op>) -> bool);
}

/// Property: once full, appends leave the content untouched.
#[test]
fn full_buffer_keeps_its_prefix() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(max_size: u8, text: String, more: String) -> bool {
        let max_size = usize::from(max_size % 16);
        let mut buffer = BoundedSegmentedBuffer::<char>::new(max_size);
        buffer.append_str(&text);
        let before = buffer.to_string();
        if buffer.is_full() {
            buffer.append_str(&more);
            for c in more.chars() {
                buffer.append(c);
            }
        }
        let expected: String = text.chars().take(max_size).collect();
        before == expected && (!buffer.is_full() || buffer.to_string() == before)
    }

    QuickCheck::new()
        .tests(quickcheck_tests())
        .quickcheck(prop as fn(u8, String, String) -> bool);
}
