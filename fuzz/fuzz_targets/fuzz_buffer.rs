#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use segbuf::{BoundedSegmentedBuffer, BufferOptions, Segment, SegmentedBuffer};

#[derive(Arbitrary, Debug)]
enum Op {
    Append(char),
    AppendStr(String),
    AppendSegment(String),
    AddFirst(char),
    Replace { start: u16, end: u16, text: String },
    RemoveStart(u8),
    RemoveEnd(u8),
    Trim,
    ReplaceAll { search: String, replacement: String },
    Substitute,
    Split,
    TrimToSize,
}

#[derive(Arbitrary, Debug)]
struct Input {
    capacity: u8,
    threshold: u8,
    max_size: u8,
    initial: String,
    ops: Vec<Op>,
}

fn range(len: usize, start: u16, end: u16) -> (usize, usize) {
    let start = usize::from(start) % (len + 1);
    let end = start + usize::from(end) % (len - start + 1);
    (start, end)
}

fn value_of(name: &str) -> String {
    format!("({})", name.chars().count())
}

/// Forward scan over `${name}` markers; stops at an unterminated one.
fn substitute(model: &mut Vec<char>) {
    let mut from = 0;
    loop {
        let Some(open) = (from..model.len().saturating_sub(1))
            .find(|&i| model[i] == '$' && model[i + 1] == '{')
        else {
            return;
        };
        let Some(close) = (open + 2..model.len()).find(|&i| model[i] == '}') else {
            return;
        };
        let name: String = model[open + 2..close].iter().collect();
        let value: Vec<char> = value_of(&name).chars().collect();
        let inserted = value.len();
        model.splice(open..=close, value);
        from = open + inserted;
    }
}

fn replace_all(model: &mut Vec<char>, search: &[char], replacement: &[char]) {
    if search.is_empty() {
        return;
    }
    let mut out = Vec::with_capacity(model.len());
    let mut i = 0;
    while i < model.len() {
        if model[i..].starts_with(search) {
            out.extend_from_slice(replacement);
            i += search.len();
        } else {
            out.push(model[i]);
            i += 1;
        }
    }
    *model = out;
}

fn apply_model(op: &Op, model: &mut Vec<char>) {
    match op {
        Op::Append(c) => model.push(*c),
        Op::AppendStr(text) | Op::AppendSegment(text) => model.extend(text.chars()),
        Op::AddFirst(c) => model.insert(0, *c),
        Op::Replace { start, end, text } => {
            let (start, end) = range(model.len(), *start, *end);
            model.splice(start..end, text.chars());
        }
        Op::RemoveStart(n) => {
            model.drain(..usize::from(*n).min(model.len()));
        }
        Op::RemoveEnd(n) => model.truncate(model.len().saturating_sub(usize::from(*n))),
        Op::Trim => {
            let text: String = model.iter().collect();
            *model = text.trim().chars().collect();
        }
        Op::ReplaceAll {
            search,
            replacement,
        } => {
            let search: Vec<char> = search.chars().collect();
            let replacement: Vec<char> = replacement.chars().collect();
            replace_all(model, &search, &replacement);
        }
        Op::Substitute => substitute(model),
        Op::Split | Op::TrimToSize => {}
    }
}

fn apply(op: &Op, buffer: &mut SegmentedBuffer) {
    match op {
        Op::Append(c) => buffer.append(*c),
        Op::AppendStr(text) => buffer.append_str(text),
        Op::AppendSegment(text) => buffer.append_segment(Segment::from_str(text)),
        Op::AddFirst(c) => buffer.add_first(*c),
        Op::Replace { start, end, text } => {
            let (start, end) = range(buffer.len(), *start, *end);
            buffer.replace_range(start, end, text.as_str());
        }
        Op::RemoveStart(n) => buffer.remove_start_chars(usize::from(*n)),
        Op::RemoveEnd(n) => buffer.remove_end_chars(usize::from(*n)),
        Op::Trim => buffer.trim(),
        Op::ReplaceAll {
            search,
            replacement,
        } => {
            let search: Vec<char> = search.chars().collect();
            let replacement: Vec<char> = replacement.chars().collect();
            buffer.replace_all(&search, &replacement);
        }
        Op::Substitute => {
            buffer.search_and_replace_str("${", "}", |name| value_of(&name.to_string()));
        }
        Op::Split => {
            let pieces = buffer.split('a');
            let rejoined: Vec<String> = pieces.iter().map(ToString::to_string).collect();
            assert_eq!(rejoined.join("a"), buffer.to_string());
        }
        Op::TrimToSize => buffer.trim_to_size(),
    }
}

fn apply_bounded(op: &Op, buffer: &mut BoundedSegmentedBuffer) {
    match op {
        Op::Append(c) => buffer.append(*c),
        Op::AppendStr(text) => buffer.append_str(text),
        Op::AppendSegment(text) => buffer.append_segment(Segment::from_str(text)),
        Op::AddFirst(c) => buffer.add_first(*c),
        Op::Replace { start, end, text } => {
            let (start, end) = range(buffer.size(), *start, *end);
            buffer.replace_range(start, end, text.as_str());
        }
        Op::RemoveStart(n) => buffer.remove_start_chars(usize::from(*n)),
        Op::RemoveEnd(n) => buffer.remove_end_chars(usize::from(*n)),
        Op::Trim => buffer.trim(),
        Op::ReplaceAll {
            search,
            replacement,
        } => {
            let search: Vec<char> = search.chars().collect();
            let replacement: Vec<char> = replacement.chars().collect();
            buffer.replace_all(&search, &replacement);
        }
        Op::Substitute => {
            let start: Vec<char> = "${".chars().collect();
            buffer.search_and_replace(&start, &['}'], |name| value_of(&name.to_string()));
        }
        Op::Split => {}
        Op::TrimToSize => buffer.trim_to_size(),
    }
}

fuzz_target!(|input: Input| {
    let options = BufferOptions {
        initial_segment_capacity: usize::from(input.capacity % 64),
        large_append_threshold: usize::from(input.threshold),
        ..BufferOptions::default()
    };
    let max_size = usize::from(input.max_size);

    let mut buffer = SegmentedBuffer::with_options(options);
    buffer.append_str(&input.initial);
    let mut bounded = BoundedSegmentedBuffer::with_options(max_size, options);
    bounded.append_str(&input.initial);
    let mut model: Vec<char> = input.initial.chars().collect();
    let mut bounded_model: Vec<char> = model.iter().copied().take(max_size).collect();

    for op in input.ops.iter().take(64) {
        apply(op, &mut buffer);
        apply_bounded(op, &mut bounded);
        apply_model(op, &mut model);
        apply_model(op, &mut bounded_model);
        bounded_model.truncate(max_size);

        buffer.check_invariants();
        bounded.check_invariants();
        assert_eq!(buffer.to_string(), model.iter().collect::<String>(), "after {op:?}");
        assert_eq!(bounded.size(), bounded.len());
        assert_eq!(
            bounded.to_string(),
            bounded_model.iter().collect::<String>(),
            "bounded after {op:?}"
        );
    }
});
