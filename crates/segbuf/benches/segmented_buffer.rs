//! Benchmark – `segbuf::SegmentedBuffer`
#![allow(missing_docs)]

use std::time::Duration;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use segbuf::{BufferOptions, Segment, SegmentedBuffer};

/// A template of `fields` placeholders, cut into `parts` segments at fixed
/// intervals so that some markers straddle segment boundaries.
fn make_template(fields: usize, parts: usize) -> SegmentedBuffer {
    let mut text = String::new();
    for i in 0..fields {
        text.push_str("some static text around ${field");
        text.push_str(&i.to_string());
        text.push_str("} and then some more; ");
    }
    let chars: Vec<char> = text.chars().collect();
    let mut buffer = SegmentedBuffer::new();
    for chunk in chars.chunks(chars.len().div_ceil(parts)) {
        buffer.append_segment(Segment::from_slice(chunk));
    }
    buffer
}

fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("append");
    for &capacity in &[1usize, 32, 1_024] {
        let options = BufferOptions {
            initial_segment_capacity: capacity,
            ..BufferOptions::default()
        };
        group.bench_with_input(BenchmarkId::new("unit", capacity), &options, |b, &options| {
            b.iter(|| {
                let mut buffer = SegmentedBuffer::with_options(options);
                for c in ('a'..='z').cycle().take(10_000) {
                    buffer.append(c);
                }
                black_box(buffer.len())
            });
        });
    }
    group.finish();
}

fn bench_search_and_replace(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_and_replace");
    for &parts in &[1usize, 100, 1_000] {
        let template = make_template(200, parts);
        group.bench_with_input(BenchmarkId::from_parameter(parts), &template, |b, template| {
            b.iter(|| {
                let mut page = template.clone();
                page.search_and_replace_str("${", "}", |name| name.len().to_string());
                black_box(page.len())
            });
        });
    }
    group.finish();
}

fn bench_substring(c: &mut Criterion) {
    let template = make_template(500, 500);
    let len = template.len();
    c.bench_function("substring_sliding_window", |b| {
        b.iter(|| {
            let mut total = 0;
            for start in (0..len - 64).step_by(97) {
                total += black_box(template.substring(start, start + 64)).segment_count();
            }
            total
        });
    });
}

fn criterion() -> Criterion {
    let mut c = Criterion::default();
    if cfg!(feature = "bench-fast") {
        c = c
            .warm_up_time(Duration::from_millis(10))
            .measurement_time(Duration::from_millis(100))
            .sample_size(10);
    } else {
        c = c
            .warm_up_time(Duration::from_secs(3))
            .measurement_time(Duration::from_secs(8));
    }
    c
}

criterion_group! {
    name = benches;
    config = criterion();
    targets = bench_append, bench_search_and_replace, bench_substring
}
criterion_main!(benches);
