use criterion::{black_box, criterion_group, criterion_main, Criterion};
use stringozzi::prelude::*;

fn haystack(repeats: usize) -> String {
    "the quick brown fox jumps over the lazy dog; ".repeat(repeats)
}

fn search_literal(c: &mut Criterion) {
    let rule = Rule::is_str("lazy dog");
    let input = haystack(200);
    let bytes = input.as_bytes();

    c.bench_function("search literal in 200x haystack", |b| {
        b.iter(|| driver::search(black_box(&rule), black_box(bytes), Flags::NONE))
    });
}

fn search_ipv4(c: &mut Criterion) {
    let rule = stringozzi::derived::ipv4();
    let input = format!("{}192.168.1.42{}", haystack(50), haystack(50));
    let bytes = input.as_bytes();

    c.bench_function("search ipv4 in mixed haystack", |b| {
        b.iter(|| driver::search(black_box(&rule), black_box(bytes), Flags::NONE))
    });
}

fn replace_many_hits(c: &mut Criterion) {
    let rule = Rule::is_str("fox");
    let input = haystack(200);

    c.bench_function("replace all hits in 200x haystack", |b| {
        b.iter(|| driver::replace(black_box(&rule), black_box(&input), "cat", Flags::NONE, None))
    });
}

criterion_group!(benches, search_literal, search_ipv4, replace_many_hits);
criterion_main!(benches);
