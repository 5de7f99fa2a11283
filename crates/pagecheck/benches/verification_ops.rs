//! Verification Operations Benchmarks
//!
//! Benchmarks for value rendering, comparer resolution and single-attempt
//! verification chains.
//!
//! Run with: `cargo bench --bench verification_ops`

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pagecheck::prelude::*;
use pagecheck::describe_sequence;

fn bench_describe(c: &mut Criterion) {
    let mut group = c.benchmark_group("describe");

    let short: Vec<i32> = (0..8).collect();
    let long: Vec<i32> = (0..512).collect();
    let multiline: Vec<String> = (0..16).map(|i| format!("line {i}\nnext")).collect();

    group.bench_function("string", |bench| {
        bench.iter(|| black_box("Sign In".to_string()).describe());
    });
    group.bench_with_input(BenchmarkId::from_parameter("ints_8"), &short, |bench, v| {
        bench.iter(|| black_box(v).describe());
    });
    group.bench_with_input(BenchmarkId::from_parameter("ints_512"), &long, |bench, v| {
        bench.iter(|| black_box(v).describe());
    });
    group.bench_with_input(
        BenchmarkId::from_parameter("multiline_16"),
        &multiline,
        |bench, v| {
            bench.iter(|| describe_sequence(black_box(v).iter()));
        },
    );

    group.finish();
}

fn bench_comparers(c: &mut Criterion) {
    let mut group = c.benchmark_group("comparers");

    let mut map = ComparerMap::new();
    map.insert_equality::<String>(std::sync::Arc::new(StringComparison::OrdinalIgnoreCase));

    group.bench_function("resolve_default", |bench| {
        bench.iter(|| black_box(&map).resolve_equality::<i32>());
    });
    group.bench_function("resolve_string_comparison", |bench| {
        bench.iter(|| black_box(&map).resolve_string_comparison().unwrap());
    });

    for mode in [
        StringComparison::Ordinal,
        StringComparison::OrdinalIgnoreCase,
        StringComparison::InvariantCultureIgnoreCase,
    ] {
        group.bench_with_input(
            BenchmarkId::new("contains", format!("{mode:?}")),
            &mode,
            |bench, mode| {
                bench.iter(|| mode.contains(black_box("The Quick Brown Fox"), black_box("brown")));
            },
        );
    }

    group.finish();
}

fn bench_verification(c: &mut Criterion) {
    let mut group = c.benchmark_group("verification");

    group.bench_function("equal_pass", |bench| {
        let scope = AssertionScope::new("bench");
        bench.iter(|| scope.should_value("\"Count\" field", black_box(57)).equal(57).unwrap());
    });

    group.bench_function("deferred_failure", |bench| {
        let scope = AssertionScope::new("bench");
        bench.iter(|| {
            scope
                .expect_value("\"Count\" field", black_box(59))
                .at_once()
                .equal(57)
                .unwrap();
            scope.clear()
        });
    });

    group.bench_function("evaluate_once", |bench| {
        bench.iter(|| {
            evaluate_until(|| Ok(black_box(1)), |v| *v == 1, RetryOptions::once()).unwrap()
        });
    });

    group.finish();
}

criterion_group!(benches, bench_describe, bench_comparers, bench_verification);
criterion_main!(benches);
