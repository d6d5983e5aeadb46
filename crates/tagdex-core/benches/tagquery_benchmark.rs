//! Benchmarks for tag query evaluation over an in-memory series set.
//!
//! # Usage
//!
//! ```bash
//! cargo bench --bench tagquery_benchmark -- --noplot
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tagdex_core::{Expression, MetricDefinition, Operator, TagQuery};

const SERIES: usize = 10_000;

fn generate_series(count: usize) -> Vec<MetricDefinition> {
    (0..count)
        .map(|i| {
            let tags = [
                format!("dc=dc{}", i % 4),
                format!("host=host-{i}"),
                format!("role={}", if i % 3 == 0 { "db" } else { "web" }),
            ];
            MetricDefinition::new(1, "cpu.user", &tags)
        })
        .collect()
}

fn bench_filter(c: &mut Criterion) {
    let series = generate_series(SERIES);
    let equality = TagQuery::new(vec![
        Expression::equal("dc", "dc1"),
        Expression::not_equal("role", "db"),
    ])
    .expect("query");
    let pattern = TagQuery::new(vec![
        Expression::new("host", Operator::Match, "host-1.*").expect("expr"),
        Expression::absence("canary"),
    ])
    .expect("query");

    let mut group = c.benchmark_group("filter_10k");
    group.sample_size(50);

    group.bench_function("equality", |b| {
        b.iter(|| black_box(equality.filter(series.iter()).count()));
    });
    group.bench_function("regex", |b| {
        b.iter(|| black_box(pattern.filter(series.iter()).count()));
    });

    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let query = TagQuery::new(vec![
        Expression::equal("dc", "eu"),
        Expression::presence("host"),
    ])
    .expect("query");
    let tags = ["role=web", "host=a", "dc=eu"];

    c.bench_function("evaluate/unsorted_tags", |b| {
        b.iter(|| black_box(query.evaluate(black_box("cpu.user"), black_box(&tags))));
    });
}

criterion_group!(benches, bench_filter, bench_evaluate);
criterion_main!(benches);
