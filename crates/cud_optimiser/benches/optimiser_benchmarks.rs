//! Benchmarks for commitment allocation.

use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use cud_optimiser::portfolio::PortfolioOptimiser;

fn expected_returns(n: usize) -> BTreeMap<String, f64> {
    (0..n)
        .map(|i| (format!("class-{:03}", i), 0.02 + 0.3 * (i as f64 / n as f64)))
        .collect()
}

fn bench_portfolio_optimise(c: &mut Criterion) {
    let mut group = c.benchmark_group("portfolio_optimise");
    let optimiser = PortfolioOptimiser::new(0.03).unwrap();

    for n in [2usize, 10, 50, 200] {
        let mu = expected_returns(n);
        group.bench_with_input(BenchmarkId::new("assets", n), &mu, |b, mu| {
            b.iter(|| optimiser.optimise(black_box(mu)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_portfolio_optimise);
criterion_main!(benches);
