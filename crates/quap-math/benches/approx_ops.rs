//! Criterion benchmarks for `quap-math`.
//!
//! Covers the grid-sized kernels and both mode-finding paths.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use quap_math::{
    build_quadratic_approximation, evaluate_beta_density, find_posterior_mode_with, Grid,
    ModeSettings, ModeStrategy,
};

fn bench_mode_finder(c: &mut Criterion) {
    let mut group = c.benchmark_group("mode");

    for (name, alpha, beta) in [
        ("globe_9", 7.0, 4.0),
        ("globe_30", 21.0, 11.0),
        ("skewed", 2.0, 80.0),
        ("concentrated", 600.0, 400.0),
    ] {
        for strategy in [ModeStrategy::Numeric, ModeStrategy::ClosedForm] {
            let settings = ModeSettings::default().with_strategy(strategy);
            group.bench_with_input(
                BenchmarkId::new(strategy.to_string(), name),
                &(alpha, beta),
                |b, &(a, bta)| {
                    b.iter(|| {
                        black_box(find_posterior_mode_with(black_box(a), black_box(bta), &settings))
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_grid_kernels(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid");
    let grid = Grid::reference();

    group.bench_function("beta_density_1001", |b| {
        b.iter(|| black_box(evaluate_beta_density(black_box(21.0), black_box(11.0), &grid)));
    });

    group.bench_function("quadratic_approximation_1001", |b| {
        b.iter(|| {
            black_box(build_quadratic_approximation(
                black_box(21.0),
                black_box(11.0),
                black_box(2.0 / 3.0),
                &grid,
            ))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_mode_finder, bench_grid_kernels);
criterion_main!(benches);
