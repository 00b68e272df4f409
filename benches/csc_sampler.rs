//! Benchmarks for the CSC sampler.
//!
//! Run:
//! - cargo bench --bench csc_sampler

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use ringosc_figures::core::csc::{FIXED_PLACEMENT_CAP, sample_csc};

const POPULATIONS: [usize; 3] = [64, 1024, 4096];

/// Distinct periods around 3.7 ns with a small per-configuration spread.
fn make_periods(n: usize, offset: f64) -> Vec<f64> {
    (0..n)
        .map(|i| 3.69 + offset + (i as f64 * 0.618_034).fract() * 0.02)
        .collect()
}

fn bench_sample_csc(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample_csc");
    group.sample_size(30);

    for &n in &POPULATIONS {
        let d0s = make_periods(n, 0.0);
        let d1s = make_periods(n, 0.001);
        let id = BenchmarkId::new("pairs", format!("n{n}"));
        group.bench_with_input(id, &(d0s, d1s), |b, (d0s, d1s)| {
            b.iter(|| {
                let sample = sample_csc(black_box(d0s), black_box(d1s), FIXED_PLACEMENT_CAP);
                black_box(sample)
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sample_csc);
criterion_main!(benches);
