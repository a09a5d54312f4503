//! Sinc reconstruction benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lib_dsp::reconstruction::{mse_sweep, Reconstruction, SamplingParams, DEFAULT_T_VIEW};
use lib_types::units::Hertz;

fn bench_reconstruction(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconstruction");

    for f_sample in [4.0, 16.0, 64.0].iter() {
        let params = SamplingParams::new(Hertz(3.0), Hertz(*f_sample));
        group.bench_with_input(
            BenchmarkId::new("compute", f_sample),
            &params,
            |b, p| {
                b.iter(|| Reconstruction::compute(black_box(p)));
            },
        );
    }

    let rates: Vec<Hertz> = (1..=16).map(|k| Hertz(k as f64)).collect();
    group.bench_function("sweep_16_rates", |b| {
        b.iter(|| mse_sweep(Hertz(3.0), black_box(&rates), DEFAULT_T_VIEW));
    });

    group.finish();
}

criterion_group!(benches, bench_reconstruction);
criterion_main!(benches);
