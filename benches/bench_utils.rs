//! Shared criterion configuration and scaling helpers for the search benches.

use criterion::{BenchmarkId, Criterion, SamplingMode, Throughput};
use std::time::Duration;

/// Criterion tuned for the table and enumeration benches.
///
/// # Settings
/// - Sample size: 30 (table builds are slow)
/// - Measurement time: 5 seconds per benchmark
/// - Warm-up time: 1 second
/// - Noise threshold: 3%
pub fn configure_criterion() -> Criterion {
    Criterion::default()
        .sample_size(30)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
        .noise_threshold(0.03)
        .confidence_level(0.95)
        .without_plots()
}

/// Fewer samples for micro benches during development.
pub fn configure_criterion_quick() -> Criterion {
    Criterion::default()
        .sample_size(20)
        .measurement_time(Duration::from_secs(1))
        .warm_up_time(Duration::from_millis(500))
        .noise_threshold(0.05)
        .without_plots()
}

/// LHS limits for table-build scaling; the candidate count grows as `N^4`.
pub const LHS_LIMITS: &[usize] = &[1, 2, 3, 4];

/// GCF depths for evaluation scaling.
pub const GCF_DEPTHS: &[usize] = &[32, 100, 500, 1_000];

/// Run `bench` once per size, with per-size data from `setup` and element
/// throughput from `elements`.
pub fn bench_scaling<T, S, B>(
    c: &mut Criterion,
    group_name: &str,
    sizes: &[usize],
    elements: fn(usize) -> u64,
    mut setup: S,
    mut bench: B,
) where
    S: FnMut(usize) -> T,
    B: FnMut(&T),
{
    let mut group = c.benchmark_group(group_name);
    group.sampling_mode(SamplingMode::Flat);

    for &size in sizes {
        let data = setup(size);
        group.throughput(Throughput::Elements(elements(size)));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| bench(&data));
        });
    }

    group.finish();
}
