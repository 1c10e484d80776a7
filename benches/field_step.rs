//! Benchmarks for the CPU-side simulation step.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use warpfield::surface::Viewport;
use warpfield::{StarField, StarfieldConfig};

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("field_step");
    let view = Viewport::default();

    for &star_count in &[200u32, 1_000, 5_000] {
        let config = StarfieldConfig {
            star_count,
            ..Default::default()
        };
        let mut field = StarField::with_seed(config, view, 42).unwrap();
        // Warm up so every trail is full and buffers are at steady state.
        for _ in 0..16 {
            field.step(view);
        }

        group.bench_with_input(
            BenchmarkId::from_parameter(star_count),
            &star_count,
            |b, _| b.iter(|| black_box(field.step(view)).heads.len()),
        );
    }

    group.finish();
}

fn bench_trail_lengths(c: &mut Criterion) {
    let mut group = c.benchmark_group("trail_length");
    let view = Viewport::default();

    for &trail_length in &[2usize, 8, 32] {
        let config = StarfieldConfig {
            star_count: 1_000,
            trail_length,
            ..Default::default()
        };
        let mut field = StarField::with_seed(config, view, 42).unwrap();
        for _ in 0..trail_length + 1 {
            field.step(view);
        }

        group.bench_with_input(
            BenchmarkId::from_parameter(trail_length),
            &trail_length,
            |b, _| b.iter(|| black_box(field.step(view)).segments.len()),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_step, bench_trail_lengths);
criterion_main!(benches);
