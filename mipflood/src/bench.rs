//! Benchmarks for mip generation and flooding.
//! Run with: cargo bench -p mipflood --features bench --bench flood -- "<pattern>"
//!
//! Examples:
//!   cargo bench -p mipflood --features bench --bench flood -- "flood"
//!   cargo bench -p mipflood --features bench --bench flood -- "generate"
//!   cargo bench -p mipflood --features bench --bench flood -- "threads"

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput};

use crate::test_utils::{gradient_with_circular_alpha, normal_field};
use crate::{flood_image, generate_mips, FloodOptions, Image};

const SIZE: u32 = 2048;

fn bench_flood(c: &mut Criterion) {
    let mut group = c.benchmark_group("flood");
    group.sample_size(10);
    group.throughput(Throughput::Elements((SIZE * SIZE) as u64));

    let inputs: [(&str, Image, FloodOptions); 4] = [
        (
            "rgba_u8",
            gradient_with_circular_alpha::<u8>(SIZE, SIZE, 4),
            FloodOptions::default(),
        ),
        (
            "rgba_u8_srgb",
            gradient_with_circular_alpha::<u8>(SIZE, SIZE, 4),
            FloodOptions::albedo(),
        ),
        (
            "rgba_u16",
            gradient_with_circular_alpha::<u16>(SIZE, SIZE, 4),
            FloodOptions::default(),
        ),
        ("normal_f32", normal_field(SIZE, SIZE), FloodOptions::normal_map()),
    ];

    for (name, image, options) in &inputs {
        group.bench_function(*name, |b| {
            b.iter(|| black_box(flood_image(black_box(image), None, options).unwrap()))
        });
    }

    group.finish();
}

fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    group.sample_size(10);

    let image = gradient_with_circular_alpha::<u8>(SIZE, SIZE, 4);
    for composite in [false, true] {
        let options = FloodOptions::default().with_composite_mips(composite);
        let name = if composite { "composited" } else { "raw" };
        group.bench_function(name, |b| {
            b.iter(|| black_box(generate_mips(black_box(&image), None, &options).unwrap()))
        });
    }

    group.finish();
}

fn bench_threads(c: &mut Criterion) {
    let mut group = c.benchmark_group("threads");
    group.sample_size(10);

    let image = gradient_with_circular_alpha::<f32>(SIZE, SIZE, 4);
    for threads in [1usize, 2, 4, 8] {
        let options = FloodOptions::default().with_max_threads(threads);
        group.bench_with_input(BenchmarkId::from_parameter(threads), &options, |b, options| {
            b.iter(|| black_box(flood_image(black_box(&image), None, options).unwrap()))
        });
    }

    group.finish();
}

pub fn benchmarks(c: &mut Criterion) {
    bench_flood(c);
    bench_generate(c);
    bench_threads(c);
}
