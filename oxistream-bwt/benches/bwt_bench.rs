//! BWT block sorting benchmarks

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use oxistream_bwt::bwt::{inverse_transform, transform};
use std::hint::black_box;

fn generate_data(size: usize) -> Vec<u8> {
    let text = b"It was the best of times, it was the worst of times. ";
    let mut state = 42u64;
    text.iter()
        .copied()
        .cycle()
        .take(size)
        .map(|byte| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            if state >> 60 == 0 { b'#' } else { byte }
        })
        .collect()
}

fn bench_transform(c: &mut Criterion) {
    let mut group = c.benchmark_group("bwt");
    for size in [64 * 1024, 256 * 1024, 1024 * 1024] {
        let data = generate_data(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("forward", size), &data, |b, data| {
            b.iter(|| transform(black_box(data)));
        });
        let (last, primary) = transform(&data);
        group.bench_with_input(BenchmarkId::new("inverse", size), &last, |b, last| {
            b.iter(|| inverse_transform(black_box(last), primary).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_transform);
criterion_main!(benches);
