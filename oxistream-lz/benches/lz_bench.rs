//! LZ compression benchmarks across levels

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use oxistream_core::CompressionLevel;
use oxistream_lz::{LzConfig, decode, encode};
use std::hint::black_box;

fn generate_data(size: usize) -> Vec<u8> {
    let phrases: [&[u8]; 4] = [
        b"the sliding window ",
        b"hash chain lookup ",
        b"back-reference ",
        b"literal byte ",
    ];
    let mut state = 12345u64;
    let mut out = Vec::with_capacity(size + 32);
    while out.len() < size {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
        out.extend_from_slice(phrases[(state >> 33) as usize % phrases.len()]);
    }
    out.truncate(size);
    out
}

fn bench_levels(c: &mut Criterion) {
    let data = generate_data(512 * 1024);
    let mut group = c.benchmark_group("lz_encode");
    group.throughput(Throughput::Bytes(data.len() as u64));

    for level in [1u8, 6, 9] {
        let config = LzConfig::from_level(CompressionLevel::new(level));
        group.bench_with_input(BenchmarkId::from_parameter(level), &data, |b, data| {
            b.iter(|| encode(black_box(data), config).unwrap());
        });
    }
    group.finish();

    let packed = encode(&data, LzConfig::DEFAULT).unwrap();
    let mut group = c.benchmark_group("lz_decode");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("default", |b| b.iter(|| decode(black_box(&packed)).unwrap()));
    group.finish();
}

criterion_group!(benches, bench_levels);
criterion_main!(benches);
