//! Adaptive Huffman throughput benchmarks

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use oxistream_huffman::{HuffmanConfig, decode, encode};
use std::hint::black_box;

fn text_like(size: usize) -> Vec<u8> {
    let text = b"The quick brown fox jumps over the lazy dog. ";
    text.iter().copied().cycle().take(size).collect()
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("huffman_encode");
    let data = text_like(256 * 1024);
    group.throughput(Throughput::Bytes(data.len() as u64));

    for (name, config) in [("fast", HuffmanConfig::FAST), ("default", HuffmanConfig::DEFAULT)] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &data, |b, data| {
            b.iter(|| encode(black_box(data), config).unwrap());
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("huffman_decode");
    let data = text_like(256 * 1024);
    group.throughput(Throughput::Bytes(data.len() as u64));

    for (name, config) in [("fast", HuffmanConfig::FAST), ("default", HuffmanConfig::DEFAULT)] {
        let packed = encode(&data, config).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(name), &packed, |b, packed| {
            b.iter(|| decode(black_box(packed), config).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
