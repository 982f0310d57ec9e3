//! CRC-32 throughput benchmarks
//!
//! Measures single-shot and incremental CRC-32 over several data sizes, and
//! the overhead of running bytes through a `Crc32Stream`.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use oxistream_core::crc::{Crc32, Crc32Stream};
use oxistream_core::stream::MemoryStream;
use oxistream_core::traits::{ByteStream, Direction};
use std::hint::black_box;

fn random(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut seed: u64 = 0x123456789ABCDEF0;
    for _ in 0..size {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        data.push((seed >> 32) as u8);
    }
    data
}

const SIZES: [(&str, usize); 4] = [
    ("16B", 16),
    ("4KB", 4 * 1024),
    ("64KB", 64 * 1024),
    ("1MB", 1024 * 1024),
];

fn bench_crc32_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("crc32_sizes");

    for (name, size) in SIZES {
        let data = random(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &data, |b, data| {
            b.iter(|| Crc32::compute(black_box(data)));
        });
    }

    group.finish();
}

fn bench_crc32_incremental(c: &mut Criterion) {
    let mut group = c.benchmark_group("crc32_incremental");
    let data = random(64 * 1024);
    group.throughput(Throughput::Bytes(data.len() as u64));

    for chunk in [1usize, 7, 64, 4096] {
        group.bench_with_input(BenchmarkId::new("chunk", chunk), &data, |b, data| {
            b.iter(|| {
                let mut crc = Crc32::new();
                for piece in data.chunks(chunk) {
                    crc.update(black_box(piece));
                }
                crc.finalize()
            });
        });
    }

    group.finish();
}

fn bench_crc32_stream(c: &mut Criterion) {
    let mut group = c.benchmark_group("crc32_stream");
    let data = random(1024 * 1024);
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("encode_with_trailer", |b| {
        b.iter(|| {
            let sink = MemoryStream::writer_with_capacity(data.len() + 4);
            let mut enc = Crc32Stream::with_trailer(sink, Direction::Encode).unwrap();
            for piece in data.chunks(16 * 1024) {
                enc.write(black_box(piece)).unwrap();
            }
            enc.close().unwrap();
            enc.checksum()
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_crc32_sizes,
    bench_crc32_incremental,
    bench_crc32_stream
);
criterion_main!(benches);
