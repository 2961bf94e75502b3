//! Benchmarks for binary token encoding and decoding.

#![allow(clippy::unwrap_used, missing_docs)]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sqlite_binary::{BinaryBuffer, decode_from_storage, encode_for_storage, encode_into};
use std::hint::black_box;

/// Deterministic pseudo-random payload.
fn payload(len: usize) -> Vec<u8> {
    let mut state = 0x2545_F491_4F6C_DD1Du64;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 56) as u8
        })
        .collect()
}

/// Benchmark encoding (raw bytes → token).
fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for size in [16usize, 1024, 64 * 1024] {
        let raw = payload(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("random", size), &raw, |b, raw| {
            b.iter(|| encode_for_storage(black_box(raw)).unwrap())
        });
    }

    // Text-like payload that needs a non-trivial offset
    let quotes = b"it's a 'quoted' string\0with nulls".repeat(64);
    group.throughput(Throughput::Bytes(quotes.len() as u64));
    group.bench_function("quoted_text", |b| {
        b.iter(|| {
            let mut buf = Vec::with_capacity(quotes.len() * 2);
            encode_into(black_box(&quotes), &mut buf);
            black_box(buf)
        })
    });

    group.finish();
}

/// Benchmark decoding (token → raw bytes).
fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for size in [16usize, 1024, 64 * 1024] {
        let token = encode_for_storage(&payload(size)).unwrap();
        group.throughput(Throughput::Bytes(token.len() as u64));
        group.bench_with_input(BenchmarkId::new("random", size), &token, |b, token| {
            b.iter(|| decode_from_storage(black_box(token)).unwrap())
        });
    }

    group.finish();
}

/// Benchmark a full buffer cycle (set → encode → decode).
fn bench_buffer(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer");
    let raw = payload(4096);
    group.throughput(Throughput::Bytes(raw.len() as u64));

    group.bench_function("transcode_cycle", |b| {
        let mut buffer = BinaryBuffer::new();
        b.iter(|| {
            buffer.set_binary(black_box(&raw)).unwrap();
            black_box(buffer.encoded().unwrap());
            black_box(buffer.binary().unwrap());
        })
    });

    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode, bench_buffer);
criterion_main!(benches);
