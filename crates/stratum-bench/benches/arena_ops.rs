//! Criterion micro-benchmarks for byte, fixed-stride and aligned arena appends.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use stratum_arena::{AlignedArena, ByteArena, FixedStrideBuilder};
use stratum_bench::{chunk_sizes, fill_byte_arena};

const SEED: u64 = 0x5EED;

/// Benchmark: 10K random appends (1..=64 bytes) into an arena that starts tiny
/// and has to grow.
fn bench_byte_append_growing(c: &mut Criterion) {
    let sizes = chunk_sizes(10_000, 64, SEED);
    c.bench_function("byte_append_10k_growing", |b| {
        b.iter(|| {
            let arena = fill_byte_arena(16, &sizes).unwrap();
            black_box(arena.len());
        });
    });
}

/// Benchmark: the same appends into a recycled arena (discard_all between
/// iterations), so no growth happens after warm-up.
fn bench_byte_append_recycled(c: &mut Criterion) {
    let sizes = chunk_sizes(10_000, 64, SEED);
    let source = [0xA5u8; 64];
    let mut arena = ByteArena::new(16).unwrap();
    c.bench_function("byte_append_10k_recycled", |b| {
        b.iter(|| {
            arena.discard_all();
            for &size in &sizes {
                black_box(arena.append(&source[..size]).unwrap());
            }
        });
    });
}

/// Benchmark: 10K 16-byte records through append_for_write.
fn bench_stride_write(c: &mut Criterion) {
    let mut builder = FixedStrideBuilder::new(16, 1).unwrap();
    c.bench_function("stride_write_10k", |b| {
        b.iter(|| {
            builder.discard_all();
            for i in 0..10_000u64 {
                let mut r = builder.append_for_write(1).unwrap();
                r[..8].copy_from_slice(&i.to_ne_bytes());
                black_box(r.offset());
            }
        });
    });
}

/// Benchmark: 10K random appends with alignment padding.
fn bench_aligned_append(c: &mut Criterion) {
    let sizes = chunk_sizes(10_000, 64, SEED);
    let source = [0x3Cu8; 64];
    let mut arena = AlignedArena::new(16).unwrap();
    c.bench_function("aligned_append_10k", |b| {
        b.iter(|| {
            arena.discard_all();
            for &size in &sizes {
                black_box(arena.append(&source[..size]).unwrap());
            }
        });
    });
}

criterion_group!(
    benches,
    bench_byte_append_growing,
    bench_byte_append_recycled,
    bench_stride_write,
    bench_aligned_append
);
criterion_main!(benches);
