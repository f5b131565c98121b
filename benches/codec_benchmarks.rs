//! Benchmarks for the textual codec and beta extraction.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use polyscop::codec;
use polyscop::extension::ExtensionRegistry;
use polyscop::int::Precision;
use polyscop::ScopConfig;

const MATMUL: &str = include_str!("../tests/data/matmul.scop");

fn config() -> ScopConfig {
    ScopConfig::default().with_precision(Precision::Double)
}

/// Benchmark reading a whole program.
fn bench_read(c: &mut Criterion) {
    let registry = ExtensionRegistry::with_defaults();
    let config = config();

    c.bench_function("read_matmul", |b| {
        b.iter(|| codec::read_scop_with(black_box(MATMUL), &registry, &config).unwrap())
    });
}

/// Benchmark printing, with and without row comments.
fn bench_print(c: &mut Criterion) {
    let scop = codec::read_scop_with(MATMUL, &ExtensionRegistry::with_defaults(), &config()).unwrap();
    let commented = config();
    let bare = config().with_comments(false);

    c.bench_function("print_matmul", |b| {
        b.iter(|| codec::print_scop_with(black_box(&scop), &commented).unwrap())
    });
    c.bench_function("print_matmul_no_comments", |b| {
        b.iter(|| codec::print_scop_with(black_box(&scop), &bare).unwrap())
    });
}

/// Benchmark arbitrary precision reading.
fn bench_read_multiple_precision(c: &mut Criterion) {
    let registry = ExtensionRegistry::with_defaults();
    let config = ScopConfig::default().with_precision(Precision::Multiple);

    c.bench_function("read_matmul_mp", |b| {
        b.iter(|| codec::read_scop_with(black_box(MATMUL), &registry, &config).unwrap())
    });
}

/// Benchmark beta extraction over every scattering part.
fn bench_betas(c: &mut Criterion) {
    let scop = codec::read_scop_with(MATMUL, &ExtensionRegistry::with_defaults(), &config()).unwrap();

    c.bench_function("extract_betas", |b| {
        b.iter(|| polyscop::beta::extract_betas(black_box(&scop)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_read,
    bench_print,
    bench_read_multiple_precision,
    bench_betas
);
criterion_main!(benches);
