//! Parser throughput benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use dango_parser::Parser;

fn bench_plain_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");

    let plain = "The quick brown fox jumps over the lazy dog. ".repeat(1000);
    group.throughput(Throughput::Bytes(plain.len() as u64));
    group.bench_function("plain_text", |b| {
        b.iter(|| {
            let mut parser = Parser::new();
            let events = parser.parse_collect(black_box(plain.as_bytes()));
            black_box(events)
        })
    });

    group.finish();
}

fn bench_csi_heavy(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");

    let csi = "\x1b[1;31merror\x1b[0m \x1b[10;20H\x1b[2K".repeat(200);
    group.throughput(Throughput::Bytes(csi.len() as u64));
    group.bench_function("csi_sequences", |b| {
        b.iter(|| {
            let mut parser = Parser::new();
            let events = parser.parse_collect(black_box(csi.as_bytes()));
            black_box(events)
        })
    });

    group.finish();
}

fn bench_mixed_output(c: &mut Criterion) {
    let mut group = c.benchmark_group("parser");

    let mixed = "build: \x1b[32mok\x1b[0m in 建物 🛠 0.3s\r\n".repeat(500);
    group.throughput(Throughput::Bytes(mixed.len() as u64));
    group.bench_function("mixed_content", |b| {
        b.iter(|| {
            let mut parser = Parser::new();
            let events = parser.parse_collect(black_box(mixed.as_bytes()));
            black_box(events)
        })
    });

    group.finish();
}

criterion_group!(benches, bench_plain_text, bench_csi_heavy, bench_mixed_output);
criterion_main!(benches);
