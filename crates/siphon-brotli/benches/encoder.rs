// Throughput benchmarks for the brotli stream encoder
//
// Run with: cargo bench -p siphon-brotli --bench encoder

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use siphon_brotli::{Algorithm, BrotliEncoder, EncoderOptions};
use std::io::Write;

fn response_body(size: usize) -> Vec<u8> {
    let line = b"{\"id\":42,\"name\":\"siphon\",\"tags\":[\"http\",\"brotli\"],\"ok\":true}\n";
    line.iter().copied().cycle().take(size).collect()
}

fn benchmark_levels(c: &mut Criterion) {
    let body = response_body(64 * 1024);
    let mut group = c.benchmark_group("brotli_levels");
    group.throughput(Throughput::Bytes(body.len() as u64));

    for (algorithm, quality) in [
        (Algorithm::Standard, 1),
        (Algorithm::Standard, 4),
        (Algorithm::Standard, 9),
        (Algorithm::V2, 2),
        (Algorithm::V2, 4),
        (Algorithm::V2, 7),
    ] {
        let options = EncoderOptions { quality, algorithm };
        group.bench_with_input(
            BenchmarkId::new(algorithm.to_string(), quality),
            &body,
            |b, body| {
                b.iter(|| {
                    let mut enc = BrotliEncoder::new(Vec::new(), options);
                    enc.write_all(black_box(body)).unwrap();
                    enc.close().unwrap();
                    enc.into_inner()
                });
            },
        );
    }

    group.finish();
}

fn benchmark_chunked_stream(c: &mut Criterion) {
    let body = response_body(256 * 1024);
    let options = EncoderOptions {
        quality: 4,
        algorithm: Algorithm::Standard,
    };
    let mut group = c.benchmark_group("brotli_chunked");
    group.throughput(Throughput::Bytes(body.len() as u64));

    for chunk_size in [512usize, 4096, 32 * 1024] {
        group.bench_with_input(BenchmarkId::from_parameter(chunk_size), &body, |b, body| {
            b.iter(|| {
                let mut enc = BrotliEncoder::new(Vec::new(), options);
                for chunk in body.chunks(chunk_size) {
                    enc.write_all(black_box(chunk)).unwrap();
                }
                enc.close().unwrap();
                enc.into_inner()
            });
        });
    }

    group.finish();
}

fn benchmark_reset(c: &mut Criterion) {
    let body = response_body(4 * 1024);
    let options = EncoderOptions {
        quality: 4,
        algorithm: Algorithm::V2,
    };

    c.bench_function("brotli_reset_reuse", |b| {
        let mut enc = BrotliEncoder::new(Vec::new(), options);
        b.iter(|| {
            enc.reset(Vec::with_capacity(1024));
            enc.write_all(black_box(&body)).unwrap();
            enc.close().unwrap();
        });
    });
}

criterion_group!(
    benches,
    benchmark_levels,
    benchmark_chunked_stream,
    benchmark_reset
);
criterion_main!(benches);
