//! Decompression throughput over synthetic streams

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use strikedat::unpack_bytes;

/// Pass-through stream: table size 0 followed by raw bytes
fn pass_through_stream(len: usize) -> Vec<u8> {
    let mut stream = Vec::with_capacity(len + 1);
    stream.push(0x00);
    stream.extend((0..len).map(|i| (i % 251) as u8));
    stream
}

/// Alternating literal runs and RLE runs under an identity table
fn mixed_stream(target_output: usize) -> Vec<u8> {
    let mut stream = vec![0x01, 0xAA, 0xFF, 0x41, 0x42];
    let mut produced = 0usize;

    while produced < target_output {
        // literal run of 32 bytes
        stream.extend_from_slice(&[0xAA, 0x20]);
        stream.extend((0..32).map(|i| (i * 7 % 0xA9) as u8));
        produced += 32;

        // RLE run of 63 bytes
        stream.extend_from_slice(&[0xAA, 0xBF, 0x33]);
        produced += 63;
    }

    stream.extend_from_slice(&[0xAA, 0x00]);
    stream
}

/// Every code expands through a patched pair, stressing the table walk
fn expansion_stream(target_output: usize) -> Vec<u8> {
    let mut stream = vec![
        0x02, 0xAA, // two patch triples
        0x01, 0x61, 0x62, // 0x01 -> (0x61, 0x62)
        0x02, 0x01, 0x01, // 0x02 -> (0x01, 0x01), four output bytes
    ];
    let mut produced = 0usize;

    while produced < target_output {
        stream.extend_from_slice(&[0xAA, 0x3C]); // run of 60 output bytes
        stream.extend(std::iter::repeat(0x02).take(15));
        produced += 60;
    }

    stream.extend_from_slice(&[0xAA, 0x00]);
    stream
}

fn bench_unpack(c: &mut Criterion) {
    let mut group = c.benchmark_group("unpack");

    for size in [4 * 1024, 64 * 1024, 512 * 1024] {
        let stream = pass_through_stream(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            BenchmarkId::new("pass_through", size),
            &stream,
            |b, stream| b.iter(|| unpack_bytes(stream).unwrap()),
        );

        let stream = mixed_stream(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("mixed_runs", size), &stream, |b, stream| {
            b.iter(|| unpack_bytes(stream).unwrap())
        });

        let stream = expansion_stream(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            BenchmarkId::new("table_expansion", size),
            &stream,
            |b, stream| b.iter(|| unpack_bytes(stream).unwrap()),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_unpack);
criterion_main!(benches);
