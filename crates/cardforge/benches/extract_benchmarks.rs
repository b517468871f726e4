//! Extraction performance benchmarks.
//!
//! Measures each recovery strategy on portraits of increasing size, with the
//! card placed where that strategy is the first to find it.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use cardforge::png::{encode_chunk, PNG_SIGNATURE};
use cardforge::Extractor;

const CARD: &str = r#"{"spec":"chara_card_v2","data":{"name":"Bench","description":"A character used for benchmarking the recovery strategies.","tags":["bench"]}}"#;

/// A PNG whose IDAT holds `size` bytes of noise, with `extra` chunks before IEND.
fn generate_png(size: usize, extra: &[Vec<u8>]) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(42);
    let noise: Vec<u8> = (0..size)
        .map(|_| rng.r#gen::<u8>())
        // Keep the noise free of anchors the locator would chase.
        .map(|b| if b == b'{' || b == b'"' { b'.' } else { b })
        .collect();

    let mut png = PNG_SIGNATURE.to_vec();
    png.extend(encode_chunk(b"IHDR", &[0, 0, 1, 0, 0, 0, 1, 0, 8, 6, 0, 0, 0]));
    png.extend(encode_chunk(b"IDAT", &noise));
    for chunk in extra {
        png.extend_from_slice(chunk);
    }
    png.extend(encode_chunk(b"IEND", &[]));
    png
}

fn chara_chunk() -> Vec<u8> {
    let mut data = b"chara\0".to_vec();
    data.extend_from_slice(STANDARD.encode(CARD).as_bytes());
    encode_chunk(b"tEXt", &data)
}

fn raw_json_chunk() -> Vec<u8> {
    let mut data = b"XML:com.adobe.xmp\0\0\0\0\0".to_vec();
    data.extend_from_slice(CARD.as_bytes());
    encode_chunk(b"iTXt", &data)
}

fn base64_chunk() -> Vec<u8> {
    let mut data = b"note\0".to_vec();
    data.extend_from_slice(STANDARD.encode(CARD).as_bytes());
    data.push(0);
    encode_chunk(b"zzAp", &data)
}

/// Benchmark each strategy's best case on growing images.
fn bench_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");
    let extractor = Extractor::new();

    for size in [16 * 1024, 256 * 1024, 2 * 1024 * 1024] {
        let cases = [
            ("chunk_scan", generate_png(size, &[chara_chunk()])),
            ("pattern_locate", generate_png(size, &[raw_json_chunk()])),
            ("base64_harvest", generate_png(size, &[base64_chunk()])),
            ("no_card", generate_png(size, &[])),
        ];

        group.throughput(Throughput::Bytes(size as u64));
        for (name, png) in &cases {
            group.bench_with_input(BenchmarkId::new(*name, size), png, |b, png| {
                b.iter(|| extractor.extract(black_box(png)))
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_strategies);
criterion_main!(benches);
