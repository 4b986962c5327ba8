//! Criterion benchmarks for blueprint compilation.
//!
//! - `layout`: placement and routing only
//! - `encode`: full compile including JSON, zlib and base64

use combinet_blueprint::{BlueprintConfig, Layout, build_document, encode_document};
use combinet_logic::test_utils::build_chains;
use criterion::{Criterion, criterion_group, criterion_main};

fn bench_compile(c: &mut Criterion) {
    let config = BlueprintConfig::default();
    let mut circuit = build_chains(32, 16);
    circuit.prime(config.history_len).expect("valid circuit");

    let mut group = c.benchmark_group("compile_32x16");
    group.bench_function("layout", |b| {
        b.iter(|| Layout::plan(&circuit, &config).expect("primed"));
    });
    group.bench_function("encode", |b| {
        b.iter(|| {
            let document = build_document(&circuit, &config).expect("primed");
            encode_document(&document).expect("encodable")
        });
    });
    group.finish();
}

criterion_group!(benches, bench_compile);
criterion_main!(benches);
