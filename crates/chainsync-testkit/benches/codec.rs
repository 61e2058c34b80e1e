//! Codec throughput on the largest conformance vector.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chainsync_core::{attr, cbor, json, Response};
use chainsync_testkit::vectors::all_vectors;

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    for vector in all_vectors() {
        let response: Response = json::from_str(vector.json).unwrap();
        let cbor_bytes = cbor::to_vec(&response);
        let item_bytes = attr::to_json_bytes(&attr::to_item(&response)).unwrap();

        group.throughput(Throughput::Bytes(vector.json.len() as u64));
        group.bench_with_input(BenchmarkId::new("json", vector.name), vector.json, |b, s| {
            b.iter(|| json::from_str::<Response>(black_box(s)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("cbor", vector.name), &cbor_bytes, |b, bytes| {
            b.iter(|| cbor::from_slice::<Response>(black_box(bytes)).unwrap())
        });
        group.bench_with_input(
            BenchmarkId::new("attribute", vector.name),
            &item_bytes,
            |b, bytes| {
                b.iter(|| {
                    let item = attr::from_json_bytes(black_box(bytes)).unwrap();
                    attr::from_item::<Response>(&item).unwrap()
                })
            },
        );
    }

    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    let vector = all_vectors()
        .into_iter()
        .max_by_key(|v| v.json.len())
        .unwrap();
    let response: Response = json::from_str(vector.json).unwrap();

    group.bench_function("json", |b| b.iter(|| json::to_vec(black_box(&response)).unwrap()));
    group.bench_function("cbor", |b| b.iter(|| cbor::to_vec(black_box(&response))));
    group.bench_function("attribute", |b| {
        b.iter(|| attr::to_json_bytes(&attr::to_item(black_box(&response))).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_decode, bench_encode);
criterion_main!(benches);
