//! Benchmarks for job-fit estimation on large pools (1k-100k nodes)
//!
//! This benchmark suite measures:
//! - Full estimates with and without a node limit
//! - Classad snapshot parsing

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use htcrystalball::core::{estimate, JobRequest, NodeResources};
use htcrystalball::pool::PoolSnapshot;
use std::hint::black_box;
use std::time::Duration;

const GIB: u64 = 1 << 30;

/// Create a node with a mix of shapes seen in a typical campus pool
fn create_test_node(index: u32) -> NodeResources {
    NodeResources::new(
        format!("node{index:06}.example.org"),
        8 << (index % 4),
        (16u64 << (index % 5)) * GIB,
    )
    .with_gpus(if index.is_multiple_of(7) { 4 } else { 0 })
    .with_disk(u64::from(100 + index % 900) * GIB)
}

fn create_test_pool(size: u32) -> Vec<NodeResources> {
    (0..size).map(create_test_node).collect()
}

fn create_classad_dump(size: u32) -> String {
    (0..size)
        .map(|i| {
            format!(
                "Machine = \"node{i:06}.example.org\"\nName = \"slot1@node{i:06}.example.org\"\n\
                 SlotType = \"Partitionable\"\nTotalSlotCpus = {}\nTotalSlotMemory = {}\n\
                 TotalSlotDisk = {}\nTotalSlotGPUs = {}\n\n",
                8 << (i % 4),
                16_384 << (i % 5),
                (100 + i % 900) * 1024 * 1024,
                if i.is_multiple_of(7) { 4 } else { 0 },
            )
        })
        .collect()
}

fn bench_estimate(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimate/full_pool");
    let request = JobRequest::builder()
        .cores(4)
        .memory(10 * GIB)
        .jobs(10_000)
        .duration(Some(Duration::from_secs(900)))
        .build();

    for size in [1_000, 10_000, 50_000, 100_000] {
        let pool = create_test_pool(size);
        group.throughput(Throughput::Elements(u64::from(size)));
        group.bench_with_input(BenchmarkId::new("nodes", size), &pool, |b, pool| {
            b.iter(|| black_box(estimate(black_box(pool), black_box(&request))));
        });
    }

    group.finish();
}

fn bench_estimate_max_nodes(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimate/max_nodes");
    let request = JobRequest::builder()
        .cores(1)
        .memory(2 * GIB)
        .gpus(1)
        .jobs(500)
        .max_nodes(Some(16))
        .build();

    for size in [1_000, 10_000, 100_000] {
        let pool = create_test_pool(size);
        group.throughput(Throughput::Elements(u64::from(size)));
        group.bench_with_input(BenchmarkId::new("nodes", size), &pool, |b, pool| {
            b.iter(|| black_box(estimate(black_box(pool), black_box(&request))));
        });
    }

    group.finish();
}

fn bench_classad_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool/classads");
    group.sample_size(10);

    for size in [1_000, 10_000] {
        let dump = create_classad_dump(size);
        group.throughput(Throughput::Bytes(dump.len() as u64));
        group.bench_with_input(BenchmarkId::new("nodes", size), &dump, |b, dump| {
            b.iter(|| black_box(PoolSnapshot::from_classads(black_box(dump))));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_estimate,
    bench_estimate_max_nodes,
    bench_classad_parsing
);
criterion_main!(benches);
