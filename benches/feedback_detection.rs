//! Feedback Detection Benchmarks
//!
//! Detection must scale linearly with chain length and allocate nothing, so
//! hosts can run it on every rewire. These benches cover acyclic chains (the
//! fast cursor runs off the end), chains closing a loop at various points,
//! and the `Rc`-linked rendition for comparison with the arena.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fxloop::prelude::*;

// ============================================================================
// Chain Sizes
// ============================================================================

const CHAIN_LENGTHS: [usize; 4] = [16, 256, 4096, 65536];
const BLOCK_SIZES: [usize; 3] = [64, 256, 1024];

// ============================================================================
// Helper Functions
// ============================================================================

/// Create a forward-only chain of `len` stages, returning the graph and head
fn create_chain(len: usize) -> (StageGraph, StageId) {
    let mut graph = StageGraph::new();
    let ids: Vec<StageId> = (0..len)
        .map(|i| graph.add(format!("stage{}", i), Transform::gain_boost(0.001)))
        .collect();
    graph.link_all(&ids).unwrap();
    (graph, ids[0])
}

/// Create a chain whose last stage links back to the stage at `entry`
fn create_looped_chain(len: usize, entry: usize) -> (StageGraph, StageId) {
    let (mut graph, head) = create_chain(len);
    let order = graph.chain_from(head).unwrap();
    graph.link(order[len - 1], order[entry]).unwrap();
    (graph, head)
}

/// Create an `Rc`-linked chain of `len` stages, optionally closing a loop
fn create_shared_chain(len: usize, close: bool) -> Vec<StageRef> {
    let stages: Vec<StageRef> = (0..len)
        .map(|_| SharedStage::new(Transform::PassThrough))
        .collect();
    for pair in stages.windows(2) {
        pair[0].set_next(Some(pair[1].clone()));
    }
    if close {
        stages[len - 1].set_next(Some(stages[len / 2].clone()));
    }
    stages
}

// ============================================================================
// Detection Benchmarks
// ============================================================================

fn bench_acyclic_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect_acyclic");

    for &len in &CHAIN_LENGTHS {
        let (graph, head) = create_chain(len);
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, _| {
            b.iter(|| black_box(graph.has_feedback(black_box(Some(head)))));
        });
    }

    group.finish();
}

fn bench_looped_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect_looped");

    for &len in &CHAIN_LENGTHS {
        // Loop closing onto the head, the middle and the last stage
        for (label, entry) in [("head", 0), ("middle", len / 2), ("tail", len - 1)] {
            let (graph, head) = create_looped_chain(len, entry);
            group.throughput(Throughput::Elements(len as u64));
            group.bench_with_input(BenchmarkId::new(label, len), &len, |b, _| {
                b.iter(|| black_box(graph.has_feedback(black_box(Some(head)))));
            });
        }
    }

    group.finish();
}

fn bench_feedback_entry(c: &mut Criterion) {
    let mut group = c.benchmark_group("feedback_entry");

    for &len in &CHAIN_LENGTHS {
        let (graph, head) = create_looped_chain(len, len / 3);
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, _| {
            b.iter(|| black_box(graph.feedback_entry(black_box(Some(head)))));
        });
    }

    group.finish();
}

fn bench_shared_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect_shared");

    for &len in &CHAIN_LENGTHS {
        for close in [false, true] {
            let stages = create_shared_chain(len, close);
            let label = if close { "looped" } else { "acyclic" };
            group.bench_with_input(BenchmarkId::new(label, len), &len, |b, _| {
                b.iter(|| black_box(detect_shared_feedback(black_box(Some(&stages[0])))));
            });
            break_feedback(Some(&stages[0]));
        }
    }

    group.finish();
}

// ============================================================================
// Processing Benchmarks
// ============================================================================

fn bench_process_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_chain");

    for &block in &BLOCK_SIZES {
        let (graph, head) = create_chain(16);
        let mut buffer = vec![0.0f32; block];
        group.throughput(Throughput::Elements(block as u64));
        group.bench_with_input(BenchmarkId::from_parameter(block), &block, |b, _| {
            b.iter(|| {
                graph.process_chain(head, &mut buffer).unwrap();
                black_box(buffer[0])
            });
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark Groups
// ============================================================================

criterion_group!(
    detection_benches,
    bench_acyclic_detection,
    bench_looped_detection,
    bench_feedback_entry,
    bench_shared_detection,
);

criterion_group!(processing_benches, bench_process_chain,);

criterion_main!(detection_benches, processing_benches);
