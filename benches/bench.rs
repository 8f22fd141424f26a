use std::ops::Range;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use marker_tree::{IntervalNode, IntervalTree, NodeId, SearchOptions, TextEdit};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn generate_random_intervals(
    n: usize,
    rng: &mut StdRng,
    start_bound: Range<usize>,
    len_bound: Range<usize>,
) -> Vec<(usize, usize)> {
    (0..n)
        .map(|_| {
            let start = rng.gen_range(start_bound.clone());
            (start, start + rng.gen_range(len_bound.clone()))
        })
        .collect()
}

fn build_tree(intervals: &[(usize, usize)]) -> (IntervalTree<usize>, Vec<NodeId>) {
    let mut tree = IntervalTree::new();
    let handles = intervals
        .iter()
        .enumerate()
        .map(|(i, &(start, end))| tree.insert(IntervalNode::new(i, start, end)))
        .collect();
    (tree, handles)
}

fn insertion_benchmark(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let n = 50000;
    let intervals = generate_random_intervals(n, &mut rng, 0..500_000, 0..100);

    c.bench_function(&format!("insert {n} random intervals"), |b| {
        b.iter(|| black_box(build_tree(&intervals)));
    });
}

fn deletion_benchmark(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let n = 10000;
    let intervals = generate_random_intervals(n, &mut rng, 0..100_000, 0..100);
    let (tree, handles) = build_tree(&intervals);

    c.bench_function(&format!("delete {n} random intervals"), |b| {
        b.iter(|| {
            let mut tree = tree.clone();
            for &handle in &handles {
                tree.delete(handle);
            }
            black_box(tree);
        });
    });
}

fn search_benchmark(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let n = 50000;
    let intervals = generate_random_intervals(n, &mut rng, 0..500_000, 0..100);
    let (tree, _) = build_tree(&intervals);
    let queries: Vec<_> = generate_random_intervals(1000, &mut rng, 0..500_000, 0..2000);
    let options = SearchOptions::default();

    c.bench_function("interval search 1000 windows", |b| {
        b.iter(|| {
            for &(start, end) in &queries {
                black_box(tree.interval_search(start, end, &options));
            }
        });
    });
}

fn edit_benchmark(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let n = 50000;
    let intervals = generate_random_intervals(n, &mut rng, 0..500_000, 0..100);
    let (tree, _) = build_tree(&intervals);
    let edits: Vec<_> = (0..1000)
        .map(|_| {
            let start = rng.gen_range(0..500_000);
            TextEdit::replace(start..start + rng.gen_range(0..10), rng.gen_range(0..10))
        })
        .collect();

    c.bench_function("accept 1000 typing edits", |b| {
        b.iter(|| {
            let mut tree = tree.clone();
            for edit in &edits {
                tree.accept_edit(edit);
            }
            black_box(tree);
        });
    });
}

criterion_group!(
    benches,
    insertion_benchmark,
    deletion_benchmark,
    search_benchmark,
    edit_benchmark
);
criterion_main!(benches);
