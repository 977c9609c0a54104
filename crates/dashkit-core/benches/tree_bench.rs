//! Benchmarks for the tree algorithms.
//!
//! Run with: cargo bench -p dashkit-core

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use dashkit_core::{
    TreeNode, apply_projection, build_tree, find_deep, flatten, projected_depth, set_property,
    visible_items,
};
use serde_json::json;
use std::hint::black_box;

/// Balanced tree: `fanout` containers per level, `depth` levels, leaves at the
/// bottom.
fn make_tree(fanout: usize, depth: usize) -> TreeNode {
    fn grow(id: String, fanout: usize, depth: usize) -> TreeNode {
        if depth == 0 {
            return TreeNode::leaf(id);
        }
        let children = (0..fanout)
            .map(|i| grow(format!("{id}.{i}"), fanout, depth - 1))
            .collect();
        TreeNode::container(id).with_children(children)
    }
    let children = (0..fanout).map(|i| grow(format!("n{i}"), fanout, depth - 1)).collect();
    TreeNode::root_with(children)
}

fn last_leaf(root: &TreeNode) -> String {
    root.iter()
        .filter(|node| node.is_leaf)
        .last()
        .map(|node| node.id.clone())
        .unwrap_or_default()
}

fn bench_flatten_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree/flatten_build");
    for (fanout, depth) in [(4, 3), (6, 4), (8, 4)] {
        let tree = make_tree(fanout, depth);
        let size = tree.iter().count();
        group.bench_with_input(BenchmarkId::new("flatten", size), &tree, |b, tree| {
            b.iter(|| black_box(flatten(tree)))
        });
        let flat = flatten(&tree);
        group.bench_with_input(BenchmarkId::new("build", size), &flat, |b, flat| {
            b.iter_batched(|| flat.clone(), |items| black_box(build_tree(items)), BatchSize::SmallInput)
        });
    }
    group.finish();
}

fn bench_edits(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree/edits");
    for (fanout, depth) in [(4, 3), (8, 4)] {
        let tree = make_tree(fanout, depth);
        let size = tree.iter().count();
        let target = last_leaf(&tree);
        group.bench_with_input(BenchmarkId::new("find_deep", size), &tree, |b, tree| {
            b.iter(|| black_box(find_deep(tree, &target)))
        });
        group.bench_with_input(BenchmarkId::new("set_property", size), &tree, |b, tree| {
            b.iter(|| black_box(set_property(tree, &target, "widget", |_| Some(json!("chart")))))
        });
    }
    group.finish();
}

fn bench_drag(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree/drag");
    let tree = make_tree(6, 4);
    let flat = flatten(&tree);
    let active = last_leaf(&tree);
    let over = flat[flat.len() / 2].id().to_string();
    group.bench_function("project_and_commit", |b| {
        b.iter(|| {
            let visible = visible_items(&flat, Some(&active));
            let projection = projected_depth(&visible, &active, &over, 50.0, 50.0);
            let moved = projection.and_then(|p| apply_projection(&flat, &active, &over, &p));
            black_box(moved.map(build_tree))
        })
    });
    group.finish();
}

criterion_group!(benches, bench_flatten_build, bench_edits, bench_drag);
criterion_main!(benches);
