//! Traversal and emission benchmarks over large synthetic forests.
//!
//! Run with: cargo bench --bench perf

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use tui_lazytree::{EmissionPlan, TreeModel, TreeState, ViewportLayout, plan_scroll};

/// Complete forest with `fanout` children per inner node, stored breadth first.
struct WideTree {
    parents: Vec<Option<u32>>,
    children: Vec<Vec<u32>>,
    roots: Vec<u32>,
}

impl WideTree {
    fn new(root_count: u32, fanout: u32, depth: u32) -> Self {
        let mut tree = Self {
            parents: Vec::new(),
            children: Vec::new(),
            roots: Vec::new(),
        };
        let mut level: Vec<u32> = (0..root_count).map(|_| tree.push(None)).collect();
        tree.roots.clone_from(&level);
        for _ in 0..depth {
            let mut next = Vec::with_capacity(level.len() * fanout as usize);
            for &parent in &level {
                for _ in 0..fanout {
                    next.push(tree.push(Some(parent)));
                }
            }
            level = next;
        }
        tree
    }

    fn push(&mut self, parent: Option<u32>) -> u32 {
        let id = u32::try_from(self.parents.len()).unwrap_or(u32::MAX);
        self.parents.push(parent);
        self.children.push(Vec::new());
        if let Some(parent) = parent {
            self.children[parent as usize].push(id);
        }
        id
    }
}

impl TreeModel for WideTree {
    type Id = u32;

    fn parent(&self, id: u32) -> Option<u32> {
        self.parents[id as usize]
    }

    fn children(&self, id: u32) -> &[u32] {
        &self.children[id as usize]
    }

    fn is_leaf(&self, id: u32) -> bool {
        self.children[id as usize].is_empty()
    }

    fn size_hint(&self) -> usize {
        self.parents.len()
    }
}

fn fully_expanded(tree: &WideTree) -> TreeState<u32> {
    let mut state = TreeState::with_capacity(tree.roots.iter().copied(), tree.size_hint())
        .expect("forest has roots");
    for &root in &tree.roots {
        state
            .expand_with_descendants(tree, root)
            .expect("roots are inner nodes");
    }
    state
}

fn bench_traversal(c: &mut Criterion) {
    let mut group = c.benchmark_group("traversal");
    for fanout in [4_u32, 10] {
        let tree = WideTree::new(8, fanout, 4);
        let state = fully_expanded(&tree);
        let visible = state.traverse(&tree).visible_len();

        group.bench_with_input(BenchmarkId::new("visible_len", visible), &tree, |b, tree| {
            b.iter(|| black_box(state.traverse(tree).visible_len()));
        });
        group.bench_with_input(BenchmarkId::new("successor_page", visible), &tree, |b, tree| {
            let start = tree.roots[0];
            b.iter(|| black_box(state.traverse(tree).successor(start, black_box(50))));
        });
        group.bench_with_input(BenchmarkId::new("index_of_last", visible), &tree, |b, tree| {
            let traversal = state.traverse(tree);
            let last = traversal.last_visible();
            b.iter(|| black_box(traversal.index_of(black_box(last))));
        });
    }
    group.finish();
}

fn bench_collapsed_forest(c: &mut Criterion) {
    // Around 600k nodes, none expanded: cost must not depend on the tree size.
    let tree = WideTree::new(16, 8, 5);
    let state = TreeState::new(tree.roots.iter().copied()).expect("forest has roots");
    c.bench_function("collapsed_forest_visible_len", |b| {
        b.iter(|| black_box(state.traverse(&tree).visible_len()));
    });
}

fn bench_emission(c: &mut Criterion) {
    let tree = WideTree::new(8, 10, 4);
    let state = fully_expanded(&tree);
    let mut plan = EmissionPlan::build(&tree, &state);
    c.bench_function("emission_rebuild", |b| {
        b.iter(|| {
            plan.rebuild(&tree, &state);
            black_box(plan.len())
        });
    });
}

fn bench_scroll(c: &mut Criterion) {
    let layout = ViewportLayout::from_extents(1_000, 0, std::iter::repeat_n(1, 60), 60);
    c.bench_function("plan_scroll_far_below", |b| {
        b.iter(|| black_box(plan_scroll(&layout, black_box(50_000), false)));
    });
}

criterion_group!(
    benches,
    bench_traversal,
    bench_collapsed_forest,
    bench_emission,
    bench_scroll
);
criterion_main!(benches);
