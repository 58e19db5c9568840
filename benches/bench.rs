use std::collections::BTreeSet;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use lazy_avl::avl::Tree;

enum TreeEnum<K> {
    Avl(Tree<K>),
    Std(BTreeSet<K>),
}

impl<K> TreeEnum<K>
where
    K: Ord,
{
    fn lookup(&self, k: &K) -> Option<&K> {
        match self {
            Self::Avl(t) => t.lookup(k),
            Self::Std(t) => t.get(k),
        }
    }

    fn insert(&mut self, k: K) {
        match self {
            Self::Avl(t) => {
                let _ = t.insert(k);
            }
            Self::Std(t) => {
                t.insert(k);
            }
        }
    }

    fn remove(&mut self, k: &K) {
        match self {
            Self::Avl(t) => {
                let _ = t.remove(k);
            }
            Self::Std(t) => {
                t.remove(k);
            }
        }
    }
}

/// Builds a fresh tree of each kind holding `0..num_nodes`.
fn trees(num_nodes: usize) -> [(&'static str, TreeEnum<i32>); 2] {
    let mut avl = Tree::new();
    for x in 0..num_nodes {
        let _ = avl.insert(x as i32);
    }
    let std = (0..num_nodes as i32).collect();

    [("lazy-avl", TreeEnum::Avl(avl)), ("btreeset", TreeEnum::Std(std))]
}

/// Helper to bench a function on a BST.
/// It creates a group for the given name and closure and runs tests for various sizes and
/// implementations of BSTs before finishing the group.
fn bench_helper(c: &mut Criterion, name: &str, f: impl Fn(&mut TreeEnum<i32>, i32)) {
    let mut group = c.benchmark_group(name);

    for num_levels in [3, 7, 11, 15] {
        let num_nodes = 2usize.pow(num_levels as u32) - 1;
        let largest_element_in_tree = num_nodes - 1;

        for (index, (name, _)) in trees(num_nodes).iter().enumerate() {
            let id = BenchmarkId::new(*name, largest_element_in_tree);

            group.bench_function(id, |b| {
                b.iter_custom(|iters| {
                    let mut time = std::time::Duration::ZERO;
                    for _ in 0..iters {
                        // Neither tree is `Clone` so each iteration builds its own.
                        let [avl, btree] = trees(num_nodes);
                        let mut tree = black_box(if index == 0 { avl.1 } else { btree.1 });
                        let instant = std::time::Instant::now();
                        f(&mut tree, black_box(largest_element_in_tree as i32));
                        let elapsed = instant.elapsed();
                        time += elapsed;
                    }
                    time
                })
            });
        }
    }

    group.finish();
}

pub fn criterion_benchmark(c: &mut Criterion) {
    bench_helper(c, "lookup", |tree, i| {
        let _value = black_box(tree.lookup(&i));
    });
    bench_helper(c, "remove", |tree, i| {
        tree.remove(&i);
    });

    bench_helper(c, "insert", |tree, i| {
        tree.insert(i + 1);
    });

    bench_helper(c, "lookup-miss", |tree, i| {
        let _value = black_box(tree.lookup(&(i + 1)));
    });
    bench_helper(c, "remove-miss", |tree, i| {
        tree.remove(&(i + 1));
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
