use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use lazy_avl::avl::Tree;

/// Returns how many nodes are needed to fill a binary tree with `num_levels` levels.
fn num_nodes_in_full_tree(num_levels: usize) -> usize {
    2usize.pow(num_levels as u32) - 1
}

/// Builds a tree by inserting values in an ascending manner. Without rebalancing this would be
/// a linked list.
fn get_ascending_tree(num_levels: usize) -> Tree<i32> {
    let mut tree = Tree::new();
    let tree_size = num_nodes_in_full_tree(num_levels);
    for x in (0..).take(tree_size) {
        let _ = tree.insert(x);
    }

    tree
}

/// Builds a tree by inserting values in a balanced manner. This adds elements so that, without
/// any self-balancing, the resultant tree will still be balanced.
///
/// It ensures there are `num_levels` of nodes, all full.
fn get_balanced_tree(num_levels: usize) -> Tree<i32> {
    let mut tree = Tree::new();
    let tree_size = num_nodes_in_full_tree(num_levels);
    let xs = (0..).take(tree_size).collect::<Vec<_>>();
    fill_balanced_tree(&mut tree, &xs);
    tree
}

/// Recursive helper for [`get_balanced_tree`].
fn fill_balanced_tree(tree: &mut Tree<i32>, xs: &[i32]) {
    if !xs.is_empty() {
        let mid = xs.len() / 2;
        let _ = tree.insert(xs[mid]);
        fill_balanced_tree(tree, &xs[..mid]);
        fill_balanced_tree(tree, &xs[mid + 1..]);
    }
}

/// Helper to bench a function on a tree.
/// It creates a group for the given name and closure and runs tests for various sizes of trees
/// built in ascending and balanced order before finishing the group. Since the tree rebalances,
/// both orders should perform about the same.
fn bench_helper(c: &mut Criterion, name: &str, f: impl Fn(&Tree<i32>, i32)) {
    let mut group = c.benchmark_group(name);

    // For trees of size 2^3, 2^7, etc....
    for num_levels in [3, 7, 11, 15] {
        let tree_tests = [
            ("ascending", get_ascending_tree(num_levels)),
            ("balanced", get_balanced_tree(num_levels)),
        ];
        let largest_element_in_tree = num_nodes_in_full_tree(num_levels) - 1;
        for (name, tree) in tree_tests.iter() {
            let id = BenchmarkId::new(name.to_string(), largest_element_in_tree);

            group.bench_with_input(id, &largest_element_in_tree, |b, _| {
                b.iter(|| {
                    f(tree, largest_element_in_tree as i32);
                })
            });
        }
    }

    group.finish();
}

/// Lookups of present and absent keys against trees built in different orders.
pub fn criterion_benchmark(c: &mut Criterion) {
    bench_helper(c, "lookup", |tree, i| {
        let _value = tree.lookup(&i);
    });
    bench_helper(c, "lookup-miss", |tree, i| {
        let _value = tree.lookup(&(i + 1));
    });
    bench_helper(c, "lookup-smallest", |tree, _| {
        let _value = tree.lookup(&0);
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
