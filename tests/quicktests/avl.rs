use lazy_avl::avl::{Inserted, Tree};
use lazy_avl::error::Error;
use lazy_avl::traverse;

use std::collections::{BTreeSet, HashSet};

use crate::Op;

/// Applies a set of operations to a tree and a set of live keys.
/// This way we can ensure that after a random smattering of inserts
/// and removes we have the same set of keys in both.
fn do_ops<K>(ops: &[Op<K>], tree: &mut Tree<K>, set: &mut BTreeSet<K>)
where
    K: Ord + Clone + std::fmt::Debug,
{
    for op in ops {
        match op {
            Op::Insert(k) => match tree.insert(k.clone()) {
                Ok(_) => assert!(set.insert(k.clone())),
                Err(Error::DuplicateKey(_)) => assert!(set.contains(k)),
                Err(err) => panic!("unexpected error: {}", err),
            },
            Op::Remove(k) => {
                assert_eq!(tree.remove(k).is_ok(), set.remove(k));
            }
        }
    }
}

#[quickcheck]
fn fuzz_multiple_operations_i8(ops: Vec<Op<i8>>) -> bool {
    let mut tree = Tree::new();
    let mut set = BTreeSet::new();

    do_ops(&ops, &mut tree, &mut set);
    tree.iter().eq(set.iter())
}

#[quickcheck]
fn contains(xs: Vec<i8>) -> bool {
    let mut tree = Tree::new();
    for x in &xs {
        let _ = tree.insert(*x);
    }

    xs.iter().all(|x| tree.lookup(x) == Some(x))
}

#[quickcheck]
fn contains_not(xs: Vec<i8>, nots: Vec<i8>) -> bool {
    let mut tree = Tree::new();
    for x in &xs {
        let _ = tree.insert(*x);
    }
    let added: HashSet<_> = xs.into_iter().collect();
    let nots: HashSet<_> = nots.into_iter().collect();
    let mut nots = nots.difference(&added);

    nots.all(|x| tree.lookup(x).is_none())
}

#[quickcheck]
fn with_removals(xs: Vec<i8>, removes: Vec<i8>) -> bool {
    let mut tree = Tree::new();
    for x in &xs {
        let _ = tree.insert(*x);
    }
    for remove in &removes {
        let _ = tree.remove(remove);
    }

    let mut still_present = xs;
    for remove in &removes {
        // We may have inserted the same value multiple times - remove each one.
        while let Some(pos) = still_present.iter().position(|x| x == remove) {
            still_present.swap_remove(pos);
        }
    }

    removes.iter().all(|x| tree.lookup(x).is_none())
        && still_present.iter().all(|x| tree.lookup(x).is_some())
}

#[quickcheck]
fn size_counts_every_node(xs: Vec<i8>, removes: Vec<i8>) -> bool {
    let mut tree = Tree::new();
    let mut created = 0;
    for x in &xs {
        if let Ok(Inserted::Created) = tree.insert(*x) {
            created += 1;
        }
    }
    for remove in &removes {
        let _ = tree.remove(remove);
    }
    let distinct: HashSet<_> = xs.iter().collect();

    tree.size() == created && created == distinct.len()
}

#[quickcheck]
fn revival_keeps_shape(xs: Vec<i8>, revive: Vec<i8>) -> bool {
    let mut tree = Tree::new();
    for x in &xs {
        let _ = tree.insert(*x);
    }
    let layout = |tree: &Tree<i8>| {
        let nodes = tree.as_bitree();
        traverse::preorder(nodes, nodes.root())
            .into_iter()
            .map(|entry| (*entry.data(), entry.balance()))
            .collect::<Vec<_>>()
    };
    let before = layout(&tree);

    for x in &revive {
        if tree.remove(x).is_ok() {
            assert_eq!(tree.insert(*x).ok(), Some(Inserted::Revived));
        }
    }

    layout(&tree) == before
}

#[quickcheck]
fn inorder_is_sorted_including_hidden(xs: Vec<i16>, removes: Vec<i16>) -> bool {
    let mut tree = Tree::new();
    for x in &xs {
        let _ = tree.insert(*x);
    }
    for remove in &removes {
        let _ = tree.remove(remove);
    }

    let nodes = tree.as_bitree();
    let keys: Vec<i16> = traverse::inorder(nodes, nodes.root())
        .into_iter()
        .map(|entry| *entry.data())
        .collect();
    keys.windows(2).all(|w| w[0] < w[1])
}
