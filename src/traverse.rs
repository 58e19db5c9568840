//! Pre-, in- and post-order traversals of a [`BiTree`].
//!
//! Each function starts at `start` (usually [`BiTree::root`]) and returns references to the
//! payloads in the order the nodes are visited. A `None` start visits nothing.
//!
//! The traversals keep an explicit stack instead of recursing since a plain [`BiTree`] has no
//! bound on its height.
//!
//! # Examples
//!
//! ```
//! use lazy_avl::bitree::BiTree;
//! use lazy_avl::traverse;
//!
//! //     b
//! //    / \
//! //   a   c
//! let mut tree = BiTree::new();
//! let root = tree.insert_left(None, 'b').unwrap();
//! tree.insert_left(Some(root), 'a').unwrap();
//! tree.insert_right(Some(root), 'c').unwrap();
//!
//! assert_eq!(traverse::preorder(&tree, tree.root()), vec![&'b', &'a', &'c']);
//! assert_eq!(traverse::inorder(&tree, tree.root()), vec![&'a', &'b', &'c']);
//! assert_eq!(traverse::postorder(&tree, tree.root()), vec![&'a', &'c', &'b']);
//! ```

use crate::bitree::{BiTree, NodeId};

/// Visits a node, then its left subtree, then its right subtree.
pub fn preorder<T>(tree: &BiTree<T>, start: Option<NodeId>) -> Vec<&T> {
    let mut visited = Vec::new();
    let mut stack: Vec<NodeId> = start.into_iter().collect();
    while let Some(id) = stack.pop() {
        visited.push(tree.data_of(id));
        // Right goes on first so the left subtree is popped first.
        stack.extend(tree.right_of(id));
        stack.extend(tree.left_of(id));
    }
    visited
}

/// Visits the left subtree, then the node, then the right subtree.
pub fn inorder<T>(tree: &BiTree<T>, start: Option<NodeId>) -> Vec<&T> {
    let mut visited = Vec::new();
    let mut stack = Vec::new();
    let mut next = start;
    loop {
        while let Some(id) = next {
            stack.push(id);
            next = tree.left_of(id);
        }
        let Some(id) = stack.pop() else {
            return visited;
        };
        visited.push(tree.data_of(id));
        next = tree.right_of(id);
    }
}

/// Visits the left subtree, then the right subtree, then the node.
pub fn postorder<T>(tree: &BiTree<T>, start: Option<NodeId>) -> Vec<&T> {
    // A mirrored preorder (node, right, left) reversed is a postorder.
    let mut visited = Vec::new();
    let mut stack: Vec<NodeId> = start.into_iter().collect();
    while let Some(id) = stack.pop() {
        visited.push(tree.data_of(id));
        stack.extend(tree.left_of(id));
        stack.extend(tree.right_of(id));
    }
    visited.reverse();
    visited
}
