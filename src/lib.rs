//! This crate exposes a self-balancing Binary Search Tree with lazy deletion, along with the
//! plain binary tree it is built on, mostly for educational purposes.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to
//! insert, find, and delete stored records. BSTs are typically defined
//! recursively using the notion of a `Node`. A `Node` will typically store
//! some sort of value (the value that was inserted, for example) and will
//! sometimes have child `Node`s. The most important invariants of a BST are:
//!
//! 1. For every `Node` in a BST, all the `Node`s in its left subtree have a
//!    value less than its own value.
//! 2. For every `Node` in a BST, all the `Node`s in its right subtree have a
//!    value greater than its own value.
//!
//! > Note that some `Node`s have no children. These `Node`s are called "leaf nodes".
//!
//! Searching for values in the tree takes `O(height)` (where `height` is defined as the longest
//! path from the root `Node` to a leaf `Node`). An AVL tree limits the height to `O(lg N)` by
//! rotating nodes whenever an insertion makes one subtree more than one level taller than its
//! sibling.
//!
//! ## Lazy deletion
//!
//! [`avl::Tree`] never unlinks a node. Deleting a record marks its node hidden so that the shape
//! (and therefore the balance) of the tree is untouched; lookups skip hidden nodes and inserting
//! an equal record brings the node back. The price is that the tree never shrinks.
//!
//! ## Modules
//!
//! - [`bitree`]: an unordered binary tree that only manages node storage and shape.
//! - [`traverse`]: pre-, in- and post-order traversals of a [`bitree::BiTree`].
//! - [`avl`]: the AVL tree, layered on a [`bitree::BiTree`].
//! - [`error`]: the errors shared by both trees.

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

pub mod avl;
pub mod bitree;
pub mod error;
pub mod traverse;

mod util;

#[cfg(test)]
mod test;
