//! A self-balancing Binary Search Tree (specifically, an AVL tree) with lazy deletion, built on
//! top of a [`BiTree`].
//!
//! Removing an entry doesn't unlink its node. The node is marked hidden: it still steers
//! searches to its descendants but [`Tree::lookup`] and [`Tree::iter`] skip it. Inserting an
//! equal entry later revives the hidden node in place. A consequence is that [`Tree::size`]
//! never shrinks on removal; it counts hidden nodes too.
//!
//! # Examples
//!
//! ```
//! use lazy_avl::avl::{Inserted, Tree};
//! use lazy_avl::error::Error;
//!
//! let mut tree = Tree::new();
//!
//! // Nothing in here yet.
//! assert_eq!(tree.lookup(&1), None);
//!
//! assert!(matches!(tree.insert(1), Ok(Inserted::Created)));
//! assert_eq!(tree.lookup(&1), Some(&1));
//!
//! // An equal live entry is reported, and the value comes back to the caller.
//! assert!(matches!(tree.insert(1), Err(Error::DuplicateKey(1))));
//!
//! // Removal only hides the entry.
//! assert!(tree.remove(&1).is_ok());
//! assert_eq!(tree.lookup(&1), None);
//! assert_eq!(tree.size(), 1);
//!
//! // Inserting it again reuses the hidden node.
//! assert!(matches!(tree.insert(1), Ok(Inserted::Revived)));
//! assert_eq!(tree.lookup(&1), Some(&1));
//! assert_eq!(tree.size(), 1);
//! ```

use std::cmp::Ordering;
use std::fmt;

use log::{debug, trace};

use crate::bitree::{BiTree, NodeId, Slot};
use crate::error::Error;
use crate::util::Growth;

/// Which subtree of a node is taller. AVL trees never let the difference exceed one level, so
/// these three states are all a node needs. See [the Wikipedia page][wiki] for more details.
///
/// [wiki]: https://en.wikipedia.org/wiki/AVL_tree#Balance_factor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Balance {
    /// The left subtree is one level taller.
    LeftHeavy,
    /// Both subtrees have the same height.
    Balanced,
    /// The right subtree is one level taller.
    RightHeavy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Visibility {
    Live,
    Hidden,
}

/// The payload of every node in a [`Tree`]: the caller's value plus the bookkeeping the AVL
/// tree needs.
#[derive(Debug)]
pub struct AvlEntry<T> {
    data: T,
    visibility: Visibility,
    balance: Balance,
}

impl<T> AvlEntry<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            visibility: Visibility::Live,
            balance: Balance::Balanced,
        }
    }

    /// The stored value. Hidden entries still have one; it's what keeps them ordered.
    pub fn data(&self) -> &T {
        &self.data
    }

    /// The balance factor of the node holding this entry.
    pub fn balance(&self) -> Balance {
        self.balance
    }

    /// Whether the entry has been removed.
    pub fn is_hidden(&self) -> bool {
        self.visibility == Visibility::Hidden
    }

    /// Marks a live entry as removed. Returns `false` if it already was.
    fn hide(&mut self) -> bool {
        match self.visibility {
            Visibility::Live => {
                self.visibility = Visibility::Hidden;
                true
            }
            Visibility::Hidden => false,
        }
    }

    /// Stores `data` in a hidden entry and makes it live again, returning the value it replaced.
    /// A live entry is left alone and `data` is handed back as the error.
    fn revive(&mut self, data: T) -> Result<T, T> {
        match self.visibility {
            Visibility::Live => Err(data),
            Visibility::Hidden => {
                self.visibility = Visibility::Live;
                Ok(std::mem::replace(&mut self.data, data))
            }
        }
    }

    fn into_data(self) -> T {
        self.data
    }
}

/// The successful outcomes of [`Tree::insert`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Inserted {
    /// A new node was added; [`Tree::size`] went up by one.
    Created,
    /// A hidden node with an equal key now holds the value. The shape of the tree is unchanged.
    Revived,
}

/// A self-balancing Binary Search Tree with lazy removal. Entries are ordered by the comparator
/// `C`, which defaults to the natural ordering of `T`.
///
/// The tree owns its entries. When an entry leaves the tree (on revival, for the value being
/// replaced, and on [`Tree::destroy`] or drop, for every node) it is passed to the destroy hook
/// set with [`Tree::with_destroy`], or simply dropped if there isn't one.
pub struct Tree<T, C = fn(&T, &T) -> Ordering> {
    nodes: BiTree<AvlEntry<T>>,
    compare: C,
    destroy: Option<Box<dyn FnMut(T)>>,
    /// Rebalances done so far. A double rotation counts once.
    #[cfg(test)]
    rotations: usize,
}

impl<T> Default for Tree<T>
where
    T: Ord,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C> Drop for Tree<T, C> {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl<T, C> fmt::Debug for Tree<T, C>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("size", &self.size())
            .field("nodes", &self.nodes)
            .finish()
    }
}

impl<T> Tree<T>
where
    T: Ord,
{
    /// Generate a new, empty `Tree` ordered by `T`'s [`Ord`] implementation.
    pub fn new() -> Self {
        Self {
            nodes: BiTree::new(),
            compare: T::cmp,
            destroy: None,
            #[cfg(test)]
            rotations: 0,
        }
    }
}

impl<T, C> Tree<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    /// Generate a new, empty `Tree` ordered by `compare`. It must be a total order and must not
    /// change while the tree is alive.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_avl::avl::Tree;
    ///
    /// // Entries are looked up by their first field only.
    /// let mut tree = Tree::with_comparator(|a: &(u32, char), b: &(u32, char)| a.0.cmp(&b.0));
    /// tree.insert((7, 's')).unwrap();
    ///
    /// assert_eq!(tree.lookup(&(7, '?')), Some(&(7, 's')));
    /// ```
    pub fn with_comparator(compare: C) -> Self {
        Self {
            nodes: BiTree::new(),
            compare,
            destroy: None,
            #[cfg(test)]
            rotations: 0,
        }
    }

    /// Inserts `data` into the tree, rebalancing on the way back up if needed.
    ///
    /// - `Ok(Inserted::Created)` when a new node was added.
    /// - `Ok(Inserted::Revived)` when an equal entry had been removed; its node now holds `data`
    ///   and the replaced value goes to the destroy hook.
    /// - `Err(Error::DuplicateKey(data))` when an equal live entry exists. Nothing changes.
    /// - `Err(Error::AllocationFailed(data))` when no storage was available. Nothing changes.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_avl::avl::{Inserted, Tree};
    ///
    /// let mut tree = Tree::new();
    /// for x in [30, 20, 10] {
    ///     assert_eq!(tree.insert(x).unwrap(), Inserted::Created);
    /// }
    ///
    /// // Sorted inserts would make a list; the tree rotated instead.
    /// let nodes = tree.as_bitree();
    /// let root = nodes.root().unwrap();
    /// assert_eq!(nodes.data_of(root).data(), &20);
    /// ```
    pub fn insert(&mut self, data: T) -> Result<Inserted, Error<T>> {
        let (inserted, _) = self.insert_at(Slot::Root, data)?;

        if cfg!(debug_assertions) {
            if let Some(root) = self.nodes.root() {
                let key = self.nodes.data_of(root).data();
                if let Some(left) = self.nodes.left_of(root) {
                    let left_key = self.nodes.data_of(left).data();
                    assert_eq!((self.compare)(left_key, key), Ordering::Less);
                }
                if let Some(right) = self.nodes.right_of(root) {
                    let right_key = self.nodes.data_of(right).data();
                    assert_eq!((self.compare)(right_key, key), Ordering::Greater);
                }
            }
        }

        Ok(inserted)
    }

    /// Hides the entry equal to `probe`. The node stays in place and [`Tree::size`] is unchanged.
    /// Returns [`Error::NotFound`] if there is no such entry or it is already hidden.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_avl::avl::Tree;
    /// use lazy_avl::error::Error;
    ///
    /// let mut tree = Tree::new();
    /// tree.insert(1).unwrap();
    ///
    /// assert!(tree.remove(&1).is_ok());
    /// assert!(matches!(tree.remove(&1), Err(Error::NotFound)));
    /// assert!(matches!(tree.remove(&2), Err(Error::NotFound)));
    /// ```
    pub fn remove(&mut self, probe: &T) -> Result<(), Error<T>> {
        let node = self.find(probe).ok_or(Error::NotFound)?;
        if self.nodes.data_of_mut(node).hide() {
            Ok(())
        } else {
            Err(Error::NotFound)
        }
    }

    /// Finds the live entry equal to `probe`. Hidden entries are never returned.
    pub fn lookup(&self, probe: &T) -> Option<&T> {
        self.find(probe)
            .map(|id| self.nodes.data_of(id))
            .filter(|entry| !entry.is_hidden())
            .map(AvlEntry::data)
    }

    /// Whether a live entry equal to `probe` is in the tree.
    pub fn contains(&self, probe: &T) -> bool {
        self.lookup(probe).is_some()
    }

    /// Finds the node whose entry compares equal to `probe`, hidden or not.
    fn find(&self, probe: &T) -> Option<NodeId> {
        let mut next = self.nodes.root();
        while let Some(id) = next {
            next = match (self.compare)(probe, self.nodes.data_of(id).data()) {
                Ordering::Less => self.nodes.left_of(id),
                Ordering::Equal => return Some(id),
                Ordering::Greater => self.nodes.right_of(id),
            };
        }
        None
    }

    /// Inserts `data` into the subtree held by `slot` and reports how that subtree's height
    /// changed. If a rotation is needed at the subtree root, the new root is stored back into
    /// `slot`.
    fn insert_at(&mut self, slot: Slot, data: T) -> Result<(Inserted, Growth), Error<T>> {
        let Some(node) = self.nodes.child(slot) else {
            self.attach(slot, data)?;
            return Ok((Inserted::Created, Growth::Taller));
        };

        match (self.compare)(&data, self.nodes.data_of(node).data()) {
            Ordering::Less => {
                let (inserted, growth) = self.insert_at(Slot::Left(node), data)?;
                let growth = match growth {
                    Growth::Taller => self.left_grew(slot, node),
                    Growth::Settled => Growth::Settled,
                };
                Ok((inserted, growth))
            }
            Ordering::Equal => {
                let replaced = self
                    .nodes
                    .data_of_mut(node)
                    .revive(data)
                    .map_err(Error::DuplicateKey)?;
                trace!("revived a hidden entry");
                self.dispose(replaced);
                Ok((Inserted::Revived, Growth::Settled))
            }
            Ordering::Greater => {
                let (inserted, growth) = self.insert_at(Slot::Right(node), data)?;
                let growth = match growth {
                    Growth::Taller => self.right_grew(slot, node),
                    Growth::Settled => Growth::Settled,
                };
                Ok((inserted, growth))
            }
        }
    }

    /// Puts a fresh leaf into the empty `slot`.
    fn attach(&mut self, slot: Slot, data: T) -> Result<NodeId, Error<T>> {
        let entry = AvlEntry::new(data);
        let attached = match slot {
            Slot::Root => self.nodes.insert_left(None, entry),
            Slot::Left(parent) => self.nodes.insert_left(Some(parent), entry),
            Slot::Right(parent) => self.nodes.insert_right(Some(parent), entry),
        };
        attached.map_err(|err| err.map(AvlEntry::into_data))
    }
}

impl<T, C> Tree<T, C> {
    /// Sets the hook that receives every value the tree disposes of.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::cell::Cell;
    /// use std::rc::Rc;
    /// use lazy_avl::avl::Tree;
    ///
    /// let destroyed = Rc::new(Cell::new(0));
    /// let counter = Rc::clone(&destroyed);
    ///
    /// let mut tree = Tree::new().with_destroy(move |_: u8| counter.set(counter.get() + 1));
    /// tree.insert(1).unwrap();
    /// tree.insert(2).unwrap();
    /// tree.remove(&2).unwrap();
    ///
    /// // Hidden entries are still destroyed with the tree.
    /// drop(tree);
    /// assert_eq!(destroyed.get(), 2);
    /// ```
    pub fn with_destroy(mut self, destroy: impl FnMut(T) + 'static) -> Self {
        self.destroy = Some(Box::new(destroy));
        self
    }

    /// The number of nodes in the tree, **including hidden ones**. Removal never decreases it.
    pub fn size(&self) -> usize {
        self.nodes.size()
    }

    /// Whether the tree has no nodes at all, hidden or live.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterates over the live entries in ascending order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.nodes)
    }

    /// The underlying binary tree, for inspecting shape, balance factors and hidden entries.
    pub fn as_bitree(&self) -> &BiTree<AvlEntry<T>> {
        &self.nodes
    }

    /// Removes every node, children before parents, handing each value (hidden or live) to the
    /// destroy hook. The tree is empty and usable afterwards.
    pub fn destroy(&mut self) {
        let entries = self.nodes.take_subtree(Slot::Root);
        if !entries.is_empty() {
            debug!("destroying {} nodes", entries.len());
        }
        for entry in entries {
            self.dispose(entry.into_data());
        }
        self.nodes.destroy();
    }

    fn dispose(&mut self, data: T) {
        if let Some(destroy) = self.destroy.as_mut() {
            destroy(data);
        }
    }

    fn balance_of(&self, id: NodeId) -> Balance {
        self.nodes.data_of(id).balance
    }

    fn set_balance(&mut self, id: NodeId, balance: Balance) {
        self.nodes.data_of_mut(id).balance = balance;
    }

    /// Updates `node` after its left subtree got taller and reports whether `node`'s subtree did
    /// too. `slot` is where `node` hangs so a rotation can replace it.
    fn left_grew(&mut self, slot: Slot, node: NodeId) -> Growth {
        match self.balance_of(node) {
            Balance::RightHeavy => {
                self.set_balance(node, Balance::Balanced);
                Growth::Settled
            }
            Balance::Balanced => {
                self.set_balance(node, Balance::LeftHeavy);
                Growth::Taller
            }
            Balance::LeftHeavy => {
                let left = self
                    .nodes
                    .left_of(node)
                    .expect("Left heavy => left child");
                let subtree_root = match self.balance_of(left) {
                    Balance::RightHeavy => self.rotate_left_right(node),
                    Balance::LeftHeavy | Balance::Balanced => self.rotate_right(node),
                };
                #[cfg(test)]
                {
                    self.rotations += 1;
                }
                self.nodes.relink(slot, Some(subtree_root));
                Growth::Settled
            }
        }
    }

    /// Mirror of [`Tree::left_grew`].
    fn right_grew(&mut self, slot: Slot, node: NodeId) -> Growth {
        match self.balance_of(node) {
            Balance::LeftHeavy => {
                self.set_balance(node, Balance::Balanced);
                Growth::Settled
            }
            Balance::Balanced => {
                self.set_balance(node, Balance::RightHeavy);
                Growth::Taller
            }
            Balance::RightHeavy => {
                let right = self
                    .nodes
                    .right_of(node)
                    .expect("Right heavy => right child");
                let subtree_root = match self.balance_of(right) {
                    Balance::LeftHeavy => self.rotate_right_left(node),
                    Balance::RightHeavy | Balance::Balanced => self.rotate_left(node),
                };
                #[cfg(test)]
                {
                    self.rotations += 1;
                }
                self.nodes.relink(slot, Some(subtree_root));
                Growth::Settled
            }
        }
    }

    /// Rotate `old_root` to the right (the LL case). This moves the left child up vertically and
    /// `old_root` down vertically. Returns the new subtree root; the caller must store it where
    /// `old_root` used to hang.
    ///
    /// ## Panics
    ///
    /// When called on a node without a left child.
    ///
    /// # Diagram
    ///
    /// ```text
    ///     old_root                new_root
    ///      /     \                /     \
    ///  new_root   z   rotate ->  x    old_root
    ///   / \                              /  \
    ///  x   y                            y    z
    /// ```
    fn rotate_right(&mut self, old_root: NodeId) -> NodeId {
        trace!("LL rotation");
        let new_root = self
            .nodes
            .left_of(old_root)
            .expect("Rotate right => left child");

        let moved = self.nodes.relink(Slot::Right(new_root), None);
        self.nodes.relink(Slot::Left(old_root), moved);
        self.nodes.relink(Slot::Right(new_root), Some(old_root));

        self.set_balance(old_root, Balance::Balanced);
        self.set_balance(new_root, Balance::Balanced);
        new_root
    }

    /// Mirror of [`Tree::rotate_right`] (the RR case).
    fn rotate_left(&mut self, old_root: NodeId) -> NodeId {
        trace!("RR rotation");
        let new_root = self
            .nodes
            .right_of(old_root)
            .expect("Rotate left => right child");

        let moved = self.nodes.relink(Slot::Left(new_root), None);
        self.nodes.relink(Slot::Right(old_root), moved);
        self.nodes.relink(Slot::Left(new_root), Some(old_root));

        self.set_balance(old_root, Balance::Balanced);
        self.set_balance(new_root, Balance::Balanced);
        new_root
    }

    /// The LR case: `old_root` is left heavy and its left child leans right. The left child's
    /// right child is lifted two levels to become the subtree root.
    ///
    /// ```text
    ///       old_root                    new_root
    ///        /    \                    /        \
    ///     left     d                left      old_root
    ///     /  \          rotate ->   /  \        /  \
    ///    a  new_root               a    b      c    d
    ///        /  \
    ///       b    c
    /// ```
    ///
    /// Only `new_root`'s previous balance says which of `b` and `c` is shorter, and so which of
    /// `left` and `old_root` ends up leaning.
    fn rotate_left_right(&mut self, old_root: NodeId) -> NodeId {
        trace!("LR rotation");
        let left = self
            .nodes
            .left_of(old_root)
            .expect("Rotate left-right => left child");
        let new_root = self
            .nodes
            .right_of(left)
            .expect("Rotate left-right => left child leans right");

        let b = self.nodes.relink(Slot::Left(new_root), None);
        let c = self.nodes.relink(Slot::Right(new_root), None);
        self.nodes.relink(Slot::Right(left), b);
        self.nodes.relink(Slot::Left(old_root), c);
        self.nodes.relink(Slot::Left(new_root), Some(left));
        self.nodes.relink(Slot::Right(new_root), Some(old_root));

        let (left_balance, old_root_balance) = match self.balance_of(new_root) {
            Balance::LeftHeavy => (Balance::Balanced, Balance::RightHeavy),
            Balance::Balanced => (Balance::Balanced, Balance::Balanced),
            Balance::RightHeavy => (Balance::LeftHeavy, Balance::Balanced),
        };
        self.set_balance(left, left_balance);
        self.set_balance(old_root, old_root_balance);
        self.set_balance(new_root, Balance::Balanced);
        new_root
    }

    /// Mirror of [`Tree::rotate_left_right`] (the RL case).
    fn rotate_right_left(&mut self, old_root: NodeId) -> NodeId {
        trace!("RL rotation");
        let right = self
            .nodes
            .right_of(old_root)
            .expect("Rotate right-left => right child");
        let new_root = self
            .nodes
            .left_of(right)
            .expect("Rotate right-left => right child leans left");

        let b = self.nodes.relink(Slot::Left(new_root), None);
        let c = self.nodes.relink(Slot::Right(new_root), None);
        self.nodes.relink(Slot::Right(old_root), b);
        self.nodes.relink(Slot::Left(right), c);
        self.nodes.relink(Slot::Left(new_root), Some(old_root));
        self.nodes.relink(Slot::Right(new_root), Some(right));

        let (old_root_balance, right_balance) = match self.balance_of(new_root) {
            Balance::LeftHeavy => (Balance::Balanced, Balance::RightHeavy),
            Balance::Balanced => (Balance::Balanced, Balance::Balanced),
            Balance::RightHeavy => (Balance::LeftHeavy, Balance::Balanced),
        };
        self.set_balance(old_root, old_root_balance);
        self.set_balance(right, right_balance);
        self.set_balance(new_root, Balance::Balanced);
        new_root
    }
}

/// An iterator over the live entries of a [`Tree`] in ascending order. Created by [`Tree::iter`].
pub struct Iter<'a, T> {
    nodes: &'a BiTree<AvlEntry<T>>,
    /// Nodes whose left subtree has been visited but which haven't been yielded yet.
    stack: Vec<NodeId>,
}

impl<'a, T> Iter<'a, T> {
    fn new(nodes: &'a BiTree<AvlEntry<T>>) -> Self {
        let mut iter = Self {
            nodes,
            stack: Vec::new(),
        };
        iter.push_left_spine(nodes.root());
        iter
    }

    fn push_left_spine(&mut self, mut next: Option<NodeId>) {
        while let Some(id) = next {
            self.stack.push(id);
            next = self.nodes.left_of(id);
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        loop {
            let id = self.stack.pop()?;
            self.push_left_spine(nodes.right_of(id));
            let entry = nodes.data_of(id);
            if !entry.is_hidden() {
                return Some(entry.data());
            }
        }
    }
}

impl<'a, T, C> IntoIterator for &'a Tree<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
