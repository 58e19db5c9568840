//! An unordered binary tree. It only knows about shape: where a node sits and which nodes are its
//! children. Ordering is left to the structures built on top of it (see [`crate::avl`]).
//!
//! Nodes are kept in an arena and addressed by [`NodeId`] handles. A handle stays valid until the
//! node it points to is removed. The arena index may be handed out again after that, but the
//! handle's generation no longer matches: inserting below it fails with
//! [`SlotError::StaleHandle`] and the accessors panic.
//!
//! # Examples
//!
//! ```
//! use lazy_avl::bitree::{BiTree, Slot};
//!
//! let mut tree = BiTree::new();
//!
//! // A `None` parent means "insert the root".
//! let root = tree.insert_left(None, 'a').unwrap();
//! let left = tree.insert_left(Some(root), 'b').unwrap();
//! tree.insert_right(Some(root), 'c').unwrap();
//! tree.insert_left(Some(left), 'd').unwrap();
//! assert_eq!(tree.size(), 4);
//!
//! // Removing a subtree removes every node below the slot too.
//! tree.remove_subtree(Slot::Left(root));
//! assert_eq!(tree.size(), 2);
//! assert_eq!(tree.left_of(root), None);
//! ```

use std::fmt;
use std::mem;

use crate::error::{Error, SlotError};

/// Handle to a node stored in a [`BiTree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

/// A position in a [`BiTree`] that may or may not hold a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    /// The root of the tree.
    Root,
    /// The left child of the given node.
    Left(NodeId),
    /// The right child of the given node.
    Right(NodeId),
}

struct Node<T> {
    data: T,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

/// One arena slot. `generation` goes up every time the slot's node is freed.
struct Entry<T> {
    generation: u32,
    node: Option<Node<T>>,
}

#[cfg(test)]
thread_local! {
    static FAIL_NEXT_RESERVE: std::cell::Cell<bool> = std::cell::Cell::new(false);
}

/// Makes the next attempt by any tree on this thread to grow its storage fail.
#[cfg(test)]
pub(crate) fn fail_next_reserve() {
    FAIL_NEXT_RESERVE.with(|fail| fail.set(true));
}

/// A binary tree with no ordering between its nodes.
///
/// The tree owns its payloads. When a payload leaves the tree through [`BiTree::remove_subtree`],
/// [`BiTree::destroy`] or dropping the tree, it is passed to the destroy hook if one was given to
/// [`BiTree::with_destroy`] and dropped otherwise.
pub struct BiTree<T> {
    nodes: Vec<Entry<T>>,
    /// Indices in `nodes` with no node that can be reused.
    vacant: Vec<usize>,
    root: Option<NodeId>,
    size: usize,
    destroy: Option<Box<dyn FnMut(T)>>,
}

impl<T> Default for BiTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for BiTree<T> {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// What `Debug` still has to write for a [`BiTree`].
enum Pending {
    Text(&'static str),
    Data(NodeId),
    Child(Option<NodeId>),
}

impl<T> fmt::Debug for BiTree<T>
where
    T: fmt::Debug,
{
    /// Writes the nested node structure. The nesting is tracked on a heap stack since the tree
    /// can be arbitrarily deep.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BiTree {{ size: {}, root: ", self.size)?;

        // Popped from the end, so each node's pieces are pushed in reverse.
        let mut pending = vec![Pending::Child(self.root)];
        while let Some(next) = pending.pop() {
            match next {
                Pending::Text(text) => f.write_str(text)?,
                Pending::Data(id) => fmt::Debug::fmt(&self.node(id).data, f)?,
                Pending::Child(None) => f.write_str("None")?,
                Pending::Child(Some(id)) => {
                    let node = self.node(id);
                    f.write_str("Some(Node { data: ")?;
                    pending.extend([
                        Pending::Text(" })"),
                        Pending::Child(node.right),
                        Pending::Text(", right: "),
                        Pending::Child(node.left),
                        Pending::Text(", left: "),
                        Pending::Data(id),
                    ]);
                }
            }
        }

        f.write_str(" }")
    }
}

impl<T> BiTree<T> {
    /// Generate a new, empty `BiTree`. Payloads are simply dropped when they leave the tree.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            vacant: Vec::new(),
            root: None,
            size: 0,
            destroy: None,
        }
    }

    /// Generate a new, empty `BiTree` that hands every payload it disposes of to `destroy`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::cell::RefCell;
    /// use std::rc::Rc;
    /// use lazy_avl::bitree::BiTree;
    ///
    /// let destroyed = Rc::new(RefCell::new(Vec::new()));
    /// let sink = Rc::clone(&destroyed);
    ///
    /// let mut tree = BiTree::with_destroy(move |x: i32| sink.borrow_mut().push(x));
    /// let root = tree.insert_left(None, 1).unwrap();
    /// tree.insert_right(Some(root), 2).unwrap();
    /// drop(tree);
    ///
    /// // Children go before their parent.
    /// assert_eq!(*destroyed.borrow(), vec![2, 1]);
    /// ```
    pub fn with_destroy(destroy: impl FnMut(T) + 'static) -> Self {
        Self {
            nodes: Vec::new(),
            vacant: Vec::new(),
            root: None,
            size: 0,
            destroy: Some(Box::new(destroy)),
        }
    }

    /// The number of nodes in the tree.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The root node, if the tree has one.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// The node currently held by `slot`. `None` means the slot is the end of a branch.
    ///
    /// ## Panics
    ///
    /// When `slot` names a child of a node that has been removed.
    pub fn child(&self, slot: Slot) -> Option<NodeId> {
        match slot {
            Slot::Root => self.root,
            Slot::Left(parent) => self.node(parent).left,
            Slot::Right(parent) => self.node(parent).right,
        }
    }

    /// The left child of `id`.
    ///
    /// ## Panics
    ///
    /// When `id` refers to a node that has been removed.
    pub fn left_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).left
    }

    /// The right child of `id`.
    ///
    /// ## Panics
    ///
    /// When `id` refers to a node that has been removed.
    pub fn right_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).right
    }

    /// Whether `id` still refers to a node in this tree.
    pub fn is_live(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Whether `id` has no children.
    ///
    /// ## Panics
    ///
    /// When `id` refers to a node that has been removed.
    pub fn is_leaf(&self, id: NodeId) -> bool {
        let node = self.node(id);
        node.left.is_none() && node.right.is_none()
    }

    /// The payload stored at `id`.
    ///
    /// ## Panics
    ///
    /// When `id` refers to a node that has been removed.
    pub fn data_of(&self, id: NodeId) -> &T {
        &self.node(id).data
    }

    /// The payload stored at `id`, mutably. Changing the payload never changes the shape.
    ///
    /// ## Panics
    ///
    /// When `id` refers to a node that has been removed.
    pub fn data_of_mut(&mut self, id: NodeId) -> &mut T {
        &mut self.node_mut(id).data
    }

    /// Inserts `data` as a new leaf in the left child slot of `parent`. If `parent` is `None` the
    /// new node becomes the root, which is only allowed while the tree is empty.
    ///
    /// On failure the value is handed back inside the error and the tree is unchanged.
    pub fn insert_left(&mut self, parent: Option<NodeId>, data: T) -> Result<NodeId, Error<T>> {
        self.insert_at(parent.map_or(Slot::Root, Slot::Left), data)
    }

    /// Inserts `data` as a new leaf in the right child slot of `parent`. If `parent` is `None` the
    /// new node becomes the root, which is only allowed while the tree is empty.
    ///
    /// On failure the value is handed back inside the error and the tree is unchanged.
    pub fn insert_right(&mut self, parent: Option<NodeId>, data: T) -> Result<NodeId, Error<T>> {
        self.insert_at(parent.map_or(Slot::Root, Slot::Right), data)
    }

    fn insert_at(&mut self, slot: Slot, data: T) -> Result<NodeId, Error<T>> {
        let reason = match slot {
            Slot::Root if self.size > 0 => Some(SlotError::NotEmpty),
            Slot::Root => None,
            Slot::Left(parent) | Slot::Right(parent) => match self.get(parent) {
                None => Some(SlotError::StaleHandle),
                Some(_) if self.child(slot).is_some() => Some(SlotError::SlotOccupied),
                Some(_) => None,
            },
        };
        if let Some(reason) = reason {
            return Err(Error::InvalidSlot {
                reason,
                value: data,
            });
        }

        let id = self.alloc(data)?;
        self.relink(slot, Some(id));
        self.size += 1;
        Ok(id)
    }

    /// Removes every node in the subtree held by `slot`, children before their parent. Each
    /// payload goes to the destroy hook. Removing [`Slot::Root`] empties the tree.
    pub fn remove_subtree(&mut self, slot: Slot) {
        for data in self.take_subtree(slot) {
            self.dispose(data);
        }
    }

    /// Detaches the subtree held by `slot` and returns its payloads in post-order. The destroy
    /// hook is *not* called; the caller owns the payloads.
    pub fn take_subtree(&mut self, slot: Slot) -> Vec<T> {
        let Some(top) = self.relink(slot, None) else {
            return Vec::new();
        };

        let mut taken = Vec::new();
        // `true` once a node's children are already on the stack above it.
        let mut stack = vec![(top, false)];
        while let Some((id, expanded)) = stack.pop() {
            if expanded {
                taken.push(self.free(id));
                continue;
            }
            stack.push((id, true));
            let node = self.node(id);
            if let Some(right) = node.right {
                stack.push((right, false));
            }
            if let Some(left) = node.left {
                stack.push((left, false));
            }
        }

        taken
    }

    /// Builds a new tree with `data` at its root, all of `left` as its left subtree and all of
    /// `right` as its right subtree. Nodes are moved, not copied: on success `left` and `right`
    /// are left empty. The merged tree takes over `left`'s destroy hook.
    ///
    /// Handles into `left` stay valid in the merged tree. Handles into `right` don't; find those
    /// nodes again from the merged root.
    ///
    /// If storage can't be obtained nothing is moved and `data` is returned in the error.
    ///
    /// # Examples
    ///
    /// ```
    /// use lazy_avl::bitree::BiTree;
    /// use lazy_avl::traverse;
    ///
    /// let mut left = BiTree::new();
    /// left.insert_left(None, 1).unwrap();
    /// let mut right = BiTree::new();
    /// right.insert_left(None, 3).unwrap();
    ///
    /// let merged = BiTree::merge(&mut left, &mut right, 2).unwrap();
    /// assert_eq!(merged.size(), 3);
    /// assert!(left.is_empty() && right.is_empty());
    /// assert_eq!(traverse::inorder(&merged, merged.root()), vec![&1, &2, &3]);
    /// ```
    pub fn merge(left: &mut Self, right: &mut Self, data: T) -> Result<Self, Error<T>> {
        // Room for every slot of `right` (vacant ones included) plus the new root.
        if !left.try_grow(right.nodes.len() + 1) {
            return Err(Error::AllocationFailed(data));
        }

        let mut merged = Self {
            nodes: mem::take(&mut left.nodes),
            vacant: mem::take(&mut left.vacant),
            root: left.root.take(),
            size: mem::take(&mut left.size),
            destroy: left.destroy.take(),
        };

        // Append `right`'s arena as-is and shift every handle into the new index range.
        let offset = merged.nodes.len();
        let shift = |id: NodeId| NodeId {
            index: id.index + offset,
            ..id
        };
        merged
            .nodes
            .extend(right.nodes.drain(..).map(|entry| Entry {
                generation: entry.generation,
                node: entry.node.map(|node| Node {
                    data: node.data,
                    left: node.left.map(shift),
                    right: node.right.map(shift),
                }),
            }));
        merged
            .vacant
            .extend(right.vacant.drain(..).map(|index| index + offset));
        merged.size += mem::take(&mut right.size);
        let right_root = right.root.take().map(shift);

        // Capacity was reserved above so this push can't reallocate.
        let root = NodeId {
            index: merged.nodes.len(),
            generation: 0,
        };
        merged.nodes.push(Entry {
            generation: 0,
            node: Some(Node {
                data,
                left: merged.root,
                right: right_root,
            }),
        });
        merged.root = Some(root);
        merged.size += 1;

        Ok(merged)
    }

    /// Removes every node, passing each payload to the destroy hook. The tree can be reused
    /// afterwards.
    pub fn destroy(&mut self) {
        self.remove_subtree(Slot::Root);
        self.nodes.clear();
        self.vacant.clear();
    }

    /// Points `slot` at `child` and returns whatever it held before. Nothing is allocated or
    /// freed, so `size` is untouched: the caller must keep every node reachable exactly once.
    pub(crate) fn relink(&mut self, slot: Slot, child: Option<NodeId>) -> Option<NodeId> {
        match slot {
            Slot::Root => mem::replace(&mut self.root, child),
            Slot::Left(parent) => mem::replace(&mut self.node_mut(parent).left, child),
            Slot::Right(parent) => mem::replace(&mut self.node_mut(parent).right, child),
        }
    }

    fn alloc(&mut self, data: T) -> Result<NodeId, Error<T>> {
        let node = Node {
            data,
            left: None,
            right: None,
        };
        if let Some(index) = self.vacant.pop() {
            let entry = &mut self.nodes[index];
            entry.node = Some(node);
            return Ok(NodeId {
                index,
                generation: entry.generation,
            });
        }
        if !self.try_grow(1) {
            return Err(Error::AllocationFailed(node.data));
        }
        self.nodes.push(Entry {
            generation: 0,
            node: Some(node),
        });
        Ok(NodeId {
            index: self.nodes.len() - 1,
            generation: 0,
        })
    }

    /// Reserves room for `additional` more arena slots, reporting failure instead of aborting.
    fn try_grow(&mut self, additional: usize) -> bool {
        #[cfg(test)]
        if FAIL_NEXT_RESERVE.with(|fail| fail.replace(false)) {
            return false;
        }
        self.nodes.try_reserve(additional).is_ok()
    }

    /// Releases the arena slot of `id` and returns its payload. The node must already be
    /// unreachable.
    fn free(&mut self, id: NodeId) -> T {
        let entry = &mut self.nodes[id.index];
        let node = entry
            .node
            .take()
            .expect("Freeing a node implies it is live");
        entry.generation = entry.generation.wrapping_add(1);
        self.vacant.push(id.index);
        self.size -= 1;
        node.data
    }

    fn dispose(&mut self, data: T) {
        if let Some(destroy) = self.destroy.as_mut() {
            destroy(data);
        }
    }

    fn get(&self, id: NodeId) -> Option<&Node<T>> {
        self.nodes
            .get(id.index)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.node.as_ref())
    }

    fn node(&self, id: NodeId) -> &Node<T> {
        self.get(id).expect("NodeId refers to a removed node")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<T> {
        self.nodes
            .get_mut(id.index)
            .filter(|entry| entry.generation == id.generation)
            .and_then(|entry| entry.node.as_mut())
            .expect("NodeId refers to a removed node")
    }
}
