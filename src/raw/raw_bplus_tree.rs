use alloc::vec::Vec;
use core::cmp::Ordering;

use tracing::{debug, error};

use super::arena::Arena;
use super::handle::Handle;
use super::node::{self, InternalNode, LeafNode, Node};
use crate::compare::Comparator;
use crate::config::TreeConfig;
use crate::error::{NodeKind, Result, TreeError};

/// The core B+Tree implementation backing `BPlusTree`.
pub(crate) struct RawBPlusTree<T, C> {
    /// Arena storing all tree nodes.
    pub(super) nodes: Arena<Node<T>>,
    /// Handle to the root node. An empty tree is a root leaf without elements.
    pub(super) root: Handle,
    /// Handle to the first (leftmost) leaf, for forward iteration.
    pub(super) first_leaf: Handle,
    /// Total number of stored elements.
    pub(super) len: usize,
    pub(super) config: TreeConfig,
    pub(super) comparator: C,
}

/// Neighbours of a non-root node inside its parent.
pub(super) struct Siblings {
    pub(super) parent: Handle,
    pub(super) left: Option<Handle>,
    pub(super) right: Option<Handle>,
    /// Position of the node among the parent's children.
    pub(super) index: usize,
}

impl<T, C> RawBPlusTree<T, C> {
    /// Creates a tree holding a single empty leaf.
    pub(crate) fn new(config: TreeConfig, comparator: C) -> Self {
        let mut nodes = Arena::with_capacity(config.node_capacity());
        let leaf = nodes.alloc(Node::Leaf(LeafNode::new(None, Vec::new())));
        Self {
            nodes,
            root: leaf,
            first_leaf: leaf,
            len: 0,
            config,
            comparator,
        }
    }

    /// Returns the number of stored elements.
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub(crate) const fn comparator(&self) -> &C {
        &self.comparator
    }

    pub(crate) const fn first_leaf(&self) -> Handle {
        self.first_leaf
    }

    pub(crate) const fn nodes(&self) -> &Arena<Node<T>> {
        &self.nodes
    }

    /// Drops every element and shrinks the tree back to one empty leaf.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        let leaf = self.nodes.alloc(Node::Leaf(LeafNode::new(None, Vec::new())));
        self.root = leaf;
        self.first_leaf = leaf;
        self.len = 0;
    }

    /// Returns a reference to a node by handle.
    pub(super) fn node(&self, handle: Handle) -> Result<&Node<T>> {
        self.nodes.get(handle).ok_or_else(|| dangling(handle))
    }

    /// Returns a mutable reference to a node by handle.
    pub(super) fn node_mut(&mut self, handle: Handle) -> Result<&mut Node<T>> {
        self.nodes.get_mut(handle).ok_or_else(|| dangling(handle))
    }

    pub(super) fn leaf(&self, handle: Handle) -> Result<&LeafNode<T>> {
        self.node(handle)?.as_leaf().ok_or_else(|| wrong_kind(handle, NodeKind::Leaf))
    }

    pub(super) fn leaf_mut(&mut self, handle: Handle) -> Result<&mut LeafNode<T>> {
        self.node_mut(handle)?.as_leaf_mut().ok_or_else(|| wrong_kind(handle, NodeKind::Leaf))
    }

    pub(super) fn internal(&self, handle: Handle) -> Result<&InternalNode<T>> {
        self.node(handle)?.as_internal().ok_or_else(|| wrong_kind(handle, NodeKind::Internal))
    }

    pub(super) fn internal_mut(&mut self, handle: Handle) -> Result<&mut InternalNode<T>> {
        self.node_mut(handle)?.as_internal_mut().ok_or_else(|| wrong_kind(handle, NodeKind::Internal))
    }

    /// Points `child` back at `parent`.
    pub(super) fn set_parent(&mut self, child: Handle, parent: Option<Handle>) -> Result<()> {
        self.node_mut(child)?.set_parent(parent);
        Ok(())
    }

    /// Finds the left and right neighbours of `handle` by scanning its parent.
    pub(super) fn siblings(&self, handle: Handle) -> Result<Option<Siblings>> {
        let Some(parent) = self.node(handle)?.parent() else {
            return Ok(None);
        };
        let parent_node = self.internal(parent)?;
        let Some(index) = parent_node.position_of(handle) else {
            error!(node = %handle, parent = %parent, "node missing from its parent's children");
            return Err(TreeError::NodeNotInParent {
                node: handle.index(),
                parent: parent.index(),
            });
        };

        Ok(Some(Siblings {
            parent,
            left: index.checked_sub(1).and_then(|left| parent_node.child(left)),
            right: parent_node.child(index + 1),
            index,
        }))
    }

    /// Walks parent links up from the current root until reaching a parentless node.
    pub(super) fn refresh_root(&mut self) -> Result<()> {
        let mut root = self.root;
        while let Some(parent) = self.node(root)?.parent() {
            root = parent;
        }
        if root != self.root {
            debug!(old_root = %self.root, new_root = %root, "root promoted");
            self.root = root;
        }
        Ok(())
    }

    /// Descends from the root to a leaf, choosing a child with `route` at every level.
    fn descend<F>(&self, mut route: F) -> Result<Handle>
    where
        F: FnMut(&InternalNode<T>) -> usize,
    {
        let mut current = self.root;
        loop {
            match self.node(current)? {
                Node::Internal(internal) => {
                    let index = route(internal);
                    current = internal.child(index).ok_or_else(|| missing_child(current, index))?;
                }
                Node::Leaf(_) => return Ok(current),
            }
        }
    }
}

impl<T, C: Comparator<T>> RawBPlusTree<T, C> {
    /// Builds a tree from `elements` in any order.
    ///
    /// The elements are sorted into a single leaf and the split engine runs once, so the
    /// shape is that of recursive halving rather than of one-by-one insertion.
    pub(crate) fn from_elements(config: TreeConfig, comparator: C, mut elements: Vec<T>) -> Result<Self>
    where
        T: Clone,
    {
        elements.sort_by(|a, b| comparator.compare(a, b));

        let mut tree = Self::new(config, comparator);
        tree.len = elements.len();
        *tree.leaf_mut(tree.root)? = LeafNode::new(None, elements);
        tree.split_if_needed(tree.root)?;

        debug!(len = tree.len, order = tree.config.order(), "built tree from initial elements");
        Ok(tree)
    }

    /// Finds the first stored element equal to `value`.
    ///
    /// Descends by lower bound, so copies equal to a separator are never skipped, then
    /// walks the leaf chain to the first element that is not less than `value`.
    pub(crate) fn search(&self, value: &T) -> Result<Option<(Handle, usize)>> {
        let comparator = &self.comparator;
        let mut current = self.descend(|internal| node::lower_bound(internal.keys(), value, comparator))?;

        loop {
            let leaf = self.leaf(current)?;
            let index = node::lower_bound(leaf.elements(), value, comparator);
            if let Some(candidate) = leaf.elements().get(index) {
                let found = comparator.compare(candidate, value) == Ordering::Equal;
                return Ok(found.then_some((current, index)));
            }
            match leaf.next() {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
    }

    /// Returns true if an element equal to `value` is stored.
    pub(crate) fn contains(&self, value: &T) -> Result<bool> {
        Ok(self.search(value)?.is_some())
    }

    /// Inserts `value` after any equal elements, splitting nodes as needed.
    pub(crate) fn insert(&mut self, value: T) -> Result<()>
    where
        T: Clone,
    {
        let comparator = &self.comparator;
        let leaf = self.descend(|internal| node::locate(internal.keys(), &value, comparator))?;
        let index = self.node(leaf)?.locate(&value, &self.comparator);

        self.leaf_mut(leaf)?.insert(index, value);
        self.len += 1;

        self.split_if_needed(leaf)
    }

    /// Removes one element equal to `value`, rebalancing as needed.
    /// Returns false (and leaves the tree untouched) if no such element is stored.
    pub(crate) fn delete(&mut self, value: &T) -> Result<bool>
    where
        T: Clone,
    {
        let Some((leaf, index)) = self.search(value)? else {
            return Ok(false);
        };

        self.leaf_mut(leaf)?.remove(index);
        self.len -= 1;

        self.rebalance(leaf)?;
        Ok(true)
    }
}

pub(super) fn missing_child(handle: Handle, index: usize) -> TreeError {
    error!(node = %handle, index, "missing child");
    TreeError::MissingChild {
        node: handle.index(),
        index,
    }
}

pub(super) fn dangling(handle: Handle) -> TreeError {
    error!(node = %handle, "dangling node handle");
    TreeError::DanglingNode { node: handle.index() }
}

fn wrong_kind(handle: Handle, expected: NodeKind) -> TreeError {
    error!(node = %handle, %expected, "unexpected node kind");
    TreeError::UnexpectedNodeKind {
        node: handle.index(),
        expected,
    }
}
