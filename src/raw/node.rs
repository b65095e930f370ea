use alloc::vec::Vec;
use core::cmp::Ordering;
use core::mem;

use super::handle::Handle;
use crate::compare::Comparator;
use crate::error::NodeKind;

#[allow(clippy::large_enum_variant)]
pub(crate) enum Node<T> {
    Internal(InternalNode<T>),
    Leaf(LeafNode<T>),
}

// B+Tree: Internal nodes store separator keys and child handles.
pub(crate) struct InternalNode<T> {
    parent: Option<Handle>,
    // Elements equal to keys[i] route to children[i + 1].
    keys: Vec<T>,
    // children.len() == keys.len() + 1 whenever the node is not mid-operation.
    children: Vec<Handle>,
}

// B+Tree: Leaf nodes store the elements themselves, linked left to right.
pub(crate) struct LeafNode<T> {
    parent: Option<Handle>,
    next: Option<Handle>,
    elements: Vec<T>,
}

/// Returns how many of the sorted `keys` are `<= value`.
///
/// This is the first index whose key compares greater than `value`, so ties route right.
#[inline]
pub(crate) fn locate<T, C: Comparator<T>>(keys: &[T], value: &T, comparator: &C) -> usize {
    keys.partition_point(|key| comparator.compare(value, key) != Ordering::Less)
}

/// Returns how many of the sorted `keys` are `< value`.
#[inline]
pub(crate) fn lower_bound<T, C: Comparator<T>>(keys: &[T], value: &T, comparator: &C) -> usize {
    keys.partition_point(|key| comparator.compare(key, value) == Ordering::Less)
}

impl<T> Node<T> {
    /// Returns which variant this node is.
    pub(crate) fn kind(&self) -> NodeKind {
        match self {
            Node::Internal(_) => NodeKind::Internal,
            Node::Leaf(_) => NodeKind::Leaf,
        }
    }

    /// Returns true if this is a leaf node.
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Returns the leaf node, or `None` if this is internal.
    pub(crate) fn as_leaf(&self) -> Option<&LeafNode<T>> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            Node::Internal(_) => None,
        }
    }

    /// Returns the leaf node mutably, or `None` if this is internal.
    pub(crate) fn as_leaf_mut(&mut self) -> Option<&mut LeafNode<T>> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            Node::Internal(_) => None,
        }
    }

    /// Returns the internal node, or `None` if this is a leaf.
    pub(crate) fn as_internal(&self) -> Option<&InternalNode<T>> {
        match self {
            Node::Internal(internal) => Some(internal),
            Node::Leaf(_) => None,
        }
    }

    /// Returns the internal node mutably, or `None` if this is a leaf.
    pub(crate) fn as_internal_mut(&mut self) -> Option<&mut InternalNode<T>> {
        match self {
            Node::Internal(internal) => Some(internal),
            Node::Leaf(_) => None,
        }
    }

    /// Returns the parent handle; `None` iff this node is the root.
    pub(crate) fn parent(&self) -> Option<Handle> {
        match self {
            Node::Internal(internal) => internal.parent,
            Node::Leaf(leaf) => leaf.parent,
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        match self {
            Node::Internal(internal) => internal.parent = parent,
            Node::Leaf(leaf) => leaf.parent = parent,
        }
    }

    /// Returns the ordered keys: separators for internal nodes, elements for leaves.
    pub(crate) fn keys(&self) -> &[T] {
        match self {
            Node::Internal(internal) => &internal.keys,
            Node::Leaf(leaf) => &leaf.elements,
        }
    }

    /// Returns the number of keys in this node.
    pub(crate) fn key_count(&self) -> usize {
        self.keys().len()
    }

    /// Returns how many keys are `<= value`; see [`locate`].
    pub(crate) fn locate<C: Comparator<T>>(&self, value: &T, comparator: &C) -> usize {
        locate(self.keys(), value, comparator)
    }
}

impl<T> InternalNode<T> {
    pub(crate) fn new(parent: Option<Handle>, keys: Vec<T>, children: Vec<Handle>) -> Self {
        Self {
            parent,
            keys,
            children,
        }
    }

    /// Creates a parentless node over two children split apart by `separator`.
    pub(crate) fn new_root(separator: T, left: Handle, right: Handle) -> Self {
        Self::new(None, alloc::vec![separator], alloc::vec![left, right])
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }

    pub(crate) fn keys(&self) -> &[T] {
        &self.keys
    }

    pub(crate) fn children(&self) -> &[Handle] {
        &self.children
    }

    #[inline]
    pub(crate) fn child(&self, index: usize) -> Option<Handle> {
        self.children.get(index).copied()
    }

    /// Returns the position of `child` among this node's children.
    pub(crate) fn position_of(&self, child: Handle) -> Option<usize> {
        self.children.iter().position(|&handle| handle == child)
    }

    /// Inserts `key` at `index` with `child` directly to its right.
    pub(crate) fn insert_separator(&mut self, index: usize, key: T, child: Handle) {
        self.keys.insert(index, key);
        self.children.insert(index + 1, child);
    }

    /// Removes the key at `index` together with the child to its right.
    pub(crate) fn remove_separator(&mut self, index: usize) -> Option<(T, Handle)> {
        if index >= self.keys.len() || index + 1 >= self.children.len() {
            return None;
        }
        let key = self.keys.remove(index);
        let child = self.children.remove(index + 1);
        Some((key, child))
    }

    /// Replaces the key at `index`, returning the old one.
    pub(crate) fn replace_key(&mut self, index: usize, key: T) -> Option<T> {
        self.keys.get_mut(index).map(|slot| mem::replace(slot, key))
    }

    /// Removes the last key and the last child.
    pub(crate) fn pop_back(&mut self) -> Option<(T, Handle)> {
        let key = self.keys.pop()?;
        let child = self.children.pop()?;
        Some((key, child))
    }

    /// Removes the first key and the first child.
    pub(crate) fn pop_front(&mut self) -> Option<(T, Handle)> {
        if self.keys.is_empty() || self.children.is_empty() {
            return None;
        }
        Some((self.keys.remove(0), self.children.remove(0)))
    }

    /// Prepends a child, with `key` separating it from the former first child.
    pub(crate) fn push_front(&mut self, key: T, child: Handle) {
        self.keys.insert(0, key);
        self.children.insert(0, child);
    }

    /// Appends a child, with `key` separating it from the former last child.
    pub(crate) fn push_back(&mut self, key: T, child: Handle) {
        self.keys.push(key);
        self.children.push(child);
    }

    /// Returns the only child of a node without keys.
    pub(crate) fn sole_child(&self) -> Option<Handle> {
        match self.children.as_slice() {
            [only] if self.keys.is_empty() => Some(*only),
            _ => None,
        }
    }

    /// Splits this node at `ceil(n / 2)`. Returns (`promoted_key`, `right_node`).
    ///
    /// The promoted key leaves both halves. The right node takes the keys after it and
    /// the children from `mid + 1` on; it still points at this node's parent, and its
    /// children still point here until the caller reparents them.
    ///
    /// A three-key node (order 3) splits at 1 instead, so neither half is left keyless.
    pub(crate) fn split(&mut self) -> Option<(T, InternalNode<T>)> {
        let n = self.keys.len();
        if n < 3 {
            return None;
        }
        let mid = n.div_ceil(2).min(n - 2);

        let right_keys: Vec<T> = self.keys.drain(mid + 1..).collect();
        let right_children: Vec<Handle> = self.children.drain(mid + 1..).collect();
        let promoted = self.keys.pop()?;

        Some((promoted, InternalNode::new(self.parent, right_keys, right_children)))
    }

    /// Absorbs a right sibling, pulling the parent's `separator` down between them.
    pub(crate) fn merge_with_right(&mut self, separator: T, mut right: InternalNode<T>) {
        self.keys.push(separator);
        self.keys.append(&mut right.keys);
        self.children.append(&mut right.children);
    }
}

impl<T> LeafNode<T> {
    pub(crate) fn new(parent: Option<Handle>, elements: Vec<T>) -> Self {
        Self {
            parent,
            next: None,
            elements,
        }
    }

    pub(crate) fn key_count(&self) -> usize {
        self.elements.len()
    }

    pub(crate) fn elements(&self) -> &[T] {
        &self.elements
    }

    pub(crate) fn first(&self) -> Option<&T> {
        self.elements.first()
    }

    /// Returns the next leaf in key order.
    pub(crate) fn next(&self) -> Option<Handle> {
        self.next
    }

    pub(crate) fn set_next(&mut self, next: Option<Handle>) {
        self.next = next;
    }

    /// Inserts `value` at `index`; callers pass the [`locate`] position so equal
    /// elements keep their insertion order.
    pub(crate) fn insert(&mut self, index: usize, value: T) {
        self.elements.insert(index, value);
    }

    pub(crate) fn remove(&mut self, index: usize) -> T {
        self.elements.remove(index)
    }

    pub(crate) fn pop_back(&mut self) -> Option<T> {
        self.elements.pop()
    }

    pub(crate) fn pop_front(&mut self) -> Option<T> {
        (!self.elements.is_empty()).then(|| self.elements.remove(0))
    }

    pub(crate) fn push_front(&mut self, value: T) {
        self.elements.insert(0, value);
    }

    pub(crate) fn push_back(&mut self, value: T) {
        self.elements.push(value);
    }

    /// Splits this leaf at `ceil(n / 2)`. Returns (`separator`, `right_leaf`).
    ///
    /// The separator is a copy of the right leaf's first element, which stays in place.
    /// The right leaf inherits this leaf's parent and `next` link; the caller splices it
    /// into the chain once it has a handle.
    pub(crate) fn split(&mut self) -> Option<(T, LeafNode<T>)>
    where
        T: Clone,
    {
        let mid = self.elements.len().div_ceil(2);
        let right_elements: Vec<T> = self.elements.drain(mid..).collect();
        let separator = right_elements.first()?.clone();

        let mut right = LeafNode::new(self.parent, right_elements);
        right.next = self.next;
        Some((separator, right))
    }

    /// Absorbs a right sibling and takes over its place in the leaf chain.
    pub(crate) fn merge_with_right(&mut self, mut right: LeafNode<T>) {
        self.elements.append(&mut right.elements);
        self.next = right.next;
    }
}
