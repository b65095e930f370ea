use core::fmt;
use core::iter::FusedIterator;
use core::slice;

use tracing::error;

use crate::raw::{Arena, Handle, Node, RawBPlusTree};

/// An iterator over the elements of a `BPlusTree` in ascending order.
///
/// This `struct` is created by the [`iter`] method on [`BPlusTree`].
/// See its documentation for more.
///
/// # Examples
///
/// ```
/// use bplus_tree::BPlusTree;
///
/// let tree = BPlusTree::with_elements(3, i32::cmp, [3, 1, 2, 2]).unwrap();
/// let mut iter = tree.iter();
/// assert_eq!(iter.next(), Some(&1));
/// assert_eq!(iter.len(), 3);
/// assert_eq!(iter.copied().collect::<Vec<_>>(), [2, 2, 3]);
/// ```
///
/// [`BPlusTree`]: crate::BPlusTree
/// [`iter`]: crate::BPlusTree::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T: 'a> {
    nodes: &'a Arena<Node<T>>,
    /// Elements of the current leaf not yet yielded.
    current: slice::Iter<'a, T>,
    /// The leaf to load once `current` runs dry.
    next_leaf: Option<Handle>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new<C>(tree: &'a RawBPlusTree<T, C>) -> Self {
        Self {
            nodes: tree.nodes(),
            current: slice::Iter::default(),
            next_leaf: Some(tree.first_leaf()),
            remaining: tree.len(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        loop {
            if let Some(element) = self.current.next() {
                self.remaining = self.remaining.saturating_sub(1);
                return Some(element);
            }

            let handle = self.next_leaf.take()?;
            if let Some(leaf) = self.nodes.get(handle).and_then(Node::as_leaf) {
                self.current = leaf.elements().iter();
                self.next_leaf = leaf.next();
            } else {
                error!(node = %handle, "leaf chain points at a missing leaf; iteration stops");
                self.remaining = 0;
                return None;
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            nodes: self.nodes,
            current: self.current.clone(),
            next_leaf: self.next_leaf,
            remaining: self.remaining,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}
