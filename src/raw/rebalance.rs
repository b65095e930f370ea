use alloc::format;
use alloc::string::String;

use smallvec::SmallVec;
use tracing::{debug, error, trace};

use super::handle::Handle;
use super::node::{InternalNode, Node};
use super::raw_bplus_tree::{RawBPlusTree, Siblings, dangling};
use crate::error::{NodeKind, Result, TreeError};

impl<T: Clone, C> RawBPlusTree<T, C> {
    /// Restores the fill of `start` after a removal, walking up while merges leave
    /// parents short.
    ///
    /// A node below `min_keys` first borrows from its left sibling, then from its right
    /// sibling, and merges with a neighbour only if neither can spare a key. Merges always
    /// fold the right node into the left one, so the leftmost leaf never moves.
    pub(super) fn rebalance(&mut self, start: Handle) -> Result<()> {
        let min_keys = self.config.min_keys();
        let mut current = start;

        loop {
            let Some(Siblings {
                parent,
                left,
                right,
                index,
            }) = self.siblings(current)?
            else {
                return self.collapse_root(current);
            };

            if self.node(current)?.key_count() >= min_keys {
                return Ok(());
            }

            if let Some(left) = left
                && self.node(left)?.key_count() > min_keys
            {
                return self.rotate_right(current, left, parent, index - 1);
            }
            if let Some(right) = right
                && self.node(right)?.key_count() > min_keys
            {
                return self.rotate_left(current, right, parent, index);
            }

            match (left, right) {
                (Some(left), _) => self.merge(left, current, parent, index - 1)?,
                (None, Some(right)) => self.merge(current, right, parent, index)?,
                (None, None) => {
                    error!(node = %current, %parent, "underfull node has no siblings");
                    return Err(TreeError::NoSibling { node: current.index() });
                }
            }
            current = parent;
        }
    }

    /// Replaces a root left without keys by its only child.
    fn collapse_root(&mut self, root: Handle) -> Result<()> {
        let Some(child) = self.node(root)?.as_internal().and_then(InternalNode::sole_child) else {
            return Ok(());
        };

        self.set_parent(child, None)?;
        self.nodes.free(root);
        self.root = child;

        debug!(old_root = %root, new_root = %child, "root demoted");
        Ok(())
    }

    /// Moves the last entry of `left` to the front of `node` through the separator at
    /// `separator` in `parent`.
    fn rotate_right(&mut self, node: Handle, left: Handle, parent: Handle, separator: usize) -> Result<()> {
        match self.node(node)?.kind() {
            NodeKind::Leaf => {
                let moved = self.leaf_mut(left)?.pop_back().ok_or_else(|| empty_sibling(left))?;
                self.replace_separator(parent, separator, moved.clone())?;
                self.leaf_mut(node)?.push_front(moved);
            }
            NodeKind::Internal => {
                let (key, child) = self.internal_mut(left)?.pop_back().ok_or_else(|| empty_sibling(left))?;
                let lowered = self.replace_separator(parent, separator, key)?;
                self.internal_mut(node)?.push_front(lowered, child);
                self.set_parent(child, Some(node))?;
            }
        }

        trace!(%node, %left, "rotated right");
        Ok(())
    }

    /// Moves the first entry of `right` to the back of `node` through the separator at
    /// `separator` in `parent`.
    fn rotate_left(&mut self, node: Handle, right: Handle, parent: Handle, separator: usize) -> Result<()> {
        match self.node(node)?.kind() {
            NodeKind::Leaf => {
                let sibling = self.leaf_mut(right)?;
                let moved = sibling.pop_front().ok_or_else(|| empty_sibling(right))?;
                let first = sibling.first().cloned().ok_or_else(|| empty_sibling(right))?;
                self.replace_separator(parent, separator, first)?;
                self.leaf_mut(node)?.push_back(moved);
            }
            NodeKind::Internal => {
                let (key, child) = self.internal_mut(right)?.pop_front().ok_or_else(|| empty_sibling(right))?;
                let lowered = self.replace_separator(parent, separator, key)?;
                self.internal_mut(node)?.push_back(lowered, child);
                self.set_parent(child, Some(node))?;
            }
        }

        trace!(%node, %right, "rotated left");
        Ok(())
    }

    /// Folds `right` into `left`, removing the separator at `separator` (and `right`)
    /// from `parent`. The arena slot of `right` is freed.
    fn merge(&mut self, left: Handle, right: Handle, parent: Handle, separator: usize) -> Result<()> {
        let Some((key, removed)) = self.internal_mut(parent)?.remove_separator(separator) else {
            return Err(invariant(format!("node {parent} has no separator {separator}")));
        };
        if removed != right {
            return Err(invariant(format!(
                "separator {separator} of node {parent} precedes {removed}, expected {right}"
            )));
        }

        match self.nodes.take(right).ok_or_else(|| dangling(right))? {
            Node::Leaf(absorbed) => self.leaf_mut(left)?.merge_with_right(absorbed),
            Node::Internal(absorbed) => {
                let moved: SmallVec<[Handle; 16]> = absorbed.children().iter().copied().collect();
                self.internal_mut(left)?.merge_with_right(key, absorbed);
                for child in moved {
                    self.set_parent(child, Some(left))?;
                }
            }
        }

        trace!(%left, %right, "merged");
        Ok(())
    }

    /// Swaps in a new separator, returning the one it replaced.
    fn replace_separator(&mut self, parent: Handle, separator: usize, key: T) -> Result<T> {
        self.internal_mut(parent)?
            .replace_key(separator, key)
            .ok_or_else(|| invariant(format!("node {parent} has no separator {separator}")))
    }
}

fn empty_sibling(handle: Handle) -> TreeError {
    error!(node = %handle, "sibling ran out of keys while lending one");
    TreeError::EmptySibling { node: handle.index() }
}

fn invariant(message: String) -> TreeError {
    error!(%message, "separator bookkeeping failed");
    TreeError::InvariantViolated(message)
}
