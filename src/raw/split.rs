use smallvec::SmallVec;
use tracing::trace;

use super::handle::Handle;
use super::node::{InternalNode, Node};
use super::raw_bplus_tree::{RawBPlusTree, Siblings};
use crate::error::Result;

/// Pending work for the split cascade.
enum SplitTask {
    /// Split this node if it reached the threshold.
    Node(Handle),
    /// Split whatever is this node's parent by the time the task runs.
    ParentOf(Handle),
}

impl<T: Clone, C> RawBPlusTree<T, C> {
    /// Splits `start` and every node the split overflows, until all are below the
    /// threshold.
    ///
    /// After each split the node itself is re-examined first, then its new sibling,
    /// then its parent. The parent is resolved lazily because an earlier task may have
    /// given the node a new one.
    pub(super) fn split_if_needed(&mut self, start: Handle) -> Result<()> {
        let threshold = self.config.split_threshold();
        let mut pending: SmallVec<[SplitTask; 8]> = SmallVec::new();
        pending.push(SplitTask::Node(start));

        while let Some(task) = pending.pop() {
            let handle = match task {
                SplitTask::Node(handle) => handle,
                SplitTask::ParentOf(child) => match self.node(child)?.parent() {
                    Some(parent) => parent,
                    None => continue,
                },
            };

            if self.node(handle)?.key_count() < threshold {
                continue;
            }
            let Some(sibling) = self.split_node(handle)? else {
                continue;
            };

            pending.push(SplitTask::ParentOf(handle));
            pending.push(SplitTask::Node(sibling));
            pending.push(SplitTask::Node(handle));
        }
        Ok(())
    }

    /// Moves the upper half of `handle` into a new right sibling and links the sibling
    /// into the parent. Returns `None` if the node is too small to split.
    fn split_node(&mut self, handle: Handle) -> Result<Option<Handle>> {
        let (separator, sibling) = match self.node_mut(handle)? {
            Node::Leaf(leaf) => {
                let Some((separator, right)) = leaf.split() else {
                    return Ok(None);
                };
                let sibling = self.nodes.alloc(Node::Leaf(right));
                self.leaf_mut(handle)?.set_next(Some(sibling));

                trace!(node = %handle, %sibling, "split leaf");
                (separator, sibling)
            }
            Node::Internal(internal) => {
                let Some((promoted, right)) = internal.split() else {
                    return Ok(None);
                };
                let moved: SmallVec<[Handle; 16]> = right.children().iter().copied().collect();
                let sibling = self.nodes.alloc(Node::Internal(right));
                for child in moved {
                    self.set_parent(child, Some(sibling))?;
                }

                trace!(node = %handle, %sibling, "split internal node");
                (promoted, sibling)
            }
        };

        self.attach_sibling(handle, separator, sibling)?;
        Ok(Some(sibling))
    }

    /// Inserts `separator` and `sibling` into the parent right after `handle`, growing a
    /// new root when `handle` has no parent.
    fn attach_sibling(&mut self, handle: Handle, separator: T, sibling: Handle) -> Result<()> {
        if let Some(Siblings { parent, index, .. }) = self.siblings(handle)? {
            self.internal_mut(parent)?.insert_separator(index, separator, sibling);
            return self.set_parent(sibling, Some(parent));
        }

        let root = self.nodes.alloc(Node::Internal(InternalNode::new_root(separator, handle, sibling)));
        self.set_parent(handle, Some(root))?;
        self.set_parent(sibling, Some(root))?;
        self.refresh_root()
    }
}
