use alloc::collections::VecDeque;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;

use tracing::error;

use super::handle::Handle;
use super::node::Node;
use super::raw_bplus_tree::{RawBPlusTree, missing_child};
use crate::compare::Comparator;
use crate::error::{Result, TreeError};

/// Breadth-first key groups, one line per level.
struct Levels<'a, T>(Vec<Vec<&'a [T]>>);

impl<T: fmt::Display> fmt::Display for Levels<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (level, groups) in self.0.iter().enumerate() {
            write!(f, "--- {level}: ")?;
            for (position, keys) in groups.iter().enumerate() {
                if position > 0 {
                    f.write_str(" ")?;
                }
                f.write_str("(")?;
                for (index, key) in keys.iter().enumerate() {
                    if index > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{key}")?;
                }
                f.write_str(")")?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

/// A node still to be validated, with what its parent expects of it.
struct Expected<'a, T> {
    handle: Handle,
    parent: Option<Handle>,
    lower: Option<&'a T>,
    upper: Option<&'a T>,
    depth: usize,
}

impl<T, C> RawBPlusTree<T, C> {
    /// Renders every level's key groups, root first:
    /// `--- <level>: (<k1>,<k2>) (<k1>) ...` followed by a newline per level.
    pub(crate) fn dump(&self) -> Result<String>
    where
        T: fmt::Display,
    {
        Ok(Levels(self.levels()?).to_string())
    }

    /// Returns the number of levels, which is 1 for a tree whose root is a leaf.
    pub(crate) fn height(&self) -> Result<usize> {
        let mut height = 1;
        let mut current = self.root;
        while let Node::Internal(internal) = self.node(current)? {
            current = internal.child(0).ok_or_else(|| missing_child(current, 0))?;
            height += 1;
        }
        Ok(height)
    }

    fn levels(&self) -> Result<Vec<Vec<&[T]>>> {
        let mut levels = Vec::new();
        let mut level = alloc::vec![self.root];

        while !level.is_empty() {
            let mut below = Vec::new();
            let mut groups = Vec::with_capacity(level.len());
            for &handle in &level {
                let node = self.node(handle)?;
                groups.push(node.keys());
                if let Node::Internal(internal) = node {
                    below.extend_from_slice(internal.children());
                }
            }
            levels.push(groups);
            level = below;
        }
        Ok(levels)
    }

    /// Walks the whole tree and reports the first structural rule it finds broken.
    ///
    /// Checked: keys sorted in every node, each element within its separators
    /// (`K(i-1) <= e <= K(i)`), `keys + 1` children per internal node, parent links,
    /// fill (`min_keys` elements per non-root leaf, one key per internal node), equal
    /// leaf depth, the leaf chain matching left-to-right leaf order, and the element
    /// count.
    pub(crate) fn check_invariants(&self) -> Result<()>
    where
        C: Comparator<T>,
    {
        let comparator = &self.comparator;
        let min_keys = self.config.min_keys();

        if self.len == 0 && !self.node(self.root)?.is_leaf() {
            return Err(violation(format!("empty tree has internal root {}", self.root)));
        }

        let mut queue = VecDeque::new();
        queue.push_back(Expected {
            handle: self.root,
            parent: None,
            lower: None,
            upper: None,
            depth: 0,
        });
        let mut leaves = Vec::new();
        let mut leaf_depth = None;
        let mut count = 0;

        while let Some(Expected {
            handle,
            parent,
            lower,
            upper,
            depth,
        }) = queue.pop_front()
        {
            let node = self.node(handle)?;
            if node.parent() != parent {
                return Err(violation(format!(
                    "node {handle} points at parent {:?}, expected {parent:?}",
                    node.parent()
                )));
            }
            let keys = node.keys();
            if keys.windows(2).any(|pair| comparator.compare(&pair[0], &pair[1]) == Ordering::Greater) {
                return Err(violation(format!("keys of node {handle} are out of order")));
            }

            match node {
                Node::Leaf(leaf) => {
                    if parent.is_some() && leaf.key_count() < min_keys {
                        return Err(violation(format!(
                            "leaf {handle} holds {} elements, fewer than {min_keys}",
                            leaf.key_count()
                        )));
                    }
                    if let Some(lower) = lower
                        && keys.iter().any(|key| comparator.compare(key, lower) == Ordering::Less)
                    {
                        return Err(violation(format!("leaf {handle} holds an element below its separator")));
                    }
                    if let Some(upper) = upper
                        && keys.iter().any(|key| comparator.compare(key, upper) == Ordering::Greater)
                    {
                        return Err(violation(format!("leaf {handle} holds an element above its separator")));
                    }
                    match leaf_depth {
                        None => leaf_depth = Some(depth),
                        Some(expected) if expected != depth => {
                            return Err(violation(format!(
                                "leaf {handle} sits at depth {depth}, other leaves at {expected}"
                            )));
                        }
                        Some(_) => {}
                    }
                    count += leaf.key_count();
                    leaves.push(handle);
                }
                Node::Internal(internal) => {
                    if internal.key_count() == 0 {
                        return Err(violation(format!("internal node {handle} has no keys")));
                    }
                    if internal.child_count() != internal.key_count() + 1 {
                        return Err(violation(format!(
                            "internal node {handle} has {} keys but {} children",
                            internal.key_count(),
                            internal.child_count()
                        )));
                    }
                    for (index, &child) in internal.children().iter().enumerate() {
                        queue.push_back(Expected {
                            handle: child,
                            parent: Some(handle),
                            lower: index.checked_sub(1).and_then(|left| internal.keys().get(left)).or(lower),
                            upper: internal.keys().get(index).or(upper),
                            depth: depth + 1,
                        });
                    }
                }
            }
        }

        if count != self.len {
            return Err(violation(format!("leaves hold {count} elements, expected {}", self.len)));
        }

        let mut chain = Vec::with_capacity(leaves.len());
        let mut cursor = Some(self.first_leaf);
        while let Some(handle) = cursor {
            if chain.len() > leaves.len() {
                break;
            }
            chain.push(handle);
            cursor = self.leaf(handle)?.next();
        }
        if chain != leaves {
            return Err(violation(format!(
                "leaf chain {chain:?} does not match leaf order {leaves:?}"
            )));
        }
        Ok(())
    }

    /// Panics with the broken rule unless the tree is well formed.
    #[cfg(test)]
    pub(crate) fn validate_invariants(&self)
    where
        C: Comparator<T>,
    {
        if let Err(error) = self.check_invariants() {
            panic!("{error}");
        }
    }

    /// Copies the elements out by walking the leaf chain.
    #[cfg(test)]
    pub(crate) fn collect_values(&self) -> Vec<T>
    where
        T: Clone,
    {
        let mut values = Vec::with_capacity(self.len);
        let mut cursor = Some(self.first_leaf);
        while let Some(handle) = cursor {
            let leaf = self.leaf(handle).unwrap();
            values.extend_from_slice(leaf.elements());
            cursor = leaf.next();
        }
        values
    }
}

fn violation(message: String) -> TreeError {
    error!(%message, "structural check failed");
    TreeError::InvariantViolated(message)
}
