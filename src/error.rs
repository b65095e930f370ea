//! Error types for tree construction and structural repair.

use alloc::string::String;
use core::fmt;

use thiserror::Error;

/// Result type alias using [`TreeError`].
pub type Result<T> = core::result::Result<T, TreeError>;

/// The two node variants of the tree, used to label errors.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum NodeKind {
    /// A terminal node holding stored elements.
    Leaf,
    /// A routing node holding separators and child links.
    Internal,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Leaf => f.write_str("leaf"),
            NodeKind::Internal => f.write_str("internal"),
        }
    }
}

/// Errors reported by [`BPlusTree`](crate::BPlusTree).
///
/// Apart from [`TreeError::InvalidOrder`], every variant means the node graph was
/// already inconsistent when the operation started. None of them is caused by user
/// input and none is recoverable by retrying.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum TreeError {
    #[error("invalid order {order}: a tree needs an order of at least {min}", min = crate::MIN_ORDER)]
    InvalidOrder { order: usize },

    #[error("internal invariant violated: node {node} is not allocated")]
    DanglingNode { node: usize },

    #[error("internal invariant violated: node {node} is not a {expected} node")]
    UnexpectedNodeKind { node: usize, expected: NodeKind },

    #[error("internal invariant violated: node {node} is not among the children of its parent {parent}")]
    NodeNotInParent { node: usize, parent: usize },

    #[error("internal invariant violated: node {node} has neither a left nor a right sibling to rebalance with")]
    NoSibling { node: usize },

    #[error("internal invariant violated: node {node} has no child at index {index}")]
    MissingChild { node: usize, index: usize },

    #[error("internal invariant violated: sibling {node} ran out of keys while lending one")]
    EmptySibling { node: usize },

    #[error("internal invariant violated: {0}")]
    InvariantViolated(String),
}

impl TreeError {
    /// Returns true if this error signals a corrupted node graph rather than bad configuration.
    #[must_use]
    pub const fn is_corruption(&self) -> bool {
        !matches!(self, TreeError::InvalidOrder { .. })
    }
}
