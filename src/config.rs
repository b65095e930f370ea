use crate::error::{Result, TreeError};

/// The smallest order a tree accepts.
///
/// Below three, an overflowing internal node cannot be split into two halves that both
/// keep at least one separator.
pub const MIN_ORDER: usize = 3;

/// The order used by [`TreeConfig::default`].
pub const DEFAULT_ORDER: usize = 32;

/// Shape parameters of a [`BPlusTree`](crate::BPlusTree).
///
/// The `order` is the maximum number of children of an internal node. A leaf holds at
/// most `order - 1` elements once an operation settles, and every non-root node is
/// repaired when it falls below [`min_keys`](TreeConfig::min_keys).
///
/// # Examples
///
/// ```
/// use bplus_tree::TreeConfig;
///
/// let config = TreeConfig::new(5).unwrap();
/// assert_eq!(config.order(), 5);
/// assert_eq!(config.min_keys(), 2);
///
/// assert!(TreeConfig::new(2).is_err());
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct TreeConfig {
    order: usize,
    capacity: usize,
}

impl TreeConfig {
    /// Creates a configuration with the given order.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidOrder`] if `order` is below [`MIN_ORDER`].
    pub fn new(order: usize) -> Result<Self> {
        if order < MIN_ORDER {
            return Err(TreeError::InvalidOrder { order });
        }
        Ok(Self { order, capacity: 0 })
    }

    /// Pre-sizes the node arena for about `capacity` elements.
    #[must_use]
    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Returns the maximum number of children per internal node.
    #[must_use]
    pub const fn order(&self) -> usize {
        self.order
    }

    /// Returns the minimum key count of a non-root node, `floor(order / 2)`.
    #[must_use]
    pub const fn min_keys(&self) -> usize {
        self.order / 2
    }

    /// Returns the key count at which a node must split.
    #[must_use]
    pub const fn split_threshold(&self) -> usize {
        self.order
    }

    /// Returns the element capacity hint.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of node slots to reserve for the capacity hint.
    pub(crate) const fn node_capacity(&self) -> usize {
        // Leaves never settle below `min_keys`, so this bounds the leaf count; internal
        // nodes add at most one more slot per leaf.
        self.capacity.div_ceil(self.min_keys()).saturating_mul(2)
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            order: DEFAULT_ORDER,
            capacity: 0,
        }
    }
}
