use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::compare::{Comparator, NaturalOrder};
use crate::config::TreeConfig;
use crate::error::Result;
use crate::raw::RawBPlusTree;

mod iter;

pub use iter::Iter;

/// An ordered multiset based on a B+ tree.
///
/// Elements are kept in the order defined by a [`Comparator`]; the tree never compares
/// elements any other way. Equal elements may be stored more than once, and a newly
/// inserted element is placed after the copies already present.
///
/// All elements live in the leaves, which are linked left to right, so [`iter`] walks
/// them without touching internal nodes. Internal nodes hold separator keys that are
/// copies of leaf elements, which is why most mutating operations need `T: Clone`.
///
/// The `order` bounds the fan-out: an internal node has at most `order` children and a
/// leaf at most `order - 1` elements once an operation completes. Every non-root node
/// keeps at least `order / 2` keys; deletions that drop below that borrow from a
/// neighbour or merge with it.
///
/// Operations that follow node links return [`Result`]. On a well-formed tree they
/// never fail; an error means the internal structure was found corrupted (see
/// [`TreeError::is_corruption`](crate::TreeError::is_corruption)).
///
/// [`iter`]: BPlusTree::iter
///
/// # Examples
///
/// ```
/// use bplus_tree::BPlusTree;
///
/// let mut words = BPlusTree::new(4)?;
///
/// words.insert("pear")?;
/// words.insert("apple")?;
/// words.insert("fig")?;
/// words.insert("apple")?;
///
/// assert!(words.exist(&"fig")?);
/// assert!(!words.exist(&"kiwi")?);
///
/// // One copy goes at a time.
/// assert!(words.delete(&"apple")?);
/// assert_eq!(words.iter().copied().collect::<Vec<_>>(), ["apple", "fig", "pear"]);
/// # Ok::<(), bplus_tree::TreeError>(())
/// ```
///
/// A tree can be built from existing elements in any order:
///
/// ```
/// use bplus_tree::BPlusTree;
///
/// let tree = BPlusTree::with_elements(3, |a: &i32, b: &i32| a.abs().cmp(&b.abs()), [-3, 1, -2])?;
/// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [1, -2, -3]);
/// # Ok::<(), bplus_tree::TreeError>(())
/// ```
pub struct BPlusTree<T, C = NaturalOrder> {
    raw: RawBPlusTree<T, C>,
}

impl<T: Ord> BPlusTree<T> {
    /// Makes a new, empty tree ordered by [`Ord`].
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidOrder`](crate::TreeError::InvalidOrder) if `order` is
    /// below [`MIN_ORDER`](crate::MIN_ORDER).
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_tree::BPlusTree;
    ///
    /// let mut tree = BPlusTree::new(8).unwrap();
    /// tree.insert(1).unwrap();
    /// assert_eq!(tree.len(), 1);
    ///
    /// assert!(BPlusTree::<i32>::new(2).is_err());
    /// ```
    pub fn new(order: usize) -> Result<Self> {
        Self::with_comparator(order, NaturalOrder)
    }
}

impl<T, C: Comparator<T>> BPlusTree<T, C> {
    /// Makes a new, empty tree ordered by `comparator`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidOrder`](crate::TreeError::InvalidOrder) if `order` is
    /// below [`MIN_ORDER`](crate::MIN_ORDER).
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_tree::BPlusTree;
    ///
    /// let mut tree = BPlusTree::with_comparator(4, |a: &u8, b: &u8| b.cmp(a)).unwrap();
    /// for value in [1, 3, 2] {
    ///     tree.insert(value).unwrap();
    /// }
    /// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [3, 2, 1]);
    /// ```
    pub fn with_comparator(order: usize, comparator: C) -> Result<Self> {
        Ok(Self {
            raw: RawBPlusTree::new(TreeConfig::new(order)?, comparator),
        })
    }

    /// Builds a tree holding `initial`, which may come in any order.
    ///
    /// The elements are sorted and then split into nodes in one pass, so the resulting
    /// shape can differ from inserting them one at a time. The contents are the same.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvalidOrder`](crate::TreeError::InvalidOrder) if `order` is
    /// below [`MIN_ORDER`](crate::MIN_ORDER).
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_tree::BPlusTree;
    ///
    /// let tree = BPlusTree::with_elements(4, i32::cmp, [10, 9, 8, 7, 6, 5, 4, 3, 2, 1]).unwrap();
    /// assert_eq!(tree.dump().unwrap(), "--- 0: (4,6,9)\n--- 1: (1,2,3) (4,5) (6,7,8) (9,10)\n");
    /// ```
    pub fn with_elements<I>(order: usize, comparator: C, initial: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Clone,
    {
        Self::with_config(TreeConfig::new(order)?, comparator, initial)
    }

    /// Builds a tree holding `initial` with an explicit [`TreeConfig`].
    ///
    /// # Errors
    ///
    /// Fails only if the freshly built structure is found inconsistent.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_tree::{BPlusTree, NaturalOrder, TreeConfig};
    ///
    /// let config = TreeConfig::new(16).unwrap().with_capacity(1_000);
    /// let tree = BPlusTree::with_config(config, NaturalOrder, 0..1_000).unwrap();
    /// assert_eq!(tree.len(), 1_000);
    /// assert_eq!(tree.config(), &config);
    /// ```
    pub fn with_config<I>(config: TreeConfig, comparator: C, initial: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Clone,
    {
        let elements: Vec<T> = initial.into_iter().collect();
        Ok(Self {
            raw: RawBPlusTree::from_elements(config, comparator, elements)?,
        })
    }

    /// Adds an element to the tree, after any equal elements already stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree structure is found corrupted.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_tree::BPlusTree;
    ///
    /// let mut tree = BPlusTree::new(4).unwrap();
    /// tree.insert(2).unwrap();
    /// tree.insert(2).unwrap();
    /// assert_eq!(tree.len(), 2);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log(n)) comparisons plus O(order) element moves per touched node.
    pub fn insert(&mut self, value: T) -> Result<()>
    where
        T: Clone,
    {
        self.raw.insert(value)
    }

    /// Removes one element equal to `value`. Returns whether an element was removed.
    ///
    /// Deleting an absent value is not an error and leaves the tree untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree structure is found corrupted.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_tree::BPlusTree;
    ///
    /// let mut tree = BPlusTree::with_elements(4, u32::cmp, [1, 2, 2]).unwrap();
    /// assert!(tree.delete(&2).unwrap());
    /// assert!(tree.delete(&2).unwrap());
    /// assert!(!tree.delete(&2).unwrap());
    /// assert_eq!(tree.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log(n))
    pub fn delete(&mut self, value: &T) -> Result<bool>
    where
        T: Clone,
    {
        self.raw.delete(value)
    }

    /// Returns `true` if an element equal to `value` is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree structure is found corrupted.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_tree::BPlusTree;
    ///
    /// let tree = BPlusTree::with_elements(4, i64::cmp, [5, 7]).unwrap();
    /// assert!(tree.exist(&7).unwrap());
    /// assert!(!tree.exist(&6).unwrap());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log(n))
    pub fn exist(&self, value: &T) -> Result<bool> {
        self.raw.contains(value)
    }

    /// Checks every structural rule of the tree and reports the first one broken.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvariantViolated`](crate::TreeError::InvariantViolated)
    /// describing the broken rule, or another corruption error if a node link could not
    /// be followed.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_tree::BPlusTree;
    ///
    /// let mut tree = BPlusTree::with_elements(3, i32::cmp, 0..50).unwrap();
    /// tree.delete(&17).unwrap();
    /// assert!(tree.check_invariants().is_ok());
    /// ```
    pub fn check_invariants(&self) -> Result<()> {
        self.raw.check_invariants()
    }
}

impl<T, C> BPlusTree<T, C> {
    /// Gets an iterator that visits the elements in ascending order.
    ///
    /// The iterator is lazy; dropping it early has no effect on the tree, and calling
    /// `iter` again starts over.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_tree::BPlusTree;
    ///
    /// let tree = BPlusTree::with_elements(4, i32::cmp, [3, 1, 2]).unwrap();
    /// let mut iter = tree.iter();
    /// assert_eq!(iter.len(), 3);
    /// assert_eq!(iter.next(), Some(&1));
    /// assert_eq!(iter.next(), Some(&2));
    /// assert_eq!(iter.next(), Some(&3));
    /// assert_eq!(iter.next(), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1) to create the iterator; O(1) per step via linked leaves.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.raw)
    }

    /// Calls `visit` on each element in ascending order until it returns `false`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_tree::BPlusTree;
    ///
    /// let tree = BPlusTree::with_elements(4, i32::cmp, 1..=100).unwrap();
    /// let mut seen = Vec::new();
    /// tree.iterate(|&value| {
    ///     seen.push(value);
    ///     value < 3
    /// });
    /// assert_eq!(seen, [1, 2, 3]);
    /// ```
    pub fn iterate<F>(&self, mut visit: F)
    where
        F: FnMut(&T) -> bool,
    {
        for element in self.iter() {
            if !visit(element) {
                break;
            }
        }
    }

    /// Returns the number of elements in the tree, counting duplicates.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_tree::BPlusTree;
    ///
    /// let mut tree = BPlusTree::new(4).unwrap();
    /// assert_eq!(tree.len(), 0);
    /// tree.insert(1).unwrap();
    /// tree.insert(1).unwrap();
    /// assert_eq!(tree.len(), 2);
    /// ```
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the order the tree was built with.
    #[must_use]
    pub const fn order(&self) -> usize {
        self.raw.config().order()
    }

    #[must_use]
    pub const fn config(&self) -> &TreeConfig {
        self.raw.config()
    }

    /// Returns the comparator ordering this tree.
    pub const fn comparator(&self) -> &C {
        self.raw.comparator()
    }

    /// Clears the tree, removing all elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_tree::BPlusTree;
    ///
    /// let mut tree = BPlusTree::with_elements(4, i32::cmp, 0..100).unwrap();
    /// tree.clear();
    /// assert!(tree.is_empty());
    /// assert_eq!(tree.dump().unwrap(), "--- 0: ()\n");
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the number of levels, 1 while the root is a leaf.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree structure is found corrupted.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_tree::BPlusTree;
    ///
    /// let tree = BPlusTree::with_elements(4, i32::cmp, 1..=16).unwrap();
    /// assert_eq!(tree.height().unwrap(), 3);
    /// ```
    pub fn height(&self) -> Result<usize> {
        self.raw.height()
    }

    /// Renders the tree level by level, root first.
    ///
    /// Each level is one line `--- <level>: ` followed by the key groups of that level's
    /// nodes from left to right, such as `(1,2,3)`, separated by single spaces. A node
    /// without keys renders as `()`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree structure is found corrupted.
    ///
    /// # Examples
    ///
    /// ```
    /// use bplus_tree::BPlusTree;
    ///
    /// let mut tree = BPlusTree::with_elements(4, i32::cmp, 1..=10).unwrap();
    /// tree.insert(11).unwrap();
    /// tree.insert(12).unwrap();
    /// assert_eq!(
    ///     tree.dump().unwrap(),
    ///     "--- 0: (9)\n--- 1: (4,6) (11)\n--- 2: (1,2,3) (4,5) (6,7,8) (9,10) (11,12)\n",
    /// );
    /// ```
    pub fn dump(&self) -> Result<String>
    where
        T: fmt::Display,
    {
        self.raw.dump()
    }
}

impl<T: Ord> Default for BPlusTree<T> {
    /// Creates an empty tree of order [`DEFAULT_ORDER`](crate::DEFAULT_ORDER).
    fn default() -> Self {
        Self {
            raw: RawBPlusTree::new(TreeConfig::default(), NaturalOrder),
        }
    }
}

impl<T: fmt::Debug, C> fmt::Debug for BPlusTree<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, T, C> IntoIterator for &'a BPlusTree<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}
