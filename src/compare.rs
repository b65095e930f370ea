use core::cmp::Ordering;

/// A three-way comparison between two elements.
///
/// The tree never defines an ordering of its own; every routing and membership
/// decision goes through this trait. Any `Fn(&T, &T) -> Ordering` is a comparator, and
/// [`NaturalOrder`] forwards to [`Ord`].
///
/// It is a logic error for a comparator to be inconsistent (for example, not transitive)
/// or to change its answer for two elements while they are stored in the same tree.
/// The behavior resulting from such a logic error is not specified, but will not
/// result in undefined behavior.
///
/// # Examples
///
/// ```
/// use bplus_tree::BPlusTree;
///
/// // Descending order.
/// let tree = BPlusTree::with_elements(4, |a: &i32, b: &i32| b.cmp(a), [1, 3, 2]).unwrap();
/// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [3, 2, 1]);
/// ```
pub trait Comparator<T: ?Sized> {
    /// Compares `a` with `b`.
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

impl<T: ?Sized, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}

/// The comparator that orders elements by their [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct NaturalOrder;

impl<T: ?Sized + Ord> Comparator<T> for NaturalOrder {
    #[inline]
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}
