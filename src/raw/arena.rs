use alloc::vec::Vec;

use super::handle::Handle;

/// Slot storage for tree nodes.
///
/// Removing a node leaves a hole that the next allocation fills, so handles to live
/// nodes stay valid across any number of splits and merges.
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<Handle>,
}

impl<T> Arena<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    #[cfg(test)]
    pub(crate) const fn len(&self) -> usize {
        self.slots.len().saturating_sub(self.free.len())
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        if let Some(handle) = self.free.pop() {
            self.slots[handle.index()] = Some(element);
            handle
        } else {
            assert!(
                self.slots.len() <= Handle::MAX,
                "`Arena::alloc()` - arena is at maximum capacity ({})",
                Handle::MAX + 1
            );
            self.slots.push(Some(element));
            Handle::from_index(self.slots.len() - 1)
        }
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> Option<&T> {
        self.slots.get(handle.index()).and_then(Option::as_ref)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.slots.get_mut(handle.index()).and_then(Option::as_mut)
    }

    /// Removes the element at `handle` and recycles its slot.
    pub(crate) fn take(&mut self, handle: Handle) -> Option<T> {
        let element = self.slots.get_mut(handle.index())?.take()?;
        self.free.push(handle);
        Some(element)
    }

    pub(crate) fn free(&mut self, handle: Handle) -> bool {
        self.take(handle).is_some()
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn freed_slots_are_reused() {
        let mut arena = Arena::with_capacity(4);
        let a = arena.alloc('a');
        let b = arena.alloc('b');
        assert!(arena.free(a));
        assert!(!arena.free(a), "double free must be rejected");
        assert_eq!(arena.get(a), None);

        let c = arena.alloc('c');
        assert_eq!(c, a);
        assert_eq!(arena.get(c), Some(&'c'));
        assert_eq!(arena.get(b), Some(&'b'));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn unknown_handles_are_absent() {
        let mut arena: Arena<u8> = Arena::with_capacity(4);
        let far = Handle::from_index(100);
        assert!(arena.get(far).is_none());
        assert!(arena.get_mut(far).is_none());
        assert!(arena.take(far).is_none());
    }

    #[test]
    #[should_panic(expected = "`Arena::alloc()` - arena is at maximum capacity")]
    fn alloc_past_handle_space_panics() {
        let mut arena = Arena::with_capacity(Handle::MAX + 2);
        for _ in 0..=Handle::MAX + 1 {
            arena.alloc(());
        }
    }

    proptest! {
        #[test]
        fn arena_behaves_like_vec(operations in prop::collection::vec(strategy(), 0..256)) {
            let mut model: Vec<(Handle, u32)> = Vec::new();
            let mut arena: Arena<u32> = Arena::with_capacity(4);

            for operation in operations {
                match operation {
                    Operation::Alloc(value) => {
                        let handle = arena.alloc(value);
                        model.push((handle, value));
                    }
                    Operation::GetMut(which, value) => {
                        if model.is_empty() {
                            continue;
                        }

                        let index = which % model.len();
                        let handle = model[index].0;
                        *arena.get_mut(handle).unwrap() = value;
                        model[index].1 = value;
                    }
                    Operation::Take(which) => {
                        if model.is_empty() {
                            continue;
                        }

                        let index = which % model.len();
                        let handle = model[index].0;
                        let taken = arena.take(handle);
                        let (_, expected) = model.swap_remove(index);
                        prop_assert_eq!(taken, Some(expected));
                    }
                    Operation::Clear => {
                        arena.clear();
                        model.clear();
                    }
                }

                prop_assert_eq!(arena.len(), model.len());

                for &(handle, value) in &model {
                    prop_assert_eq!(arena.get(handle), Some(&value));
                }
            }
        }
    }

    #[derive(Clone, Debug)]
    enum Operation {
        Alloc(u32),
        GetMut(usize, u32),
        Take(usize),
        Clear,
    }

    fn strategy() -> impl Strategy<Value = Operation> {
        prop_oneof![
            20 => any::<u32>().prop_map(Operation::Alloc),
            5 => (any::<usize>(), any::<u32>()).prop_map(|(which, value)| Operation::GetMut(which, value)),
            5 => any::<usize>().prop_map(Operation::Take),
            1 => Just(Operation::Clear),
        ]
    }
}
