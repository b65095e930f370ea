use std::cmp::Ordering;

use bplus_tree::{BPlusTree, DEFAULT_ORDER, TreeError};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

mod common;

use common::{check, init_tracing, tree_of};

// ─── Dump scenarios at order 4 ───────────────────────────────────────────────

#[test]
fn initial_elements_are_halved_into_leaves() {
    init_tracing();
    let tree = tree_of(4, 1..=10);
    assert_eq!(tree.dump().unwrap(), "--- 0: (4,6,9)\n--- 1: (1,2,3) (4,5) (6,7,8) (9,10)\n");
    check(&tree, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
}

#[test]
fn insert_without_split() {
    init_tracing();
    let mut tree = tree_of(4, 1..=10);
    tree.insert(11).unwrap();
    assert_eq!(tree.dump().unwrap(), "--- 0: (4,6,9)\n--- 1: (1,2,3) (4,5) (6,7,8) (9,10,11)\n");
    check(&tree, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
}

#[test]
fn insert_splits_leaf_then_internal_node() {
    init_tracing();
    let mut tree = tree_of(4, 1..=10);
    tree.insert(11).unwrap();
    tree.insert(12).unwrap();
    assert_eq!(
        tree.dump().unwrap(),
        "--- 0: (9)\n--- 1: (4,6) (11)\n--- 2: (1,2,3) (4,5) (6,7,8) (9,10) (11,12)\n"
    );
    assert_eq!(tree.height().unwrap(), 3);
    check(&tree, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
}

#[test]
fn delete_rotates_then_merges() {
    init_tracing();
    let mut tree = tree_of(4, 1..=10);
    tree.insert(11).unwrap();
    tree.insert(12).unwrap();

    assert!(tree.delete(&5).unwrap());
    assert_eq!(
        tree.dump().unwrap(),
        "--- 0: (9)\n--- 1: (3,6) (11)\n--- 2: (1,2) (3,4) (6,7,8) (9,10) (11,12)\n"
    );
    check(&tree, &[1, 2, 3, 4, 6, 7, 8, 9, 10, 11, 12]);

    assert!(tree.delete(&3).unwrap());
    assert_eq!(
        tree.dump().unwrap(),
        "--- 0: (9)\n--- 1: (3,7) (11)\n--- 2: (1,2) (4,6) (7,8) (9,10) (11,12)\n"
    );
    check(&tree, &[1, 2, 4, 6, 7, 8, 9, 10, 11, 12]);

    assert!(tree.delete(&2).unwrap());
    assert_eq!(tree.dump().unwrap(), "--- 0: (7,9,11)\n--- 1: (1,4,6) (7,8) (9,10) (11,12)\n");
    assert_eq!(tree.height().unwrap(), 2);
    check(&tree, &[1, 4, 6, 7, 8, 9, 10, 11, 12]);
}

#[test]
fn sixteen_elements_build_three_levels() {
    init_tracing();
    let tree = tree_of(4, 1..=16);
    assert_eq!(
        tree.dump().unwrap(),
        "--- 0: (7,13)\n\
         --- 1: (3,5) (9,11) (15)\n\
         --- 2: (1,2) (3,4) (5,6) (7,8) (9,10) (11,12) (13,14) (15,16)\n"
    );
    check(&tree, &(1..=16).collect::<Vec<_>>());
}

#[test]
fn leaf_merge_cascades_into_internal_merge() {
    init_tracing();
    let mut tree = tree_of(4, 1..=16);
    assert!(tree.delete(&1).unwrap());
    assert_eq!(
        tree.dump().unwrap(),
        "--- 0: (13)\n\
         --- 1: (5,7,9,11) (15)\n\
         --- 2: (2,3,4) (5,6) (7,8) (9,10) (11,12) (13,14) (15,16)\n"
    );
    check(&tree, &(2..=16).collect::<Vec<_>>());
}

#[test]
fn leaf_merge_then_internal_rotate_right() {
    init_tracing();
    let mut tree = tree_of(4, 1..=16);
    assert!(tree.delete(&1).unwrap());
    assert!(tree.delete(&16).unwrap());
    assert_eq!(
        tree.dump().unwrap(),
        "--- 0: (11)\n\
         --- 1: (5,7,9) (13)\n\
         --- 2: (2,3,4) (5,6) (7,8) (9,10) (11,12) (13,14,15)\n"
    );
    check(&tree, &(2..=15).collect::<Vec<_>>());
}

#[test]
fn leaf_merge_then_internal_merge_on_the_right_edge() {
    init_tracing();
    let mut tree = tree_of(4, 1..=16);
    assert!(tree.delete(&15).unwrap());
    assert_eq!(
        tree.dump().unwrap(),
        "--- 0: (7)\n\
         --- 1: (3,5) (9,11,13)\n\
         --- 2: (1,2) (3,4) (5,6) (7,8) (9,10) (11,12) (13,14,16)\n"
    );
    check(&tree, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 16]);
}

#[test]
fn leaf_merge_then_internal_rotate_left() {
    init_tracing();
    let mut tree = tree_of(4, 1..=16);
    assert!(tree.delete(&15).unwrap());
    assert!(tree.delete(&4).unwrap());
    assert_eq!(
        tree.dump().unwrap(),
        "--- 0: (9)\n\
         --- 1: (5,7) (11,13)\n\
         --- 2: (1,2,3) (5,6) (7,8) (9,10) (11,12) (13,14,16)\n"
    );
    check(&tree, &[1, 2, 3, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 16]);
}

// ─── Mixed workloads ─────────────────────────────────────────────────────────

#[test]
fn delete_some_of_ten() {
    init_tracing();
    let mut tree = tree_of(4, 1..=10);
    for value in [3, 7, 1] {
        assert!(tree.delete(&value).unwrap());
    }
    check(&tree, &[2, 4, 5, 6, 8, 9, 10]);
}

#[test]
fn interleaved_inserts_and_deletes() {
    init_tracing();
    let mut tree = tree_of(4, 1..=10);
    tree.insert(15).unwrap();
    tree.insert(20).unwrap();
    for value in [3, 7, 1] {
        assert!(tree.delete(&value).unwrap());
    }
    check(&tree, &[2, 4, 5, 6, 8, 9, 10, 15, 20]);

    tree.insert(16).unwrap();
    tree.insert(17).unwrap();
    assert!(tree.delete(&15).unwrap());
    tree.insert(1).unwrap();
    check(&tree, &[1, 2, 4, 5, 6, 8, 9, 10, 16, 17, 20]);
}

#[test]
fn deleting_everything_leaves_an_empty_root() {
    init_tracing();
    let mut tree = tree_of(4, 1..=99);
    tree.insert(100).unwrap();

    for value in 2..=100 {
        assert!(tree.delete(&value).unwrap());
    }
    check(&tree, &[1]);

    assert!(tree.delete(&1).unwrap());
    check(&tree, &[]);
    assert!(tree.is_empty());
    assert_eq!(tree.dump().unwrap(), "--- 0: ()\n");
    assert_eq!(tree.height().unwrap(), 1);
}

#[test]
fn large_block_delete_and_restore() {
    init_tracing();
    let origin: Vec<i32> = (1..=5000).collect();
    let mut tree = tree_of(4, origin.iter().copied());

    let mut remaining = origin.clone();
    let removed: Vec<i32> = remaining.drain(600..1400).collect();
    for value in &removed {
        assert!(tree.delete(value).unwrap());
    }
    check(&tree, &remaining);

    for value in removed.iter().rev() {
        tree.insert(*value).unwrap();
    }
    check(&tree, &origin);

    for value in &origin {
        assert!(tree.delete(value).unwrap());
    }
    check(&tree, &[]);

    for value in origin.iter().rev() {
        tree.insert(*value).unwrap();
    }
    check(&tree, &origin);
}

#[test]
fn exist_reports_membership() {
    let tree = tree_of(4, 1..=20);
    assert!(tree.exist(&20).unwrap());
    assert!(tree.exist(&1).unwrap());
    assert!(!tree.exist(&21).unwrap());
    assert!(!tree.exist(&0).unwrap());
}

#[test]
fn deleting_an_absent_value_changes_nothing() {
    let mut tree = tree_of(4, 1..=20);
    let before = tree.dump().unwrap();
    assert!(!tree.delete(&100).unwrap());
    assert!(!tree.delete(&0).unwrap());
    assert_eq!(tree.dump().unwrap(), before);
    check(&tree, &(1..=20).collect::<Vec<_>>());
}

#[test]
fn insert_then_delete_restores_the_dump() {
    let mut tree = tree_of(4, (1..=10).map(|x| x * 10));
    let before = tree.dump().unwrap();
    assert_eq!(before, "--- 0: (40,60,90)\n--- 1: (10,20,30) (40,50) (60,70,80) (90,100)\n");

    for value in [45, 40, 50, 95, 150] {
        tree.insert(value).unwrap();
        assert!(tree.delete(&value).unwrap());
        assert_eq!(tree.dump().unwrap(), before, "after inserting and deleting {value}");
    }
    check(&tree, &(1..=10).map(|x| x * 10).collect::<Vec<_>>());
}

#[test]
fn empty_tree_operations() {
    let mut tree: BPlusTree<i32> = BPlusTree::new(4).unwrap();
    assert!(!tree.exist(&1).unwrap());
    assert!(!tree.delete(&1).unwrap());
    assert_eq!(tree.iter().next(), None);
    assert_eq!(tree.dump().unwrap(), "--- 0: ()\n");
    check(&tree, &[]);
}

// ─── Duplicates and custom comparators ───────────────────────────────────────

#[test]
fn duplicates_spanning_many_leaves() {
    init_tracing();
    let mut tree = tree_of(4, [1, 9]);
    for _ in 0..40 {
        tree.insert(5).unwrap();
    }
    assert_eq!(tree.len(), 42);
    assert!(tree.height().unwrap() > 2);
    assert!(tree.check_invariants().is_ok());

    for left in (0..40).rev() {
        assert!(tree.exist(&5).unwrap());
        assert!(tree.delete(&5).unwrap());
        assert!(tree.check_invariants().is_ok());
        assert_eq!(tree.iter().filter(|&&value| value == 5).count(), left);
    }
    assert!(!tree.delete(&5).unwrap());
    check(&tree, &[1, 9]);
}

#[derive(Clone, Debug, PartialEq)]
struct Entry {
    key: u32,
    tag: char,
}

fn by_key(a: &Entry, b: &Entry) -> Ordering {
    a.key.cmp(&b.key)
}

#[test]
fn equal_elements_keep_insertion_order() {
    let mut tree = BPlusTree::with_comparator(3, by_key).unwrap();
    for (key, tag) in [(2, 'a'), (1, 'b'), (2, 'c'), (3, 'd'), (2, 'e')] {
        tree.insert(Entry { key, tag }).unwrap();
    }
    let tags: String = tree.iter().map(|entry| entry.tag).collect();
    assert_eq!(tags, "baced");

    // Any element with key 2 matches; the first one in order goes.
    assert!(tree.delete(&Entry { key: 2, tag: 'z' }).unwrap());
    let tags: String = tree.iter().map(|entry| entry.tag).collect();
    assert_eq!(tags, "bced");
    assert!(tree.check_invariants().is_ok());
}

#[test]
fn reverse_comparator_orders_descending() {
    let tree = BPlusTree::with_elements(5, |a: &i32, b: &i32| b.cmp(a), 0..100).unwrap();
    assert_eq!(tree.iter().copied().collect::<Vec<_>>(), (0..100).rev().collect::<Vec<_>>());
    assert!(tree.exist(&42).unwrap());
    assert!(tree.check_invariants().is_ok());
}

// ─── Handle-level behaviour ──────────────────────────────────────────────────

#[test]
fn orders_below_three_are_rejected() {
    for order in 0..3 {
        let error = BPlusTree::<i32>::new(order).err();
        assert_eq!(error, Some(TreeError::InvalidOrder { order }));
    }
    let error = BPlusTree::<i32>::new(2).unwrap_err();
    assert!(!error.is_corruption());
    assert_eq!(error.to_string(), "invalid order 2: a tree needs an order of at least 3");
}

#[test]
fn default_tree_uses_the_default_order() {
    let tree: BPlusTree<u64> = BPlusTree::default();
    assert_eq!(tree.order(), DEFAULT_ORDER);
    assert_eq!(tree.config().min_keys(), DEFAULT_ORDER / 2);
    assert!(tree.is_empty());
}

#[test]
fn iterate_stops_when_told() {
    let tree = tree_of(4, 1..=50);
    let mut seen = Vec::new();
    tree.iterate(|&value| {
        seen.push(value);
        value != 17
    });
    assert_eq!(seen, (1..=17).collect::<Vec<_>>());

    let mut count = 0;
    tree.iterate(|_| {
        count += 1;
        true
    });
    assert_eq!(count, 50);
}

#[test]
fn iter_is_restartable_and_exact() {
    let tree = tree_of(3, 1..=30);
    let mut iter = tree.iter();
    assert_eq!(iter.len(), 30);
    let head: Vec<i32> = iter.by_ref().take(10).copied().collect();
    assert_eq!(head, (1..=10).collect::<Vec<_>>());
    assert_eq!(iter.size_hint(), (20, Some(20)));

    let rest = iter.clone();
    assert_eq!(rest.count(), 20);
    assert_eq!(iter.last(), Some(&30));

    let again: Vec<i32> = (&tree).into_iter().copied().collect();
    assert_eq!(again, (1..=30).collect::<Vec<_>>());
}

#[test]
fn debug_prints_a_set() {
    let tree = tree_of(4, [3, 1, 2, 2]);
    assert_eq!(format!("{tree:?}"), "{1, 2, 2, 3}");
    assert_eq!(format!("{:?}", tree.iter()), "[1, 2, 2, 3]");
}

#[test]
fn clear_allows_reuse() {
    let mut tree = tree_of(4, 1..=100);
    tree.clear();
    check(&tree, &[]);
    for value in (1..=10).rev() {
        tree.insert(value).unwrap();
    }
    check(&tree, &(1..=10).collect::<Vec<_>>());
}

// ─── Model checking ──────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
enum Op {
    Insert(i32),
    Delete(i32),
    Exist(i32),
}

/// A small value range, so duplicates and deletes of present values are common.
fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        5 => (0..64i32).prop_map(Op::Insert),
        4 => (0..64i32).prop_map(Op::Delete),
        1 => (0..64i32).prop_map(Op::Exist),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Replays random operations on the tree and on a sorted `Vec` and compares them
    /// after every step.
    #[test]
    fn tree_matches_sorted_vec(
        order in 3usize..9,
        initial in proptest::collection::vec(0..64i32, 0..80),
        ops in proptest::collection::vec(op_strategy(), 1..400),
    ) {
        let mut tree = tree_of(order, initial.iter().copied());
        let mut model = initial;
        model.sort_unstable();

        for op in &ops {
            match *op {
                Op::Insert(value) => {
                    tree.insert(value).unwrap();
                    let at = model.partition_point(|&x| x <= value);
                    model.insert(at, value);
                }
                Op::Delete(value) => {
                    let removed = tree.delete(&value).unwrap();
                    let expected = match model.iter().position(|&x| x == value) {
                        Some(at) => {
                            model.remove(at);
                            true
                        }
                        None => false,
                    };
                    prop_assert_eq!(removed, expected, "delete({})", value);
                }
                Op::Exist(value) => {
                    prop_assert_eq!(tree.exist(&value).unwrap(), model.contains(&value), "exist({})", value);
                }
            }

            prop_assert!(tree.check_invariants().is_ok(), "{:?}", tree.check_invariants());
            prop_assert_eq!(tree.len(), model.len());
        }
        prop_assert_eq!(tree.iter().copied().collect::<Vec<_>>(), model);
    }

    /// Inserting a value into a leaf with room and deleting it again leaves the
    /// structure untouched.
    #[test]
    fn insert_delete_round_trip(value in prop_oneof![40..60i32, 90..1000i32]) {
        let mut tree = tree_of(4, (1..=10).map(|x| x * 10));
        let before = tree.dump().unwrap();
        tree.insert(value).unwrap();
        prop_assert!(tree.delete(&value).unwrap());
        prop_assert_eq!(tree.dump().unwrap(), before);
    }

    /// Bulk construction holds the same elements as one-by-one insertion.
    #[test]
    fn bulk_build_matches_incremental(
        order in 3usize..9,
        values in proptest::collection::vec(any::<i16>(), 0..300),
    ) {
        let bulk = BPlusTree::with_elements(order, i16::cmp, values.iter().copied()).unwrap();
        let mut incremental = BPlusTree::with_comparator(order, i16::cmp).unwrap();
        for &value in &values {
            incremental.insert(value).unwrap();
        }

        prop_assert!(bulk.check_invariants().is_ok());
        prop_assert!(incremental.check_invariants().is_ok());
        prop_assert_eq!(
            bulk.iter().collect::<Vec<_>>(),
            incremental.iter().collect::<Vec<_>>()
        );
    }
}
