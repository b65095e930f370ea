//! Shared helpers for the integration tests.
//!
//! Set `RUST_LOG` (for example `bplus_tree=trace`) to see splits, rotations and merges.

use std::sync::Once;

use bplus_tree::BPlusTree;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Installs a test-writer subscriber once per test binary.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bplus_tree=warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_ansi(false)
            .try_init();
    });
}

/// Builds an order-`order` tree of `i32` from `elements`, ordered by `Ord`.
pub fn tree_of(order: usize, elements: impl IntoIterator<Item = i32>) -> BPlusTree<i32> {
    BPlusTree::with_config(bplus_tree::TreeConfig::new(order).unwrap(), bplus_tree::NaturalOrder, elements).unwrap()
}

/// Asserts the structure is valid and holds exactly `expected`, in order.
pub fn check(tree: &BPlusTree<i32>, expected: &[i32]) {
    if let Err(error) = tree.check_invariants() {
        panic!("{error}\n{}", tree.dump().unwrap_or_default());
    }
    assert_eq!(tree.len(), expected.len());
    assert_eq!(tree.iter().copied().collect::<Vec<_>>(), expected);
}
