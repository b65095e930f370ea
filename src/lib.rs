//! An arena-backed B+ tree for Rust.
//!
//! This crate provides [`BPlusTree`], an ordered multiset whose ordering comes from a
//! caller-supplied [`Comparator`]. It supports:
//!
//! - [`insert`](BPlusTree::insert) - Add an element (duplicates are kept, ties go right)
//! - [`delete`](BPlusTree::delete) - Remove one matching element
//! - [`exist`](BPlusTree::exist) - Membership test
//! - [`iter`](BPlusTree::iter) / [`iterate`](BPlusTree::iterate) - In-order traversal of the leaf chain
//!
//! # Example
//!
//! ```
//! use bplus_tree::BPlusTree;
//!
//! let mut tree = BPlusTree::with_elements(4, i32::cmp, 1..=10).unwrap();
//! assert_eq!(tree.dump().unwrap(), "--- 0: (4,6,9)\n--- 1: (1,2,3) (4,5) (6,7,8) (9,10)\n");
//!
//! tree.insert(11).unwrap();
//! assert!(tree.exist(&11).unwrap());
//! assert!(tree.delete(&5).unwrap());
//! assert!(!tree.delete(&5).unwrap());
//!
//! let items: Vec<_> = tree.iter().copied().collect();
//! assert_eq!(items, [1, 2, 3, 4, 6, 7, 8, 9, 10, 11]);
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Configurable fan-out** - The `order` bounds children per internal node, see [`TreeConfig`]
//! - **Custom ordering** - Any `Fn(&T, &T) -> Ordering` works as a [`Comparator`]
//! - **Fast scans** - Leaves are linked in key order, iteration never revisits internal nodes
//!
//! # Implementation
//!
//! Nodes live in an arena and refer to each other by handle. Internal nodes own their
//! children through handle lists, while parent and next-leaf links are plain handles
//! with no ownership. Overflowing nodes are split after insertion and underflowing
//! nodes are repaired after deletion by rotating through a sibling or merging with it.

#![cfg_attr(not(test), no_std)]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod compare;
mod config;
mod error;
mod raw;

pub mod bplus_tree;

pub use bplus_tree::BPlusTree;
pub use compare::{Comparator, NaturalOrder};
pub use config::{DEFAULT_ORDER, MIN_ORDER, TreeConfig};
pub use error::{NodeKind, Result, TreeError};
