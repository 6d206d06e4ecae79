//! Order-statistic AVL tree for Rust.
//!
//! This crate provides [`RankSet`], an ordered set of unique keys backed by a
//! height-balanced binary search tree whose nodes carry cached subtree sizes.
//! The size augmentation turns rank arithmetic into tree descents, so the set
//! answers order-statistic queries in O(log n) without walking any subtree:
//!
//! - [`rank_before`](RankSet::rank_before) - How many stored keys compare less
//!   than a given key
//! - [`range_count`](RankSet::range_count) - How many stored keys fall in the
//!   half-open interval `(a, b]`
//! - [`lower_bound`](RankSet::lower_bound) / [`upper_bound`](RankSet::upper_bound) -
//!   Boundary lookups in the key order
//!
//! # Example
//!
//! ```
//! use rank_tree::RankSet;
//!
//! let mut latencies = RankSet::new();
//! latencies.insert(120);
//! latencies.insert(48);
//! latencies.insert(97);
//! latencies.insert(210);
//!
//! // Duplicate insertion is a no-op.
//! assert!(!latencies.insert(97));
//! assert_eq!(latencies.len(), 4);
//!
//! // Keys strictly above 48 and at most 120: {97, 120}.
//! assert_eq!(latencies.range_count(&48, &120), 2);
//!
//! // Keys strictly below 100: {48, 97}.
//! assert_eq!(latencies.rank_before(&100), 2);
//! ```
//!
//! # Implementation
//!
//! Nodes live in a growing block-based arena and reference each other through
//! compact index handles; child links own their subtrees logically while the
//! parent back-reference is a non-owning index used only for the bottom-up
//! rebalancing walk and successor computation. Blocks double in capacity and
//! are never resized once created, so allocation cost is amortized and tearing
//! the whole structure down is a single bulk release.
//!
//! The crate also ships a small stream [`runner`] speaking the `k`/`q` command
//! protocol used by the `range-query` binary and its golden tests.

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

mod raw;

pub mod rank_set;
pub mod runner;

pub use rank_set::RankSet;
