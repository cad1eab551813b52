//! An arena-backed B-tree ordered map for Rust.
//!
//! This crate provides [`OrderedTree`], an in-memory ordered map built on the
//! classical B-tree: every node stores key-value entries, nodes hold between
//! `t - 1` and `2t - 1` keys for a runtime [minimum degree](MinDegree) `t`,
//! and all leaves share one depth.
//!
//! # Example
//!
//! ```
//! use ordtree::{MinDegree, OrderedTree, TreeError};
//!
//! let mut tree = OrderedTree::with_min_degree(MinDegree::new(3)?);
//! for (i, word) in ["kiwi", "apple", "mango", "fig", "pear"].into_iter().enumerate() {
//!     tree.insert(word, i);
//! }
//!
//! assert_eq!(tree.find("mango"), Some(&2));
//! assert_eq!(tree.minimum(), Ok(&1)); // "apple"
//! assert_eq!(tree.maximum(), Ok(&4)); // "pear"
//!
//! assert_eq!(tree.delete("fig"), Ok(3));
//! assert_eq!(tree.delete("fig"), Err(TreeError::NotFound));
//! # Ok::<(), TreeError>(())
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Single-pass updates** - Full nodes are split on the way down during
//!   insertion; minimal nodes are grown on the way down during deletion
//! - **Configurable shape** - Minimum degree and sibling tie-break are chosen
//!   at construction through [`Config`]
//!
//! # Implementation
//!
//! Nodes and values live in two slot arenas and refer to each other through
//! small copyable handles. Every node keeps a handle to its parent, which is
//! how deletion finds the siblings it borrows from or merges with. Structural
//! steps are reported as `tracing` events (`btree.split`, `btree.merge`,
//! `btree.redistribute`, `btree.root.split`, `btree.root.collapse`); the crate
//! never installs a subscriber.

#![no_std]
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

mod config;
mod error;
mod ordered_tree;
mod raw;

pub use config::{Config, MinDegree, TieBreak};
pub use error::{Result, TreeError};
pub use ordered_tree::OrderedTree;
