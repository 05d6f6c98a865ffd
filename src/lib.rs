//! # llrb-arena
//!
//! An ordered map over arbitrary records, built as a left-leaning red-black
//! tree whose nodes live in an index-linked arena instead of individual heap
//! allocations.
//!
//! - Records are addressed by [`NodeIndex`]; indices survive arena growth.
//! - Keys are projected out of records by a [`Schema`], so any record type
//!   and any key field can be indexed.
//! - A [`Policy`] decides what happens when the arena is full: grow it,
//!   evict a node (turning the tree into a bounded ordered cache), or fail
//!   with [`Error::Exhausted`].
//!
//! ## Example
//!
//! ```rust
//! use llrb_arena::{LlrbTree, Lru, Pairs};
//!
//! // A three-entry ordered cache.
//! let mut cache = LlrbTree::with_policy(Pairs::new(), Lru::with_capacity(3));
//! for (k, v) in [(1, "a"), (2, "b"), (3, "c")] {
//!     cache.insert((k, v), false).unwrap();
//! }
//!
//! let one = cache.find(&1).unwrap();
//! cache.touch(one);
//! cache.insert((4, "d"), false).unwrap(); // evicts 2, the least recently used
//!
//! let keys: Vec<i32> = cache.iter().map(|(_, (k, _))| *k).collect();
//! assert_eq!(keys, vec![1, 3, 4]);
//! ```
//!
//! The tree is single-owner: no internal locking, and policy hooks run
//! synchronously inside the call that triggered them.

#![forbid(unsafe_code)]

mod arena;
pub mod config;
mod error;
mod index;
mod iter;
pub mod policy;
mod schema;
mod tree;

pub use arena::Nodes;
pub use config::GrowthConfig;
pub use error::{Error, Result};
pub use index::{NodeIndex, MAX_CAPACITY};
pub use iter::Iter;
pub use policy::{EvictMin, Fixed, Grow, Lru, Policy};
pub use schema::{KeyFn, Pairs, Schema};
pub use tree::LlrbTree;

#[cfg(test)]
mod proptests;
