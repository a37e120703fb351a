//! Persistent hash map and set based on a hash array mapped trie (HAMT).
//!
//! Every update returns a new version and leaves the old one untouched.
//! Versions share all subtrees off the modified path, so an update costs
//! `O(depth)` table copies and old versions stay valid for as long as
//! anything holds them.
//!
//! # Key properties
//!
//! - **Adaptive tables**: sparse (bitmap + dense array) below
//!   `UPGRADE_THRESHOLD` occupancy, fixed (direct index) above it, with
//!   hysteresis between the two thresholds
//! - **Bounded depth**: once the 64-bit hash is exhausted, keys with equal
//!   hashes share a collision leaf
//! - **Bulk building**: `from_list`, `bulk_insert`, `merge` and
//!   `bulk_delete` mutate fresh nodes in place instead of allocating a
//!   version per key
//! - **Thread-safe variant**: [`HamtMapSync`] / [`HamtSetSync`] share nodes
//!   through `Arc`
//! - **Zero `unsafe`**: enforced by `#![forbid(unsafe_code)]`
//!
//! # Example
//!
//! ```
//! use hamt_persist::HamtMap;
//!
//! let v1 = HamtMap::new().put("a", 1).put("b", 2);
//! let v2 = v1.put("a", 10);
//!
//! assert_eq!(v1.get(&"a"), Some(&1));
//! assert_eq!(v2.get(&"a"), Some(&10));
//! assert_eq!(v2.len(), 2);
//! ```
//!
//! # References
//!
//! - Bagwell, 2001, "Ideal Hash Trees"

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod bitmap;
pub mod config;
pub mod error;
pub mod hash;
pub mod iter;
pub mod resolve;
pub mod stats;

mod debug;
mod leaf;
mod map;
mod node;
mod ops;
mod set;
mod table;

#[cfg(test)]
mod tests;

pub use archery::{ArcK, RcK, SharedPointerKind};
pub use config::TableOption;
pub use error::InvariantViolation;
pub use hash::{DefaultHashBuilder, HashValue};
pub use map::{HamtMap, HamtMapSync};
pub use set::{HamtSet, HamtSetSync};
pub use stats::HamtStats;
