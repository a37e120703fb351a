//! Trie algorithms.
//!
//! - [`get`]: read-only lookup
//! - [`find`] + [`persist`]: the two-phase protocol behind every
//!   single-key mutation: locate the tip, then copy the ancestor path
//! - [`transient`]: in-place mutation of exclusively owned nodes, used by
//!   the bulk operations

pub mod find;
pub mod get;
pub mod persist;
pub mod transient;
