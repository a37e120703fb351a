//! Structural invariant violations reported by `validate`.

use thiserror::Error;

use crate::config::TableOption;
use crate::hash::HashValue;

/// The first broken structural invariant found in a trie.
///
/// Any of these indicates a bug in this crate, or a key type whose `Hash`
/// and `Eq` disagree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A table's recorded depth does not match its position.
    #[error("table at depth {found} found where depth {expected} was expected")]
    DepthMismatch {
        /// Depth implied by the table's position.
        expected: usize,
        /// Depth recorded by the table.
        found: usize,
    },

    /// A table's hash path does not match the slots leading to it.
    #[error("table at depth {depth} has hash path {found}, expected {expected}")]
    HashPathMismatch {
        /// Depth of the table.
        depth: usize,
        /// Path implied by the table's position.
        expected: HashValue,
        /// Path recorded by the table.
        found: HashValue,
    },

    /// A table other than the root has no entries.
    #[error("non-root table at depth {depth} is empty")]
    EmptyTable {
        /// Depth of the table.
        depth: usize,
    },

    /// A table's occupancy bookkeeping disagrees with its slots.
    #[error("table at depth {depth} records {recorded} entries but holds {actual}")]
    OccupancyMismatch {
        /// Depth of the table.
        depth: usize,
        /// Count recorded by the table.
        recorded: usize,
        /// Occupied slots actually present.
        actual: usize,
    },

    /// A leaf sits in a slot its hash does not select.
    #[error("leaf with hash {hash} stored in slot {idx} of a depth-{depth} table")]
    MisplacedLeaf {
        /// Depth of the table holding the leaf.
        depth: usize,
        /// Slot holding the leaf.
        idx: usize,
        /// The leaf's hash.
        hash: HashValue,
    },

    /// A collision leaf holds fewer than two pairs.
    #[error("collision leaf at depth {depth} holds {len} pair(s)")]
    SingletonCollision {
        /// Depth of the table holding the leaf.
        depth: usize,
        /// Pairs held.
        len: usize,
    },

    /// A collision leaf holds two equal keys.
    #[error("collision leaf at depth {depth} holds a duplicate key")]
    DuplicateKey {
        /// Depth of the table holding the leaf.
        depth: usize,
    },

    /// A table's representation contradicts the map's [`TableOption`].
    #[error("{kind} at depth {depth} with {occupancy} entries violates the {option:?} policy")]
    Representation {
        /// `"SparseTable"` or `"FixedTable"`.
        kind: &'static str,
        /// Depth of the table.
        depth: usize,
        /// Occupied slots.
        occupancy: usize,
        /// The map's policy.
        option: TableOption,
    },

    /// The maintained entry count differs from the reachable entries.
    #[error("map records {recorded} entries but {actual} are reachable")]
    CountMismatch {
        /// Value of `len()`.
        recorded: usize,
        /// Value of `count()`.
        actual: usize,
    },
}
