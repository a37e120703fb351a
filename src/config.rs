//! Trie geometry and table representation policy.
//!
//! The geometry is fixed at compile time through cargo features:
//!
//! | feature            | bits per level | `INDEX_LIMIT` | `DEPTH_LIMIT` |
//! |--------------------|----------------|---------------|---------------|
//! | `fanout-32` (default) | 5           | 32            | 13            |
//! | `fanout-64`        | 6              | 64            | 11            |
//!
//! The representation policy is chosen per map at runtime via [`TableOption`].

cfg_if::cfg_if! {
    if #[cfg(feature = "fanout-64")] {
        /// Hash bits consumed per trie level.
        pub const BITS_PER_LEVEL: u32 = 6;
    } else {
        /// Hash bits consumed per trie level.
        pub const BITS_PER_LEVEL: u32 = 5;
    }
}

/// Width of the hash value in bits.
pub const HASH_BITS: u32 = u64::BITS;

/// Fan-out of every table: number of child slots, `2^BITS_PER_LEVEL`.
pub const INDEX_LIMIT: usize = 1 << BITS_PER_LEVEL;

/// Maximum number of table levels, `ceil(HASH_BITS / BITS_PER_LEVEL)`.
///
/// The deepest level consumes whatever hash bits remain, so it may use fewer
/// than `BITS_PER_LEVEL` bits.
pub const DEPTH_LIMIT: usize = HASH_BITS.div_ceil(BITS_PER_LEVEL) as usize;

/// Occupancy at which a sparse table is rebuilt as a fixed table on insert.
pub const UPGRADE_THRESHOLD: usize = INDEX_LIMIT * 5 / 8;

/// Occupancy at which a fixed table is rebuilt as a sparse table on delete.
///
/// Must stay below [`UPGRADE_THRESHOLD`].
pub const DOWNGRADE_THRESHOLD: usize = INDEX_LIMIT / 2;

/// Mask selecting one level's worth of hash bits.
pub(crate) const INDEX_MASK: u64 = (INDEX_LIMIT as u64) - 1;

const _: () = assert!(DOWNGRADE_THRESHOLD < UPGRADE_THRESHOLD);
const _: () = assert!(UPGRADE_THRESHOLD <= INDEX_LIMIT);

/// Which table representations a map may use below its root.
///
/// The root table is always fixed, whatever the option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TableOption {
    /// Sparse tables for low occupancy, fixed tables once a table reaches
    /// [`UPGRADE_THRESHOLD`], back to sparse at [`DOWNGRADE_THRESHOLD`].
    #[default]
    Hybrid,
    /// Every table is a fixed, directly indexed table.
    FixedOnly,
    /// Every non-root table is a sparse, rank-compressed table.
    SparseOnly,
}

impl TableOption {
    /// `true` if tables switch representation with their occupancy.
    #[must_use]
    pub const fn is_adaptive(self) -> bool {
        matches!(self, Self::Hybrid)
    }

    /// `true` if freshly created tables are fixed tables.
    #[must_use]
    pub const fn creates_fixed(self) -> bool {
        matches!(self, Self::FixedOnly)
    }
}
