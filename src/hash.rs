//! 64-bit hash values and their per-level decomposition.

use std::fmt;
use std::hash::{BuildHasher, Hash};

use crate::config::{BITS_PER_LEVEL, DEPTH_LIMIT, HASH_BITS, INDEX_MASK};

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// Hasher builder used when none is supplied.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else {
        /// Hasher builder used when none is supplied.
        pub type DefaultHashBuilder = std::hash::RandomState;
    }
}

/// A key's 64-bit hash, consumed `BITS_PER_LEVEL` bits per trie level,
/// least significant bits first.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct HashValue(u64);

impl HashValue {
    /// Wraps a raw hash.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw hash.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Returns the slot index this hash selects in a table at `depth`.
    #[inline]
    #[must_use]
    pub const fn index(self, depth: usize) -> usize {
        debug_assert!(depth < DEPTH_LIMIT);
        ((self.0 >> shift(depth)) & INDEX_MASK) as usize
    }

    /// Returns the hash prefix consumed by the levels above `depth`.
    ///
    /// Every key stored below a table at `depth` shares this prefix.
    #[must_use]
    pub const fn hash_path(self, depth: usize) -> Self {
        let bits = shift(depth);
        if bits >= HASH_BITS {
            self
        } else {
            Self(self.0 & ((1 << bits) - 1))
        }
    }

    /// Returns the hash path of the child selected by slot `idx` of a table
    /// at `depth` whose path is `self`.
    #[must_use]
    pub(crate) const fn with_index(self, depth: usize, idx: usize) -> Self {
        Self(self.0 | ((idx as u64) << shift(depth)))
    }

    /// Renders the indices of the first `depth` levels as `/05/1f/...`.
    #[must_use]
    pub fn path_string(self, depth: usize) -> String {
        use fmt::Write;

        let mut out = String::with_capacity(depth * 3 + 1);
        for d in 0..depth.min(DEPTH_LIMIT) {
            let _ = write!(out, "/{:02x}", self.index(d));
        }
        if out.is_empty() {
            out.push('/');
        }
        out
    }
}

#[allow(clippy::cast_possible_truncation)]
const fn shift(depth: usize) -> u32 {
    (depth as u32).saturating_mul(BITS_PER_LEVEL)
}

/// Hashes `value` with `build`.
#[inline]
#[must_use]
pub fn hash_one<T: Hash + ?Sized, S: BuildHasher>(build: &S, value: &T) -> HashValue {
    HashValue(build.hash_one(value))
}

impl fmt::Debug for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashValue({:#018x})", self.0)
    }
}

impl fmt::Display for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path_string(DEPTH_LIMIT))
    }
}

impl From<u64> for HashValue {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}
