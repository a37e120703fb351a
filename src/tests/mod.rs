mod basic;
mod bulk;
mod collision;

use std::hash::{BuildHasherDefault, Hash, Hasher};

use crate::config::BITS_PER_LEVEL;

/// Hasher that returns the last `u64` written to it unchanged.
///
/// With `u64` keys the key *is* the hash, which pins every key to a known
/// slot path.
#[derive(Default)]
pub struct IdentityHasher(u64);

impl Hasher for IdentityHasher {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 = self.0.rotate_left(8) ^ u64::from(b);
        }
    }

    fn write_u64(&mut self, n: u64) {
        self.0 = n;
    }
}

pub type IdentityState = BuildHasherDefault<IdentityHasher>;

/// A key type with a controllable hash value for testing hash collisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollidingKey {
    pub id: u32,
    pub forced_hash: u64,
}

impl CollidingKey {
    pub const fn new(id: u32, hash: u64) -> Self {
        Self {
            id,
            forced_hash: hash,
        }
    }
}

impl Hash for CollidingKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.forced_hash.hash(state);
    }
}

/// Hash whose index is `idx` at depth 1 and 0 everywhere else, so keys
/// built from it share the root slot 0 and spread over one child table.
pub const fn child_slot(idx: usize) -> u64 {
    (idx as u64) << BITS_PER_LEVEL
}
