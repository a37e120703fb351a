//! Persistent HAMT set: a [`HamtMap`] with unit values.

use std::fmt;
use std::hash::{BuildHasher, Hash};

use archery::{ArcK, RcK, SharedPointerKind};

use crate::config::TableOption;
use crate::error::InvariantViolation;
use crate::hash::DefaultHashBuilder;
use crate::iter::Keys;
use crate::map::HamtMap;
use crate::resolve::keep_orig_val;
use crate::stats::HamtStats;

/// Persistent hash set.
///
/// Shares every property of [`HamtMap`]: each update returns a new set and
/// leaves the receiver untouched.
pub struct HamtSet<K, S = DefaultHashBuilder, P: SharedPointerKind = RcK> {
    map: HamtMap<K, (), S, P>,
}

/// Thread-safe [`HamtSet`].
pub type HamtSetSync<K, S = DefaultHashBuilder> = HamtSet<K, S, ArcK>;

impl<K, S, P: SharedPointerKind> HamtSet<K, S, P> {
    /// Creates an empty set with the given table policy and hasher.
    #[must_use]
    pub fn with_options_and_hasher(options: TableOption, hasher: S) -> Self {
        Self {
            map: HamtMap::with_options_and_hasher(options, hasher),
        }
    }

    /// Number of members. O(1).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the set has no members.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the table policy of this set.
    #[must_use]
    pub const fn options(&self) -> TableOption {
        self.map.options()
    }

    /// Returns `true` if both sets are the same version.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.map.ptr_eq(&other.map)
    }

    /// Iterates over the members in slot order.
    #[must_use]
    pub fn iter(&self) -> Keys<'_, K, (), P> {
        self.map.keys()
    }

    /// Calls `f` on every member until it returns `false`.
    pub fn range<F>(&self, mut f: F)
    where
        F: FnMut(&K) -> bool,
    {
        self.map.range(|k, _| f(k));
    }

    /// Counts members by walking every leaf. O(n).
    #[must_use]
    pub fn count(&self) -> usize {
        self.map.count()
    }

    /// Collects a structural report of this version.
    #[must_use]
    pub fn stats(&self) -> HamtStats {
        self.map.stats()
    }

    /// Renders the trie structure, one node per line.
    #[must_use]
    pub fn tree_string(&self) -> String
    where
        K: fmt::Debug,
    {
        self.map.tree_string()
    }

    /// Checks every structural invariant of this version.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    pub fn validate(&self) -> Result<(), InvariantViolation>
    where
        K: Eq,
    {
        self.map.validate()
    }
}

impl<K> HamtSet<K> {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(TableOption::default())
    }

    /// Creates an empty set with the given table policy.
    #[must_use]
    pub fn with_options(options: TableOption) -> Self {
        Self::with_options_and_hasher(options, DefaultHashBuilder::default())
    }
}

impl<K, S> HamtSet<K, S> {
    /// Creates an empty set using `hasher` to hash keys.
    #[must_use]
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_options_and_hasher(TableOption::default(), hasher)
    }
}

impl<K, S> HamtSetSync<K, S> {
    /// Creates an empty thread-safe set using `hasher` to hash keys.
    #[must_use]
    pub fn with_hasher_sync(hasher: S) -> Self {
        Self::with_options_and_hasher(TableOption::default(), hasher)
    }
}

impl<K> HamtSetSync<K> {
    /// Creates an empty thread-safe set.
    #[must_use]
    pub fn new_sync() -> Self {
        Self::with_options_sync(TableOption::default())
    }

    /// Creates an empty thread-safe set with the given table policy.
    #[must_use]
    pub fn with_options_sync(options: TableOption) -> Self {
        Self::with_options_and_hasher(options, DefaultHashBuilder::default())
    }
}

impl<K: Hash + Eq, S: BuildHasher, P: SharedPointerKind> HamtSet<K, S, P> {
    /// Returns `true` if `key` is a member.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Alias of [`contains`](Self::contains).
    #[must_use]
    pub fn is_set(&self, key: &K) -> bool {
        self.contains(key)
    }
}

impl<K, S, P> HamtSet<K, S, P>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
    P: SharedPointerKind,
{
    /// Returns a new set containing `key`, and `true` if it was added.
    #[must_use = "the receiver is unchanged; use the returned set"]
    pub fn add(&self, key: K) -> (Self, bool) {
        let (map, added) = self.map.store(key, ());
        (Self { map }, added)
    }

    /// Returns a new set containing `key`.
    #[must_use = "the receiver is unchanged; use the returned set"]
    pub fn set(&self, key: K) -> Self {
        self.add(key).0
    }

    /// Returns a new set without `key`, and `true` if it was a member.
    #[must_use = "the receiver is unchanged; use the returned set"]
    pub fn remove(&self, key: &K) -> (Self, bool) {
        let (map, removed) = self.map.remove(key);
        (Self { map }, removed.is_some())
    }

    /// Returns a new set without `key`.
    #[must_use = "the receiver is unchanged; use the returned set"]
    pub fn unset(&self, key: &K) -> Self {
        self.remove(key).0
    }

    /// Builds a set from `keys` with the given policy and hasher.
    #[must_use]
    pub fn from_list_with<I>(keys: I, options: TableOption, hasher: S) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        Self {
            map: HamtMap::from_list_with(keys.into_iter().map(|k| (k, ())), options, hasher),
        }
    }

    /// Returns a new set with every key of `keys` added.
    #[must_use = "the receiver is unchanged; use the returned set"]
    pub fn bulk_insert<I>(&self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        Self {
            map: self.map.bulk_insert(keys.into_iter().map(|k| (k, ())), keep_orig_val),
        }
    }

    /// Returns a new set without any of `keys`, and the keys that were not
    /// members, in input order.
    #[must_use = "the receiver is unchanged; use the returned set"]
    pub fn bulk_delete<I>(&self, keys: I) -> (Self, Vec<K>)
    where
        I: IntoIterator<Item = K>,
    {
        let (map, not_found) = self.map.bulk_delete(keys);
        (Self { map }, not_found)
    }

    /// Returns the union of the receiver and `other`.
    #[must_use = "the receiver is unchanged; use the returned set"]
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            map: self.map.merge(&other.map, keep_orig_val),
        }
    }
}

impl<K: Hash + Eq + Clone> HamtSet<K> {
    /// Builds a set from `keys`.
    #[must_use]
    pub fn from_list<I: IntoIterator<Item = K>>(keys: I) -> Self {
        Self::from_list_with(keys, TableOption::default(), DefaultHashBuilder::default())
    }
}

impl<K: Hash + Eq + Clone> HamtSetSync<K> {
    /// Builds a thread-safe set from `keys`.
    #[must_use]
    pub fn from_list_sync<I: IntoIterator<Item = K>>(keys: I) -> Self {
        Self::from_list_with(keys, TableOption::default(), DefaultHashBuilder::default())
    }
}

// ---------------------------------------------------------------------------
// Trait impls
// ---------------------------------------------------------------------------

impl<K, S, P: SharedPointerKind> Clone for HamtSet<K, S, P> {
    fn clone(&self) -> Self {
        Self { map: self.map.clone() }
    }
}

impl<K, S: Default, P: SharedPointerKind> Default for HamtSet<K, S, P> {
    fn default() -> Self {
        Self { map: HamtMap::default() }
    }
}

impl<K: fmt::Debug, S, P: SharedPointerKind> fmt::Debug for HamtSet<K, S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K: Hash + Eq, S: BuildHasher, P: SharedPointerKind> PartialEq for HamtSet<K, S, P> {
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl<K: Hash + Eq, S: BuildHasher, P: SharedPointerKind> Eq for HamtSet<K, S, P> {}

impl<K, S, P> Extend<K> for HamtSet<K, S, P>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
    P: SharedPointerKind,
{
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        self.map.extend(iter.into_iter().map(|k| (k, ())));
    }
}

impl<K, S, P> FromIterator<K> for HamtSet<K, S, P>
where
    K: Hash + Eq + Clone,
    S: BuildHasher + Default,
    P: SharedPointerKind,
{
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        Self::from_list_with(iter, TableOption::default(), S::default())
    }
}

impl<'a, K, S, P: SharedPointerKind> IntoIterator for &'a HamtSet<K, S, P> {
    type Item = &'a K;
    type IntoIter = Keys<'a, K, (), P>;

    fn into_iter(self) -> Keys<'a, K, (), P> {
        self.iter()
    }
}
