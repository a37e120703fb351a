//! Persistent HAMT map.

use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::ops;

use archery::{ArcK, RcK, SharedPointer, SharedPointerKind};

use crate::config::TableOption;
use crate::debug;
use crate::error::InvariantViolation;
use crate::hash::{DefaultHashBuilder, HashValue, hash_one};
use crate::iter::{Iter, Keys, Values};
use crate::leaf::Leaf;
use crate::node::Node;
use crate::ops::find::{Found, find};
use crate::ops::get::get;
use crate::ops::persist::persist;
use crate::ops::transient;
use crate::resolve::take_new_val;
use crate::stats::{self, HamtStats};
use crate::table::{FixedTable, SlotChange, fan_out};

/// Persistent hash map based on a hash array mapped trie.
///
/// Every mutating method takes `&self` and returns a new map; the receiver
/// and everything reachable from it stay unchanged. The new version shares
/// all subtrees off the modified path with the old one, so keeping many
/// versions alive is cheap.
///
/// `P` selects the reference counting used for shared nodes: [`RcK`] here,
/// [`ArcK`] for [`HamtMapSync`], which can be read from many threads at once.
///
/// Keys must satisfy `a == b ⇒ hash(a) == hash(b)`. Keys violating this are
/// not detected and lead to unspecified (but memory-safe) results.
pub struct HamtMap<K, V, S = DefaultHashBuilder, P: SharedPointerKind = RcK> {
    root: SharedPointer<FixedTable<K, V, P>, P>,
    len: usize,
    hasher: SharedPointer<S, P>,
    options: TableOption,
}

/// Thread-safe [`HamtMap`]: nodes are shared through atomic reference counts.
pub type HamtMapSync<K, V, S = DefaultHashBuilder> = HamtMap<K, V, S, ArcK>;

// ---------------------------------------------------------------------------
// Construction: no trait bounds
// ---------------------------------------------------------------------------

impl<K, V, S, P: SharedPointerKind> HamtMap<K, V, S, P> {
    /// Creates an empty map with the given table policy and hasher.
    #[must_use]
    pub fn with_options_and_hasher(options: TableOption, hasher: S) -> Self {
        Self {
            root: SharedPointer::new(FixedTable::new(0, HashValue::default())),
            len: 0,
            hasher: SharedPointer::new(hasher),
            options,
        }
    }

    fn derive(&self, root: FixedTable<K, V, P>, len: usize) -> Self {
        Self {
            root: SharedPointer::new(root),
            len,
            hasher: SharedPointer::clone(&self.hasher),
            options: self.options,
        }
    }
}

impl<K, V> HamtMap<K, V> {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(TableOption::default())
    }

    /// Creates an empty map with the given table policy.
    #[must_use]
    pub fn with_options(options: TableOption) -> Self {
        Self::with_options_and_hasher(options, DefaultHashBuilder::default())
    }
}

impl<K, V, S> HamtMap<K, V, S> {
    /// Creates an empty map using `hasher` to hash keys.
    #[must_use]
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_options_and_hasher(TableOption::default(), hasher)
    }
}

impl<K, V> HamtMapSync<K, V> {
    /// Creates an empty thread-safe map.
    #[must_use]
    pub fn new_sync() -> Self {
        Self::with_options_sync(TableOption::default())
    }

    /// Creates an empty thread-safe map with the given table policy.
    #[must_use]
    pub fn with_options_sync(options: TableOption) -> Self {
        Self::with_options_and_hasher(options, DefaultHashBuilder::default())
    }
}

impl<K, V, S> HamtMapSync<K, V, S> {
    /// Creates an empty thread-safe map using `hasher` to hash keys.
    #[must_use]
    pub fn with_hasher_sync(hasher: S) -> Self {
        Self::with_options_and_hasher(TableOption::default(), hasher)
    }
}

// ---------------------------------------------------------------------------
// Accessors and traversal: no trait bounds
// ---------------------------------------------------------------------------

impl<K, V, S, P: SharedPointerKind> HamtMap<K, V, S, P> {
    /// Returns the number of entries. O(1).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the table policy of this map.
    #[must_use]
    pub const fn options(&self) -> TableOption {
        self.options
    }

    /// Returns the hasher used for keys.
    #[must_use]
    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Returns `true` if both maps are the same version (share one root).
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        SharedPointer::ptr_eq(&self.root, &other.root)
    }

    /// Returns an iterator over `(&K, &V)` pairs in slot order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V, P> {
        Iter::new(&self.root, self.len)
    }

    /// Returns an iterator over the keys.
    #[must_use]
    pub fn keys(&self) -> Keys<'_, K, V, P> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values.
    #[must_use]
    pub fn values(&self) -> Values<'_, K, V, P> {
        Values { inner: self.iter() }
    }

    /// Calls `f` on every entry until it returns `false`.
    pub fn range<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        for (k, v) in self.iter() {
            if !f(k, v) {
                break;
            }
        }
    }

    /// Counts entries by walking every leaf. O(n).
    ///
    /// Always equals [`len`](Self::len); useful as a cross-check.
    #[must_use]
    pub fn count(&self) -> usize {
        stats::count_entries(&self.root)
    }

    /// Collects a structural report of this version.
    #[must_use]
    pub fn stats(&self) -> HamtStats {
        HamtStats::collect(&self.root)
    }

    /// Renders the trie structure, one node per line.
    #[must_use]
    pub fn tree_string(&self) -> String
    where
        K: fmt::Debug,
    {
        debug::tree_string(&self.root)
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
        debug::validate(&self.root, self.len, self.options)
    }
}

// ---------------------------------------------------------------------------
// Read operations: K: Hash + Eq
// ---------------------------------------------------------------------------

impl<K: Hash + Eq, V, S: BuildHasher, P: SharedPointerKind> HamtMap<K, V, S, P> {
    fn hash(&self, key: &K) -> HashValue {
        hash_one(&*self.hasher, key)
    }

    /// Returns a reference to the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.get_key_value(key).map(|(_, v)| v)
    }

    /// Returns the stored key and value for `key`.
    #[must_use]
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        get(&self.root, self.hash(key), key)
    }

    /// Returns `true` if the map contains `key`.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.get_key_value(key).is_some()
    }
}

// ---------------------------------------------------------------------------
// Single-key writes: find, then persist
// ---------------------------------------------------------------------------

impl<K, V, S, P> HamtMap<K, V, S, P>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher,
    P: SharedPointerKind,
{
    /// Returns a new map with `value` stored under `key`.
    #[must_use = "the receiver is unchanged; use the returned map"]
    pub fn put(&self, key: K, value: V) -> Self {
        self.store(key, value).0
    }

    /// Returns a new map with `value` stored under `key`, and `true` if the
    /// key was added rather than replaced.
    ///
    /// A replace still allocates a new version.
    #[must_use = "the receiver is unchanged; use the returned map"]
    pub fn store(&self, key: K, value: V) -> (Self, bool) {
        self.store_resolve(key, value, &mut take_new_val)
    }

    /// Returns the value already stored under `key` together with this very
    /// map, or stores `value` and returns the new map.
    ///
    /// The flag is `true` when the value was loaded. Loading allocates
    /// nothing; the returned map is [`ptr_eq`](Self::ptr_eq) to the receiver.
    #[must_use = "the receiver is unchanged; use the returned map"]
    pub fn load_or_store(&self, key: K, value: V) -> (Self, V, bool) {
        let hash = self.hash(&key);
        let found = find(&self.root, hash);
        if let Some((_, existing)) = found.leaf.filter(|leaf| leaf.hash() == hash).and_then(|leaf| leaf.get(&key)) {
            return (self.clone(), existing.clone(), true);
        }
        let stored = value.clone();
        let (map, _) = self.store_found(&found, hash, key, value, &mut take_new_val);
        (map, stored, false)
    }

    fn store_resolve<F>(&self, key: K, value: V, resolve: &mut F) -> (Self, bool)
    where
        F: FnMut(&K, &V, V) -> V,
    {
        let hash = self.hash(&key);
        let found = find(&self.root, hash);
        self.store_found(&found, hash, key, value, resolve)
    }

    fn store_found<F>(
        &self,
        found: &Found<'_, K, V, P>,
        hash: HashValue,
        key: K,
        value: V,
        resolve: &mut F,
    ) -> (Self, bool)
    where
        F: FnMut(&K, &V, V) -> V,
    {
        let (change, added) = match found.leaf {
            None => (SlotChange::Insert(Node::Leaf(Leaf::flat(hash, key, value))), true),
            Some(leaf) if leaf.hash() == hash => {
                let (leaf, added) = leaf.put_resolve(key, value, resolve);
                (SlotChange::Replace(Node::Leaf(leaf)), added)
            }
            Some(leaf) => {
                let node = fan_out(found.depth + 1, leaf.clone(), Leaf::flat(hash, key, value), self.options);
                (SlotChange::Replace(node), true)
            }
        };
        let root = persist(&self.root, &found.path, hash, change, self.options);
        (self.derive(root, self.len + usize::from(added)), added)
    }

    /// Returns a new map without `key`.
    ///
    /// If `key` is absent the result shares the receiver's root.
    #[must_use = "the receiver is unchanged; use the returned map"]
    pub fn del(&self, key: &K) -> Self {
        self.remove(key).0
    }

    /// Returns a new map without `key`, and the removed value.
    ///
    /// If `key` is absent the result is the receiver itself (no allocation)
    /// and the value is `None`.
    #[must_use = "the receiver is unchanged; use the returned map"]
    pub fn remove(&self, key: &K) -> (Self, Option<V>) {
        let hash = self.hash(key);
        let found = find(&self.root, hash);
        let Some((rest, value)) = found.leaf.filter(|leaf| leaf.hash() == hash).and_then(|leaf| leaf.del(key))
        else {
            return (self.clone(), None);
        };
        let change = match rest {
            Some(leaf) => SlotChange::Replace(Node::Leaf(leaf)),
            None => SlotChange::Remove,
        };
        let root = persist(&self.root, &found.path, hash, change, self.options);
        (self.derive(root, self.len - 1), Some(value))
    }
}

// ---------------------------------------------------------------------------
// Bulk writes: transient in-place building
// ---------------------------------------------------------------------------

impl<K, V, S, P> HamtMap<K, V, S, P>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher,
    P: SharedPointerKind,
{
    /// Builds a map from `pairs` with the given policy and hasher. Later
    /// duplicates overwrite earlier ones.
    ///
    /// Tables are filled in place as they are created; no intermediate map
    /// versions are allocated.
    #[must_use]
    pub fn from_list_with<I>(pairs: I, options: TableOption, hasher: S) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut map = Self::with_options_and_hasher(options, hasher);
        map.extend(pairs);
        map
    }

    /// Returns a new map with every pair of `pairs` stored.
    ///
    /// For a key already present, `resolve(key, current, incoming)` decides
    /// the stored value (see [`resolve`](crate::resolve)). Subtrees no pair
    /// touches stay shared with the receiver.
    #[must_use = "the receiver is unchanged; use the returned map"]
    pub fn bulk_insert<I, F>(&self, pairs: I, mut resolve: F) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        F: FnMut(&K, &V, V) -> V,
    {
        let mut map = self.clone();
        let before = map.len;
        for (key, value) in pairs {
            map.insert_in_place(key, value, &mut resolve);
        }
        log::debug!("bulk insert added {} entries to {before}", map.len - before);
        map
    }

    /// Returns the union of the receiver and `other`.
    ///
    /// For a key in both, `resolve(key, receiver_value, other_value)`
    /// decides the stored value. This holds when `other` shares structure
    /// with the receiver too, including a merge with itself.
    #[must_use = "the receiver is unchanged; use the returned map"]
    pub fn merge<F>(&self, other: &Self, mut resolve: F) -> Self
    where
        F: FnMut(&K, &V, V) -> V,
    {
        if other.is_empty() {
            return self.clone();
        }
        let mut map = self.clone();
        for (key, value) in other {
            map.insert_in_place(key.clone(), value.clone(), &mut resolve);
        }
        log::debug!(
            "merged {} entries into {}, result holds {}",
            other.len,
            self.len,
            map.len
        );
        map
    }

    /// Returns a new map without any of `keys`, and the keys that were not
    /// found, in input order.
    #[must_use = "the receiver is unchanged; use the returned map"]
    pub fn bulk_delete<I>(&self, keys: I) -> (Self, Vec<K>)
    where
        I: IntoIterator<Item = K>,
    {
        let mut map = self.clone();
        let mut not_found = Vec::new();
        for key in keys {
            if !map.remove_in_place(&key) {
                not_found.push(key);
            }
        }
        log::debug!(
            "bulk delete removed {} entries, {} keys not found",
            self.len - map.len,
            not_found.len()
        );
        (map, not_found)
    }

    fn insert_in_place<F>(&mut self, key: K, value: V, resolve: &mut F)
    where
        F: FnMut(&K, &V, V) -> V,
    {
        let hash = hash_one(&*self.hasher, &key);
        let root = SharedPointer::make_mut(&mut self.root);
        if transient::insert(root, hash, key, value, resolve, self.options) {
            self.len += 1;
        }
    }

    fn remove_in_place(&mut self, key: &K) -> bool {
        let hash = hash_one(&*self.hasher, key);
        // Checked first so a miss copies nothing.
        if get(&self.root, hash, key).is_none() {
            return false;
        }
        let root = SharedPointer::make_mut(&mut self.root);
        let removed = transient::remove(root, hash, key, self.options).is_some();
        debug_assert!(removed, "present key not removed");
        if removed {
            self.len -= 1;
        }
        removed
    }
}

impl<K: Hash + Eq + Clone, V: Clone> HamtMap<K, V> {
    /// Builds a map from `pairs`. Later duplicates overwrite earlier ones.
    #[must_use]
    pub fn from_list<I: IntoIterator<Item = (K, V)>>(pairs: I) -> Self {
        Self::from_list_with(pairs, TableOption::default(), DefaultHashBuilder::default())
    }
}

impl<K: Hash + Eq + Clone, V: Clone> HamtMapSync<K, V> {
    /// Builds a thread-safe map from `pairs`. Later duplicates overwrite
    /// earlier ones.
    #[must_use]
    pub fn from_list_sync<I: IntoIterator<Item = (K, V)>>(pairs: I) -> Self {
        Self::from_list_with(pairs, TableOption::default(), DefaultHashBuilder::default())
    }
}

// ---------------------------------------------------------------------------
// Trait impls
// ---------------------------------------------------------------------------

impl<K, V, S, P: SharedPointerKind> Clone for HamtMap<K, V, S, P> {
    /// O(1): the clone shares the whole trie.
    fn clone(&self) -> Self {
        Self {
            root: SharedPointer::clone(&self.root),
            len: self.len,
            hasher: SharedPointer::clone(&self.hasher),
            options: self.options,
        }
    }
}

impl<K, V, S: Default, P: SharedPointerKind> Default for HamtMap<K, V, S, P> {
    fn default() -> Self {
        Self::with_options_and_hasher(TableOption::default(), S::default())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, S, P: SharedPointerKind> fmt::Debug for HamtMap<K, V, S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, S, P> PartialEq for HamtMap<K, V, S, P>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
    P: SharedPointerKind,
{
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.len == other.len && self.iter().all(|(k, v)| other.get(k) == Some(v)))
    }
}

impl<K, V, S, P> Eq for HamtMap<K, V, S, P>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
    P: SharedPointerKind,
{
}

impl<K, V, S, P> Extend<(K, V)> for HamtMap<K, V, S, P>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher,
    P: SharedPointerKind,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert_in_place(key, value, &mut take_new_val);
        }
    }
}

impl<K, V, S, P> FromIterator<(K, V)> for HamtMap<K, V, S, P>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Default,
    P: SharedPointerKind,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_list_with(iter, TableOption::default(), S::default())
    }
}

impl<K: Hash + Eq, V, S: BuildHasher, P: SharedPointerKind> ops::Index<&K> for HamtMap<K, V, S, P> {
    type Output = V;

    fn index(&self, key: &K) -> &V {
        self.get(key).expect("key not found")
    }
}

impl<'a, K, V, S, P: SharedPointerKind> IntoIterator for &'a HamtMap<K, V, S, P> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, P>;

    fn into_iter(self) -> Iter<'a, K, V, P> {
        self.iter()
    }
}
