//! Leaf nodes: the only payload-carrying nodes of the trie.
//!
//! Leaves are immutable once shared. Every operation that changes a leaf
//! returns a new one; the `_in_place` variants mutate through
//! [`SharedPointer::make_mut`] and therefore copy first when the leaf is
//! still reachable from another version.

use std::slice;

use archery::{SharedPointer, SharedPointerKind};

use crate::hash::HashValue;

/// A single key/value pair.
#[derive(Clone)]
pub struct FlatLeaf<K, V> {
    hash: HashValue,
    key: K,
    value: V,
}

/// Key/value pairs whose keys hash to the same full 64-bit value.
///
/// Invariant: at least two pairs, keys pairwise distinct, insertion order.
#[derive(Clone)]
pub struct CollisionLeaf<K, V> {
    hash: HashValue,
    pairs: Vec<(K, V)>,
}

impl<K, V> CollisionLeaf<K, V> {
    /// Returns the stored pairs in insertion order.
    pub fn pairs(&self) -> &[(K, V)] {
        &self.pairs
    }
}

/// Shared handle to either leaf kind.
pub enum Leaf<K, V, P: SharedPointerKind> {
    /// One pair.
    Flat(SharedPointer<FlatLeaf<K, V>, P>),
    /// Two or more pairs with identical hashes.
    Collision(SharedPointer<CollisionLeaf<K, V>, P>),
}

impl<K, V, P: SharedPointerKind> Clone for Leaf<K, V, P> {
    fn clone(&self) -> Self {
        match self {
            Self::Flat(flat) => Self::Flat(SharedPointer::clone(flat)),
            Self::Collision(coll) => Self::Collision(SharedPointer::clone(coll)),
        }
    }
}

impl<K, V, P: SharedPointerKind> Leaf<K, V, P> {
    /// Creates a flat leaf.
    pub fn flat(hash: HashValue, key: K, value: V) -> Self {
        Self::Flat(SharedPointer::new(FlatLeaf { hash, key, value }))
    }

    fn collision(hash: HashValue, pairs: Vec<(K, V)>) -> Self {
        debug_assert!(pairs.len() >= 2, "collision leaf with fewer than two pairs");
        Self::Collision(SharedPointer::new(CollisionLeaf { hash, pairs }))
    }

    /// The full hash shared by every key in this leaf.
    pub fn hash(&self) -> HashValue {
        match self {
            Self::Flat(flat) => flat.hash,
            Self::Collision(coll) => coll.hash,
        }
    }

    /// Number of pairs held.
    pub fn len(&self) -> usize {
        match self {
            Self::Flat(_) => 1,
            Self::Collision(coll) => coll.pairs.len(),
        }
    }

    /// Name of the leaf kind, for diagnostics.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Flat(_) => "FlatLeaf",
            Self::Collision(_) => "CollisionLeaf",
        }
    }

    /// Iterates over the pairs in storage order.
    pub fn pairs(&self) -> LeafPairs<'_, K, V> {
        LeafPairs::new(self)
    }
}

impl<K: Eq, V, P: SharedPointerKind> Leaf<K, V, P> {
    /// Looks up `key`. The caller has already matched the hash.
    pub fn get(&self, key: &K) -> Option<(&K, &V)> {
        match self {
            Self::Flat(flat) => (flat.key == *key).then_some((&flat.key, &flat.value)),
            Self::Collision(coll) => coll
                .pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(k, v)| (k, v)),
        }
    }
}

impl<K: Eq + Clone, V: Clone, P: SharedPointerKind> Leaf<K, V, P> {
    /// Stores `value` under `key`, overwriting an equal key.
    ///
    /// Returns the new leaf and `true` if the key was not present.
    pub fn put(&self, key: K, value: V) -> (Self, bool) {
        self.put_resolve(key, value, &mut |_, _, new| new)
    }

    /// Like [`put`](Self::put), but an equal key stores
    /// `resolve(existing_key, existing_value, value)` instead of `value`.
    pub fn put_resolve<F>(&self, key: K, value: V, resolve: &mut F) -> (Self, bool)
    where
        F: FnMut(&K, &V, V) -> V,
    {
        match self {
            Self::Flat(flat) => {
                if flat.key == key {
                    let value = resolve(&flat.key, &flat.value, value);
                    (Self::flat(flat.hash, flat.key.clone(), value), false)
                } else {
                    let pairs = vec![(flat.key.clone(), flat.value.clone()), (key, value)];
                    (Self::collision(flat.hash, pairs), true)
                }
            }
            Self::Collision(coll) => {
                let mut pairs = coll.pairs.clone();
                let added = resolve_into(&mut pairs, key, value, resolve);
                (Self::collision(coll.hash, pairs), added)
            }
        }
    }

    /// Removes `key`.
    ///
    /// Returns `None` if the key is absent. Otherwise returns what is left of
    /// the leaf (`None` when it held only this key; a flat leaf when a
    /// collision leaf drops to one pair) and the removed value.
    pub fn del(&self, key: &K) -> Option<(Option<Self>, V)> {
        match self {
            Self::Flat(flat) => (flat.key == *key).then(|| (None, flat.value.clone())),
            Self::Collision(coll) => {
                let pos = coll.pairs.iter().position(|(k, _)| k == key)?;
                let value = coll.pairs[pos].1.clone();
                let mut rest: Vec<(K, V)> = coll
                    .pairs
                    .iter()
                    .enumerate()
                    .filter(|&(i, _)| i != pos)
                    .map(|(_, pair)| pair.clone())
                    .collect();
                debug_assert!(!rest.is_empty(), "collision leaf with a single pair");
                let leaf = if rest.len() == 1 {
                    rest.pop().map(|(k, v)| Self::flat(coll.hash, k, v))
                } else {
                    Some(Self::collision(coll.hash, rest))
                };
                Some((leaf, value))
            }
        }
    }

    /// Combines two leaves with identical full hashes into one collision leaf.
    ///
    /// Pairs of `first` come before pairs of `second`.
    pub fn merge(first: &Self, second: &Self) -> Self {
        debug_assert_eq!(first.hash(), second.hash(), "merging leaves with distinct hashes");
        let pairs = first
            .pairs()
            .chain(second.pairs())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Self::collision(first.hash(), pairs)
    }

    /// In-place [`put_resolve`](Self::put_resolve). Copies the leaf first if
    /// it is shared with another version.
    pub fn put_in_place<F>(&mut self, key: K, value: V, resolve: &mut F) -> bool
    where
        F: FnMut(&K, &V, V) -> V,
    {
        match self {
            Self::Flat(flat) if flat.key == key => {
                let flat = SharedPointer::make_mut(flat);
                let resolved = resolve(&flat.key, &flat.value, value);
                flat.value = resolved;
                false
            }
            Self::Flat(flat) => {
                let hash = flat.hash;
                let pairs = vec![(flat.key.clone(), flat.value.clone()), (key, value)];
                *self = Self::collision(hash, pairs);
                true
            }
            Self::Collision(coll) => {
                resolve_into(&mut SharedPointer::make_mut(coll).pairs, key, value, resolve)
            }
        }
    }
}

fn resolve_into<K: Eq, V, F>(pairs: &mut Vec<(K, V)>, key: K, value: V, resolve: &mut F) -> bool
where
    F: FnMut(&K, &V, V) -> V,
{
    if let Some((k, v)) = pairs.iter_mut().find(|(k, _)| *k == key) {
        let resolved = resolve(k, v, value);
        *v = resolved;
        false
    } else {
        pairs.push((key, value));
        true
    }
}

/// Iterator over the pairs of one leaf.
pub enum LeafPairs<'a, K, V> {
    /// Nothing left.
    Empty,
    /// The pair of a flat leaf, not yet yielded.
    Flat(&'a FlatLeaf<K, V>),
    /// Remaining pairs of a collision leaf.
    Collision(slice::Iter<'a, (K, V)>),
}

impl<'a, K, V> LeafPairs<'a, K, V> {
    /// Starts at the first pair of `leaf`.
    pub fn new<P: SharedPointerKind>(leaf: &'a Leaf<K, V, P>) -> Self {
        match leaf {
            Leaf::Flat(flat) => Self::Flat(flat),
            Leaf::Collision(coll) => Self::Collision(coll.pairs.iter()),
        }
    }
}

impl<K, V> Clone for LeafPairs<'_, K, V> {
    fn clone(&self) -> Self {
        match self {
            Self::Empty => Self::Empty,
            Self::Flat(flat) => Self::Flat(*flat),
            Self::Collision(pairs) => Self::Collision(pairs.clone()),
        }
    }
}

impl<'a, K, V> Iterator for LeafPairs<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Empty => None,
            Self::Flat(flat) => {
                let flat: &'a FlatLeaf<K, V> = *flat;
                *self = Self::Empty;
                Some((&flat.key, &flat.value))
            }
            Self::Collision(iter) => iter.next().map(|(k, v)| (k, v)),
        }
    }
}
