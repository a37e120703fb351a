//! In-place mutation for bulk operations.
//!
//! Every node is reached through [`SharedPointer::make_mut`], so a node still
//! shared with another version is copied once and the copy is then updated
//! in place for the rest of the batch. Untouched subtrees stay shared.

use archery::{SharedPointer, SharedPointerKind};

use crate::config::TableOption;
use crate::hash::HashValue;
use crate::leaf::Leaf;
use crate::node::Node;
use crate::table::{Slots, Table, fan_out};

/// Inserts `key` into `table`, resolving a present key with `resolve`.
///
/// Returns `true` if the key was added.
pub fn insert<K, V, P, T, F>(
    table: &mut T,
    hash: HashValue,
    key: K,
    value: V,
    resolve: &mut F,
    options: TableOption,
) -> bool
where
    K: Eq + Clone,
    V: Clone,
    P: SharedPointerKind,
    T: Slots<K, V, P>,
    F: FnMut(&K, &V, V) -> V,
{
    let depth = table.depth();
    let idx = hash.index(depth);
    if table.get(idx).is_none() {
        table.insert(idx, Node::Leaf(Leaf::flat(hash, key, value)));
        return true;
    }
    let Some(slot) = table.get_mut(idx) else {
        return false;
    };
    match slot {
        Node::Leaf(leaf) if leaf.hash() == hash => leaf.put_in_place(key, value, resolve),
        Node::Leaf(leaf) => {
            let existing = leaf.clone();
            *slot = fan_out(depth + 1, existing, Leaf::flat(hash, key, value), options);
            true
        }
        Node::Table(child) => insert_into_table(child, hash, key, value, resolve, options),
    }
}

fn insert_into_table<K, V, P, F>(
    table: &mut Table<K, V, P>,
    hash: HashValue,
    key: K,
    value: V,
    resolve: &mut F,
    options: TableOption,
) -> bool
where
    K: Eq + Clone,
    V: Clone,
    P: SharedPointerKind,
    F: FnMut(&K, &V, V) -> V,
{
    let upgraded = match table {
        Table::Sparse(sparse)
            if options.is_adaptive()
                && sparse.get(hash.index(sparse.depth())).is_none()
                && sparse.would_upgrade() =>
        {
            Some(sparse.upgrade())
        }
        _ => None,
    };
    if let Some(fixed) = upgraded {
        *table = Table::Fixed(SharedPointer::new(fixed));
    }
    match table {
        Table::Sparse(sparse) => insert(SharedPointer::make_mut(sparse), hash, key, value, resolve, options),
        Table::Fixed(fixed) => insert(SharedPointer::make_mut(fixed), hash, key, value, resolve, options),
    }
}

/// Removes `key` from `table`, returning its value.
///
/// The caller must have checked that the key is present; otherwise shared
/// nodes on the path are copied for nothing.
pub fn remove<K, V, P, T>(table: &mut T, hash: HashValue, key: &K, options: TableOption) -> Option<V>
where
    K: Eq + Clone,
    V: Clone,
    P: SharedPointerKind,
    T: Slots<K, V, P>,
{
    let idx = hash.index(table.depth());
    let (value, vacate) = match table.get_mut(idx)? {
        Node::Leaf(leaf) => {
            if leaf.hash() != hash {
                return None;
            }
            match leaf.del(key)? {
                (Some(rest), value) => {
                    *leaf = rest;
                    (value, false)
                }
                (None, value) => (value, true),
            }
        }
        Node::Table(child) => {
            let value = remove_from_table(child, hash, key, options)?;
            (value, child.is_empty())
        }
    };
    if vacate {
        let _old = table.remove(idx);
    }
    Some(value)
}

fn remove_from_table<K, V, P>(
    table: &mut Table<K, V, P>,
    hash: HashValue,
    key: &K,
    options: TableOption,
) -> Option<V>
where
    K: Eq + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    let value = match table {
        Table::Sparse(sparse) => remove(SharedPointer::make_mut(sparse), hash, key, options),
        Table::Fixed(fixed) => remove(SharedPointer::make_mut(fixed), hash, key, options),
    }?;
    let downgraded = match table {
        Table::Fixed(fixed) if options.is_adaptive() && !fixed.is_empty() && fixed.would_downgrade() => {
            Some(fixed.downgrade())
        }
        _ => None,
    };
    if let Some(sparse) = downgraded {
        *table = Table::Sparse(SharedPointer::new(sparse));
    }
    Some(value)
}
