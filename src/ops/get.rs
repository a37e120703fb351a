//! Lookup: walks from the root to the leaf selected by the hash.

use archery::SharedPointerKind;

use crate::hash::HashValue;
use crate::node::Node;
use crate::table::{FixedTable, TableRef};

/// Searches for `key` below `root`. Allocation-free.
pub fn get<'a, K, V, P>(root: &'a FixedTable<K, V, P>, hash: HashValue, key: &K) -> Option<(&'a K, &'a V)>
where
    K: Eq,
    P: SharedPointerKind,
{
    let mut table = TableRef::Fixed(root);
    loop {
        match table.get(hash.index(table.depth()))? {
            Node::Leaf(leaf) => {
                return if leaf.hash() == hash { leaf.get(key) } else { None };
            }
            Node::Table(child) => table = child.view(),
        }
    }
}
