//! Trie slot contents.

use archery::SharedPointerKind;

use crate::leaf::Leaf;
use crate::table::Table;

/// A non-empty table slot. An empty slot is `None` in an `Option<Node>`.
pub enum Node<K, V, P: SharedPointerKind> {
    /// Key/value payload.
    Leaf(Leaf<K, V, P>),
    /// Next trie level.
    Table(Table<K, V, P>),
}

// Cloning a node only bumps a reference count; no `K: Clone` needed.
impl<K, V, P: SharedPointerKind> Clone for Node<K, V, P> {
    fn clone(&self) -> Self {
        match self {
            Self::Leaf(leaf) => Self::Leaf(leaf.clone()),
            Self::Table(table) => Self::Table(table.clone()),
        }
    }
}
