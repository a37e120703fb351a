//! First phase of a mutation: locate the tip slot for a hash.

use archery::SharedPointerKind;

use crate::config::DEPTH_LIMIT;
use crate::hash::HashValue;
use crate::leaf::Leaf;
use crate::node::Node;
use crate::table::{FixedTable, Table, TableRef};

/// Where a hash ends up in one trie version.
pub struct Found<'a, K, V, P: SharedPointerKind> {
    /// Non-root tables walked through, root-most first.
    pub path: Vec<&'a Table<K, V, P>>,
    /// Depth of the tip table (the last entry of `path`, or the root).
    pub depth: usize,
    /// Slot index in the tip table.
    pub idx: usize,
    /// Leaf occupying the tip slot, or `None` if the slot is empty.
    pub leaf: Option<&'a Leaf<K, V, P>>,
}

/// Descends from `root` until the slot for `hash` holds a leaf or nothing.
///
/// Read-only; safe to run concurrently against one version.
pub fn find<K, V, P: SharedPointerKind>(root: &FixedTable<K, V, P>, hash: HashValue) -> Found<'_, K, V, P> {
    let mut path = Vec::with_capacity(DEPTH_LIMIT);
    let mut table = TableRef::Fixed(root);
    loop {
        let depth = table.depth();
        let idx = hash.index(depth);
        match table.get(idx) {
            Some(Node::Table(child)) => {
                debug_assert_eq!(child.depth(), depth + 1, "table depth out of sequence");
                path.push(child);
                table = child.view();
            }
            Some(Node::Leaf(leaf)) => {
                return Found {
                    path,
                    depth,
                    idx,
                    leaf: Some(leaf),
                };
            }
            None => {
                return Found {
                    path,
                    depth,
                    idx,
                    leaf: None,
                };
            }
        }
    }
}
