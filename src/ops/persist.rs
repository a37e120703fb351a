//! Second phase of a mutation: copy the ancestor path bottom-up.

use archery::SharedPointerKind;

use crate::config::TableOption;
use crate::hash::HashValue;
use crate::node::Node;
use crate::table::{FixedTable, SlotChange, Table, apply_change};

/// Replays `change` at the tip of `path` and copies every ancestor up to a
/// new root.
///
/// Each popped table is copied with its child slot replaced; a table left
/// empty is removed from its parent instead. Siblings are shared with the
/// old version. The root is always copied and never removed.
pub fn persist<K, V, P: SharedPointerKind>(
    root: &FixedTable<K, V, P>,
    path: &[&Table<K, V, P>],
    hash: HashValue,
    change: SlotChange<K, V, P>,
    options: TableOption,
) -> FixedTable<K, V, P> {
    let mut change = change;
    for table in path.iter().rev() {
        let idx = hash.index(table.depth());
        change = match table.apply(idx, change, options) {
            Some(copy) => SlotChange::Replace(Node::Table(copy)),
            None => SlotChange::Remove,
        };
    }
    let mut new_root = root.clone();
    apply_change(&mut new_root, hash.index(0), change);
    new_root
}
