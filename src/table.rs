//! Internal trie nodes.
//!
//! Two representations share the [`Slots`] contract:
//! - [`SparseTable`]: occupancy bitmap plus a dense child array, for low occupancy
//! - [`FixedTable`]: `INDEX_LIMIT` directly indexed slots, for high occupancy
//!   and always for the root
//!
//! Tables record their depth and hash path for diagnostics only; routing
//! re-derives the slot index from each key's hash.

use std::mem;

use archery::{SharedPointer, SharedPointerKind};

use crate::bitmap::Bitmap;
use crate::config::{DEPTH_LIMIT, DOWNGRADE_THRESHOLD, INDEX_LIMIT, TableOption, UPGRADE_THRESHOLD};
use crate::hash::HashValue;
use crate::leaf::Leaf;
use crate::node::Node;

/// Slot-level operations shared by both table representations.
///
/// `idx` is always a slot index in `[0, INDEX_LIMIT)`.
pub trait Slots<K, V, P: SharedPointerKind> {
    /// Trie level of this table; the root is at depth 0.
    fn depth(&self) -> usize;

    /// Hash prefix common to every key below this table.
    fn hash_path(&self) -> HashValue;

    /// Number of occupied slots.
    fn len(&self) -> usize;

    /// Returns `true` if no slot is occupied.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the node in slot `idx`.
    fn get(&self, idx: usize) -> Option<&Node<K, V, P>>;

    /// Returns the node in slot `idx` for in-place update.
    fn get_mut(&mut self, idx: usize) -> Option<&mut Node<K, V, P>>;

    /// Fills the empty slot `idx`.
    fn insert(&mut self, idx: usize, node: Node<K, V, P>);

    /// Swaps the node in the occupied slot `idx`, returning the old one.
    fn replace(&mut self, idx: usize, node: Node<K, V, P>) -> Option<Node<K, V, P>>;

    /// Empties slot `idx`, returning its node.
    fn remove(&mut self, idx: usize) -> Option<Node<K, V, P>>;
}

// ---------------------------------------------------------------------------
// SparseTable
// ---------------------------------------------------------------------------

/// Rank-compressed table: only occupied slots are stored, in index order.
pub struct SparseTable<K, V, P: SharedPointerKind> {
    depth: usize,
    hash_path: HashValue,
    bitmap: Bitmap,
    nodes: Vec<Node<K, V, P>>,
}

impl<K, V, P: SharedPointerKind> SparseTable<K, V, P> {
    /// Creates an empty table.
    pub fn new(depth: usize, hash_path: HashValue) -> Self {
        debug_assert!(depth < DEPTH_LIMIT, "table below the last trie level");
        Self {
            depth,
            hash_path,
            bitmap: Bitmap::new(),
            nodes: Vec::with_capacity(2),
        }
    }

    /// Occupancy bitmap.
    pub const fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    /// Occupied slots' nodes, in ascending slot order.
    pub fn nodes(&self) -> &[Node<K, V, P>] {
        &self.nodes
    }

    /// `true` if one more entry reaches [`UPGRADE_THRESHOLD`].
    pub fn would_upgrade(&self) -> bool {
        self.nodes.len() + 1 >= UPGRADE_THRESHOLD
    }

    /// Rebuilds this table as a fixed table in one pass.
    pub fn upgrade(&self) -> FixedTable<K, V, P> {
        log::trace!(
            "upgrading sparse table at depth {} with {} entries",
            self.depth,
            self.nodes.len()
        );
        let mut fixed = FixedTable::new(self.depth, self.hash_path);
        for (idx, node) in self.bitmap.iter().zip(&self.nodes) {
            fixed.slots[idx] = Some(node.clone());
        }
        fixed.len = self.nodes.len();
        fixed
    }
}

impl<K, V, P: SharedPointerKind> Clone for SparseTable<K, V, P> {
    fn clone(&self) -> Self {
        Self {
            depth: self.depth,
            hash_path: self.hash_path,
            bitmap: self.bitmap,
            nodes: self.nodes.clone(),
        }
    }
}

impl<K, V, P: SharedPointerKind> Slots<K, V, P> for SparseTable<K, V, P> {
    fn depth(&self) -> usize {
        self.depth
    }

    fn hash_path(&self) -> HashValue {
        self.hash_path
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }

    fn get(&self, idx: usize) -> Option<&Node<K, V, P>> {
        if self.bitmap.is_set(idx) {
            self.nodes.get(self.bitmap.count(idx))
        } else {
            None
        }
    }

    fn get_mut(&mut self, idx: usize) -> Option<&mut Node<K, V, P>> {
        if self.bitmap.is_set(idx) {
            let pos = self.bitmap.count(idx);
            self.nodes.get_mut(pos)
        } else {
            None
        }
    }

    fn insert(&mut self, idx: usize, node: Node<K, V, P>) {
        debug_assert!(!self.bitmap.is_set(idx), "insert into occupied slot {idx}");
        let pos = self.bitmap.count(idx);
        self.nodes.insert(pos, node);
        self.bitmap.set(idx);
    }

    fn replace(&mut self, idx: usize, node: Node<K, V, P>) -> Option<Node<K, V, P>> {
        debug_assert!(self.bitmap.is_set(idx), "replace of empty slot {idx}");
        self.get_mut(idx).map(|slot| mem::replace(slot, node))
    }

    fn remove(&mut self, idx: usize) -> Option<Node<K, V, P>> {
        debug_assert!(self.bitmap.is_set(idx), "remove of empty slot {idx}");
        if !self.bitmap.is_set(idx) {
            return None;
        }
        let pos = self.bitmap.count(idx);
        self.bitmap.unset(idx);
        Some(self.nodes.remove(pos))
    }
}

// ---------------------------------------------------------------------------
// FixedTable
// ---------------------------------------------------------------------------

/// Directly indexed table with one slot per index.
pub struct FixedTable<K, V, P: SharedPointerKind> {
    depth: usize,
    hash_path: HashValue,
    len: usize,
    slots: [Option<Node<K, V, P>>; INDEX_LIMIT],
}

impl<K, V, P: SharedPointerKind> FixedTable<K, V, P> {
    /// Creates a table with every slot empty.
    pub fn new(depth: usize, hash_path: HashValue) -> Self {
        debug_assert!(depth < DEPTH_LIMIT, "table below the last trie level");
        Self {
            depth,
            hash_path,
            len: 0,
            slots: std::array::from_fn(|_| None),
        }
    }

    /// All `INDEX_LIMIT` slots.
    pub fn slots(&self) -> &[Option<Node<K, V, P>>] {
        &self.slots
    }

    /// `true` if occupancy has fallen to [`DOWNGRADE_THRESHOLD`].
    pub const fn would_downgrade(&self) -> bool {
        self.len <= DOWNGRADE_THRESHOLD
    }

    /// Rebuilds this table as a sparse table in one pass.
    pub fn downgrade(&self) -> SparseTable<K, V, P> {
        log::trace!(
            "downgrading fixed table at depth {} with {} entries",
            self.depth,
            self.len
        );
        let mut sparse = SparseTable::new(self.depth, self.hash_path);
        sparse.nodes.reserve(self.len);
        for (idx, node) in self.slots.iter().enumerate() {
            if let Some(node) = node {
                sparse.bitmap.set(idx);
                sparse.nodes.push(node.clone());
            }
        }
        sparse
    }
}

impl<K, V, P: SharedPointerKind> Clone for FixedTable<K, V, P> {
    fn clone(&self) -> Self {
        Self {
            depth: self.depth,
            hash_path: self.hash_path,
            len: self.len,
            slots: self.slots.clone(),
        }
    }
}

impl<K, V, P: SharedPointerKind> Slots<K, V, P> for FixedTable<K, V, P> {
    fn depth(&self) -> usize {
        self.depth
    }

    fn hash_path(&self) -> HashValue {
        self.hash_path
    }

    fn len(&self) -> usize {
        self.len
    }

    fn get(&self, idx: usize) -> Option<&Node<K, V, P>> {
        self.slots[idx].as_ref()
    }

    fn get_mut(&mut self, idx: usize) -> Option<&mut Node<K, V, P>> {
        self.slots[idx].as_mut()
    }

    fn insert(&mut self, idx: usize, node: Node<K, V, P>) {
        debug_assert!(self.slots[idx].is_none(), "insert into occupied slot {idx}");
        if self.slots[idx].replace(node).is_none() {
            self.len += 1;
        }
    }

    fn replace(&mut self, idx: usize, node: Node<K, V, P>) -> Option<Node<K, V, P>> {
        debug_assert!(self.slots[idx].is_some(), "replace of empty slot {idx}");
        let old = self.slots[idx].replace(node);
        if old.is_none() {
            self.len += 1;
        }
        old
    }

    fn remove(&mut self, idx: usize) -> Option<Node<K, V, P>> {
        debug_assert!(self.slots[idx].is_some(), "remove of empty slot {idx}");
        let old = self.slots[idx].take();
        if old.is_some() {
            self.len -= 1;
        }
        old
    }
}

// ---------------------------------------------------------------------------
// Table: shared handle to either representation
// ---------------------------------------------------------------------------

/// A pending change to one slot, replayed up the path by `persist`.
pub enum SlotChange<K, V, P: SharedPointerKind> {
    /// Fill an empty slot.
    Insert(Node<K, V, P>),
    /// Swap the node in an occupied slot.
    Replace(Node<K, V, P>),
    /// Empty an occupied slot.
    Remove,
}

/// Applies `change` to slot `idx` of an exclusively owned table.
pub fn apply_change<K, V, P, T>(table: &mut T, idx: usize, change: SlotChange<K, V, P>)
where
    P: SharedPointerKind,
    T: Slots<K, V, P>,
{
    match change {
        SlotChange::Insert(node) => table.insert(idx, node),
        SlotChange::Replace(node) => {
            let _old = table.replace(idx, node);
        }
        SlotChange::Remove => {
            let _old = table.remove(idx);
        }
    }
}

/// Shared handle to a non-root table.
pub enum Table<K, V, P: SharedPointerKind> {
    /// Rank-compressed representation.
    Sparse(SharedPointer<SparseTable<K, V, P>, P>),
    /// Directly indexed representation.
    Fixed(SharedPointer<FixedTable<K, V, P>, P>),
}

impl<K, V, P: SharedPointerKind> Clone for Table<K, V, P> {
    fn clone(&self) -> Self {
        match self {
            Self::Sparse(sparse) => Self::Sparse(SharedPointer::clone(sparse)),
            Self::Fixed(fixed) => Self::Fixed(SharedPointer::clone(fixed)),
        }
    }
}

impl<K, V, P: SharedPointerKind> Table<K, V, P> {
    /// Borrowed view for read-only traversal.
    pub fn view(&self) -> TableRef<'_, K, V, P> {
        match self {
            Self::Sparse(sparse) => TableRef::Sparse(sparse),
            Self::Fixed(fixed) => TableRef::Fixed(fixed),
        }
    }

    /// Trie level of this table.
    pub fn depth(&self) -> usize {
        self.view().depth()
    }

    /// Returns `true` if no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.view().len() == 0
    }

    /// Copies this table with `change` applied to slot `idx`.
    ///
    /// Returns `None` when the copy would be empty; the caller then removes
    /// the table from its parent. Under [`TableOption::Hybrid`] an insert
    /// that reaches [`UPGRADE_THRESHOLD`] yields a fixed table, and a remove
    /// that falls to [`DOWNGRADE_THRESHOLD`] yields a sparse one.
    pub fn apply(&self, idx: usize, change: SlotChange<K, V, P>, options: TableOption) -> Option<Self> {
        match (self, change) {
            (Self::Sparse(sparse), SlotChange::Insert(node))
                if options.is_adaptive() && sparse.would_upgrade() =>
            {
                let mut fixed = sparse.upgrade();
                fixed.insert(idx, node);
                Some(Self::Fixed(SharedPointer::new(fixed)))
            }
            (Self::Sparse(sparse), change) => {
                let mut copy = SparseTable::clone(sparse);
                apply_change(&mut copy, idx, change);
                (!copy.is_empty()).then(|| Self::Sparse(SharedPointer::new(copy)))
            }
            (Self::Fixed(fixed), change) => {
                let removing = matches!(change, SlotChange::Remove);
                let mut copy = FixedTable::clone(fixed);
                apply_change(&mut copy, idx, change);
                if copy.is_empty() {
                    None
                } else if removing && options.is_adaptive() && copy.would_downgrade() {
                    Some(Self::Sparse(SharedPointer::new(copy.downgrade())))
                } else {
                    Some(Self::Fixed(SharedPointer::new(copy)))
                }
            }
        }
    }
}

/// Builds the node that separates two leaves which landed in the same slot
/// at `depth - 1`.
///
/// Recurses one level per shared index. Once every hash bit is consumed the
/// leaves are merged into a collision leaf instead, which bounds the trie
/// depth by [`DEPTH_LIMIT`].
pub fn fan_out<K, V, P>(
    depth: usize,
    first: Leaf<K, V, P>,
    second: Leaf<K, V, P>,
    options: TableOption,
) -> Node<K, V, P>
where
    K: Eq + Clone,
    V: Clone,
    P: SharedPointerKind,
{
    if depth >= DEPTH_LIMIT {
        return Node::Leaf(Leaf::merge(&first, &second));
    }
    debug_assert_eq!(
        first.hash().hash_path(depth),
        second.hash().hash_path(depth),
        "fan-out of leaves with different hash paths"
    );
    let hash_path = first.hash().hash_path(depth);
    if options.creates_fixed() {
        let mut table = FixedTable::new(depth, hash_path);
        fill_fan_out(&mut table, first, second, options);
        Node::Table(Table::Fixed(SharedPointer::new(table)))
    } else {
        let mut table = SparseTable::new(depth, hash_path);
        fill_fan_out(&mut table, first, second, options);
        Node::Table(Table::Sparse(SharedPointer::new(table)))
    }
}

fn fill_fan_out<K, V, P, T>(table: &mut T, first: Leaf<K, V, P>, second: Leaf<K, V, P>, options: TableOption)
where
    K: Eq + Clone,
    V: Clone,
    P: SharedPointerKind,
    T: Slots<K, V, P>,
{
    let depth = table.depth();
    let first_idx = first.hash().index(depth);
    let second_idx = second.hash().index(depth);
    if first_idx == second_idx {
        table.insert(first_idx, fan_out(depth + 1, first, second, options));
    } else {
        table.insert(first_idx, Node::Leaf(first));
        table.insert(second_idx, Node::Leaf(second));
    }
}

// ---------------------------------------------------------------------------
// Read-only views
// ---------------------------------------------------------------------------

/// Borrowed view of either table representation.
pub enum TableRef<'a, K, V, P: SharedPointerKind> {
    /// A sparse table.
    Sparse(&'a SparseTable<K, V, P>),
    /// A fixed table (including the root).
    Fixed(&'a FixedTable<K, V, P>),
}

impl<K, V, P: SharedPointerKind> Clone for TableRef<'_, K, V, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V, P: SharedPointerKind> Copy for TableRef<'_, K, V, P> {}

impl<'a, K, V, P: SharedPointerKind> TableRef<'a, K, V, P> {
    /// Trie level of the table.
    pub fn depth(self) -> usize {
        match self {
            Self::Sparse(t) => t.depth(),
            Self::Fixed(t) => t.depth(),
        }
    }

    /// Hash prefix common to the table's descendants.
    pub fn hash_path(self) -> HashValue {
        match self {
            Self::Sparse(t) => t.hash_path(),
            Self::Fixed(t) => t.hash_path(),
        }
    }

    /// Number of occupied slots.
    pub fn len(self) -> usize {
        match self {
            Self::Sparse(t) => t.len(),
            Self::Fixed(t) => t.len(),
        }
    }

    /// Node in slot `idx`.
    pub fn get(self, idx: usize) -> Option<&'a Node<K, V, P>> {
        match self {
            Self::Sparse(t) => t.get(idx),
            Self::Fixed(t) => t.get(idx),
        }
    }

    /// Name of the representation, for diagnostics.
    pub const fn kind(self) -> &'static str {
        match self {
            Self::Sparse(_) => "SparseTable",
            Self::Fixed(_) => "FixedTable",
        }
    }

    /// Occupied slots as `(idx, node)` in ascending index order.
    pub fn entries(self) -> TableCursor<'a, K, V, P> {
        TableCursor {
            table: self,
            slot: 0,
            dense: 0,
        }
    }
}

/// Resumable position inside one table: the next slot to visit.
pub struct TableCursor<'a, K, V, P: SharedPointerKind> {
    table: TableRef<'a, K, V, P>,
    slot: usize,
    dense: usize,
}

impl<K, V, P: SharedPointerKind> Clone for TableCursor<'_, K, V, P> {
    fn clone(&self) -> Self {
        Self {
            table: self.table,
            slot: self.slot,
            dense: self.dense,
        }
    }
}

impl<'a, K, V, P: SharedPointerKind> Iterator for TableCursor<'a, K, V, P> {
    type Item = (usize, &'a Node<K, V, P>);

    fn next(&mut self) -> Option<Self::Item> {
        match self.table {
            TableRef::Sparse(t) => {
                while self.slot < INDEX_LIMIT {
                    let idx = self.slot;
                    self.slot += 1;
                    if t.bitmap.is_set(idx) {
                        let node = t.nodes.get(self.dense)?;
                        self.dense += 1;
                        return Some((idx, node));
                    }
                }
                None
            }
            TableRef::Fixed(t) => {
                while self.slot < INDEX_LIMIT {
                    let idx = self.slot;
                    self.slot += 1;
                    if let Some(node) = &t.slots[idx] {
                        return Some((idx, node));
                    }
                }
                None
            }
        }
    }
}
