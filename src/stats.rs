//! Structural statistics and the independent entry count.
//!
//! Both walk the whole trie; they are diagnostics, not hot-path queries.

use std::fmt;

use archery::SharedPointerKind;

use crate::config::{DEPTH_LIMIT, INDEX_LIMIT};
use crate::node::Node;
use crate::table::{FixedTable, TableRef};

/// Shape of one trie version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HamtStats {
    /// Key/value pairs reachable from the root.
    pub entries: usize,
    /// Deepest table level holding a leaf.
    pub max_depth: usize,
    /// Tables per depth, root included at depth 0.
    pub tables_by_depth: [usize; DEPTH_LIMIT],
    /// Tables per occupancy (number of non-empty slots).
    pub tables_by_occupancy: [usize; INDEX_LIMIT + 1],
    /// Leaves per depth of the table holding them.
    pub leaves_by_depth: [usize; DEPTH_LIMIT],
    /// Sparse tables.
    pub sparse_tables: usize,
    /// Fixed tables, root included.
    pub fixed_tables: usize,
    /// Empty slots across fixed tables.
    pub nil_slots: usize,
    /// Single-pair leaves.
    pub flat_leaves: usize,
    /// Multi-pair leaves.
    pub collision_leaves: usize,
    /// Pairs held by collision leaves.
    pub collision_entries: usize,
}

impl HamtStats {
    pub(crate) fn collect<K, V, P: SharedPointerKind>(root: &FixedTable<K, V, P>) -> Self {
        let mut stats = Self {
            entries: 0,
            max_depth: 0,
            tables_by_depth: [0; DEPTH_LIMIT],
            tables_by_occupancy: [0; INDEX_LIMIT + 1],
            leaves_by_depth: [0; DEPTH_LIMIT],
            sparse_tables: 0,
            fixed_tables: 0,
            nil_slots: 0,
            flat_leaves: 0,
            collision_leaves: 0,
            collision_entries: 0,
        };
        stats.visit(TableRef::Fixed(root));
        stats
    }

    fn visit<K, V, P: SharedPointerKind>(&mut self, table: TableRef<'_, K, V, P>) {
        let depth = table.depth();
        let len = table.len();
        self.tables_by_depth[depth] += 1;
        self.tables_by_occupancy[len] += 1;
        match table {
            TableRef::Sparse(_) => self.sparse_tables += 1,
            TableRef::Fixed(_) => {
                self.fixed_tables += 1;
                self.nil_slots += INDEX_LIMIT - len;
            }
        }
        for (_, node) in table.entries() {
            match node {
                Node::Leaf(leaf) => {
                    let pairs = leaf.len();
                    self.entries += pairs;
                    self.leaves_by_depth[depth] += 1;
                    self.max_depth = self.max_depth.max(depth);
                    if pairs > 1 {
                        self.collision_leaves += 1;
                        self.collision_entries += pairs;
                    } else {
                        self.flat_leaves += 1;
                    }
                }
                Node::Table(child) => self.visit(child.view()),
            }
        }
    }

    /// Total tables, root included.
    #[must_use]
    pub const fn tables(&self) -> usize {
        self.sparse_tables + self.fixed_tables
    }

    /// Total leaves.
    #[must_use]
    pub const fn leaves(&self) -> usize {
        self.flat_leaves + self.collision_leaves
    }
}

impl fmt::Display for HamtStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "entries:          {}", self.entries)?;
        writeln!(f, "max depth:        {}", self.max_depth)?;
        writeln!(
            f,
            "tables:           {} ({} sparse, {} fixed, {} nil slots)",
            self.tables(),
            self.sparse_tables,
            self.fixed_tables,
            self.nil_slots
        )?;
        writeln!(
            f,
            "leaves:           {} ({} flat, {} collision holding {} entries)",
            self.leaves(),
            self.flat_leaves,
            self.collision_leaves,
            self.collision_entries
        )?;
        writeln!(f, "by depth:         tables / leaves")?;
        for depth in 0..=self.max_depth.min(DEPTH_LIMIT - 1) {
            writeln!(
                f,
                "  {depth:>2}: {:>8} / {:<8}",
                self.tables_by_depth[depth], self.leaves_by_depth[depth]
            )?;
        }
        writeln!(f, "by occupancy:     tables")?;
        for (occupancy, &tables) in self.tables_by_occupancy.iter().enumerate() {
            if tables > 0 {
                writeln!(f, "  {occupancy:>2}: {tables:>8}")?;
            }
        }
        Ok(())
    }
}

/// Counts the pairs reachable from `root` by walking every leaf.
pub(crate) fn count_entries<K, V, P: SharedPointerKind>(root: &FixedTable<K, V, P>) -> usize {
    fn walk<K, V, P: SharedPointerKind>(table: TableRef<'_, K, V, P>) -> usize {
        table
            .entries()
            .map(|(_, node)| match node {
                Node::Leaf(leaf) => leaf.len(),
                Node::Table(child) => walk(child.view()),
            })
            .sum()
    }
    walk(TableRef::Fixed(root))
}
