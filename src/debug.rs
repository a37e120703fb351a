//! Diagnostic dump and structural invariant checker.

use std::fmt::{self, Write};

use archery::SharedPointerKind;

use crate::config::{DOWNGRADE_THRESHOLD, TableOption, UPGRADE_THRESHOLD};
use crate::error::InvariantViolation;
use crate::hash::HashValue;
use crate::leaf::Leaf;
use crate::node::Node;
use crate::table::{FixedTable, TableRef};

/// Renders the table tree below `root`, one node per line.
pub fn tree_string<K, V, P>(root: &FixedTable<K, V, P>) -> String
where
    K: fmt::Debug,
    P: SharedPointerKind,
{
    let mut out = String::new();
    let _ = write_table(&mut out, TableRef::Fixed(root), "", 0);
    out
}

fn write_table<K, V, P>(out: &mut String, table: TableRef<'_, K, V, P>, label: &str, indent: usize) -> fmt::Result
where
    K: fmt::Debug,
    P: SharedPointerKind,
{
    let depth = table.depth();
    writeln!(
        out,
        "{:indent$}{label}{} depth={depth} path={} entries={}",
        "",
        table.kind(),
        table.hash_path().path_string(depth),
        table.len(),
    )?;
    for (idx, node) in table.entries() {
        let label = format!("[{idx:02x}] ");
        match node {
            Node::Leaf(leaf) => {
                write!(out, "{:width$}{label}{} hash={} keys=[", "", leaf.kind(), leaf.hash(), width = indent + 2)?;
                for (i, (key, _)) in leaf.pairs().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    write!(out, "{key:?}")?;
                }
                out.push_str("]\n");
            }
            Node::Table(child) => write_table(out, child.view(), &label, indent + 2)?,
        }
    }
    Ok(())
}

/// Checks every structural invariant of the trie below `root`.
pub fn validate<K, V, P>(root: &FixedTable<K, V, P>, len: usize, options: TableOption) -> Result<(), InvariantViolation>
where
    K: Eq,
    P: SharedPointerKind,
{
    let root = TableRef::Fixed(root);
    if root.depth() != 0 {
        return Err(InvariantViolation::DepthMismatch {
            expected: 0,
            found: root.depth(),
        });
    }
    if root.hash_path() != HashValue::default() {
        return Err(InvariantViolation::HashPathMismatch {
            depth: 0,
            expected: HashValue::default(),
            found: root.hash_path(),
        });
    }
    let actual = check_table(root, options, true)?;
    if actual != len {
        return Err(InvariantViolation::CountMismatch { recorded: len, actual });
    }
    Ok(())
}

fn check_table<K, V, P>(table: TableRef<'_, K, V, P>, options: TableOption, is_root: bool) -> Result<usize, InvariantViolation>
where
    K: Eq,
    P: SharedPointerKind,
{
    let depth = table.depth();
    let path = table.hash_path();
    let (recorded, actual) = match table {
        TableRef::Sparse(t) => (t.bitmap().len(), t.nodes().len()),
        TableRef::Fixed(t) => (table.len(), t.slots().iter().filter(|s| s.is_some()).count()),
    };
    if recorded != actual {
        return Err(InvariantViolation::OccupancyMismatch { depth, recorded, actual });
    }
    if !is_root {
        if actual == 0 {
            return Err(InvariantViolation::EmptyTable { depth });
        }
        check_representation(table, options)?;
    }

    let mut entries = 0;
    for (idx, node) in table.entries() {
        match node {
            Node::Leaf(leaf) => {
                let hash = leaf.hash();
                if hash.index(depth) != idx || hash.hash_path(depth) != path {
                    return Err(InvariantViolation::MisplacedLeaf { depth, idx, hash });
                }
                if let Leaf::Collision(coll) = leaf {
                    let pairs = coll.pairs();
                    if pairs.len() < 2 {
                        return Err(InvariantViolation::SingletonCollision { depth, len: pairs.len() });
                    }
                    for (i, (key, _)) in pairs.iter().enumerate() {
                        if pairs[i + 1..].iter().any(|(other, _)| other == key) {
                            return Err(InvariantViolation::DuplicateKey { depth });
                        }
                    }
                }
                entries += leaf.len();
            }
            Node::Table(child) => {
                let child = child.view();
                if child.depth() != depth + 1 {
                    return Err(InvariantViolation::DepthMismatch {
                        expected: depth + 1,
                        found: child.depth(),
                    });
                }
                let expected = path.with_index(depth, idx);
                if child.hash_path() != expected {
                    return Err(InvariantViolation::HashPathMismatch {
                        depth: depth + 1,
                        expected,
                        found: child.hash_path(),
                    });
                }
                entries += check_table(child, options, false)?;
            }
        }
    }
    Ok(entries)
}

fn check_representation<K, V, P>(table: TableRef<'_, K, V, P>, options: TableOption) -> Result<(), InvariantViolation>
where
    P: SharedPointerKind,
{
    let occupancy = table.len();
    let allowed = match (options, table) {
        (TableOption::Hybrid, TableRef::Sparse(_)) => occupancy < UPGRADE_THRESHOLD,
        (TableOption::Hybrid, TableRef::Fixed(_)) => occupancy > DOWNGRADE_THRESHOLD,
        (TableOption::FixedOnly, TableRef::Fixed(_)) | (TableOption::SparseOnly, TableRef::Sparse(_)) => true,
        (TableOption::FixedOnly, TableRef::Sparse(_)) | (TableOption::SparseOnly, TableRef::Fixed(_)) => false,
    };
    if allowed {
        Ok(())
    } else {
        Err(InvariantViolation::Representation {
            kind: table.kind(),
            depth: table.depth(),
            occupancy,
            option: options,
        })
    }
}
