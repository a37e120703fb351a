//! Iterator types for HAMT maps and sets.
//!
//! Traversal keeps an explicit stack of [`TableCursor`]s, one per open
//! table level, so it never recurses and can be suspended between any two
//! items. The stack is bounded by [`DEPTH_LIMIT`].

use std::iter::FusedIterator;

use archery::SharedPointerKind;

use crate::config::DEPTH_LIMIT;
use crate::leaf::LeafPairs;
use crate::node::Node;
use crate::table::{FixedTable, TableCursor, TableRef};

/// Iterator over `(&K, &V)` pairs of one map version.
///
/// Visits every entry exactly once, in slot order. The order is a property
/// of the hashes, not of insertion, and is not guaranteed to be stable
/// across hashers.
pub struct Iter<'a, K, V, P: SharedPointerKind> {
    stack: Vec<TableCursor<'a, K, V, P>>,
    leaf: LeafPairs<'a, K, V>,
    remaining: usize,
}

impl<'a, K, V, P: SharedPointerKind> Iter<'a, K, V, P> {
    pub(crate) fn new(root: &'a FixedTable<K, V, P>, len: usize) -> Self {
        let mut stack = Vec::with_capacity(DEPTH_LIMIT);
        stack.push(TableRef::Fixed(root).entries());
        Self {
            stack,
            leaf: LeafPairs::Empty,
            remaining: len,
        }
    }
}

impl<K, V, P: SharedPointerKind> Clone for Iter<'_, K, V, P> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
            leaf: self.leaf.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V, P: SharedPointerKind> Iterator for Iter<'a, K, V, P> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(pair) = self.leaf.next() {
                self.remaining = self.remaining.saturating_sub(1);
                return Some(pair);
            }
            let next = self.stack.last_mut()?.next();
            match next {
                Some((_, Node::Leaf(leaf))) => self.leaf = LeafPairs::new(leaf),
                Some((_, Node::Table(table))) => self.stack.push(table.view().entries()),
                None => {
                    self.stack.pop();
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, P: SharedPointerKind> ExactSizeIterator for Iter<'_, K, V, P> {}

impl<K, V, P: SharedPointerKind> FusedIterator for Iter<'_, K, V, P> {}

/// Iterator over the keys of one map version.
pub struct Keys<'a, K, V, P: SharedPointerKind> {
    pub(crate) inner: Iter<'a, K, V, P>,
}

impl<'a, K, V, P: SharedPointerKind> Iterator for Keys<'a, K, V, P> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, P: SharedPointerKind> ExactSizeIterator for Keys<'_, K, V, P> {}

impl<K, V, P: SharedPointerKind> FusedIterator for Keys<'_, K, V, P> {}

/// Iterator over the values of one map version.
pub struct Values<'a, K, V, P: SharedPointerKind> {
    pub(crate) inner: Iter<'a, K, V, P>,
}

impl<'a, K, V, P: SharedPointerKind> Iterator for Values<'a, K, V, P> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, P: SharedPointerKind> ExactSizeIterator for Values<'_, K, V, P> {}

impl<K, V, P: SharedPointerKind> FusedIterator for Values<'_, K, V, P> {}
