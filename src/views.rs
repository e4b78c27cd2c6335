//! Lazy traversal views over the live bucket array.
//!
//! Every view is a cursor: the index of the next bucket to scan plus the
//! current chain node. Nothing is snapshotted. Buckets are visited in
//! ascending order and each chain front to back. Because a view borrows the
//! map, the map cannot be mutated while a view is alive.
//!
//! Besides `Iterator`, each view offers `has_next`/`try_next`. `try_next`
//! reports a drained view as `Err(Exhausted)` rather than `None`.

use crate::error::Exhausted;
use crate::node::{Entry, Node, NodeArena, NodeKey};
use core::iter::FusedIterator;

struct Cursor<'a, K, V> {
    heads: &'a [Option<NodeKey>],
    nodes: &'a NodeArena<K, V>,
    bucket: usize,
    current: Option<NodeKey>,
    remaining: usize,
}

impl<'a, K, V> Cursor<'a, K, V> {
    fn new(heads: &'a [Option<NodeKey>], nodes: &'a NodeArena<K, V>) -> Self {
        Self {
            heads,
            nodes,
            bucket: 0,
            current: None,
            remaining: nodes.len(),
        }
    }

    #[inline]
    fn has_next(&self) -> bool {
        self.remaining > 0
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }

    fn advance(&mut self) -> Result<&'a Node<K, V>, Exhausted> {
        while self.current.is_none() && self.bucket < self.heads.len() {
            self.current = self.heads[self.bucket];
            self.bucket += 1;
        }
        let key = self.current.ok_or(Exhausted)?;
        let nodes = self.nodes;
        let node = &nodes[key];
        self.current = node.next;
        self.remaining -= 1;
        Ok(node)
    }
}

impl<K, V> Clone for Cursor<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            heads: self.heads,
            nodes: self.nodes,
            bucket: self.bucket,
            current: self.current,
            remaining: self.remaining,
        }
    }
}

/// View over keys; the null key appears as `None`.
pub struct Keys<'a, K, V> {
    cursor: Cursor<'a, K, V>,
}

/// View over values.
pub struct Values<'a, K, V> {
    cursor: Cursor<'a, K, V>,
}

/// View over key-value pairs.
pub struct Entries<'a, K, V> {
    cursor: Cursor<'a, K, V>,
}

impl<'a, K, V> Keys<'a, K, V> {
    pub(crate) fn new(heads: &'a [Option<NodeKey>], nodes: &'a NodeArena<K, V>) -> Self {
        Self {
            cursor: Cursor::new(heads, nodes),
        }
    }

    /// Whether another key remains.
    #[inline]
    pub fn has_next(&self) -> bool {
        self.cursor.has_next()
    }

    /// The next key, or `Err(Exhausted)` once the view is drained.
    pub fn try_next(&mut self) -> Result<Option<&'a K>, Exhausted> {
        self.cursor.advance().map(|node| node.key.as_ref())
    }
}

impl<'a, K, V> Values<'a, K, V> {
    pub(crate) fn new(heads: &'a [Option<NodeKey>], nodes: &'a NodeArena<K, V>) -> Self {
        Self {
            cursor: Cursor::new(heads, nodes),
        }
    }

    #[inline]
    pub fn has_next(&self) -> bool {
        self.cursor.has_next()
    }

    /// The next value, or `Err(Exhausted)` once the view is drained.
    pub fn try_next(&mut self) -> Result<&'a V, Exhausted> {
        self.cursor.advance().map(|node| &node.value)
    }
}

impl<'a, K, V> Entries<'a, K, V> {
    pub(crate) fn new(heads: &'a [Option<NodeKey>], nodes: &'a NodeArena<K, V>) -> Self {
        Self {
            cursor: Cursor::new(heads, nodes),
        }
    }

    #[inline]
    pub fn has_next(&self) -> bool {
        self.cursor.has_next()
    }

    /// The next pair, or `Err(Exhausted)` once the view is drained.
    pub fn try_next(&mut self) -> Result<Entry<'a, K, V>, Exhausted> {
        self.cursor.advance().map(Entry::from_node)
    }
}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            cursor: self.cursor.clone(),
        }
    }
}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            cursor: self.cursor.clone(),
        }
    }
}

impl<K, V> Clone for Entries<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            cursor: self.cursor.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = Option<&'a K>;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.try_next().ok()
    }
    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.cursor.size_hint()
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.try_next().ok()
    }
    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.cursor.size_hint()
    }
}

impl<'a, K, V> Iterator for Entries<'a, K, V> {
    type Item = Entry<'a, K, V>;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.try_next().ok()
    }
    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.cursor.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}
impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
impl<K, V> ExactSizeIterator for Entries<'_, K, V> {}
impl<K, V> FusedIterator for Keys<'_, K, V> {}
impl<K, V> FusedIterator for Values<'_, K, V> {}
impl<K, V> FusedIterator for Entries<'_, K, V> {}
