//! Chain nodes and the arena that owns them.

use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Stable arena address of a chain node. Survives resizes.
    pub(crate) struct NodeKey;
}

pub(crate) type NodeArena<K, V> = SlotMap<NodeKey, Node<K, V>>;

/// One link of a bucket chain.
#[derive(Debug)]
pub(crate) struct Node<K, V> {
    /// Folded key hash, computed once on insertion and never re-derived.
    pub(crate) hash: u32,
    /// `None` is the null key.
    pub(crate) key: Option<K>,
    pub(crate) value: V,
    pub(crate) next: Option<NodeKey>,
}

impl<K, V> Node<K, V> {
    pub(crate) fn new(hash: u32, key: Option<K>, value: V) -> Self {
        Self {
            hash,
            key,
            value,
            next: None,
        }
    }
}

/// Borrowed key-value pair yielded by [`Entries`](crate::Entries).
#[derive(Debug)]
pub struct Entry<'a, K, V> {
    key: Option<&'a K>,
    value: &'a V,
}

impl<'a, K, V> Entry<'a, K, V> {
    pub(crate) fn from_node(node: &'a Node<K, V>) -> Self {
        Self {
            key: node.key.as_ref(),
            value: &node.value,
        }
    }

    /// The entry's key; `None` for the null key.
    pub fn key(&self) -> Option<&'a K> {
        self.key
    }

    pub fn value(&self) -> &'a V {
        self.value
    }
}

impl<K, V> Clone for Entry<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Entry<'_, K, V> {}
