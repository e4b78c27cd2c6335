//! Bucket array: chain heads indexed by masked hash, and the doubling resize.

use crate::node::{NodeArena, NodeKey};

/// Bucket count of a freshly constructed map and the floor for any requested
/// capacity.
pub const DEFAULT_CAPACITY: usize = 16;

/// Growth is triggered once `len > capacity * LOAD_FACTOR`.
pub const LOAD_FACTOR: f64 = 0.75;

/// Maps a hash to a bucket. `capacity` must be a power of two.
#[inline]
pub(crate) fn index_of(hash: u32, capacity: usize) -> usize {
    debug_assert!(capacity.is_power_of_two());
    (hash as usize) & (capacity - 1)
}

#[derive(Debug)]
pub(crate) struct Buckets {
    heads: Vec<Option<NodeKey>>,
}

impl Buckets {
    /// Allocates at least `capacity` empty buckets, rounded up to a power of
    /// two and never fewer than [`DEFAULT_CAPACITY`].
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(DEFAULT_CAPACITY).next_power_of_two();
        Self {
            heads: vec![None; capacity],
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.heads.len()
    }

    #[inline]
    pub(crate) fn slot_for(&self, hash: u32) -> usize {
        index_of(hash, self.heads.len())
    }

    #[inline]
    pub(crate) fn head(&self, index: usize) -> Option<NodeKey> {
        self.heads[index]
    }

    #[inline]
    pub(crate) fn set_head(&mut self, index: usize, head: Option<NodeKey>) {
        self.heads[index] = head;
    }

    pub(crate) fn heads(&self) -> &[Option<NodeKey>] {
        &self.heads
    }

    /// True when `len` pairs exceed the load threshold for the current array.
    #[inline]
    pub(crate) fn over_threshold(&self, len: usize) -> bool {
        len as f64 > self.heads.len() as f64 * LOAD_FACTOR
    }

    /// Doubles the bucket array and rehomes every node by its cached hash.
    ///
    /// Nodes are relinked in place in the arena; each is pushed onto the front
    /// of its new chain, so nodes that land in the same bucket come out in
    /// reverse of their old relative order.
    pub(crate) fn grow<K, V>(&mut self, nodes: &mut NodeArena<K, V>) {
        let new_capacity = self.heads.len() * 2;
        let old = std::mem::replace(&mut self.heads, vec![None; new_capacity]);
        for head in old {
            let mut cursor = head;
            while let Some(key) = cursor {
                let node = &mut nodes[key];
                cursor = node.next;
                let index = index_of(node.hash, new_capacity);
                node.next = self.heads[index];
                self.heads[index] = Some(key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use slotmap::SlotMap;

    /// Invariant: masking keeps only the low bits and stays within capacity.
    #[test]
    fn index_masks_low_bits() {
        assert_eq!(index_of(0, 16), 0);
        assert_eq!(index_of(17, 16), 1);
        assert_eq!(index_of(u32::MAX, 16), 15);
        assert_eq!(index_of(u32::MAX, 32), 31);
    }

    /// Invariant: requested capacities round up to a power of two >= 16.
    #[test]
    fn capacity_is_rounded() {
        assert_eq!(Buckets::with_capacity(0).capacity(), 16);
        assert_eq!(Buckets::with_capacity(16).capacity(), 16);
        assert_eq!(Buckets::with_capacity(17).capacity(), 32);
        assert_eq!(Buckets::with_capacity(100).capacity(), 128);
    }

    /// Invariant: the threshold is strict; 12 of 16 is fine, 13 is not.
    #[test]
    fn threshold_at_three_quarters() {
        let b = Buckets::with_capacity(16);
        assert!(!b.over_threshold(12));
        assert!(b.over_threshold(13));
    }

    /// Invariant: growth keeps arena keys, moves each node to the bucket its
    /// cached hash selects, and reverses relative order within a chain.
    #[test]
    fn grow_relinks_by_cached_hash() {
        let mut nodes: NodeArena<u32, ()> = SlotMap::with_key();
        let mut b = Buckets::with_capacity(16);

        // 1 and 17 share bucket 1 at capacity 16 and split at 32; 33 follows 1.
        let mut tail: Option<NodeKey> = None;
        let mut keys = Vec::new();
        for h in [1u32, 17, 33] {
            let k = nodes.insert(Node::new(h, Some(h), ()));
            match tail {
                None => b.set_head(1, Some(k)),
                Some(t) => nodes[t].next = Some(k),
            }
            tail = Some(k);
            keys.push(k);
        }

        b.grow(&mut nodes);
        assert_eq!(b.capacity(), 32);
        assert_eq!(nodes.len(), 3);

        // Bucket 1 now holds 33 then 1 (prepended), bucket 17 holds 17.
        let h1 = b.head(1).expect("bucket 1");
        assert_eq!(h1, keys[2]);
        assert_eq!(nodes[h1].next, Some(keys[0]));
        assert_eq!(nodes[keys[0]].next, None);
        assert_eq!(b.head(17), Some(keys[1]));
        assert_eq!(nodes[keys[1]].next, None);
    }
}
