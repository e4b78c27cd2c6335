//! ChainHashMap: separate chaining over a power-of-two bucket array, with
//! chain nodes stored in a slot arena.

use crate::buckets::{Buckets, DEFAULT_CAPACITY};
use crate::node::{Entry, Node, NodeArena, NodeKey};
use crate::views::{Entries, Keys, Values};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use slotmap::SlotMap;

/// Deterministic default hasher. No per-instance seed.
pub type DefaultHashBuilder = foldhash::fast::FixedState;

pub struct ChainHashMap<K, V, S = DefaultHashBuilder> {
    hasher: S,
    buckets: Buckets,
    nodes: NodeArena<K, V>, // chain nodes, addressed from bucket heads and `next` links
}

/// Whether `node` holds `key`. The cached hash is compared first; it only
/// rejects, equality always decides.
#[inline]
fn matches<K, V, Q>(node: &Node<K, V>, hash: u32, key: Option<&Q>) -> bool
where
    K: Borrow<Q>,
    Q: ?Sized + Eq,
{
    if node.hash != hash {
        return false;
    }
    match (node.key.as_ref(), key) {
        (None, None) => true,
        (Some(k), Some(q)) => <K as Borrow<Q>>::borrow(k) == q,
        _ => false,
    }
}

impl<K, V> ChainHashMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, Default::default())
    }
}

impl<K, V> Default for ChainHashMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> ChainHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, hasher)
    }

    /// Starts with at least `capacity` buckets (a power of two, minimum 16).
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            hasher,
            buckets: Buckets::with_capacity(capacity),
            nodes: SlotMap::with_key(),
        }
    }

    /// The null key hashes to 0; other keys fold the 64-bit hash to 32 bits.
    fn make_hash<Q>(&self, key: Option<&Q>) -> u32
    where
        Q: ?Sized + Hash,
    {
        match key {
            None => 0,
            Some(q) => {
                let h = self.hasher.hash_one(q);
                (h ^ (h >> 32)) as u32
            }
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of buckets. Only ever grows.
    pub fn capacity(&self) -> usize {
        self.buckets.capacity()
    }

    fn find<Q>(&self, key: Option<&Q>) -> Option<NodeKey>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(key);
        let mut cursor = self.buckets.head(self.buckets.slot_for(hash));
        while let Some(k) = cursor {
            let node = &self.nodes[k];
            if matches(node, hash, key) {
                return Some(k);
            }
            cursor = node.next;
        }
        None
    }

    /// Value stored under `key`; `None` is both the null key and "not present"
    /// in the result.
    pub fn get<Q>(&self, key: Option<&Q>) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let k = self.find(key)?;
        Some(&self.nodes[k].value)
    }

    pub fn get_mut<Q>(&mut self, key: Option<&Q>) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let k = self.find(key)?;
        Some(&mut self.nodes[k].value)
    }

    pub fn contains_key<Q>(&self, key: Option<&Q>) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find(key).is_some()
    }

    /// Associates `value` with `key` and returns the previous value, if any.
    ///
    /// Updating an existing key replaces its value in place and never grows
    /// the table. A new key is appended to the tail of its chain; afterwards,
    /// if `len` exceeds three quarters of the bucket count, the bucket array
    /// doubles.
    pub fn put(&mut self, key: Option<K>, value: V) -> Option<V> {
        let hash = self.make_hash(key.as_ref());
        let slot = self.buckets.slot_for(hash);

        match self.buckets.head(slot) {
            None => {
                let k = self.nodes.insert(Node::new(hash, key, value));
                self.buckets.set_head(slot, Some(k));
            }
            Some(head) => {
                let mut cur = head;
                loop {
                    let node = &mut self.nodes[cur];
                    if matches(node, hash, key.as_ref()) {
                        return Some(core::mem::replace(&mut node.value, value));
                    }
                    match node.next {
                        Some(next) => cur = next,
                        None => break,
                    }
                }
                let k = self.nodes.insert(Node::new(hash, key, value));
                self.nodes[cur].next = Some(k);
            }
        }

        if self.buckets.over_threshold(self.nodes.len()) {
            let old_capacity = self.buckets.capacity();
            self.buckets.grow(&mut self.nodes);
            tracing::debug!(
                old_capacity,
                new_capacity = self.buckets.capacity(),
                len = self.nodes.len(),
                "ChainHashMap: grew bucket array"
            );
        }
        None
    }

    /// Unlinks `key` and returns its value. Never shrinks the table.
    pub fn delete<Q>(&mut self, key: Option<&Q>) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(key);
        let slot = self.buckets.slot_for(hash);
        let head = self.buckets.head(slot)?;

        if matches(&self.nodes[head], hash, key) {
            let node = self.nodes.remove(head)?;
            self.buckets.set_head(slot, node.next);
            return Some(node.value);
        }

        let mut prev = head;
        while let Some(cur) = self.nodes[prev].next {
            if matches(&self.nodes[cur], hash, key) {
                let node = self.nodes.remove(cur)?;
                self.nodes[prev].next = node.next;
                return Some(node.value);
            }
            prev = cur;
        }
        None
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys::new(self.buckets.heads(), &self.nodes)
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.buckets.heads(), &self.nodes)
    }

    pub fn entries(&self) -> Entries<'_, K, V> {
        Entries::new(self.buckets.heads(), &self.nodes)
    }

    /// Panics if any structural invariant is broken. Test-only.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let capacity = self.buckets.capacity();
        assert!(capacity.is_power_of_two() && capacity >= DEFAULT_CAPACITY);
        assert!(
            !self.buckets.over_threshold(self.len()),
            "load ratio above threshold: {} / {}",
            self.len(),
            capacity
        );
        let mut linked = 0;
        for (slot, head) in self.buckets.heads().iter().enumerate() {
            let mut cursor = *head;
            while let Some(k) = cursor {
                let node = &self.nodes[k];
                assert_eq!(node.hash, self.make_hash(node.key.as_ref()));
                assert_eq!(self.buckets.slot_for(node.hash), slot);
                linked += 1;
                cursor = node.next;
            }
        }
        assert_eq!(linked, self.nodes.len(), "arena holds unlinked nodes");
    }
}

impl<K, V, S> fmt::Debug for ChainHashMap<K, V, S>
where
    K: fmt::Debug + Eq + Hash,
    V: fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for e in self.entries() {
            map.entry(&e.key(), e.value());
        }
        map.finish()
    }
}

impl<K, V, S> Extend<(Option<K>, V)> for ChainHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = (Option<K>, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(Option<K>, V)> for ChainHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<T: IntoIterator<Item = (Option<K>, V)>>(iter: T) -> Self {
        let mut m = Self::with_hasher(S::default());
        m.extend(iter);
        m
    }
}

impl<'a, K, V, S> IntoIterator for &'a ChainHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    type Item = Entry<'a, K, V>;
    type IntoIter = Entries<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Exhausted;
    use std::collections::BTreeSet;
    use std::hash::Hasher;

    #[derive(Clone, Default)]
    struct ConstBuildHasher;
    struct ConstHasher;
    impl BuildHasher for ConstBuildHasher {
        type Hasher = ConstHasher;
        fn build_hasher(&self) -> Self::Hasher {
            ConstHasher
        }
    }
    impl Hasher for ConstHasher {
        fn write(&mut self, _bytes: &[u8]) {}
        fn finish(&self) -> u64 {
            0
        } // every key lands in bucket 0
    }

    fn key(i: usize) -> Option<String> {
        Some(format!("key{i}"))
    }

    /// Invariant: a key never inserted is absent for get and delete.
    #[test]
    fn absent_key_reads_none() {
        let mut m: ChainHashMap<String, i32> = ChainHashMap::new();
        assert_eq!(m.get(Some("nope")), None);
        assert_eq!(m.delete(Some("nope")), None);
        assert_eq!(m.len(), 0);
        m.assert_invariants();
    }

    /// Invariant: put of a new key returns None; a second put returns the
    /// previous value, replaces it, and leaves len unchanged.
    #[test]
    fn put_then_update_returns_previous() {
        let mut m: ChainHashMap<String, i32> = ChainHashMap::new();
        assert_eq!(m.put(key(1), 10), None);
        assert_eq!(m.put(key(1), 20), Some(10));
        assert_eq!(m.get(Some("key1")), Some(&20));
        assert_eq!(m.len(), 1);
    }

    /// Invariant: updates never grow the table, even at the threshold.
    #[test]
    fn update_at_threshold_does_not_grow() {
        let mut m: ChainHashMap<String, i32> = ChainHashMap::new();
        for i in 0..12 {
            m.put(key(i), i as i32);
        }
        assert_eq!(m.capacity(), 16);
        for i in 0..12 {
            m.put(key(i), -1);
        }
        assert_eq!(m.capacity(), 16);
        assert_eq!(m.len(), 12);
    }

    /// Invariant: the 13th distinct key in a 16-bucket table doubles it and
    /// every key stays reachable.
    #[test]
    fn thirteenth_key_doubles_capacity() {
        let mut m: ChainHashMap<String, usize> = ChainHashMap::new();
        for i in 0..13 {
            m.put(key(i), i);
        }
        assert_eq!(m.capacity(), 32);
        for i in 0..13 {
            assert_eq!(m.get(key(i).as_deref()), Some(&i));
        }
        m.assert_invariants();
    }

    /// Invariant: the null key is an ordinary key for put/get/delete.
    #[test]
    fn null_key_round_trip() {
        let mut m: ChainHashMap<String, i32> = ChainHashMap::new();
        assert_eq!(m.put(None, 0), None);
        assert_eq!(m.put(None, 100), Some(0));
        assert_eq!(m.get(None::<&str>), Some(&100));
        assert_eq!(m.len(), 1);
        assert_eq!(m.delete(None::<&str>), Some(100));
        assert_eq!(m.get(None::<&str>), None);
        assert!(m.is_empty());
    }

    /// Invariant: under total collisions, deletes of head, middle, and tail
    /// unlink only the matching node.
    #[test]
    fn delete_from_every_chain_position() {
        let mut m: ChainHashMap<String, i32, ConstBuildHasher> =
            ChainHashMap::with_hasher(ConstBuildHasher);
        for i in 0..5 {
            m.put(key(i), i as i32);
        }
        // chain in bucket 0: key0 key1 key2 key3 key4
        assert_eq!(m.delete(Some("key0")), Some(0));
        assert_eq!(m.delete(Some("key2")), Some(2));
        assert_eq!(m.delete(Some("key4")), Some(4));
        assert_eq!(m.delete(Some("key9")), None);
        let left: Vec<_> = m.keys().map(|k| k.cloned()).collect();
        assert_eq!(left, vec![key(1), key(3)]);
        assert_eq!(m.len(), 2);
        m.assert_invariants();
    }

    /// Invariant: the null key and a key hashing to 0 share a chain without
    /// being confused.
    #[test]
    fn null_key_collides_but_stays_distinct() {
        let mut m: ChainHashMap<String, i32, ConstBuildHasher> =
            ChainHashMap::with_hasher(ConstBuildHasher);
        m.put(key(0), 1);
        m.put(None, 2);
        assert_eq!(m.get(Some("key0")), Some(&1));
        assert_eq!(m.get(None::<&str>), Some(&2));
        assert_eq!(m.delete(None::<&str>), Some(2));
        assert_eq!(m.get(Some("key0")), Some(&1));
    }

    /// Invariant: within-bucket order is insertion order until a resize, which
    /// reverses the relocated nodes; later inserts append after them.
    #[test]
    fn resize_reverses_chain_order() {
        let mut m: ChainHashMap<String, usize, ConstBuildHasher> =
            ChainHashMap::with_hasher(ConstBuildHasher);
        for i in 0..12 {
            m.put(key(i), i);
        }
        let before: Vec<_> = m.values().copied().collect();
        assert_eq!(before, (0..12).collect::<Vec<_>>());

        m.put(key(12), 12);
        assert_eq!(m.capacity(), 32);
        m.put(key(13), 13);
        let after: Vec<_> = m.values().copied().collect();
        let mut expected: Vec<_> = (0..13).rev().collect();
        expected.push(13);
        assert_eq!(after, expected);
    }

    /// Invariant: get_mut edits the stored value in place.
    #[test]
    fn get_mut_updates_in_place() {
        let mut m: ChainHashMap<String, i32> = ChainHashMap::new();
        m.put(key(7), 1);
        *m.get_mut(Some("key7")).unwrap() += 41;
        assert_eq!(m.get(Some("key7")), Some(&42));
        assert!(m.get_mut(Some("key8")).is_none());
    }

    /// Invariant: every view yields exactly len elements that agree with get.
    #[test]
    fn views_agree_with_lookup() {
        let mut m: ChainHashMap<String, usize> = ChainHashMap::new();
        for i in 0..100 {
            m.put(key(i), i);
        }
        m.put(None, 1000);
        assert_eq!(m.keys().len(), m.len());
        assert_eq!(m.values().count(), m.len());

        let mut seen = BTreeSet::new();
        for e in &m {
            let k = e.key().map(String::as_str);
            assert_eq!(m.get(k), Some(e.value()));
            assert!(seen.insert(e.key().cloned()));
        }
        assert_eq!(seen.len(), 101);
    }

    /// Invariant: a drained view signals Exhausted, not a default element.
    #[test]
    fn drained_keys_signal_exhausted() {
        let mut m: ChainHashMap<String, i32> = ChainHashMap::new();
        m.put(key(0), 0);
        let mut ks = m.keys();
        assert_eq!(ks.try_next(), Ok(Some(&"key0".to_string())));
        assert_eq!(ks.try_next(), Err(Exhausted));
    }

    /// Invariant: with_capacity rounds up and still starts empty.
    #[test]
    fn with_capacity_rounds_up() {
        let m: ChainHashMap<String, i32> = ChainHashMap::with_capacity(100);
        assert_eq!(m.capacity(), 128);
        assert!(m.is_empty());
        let small: ChainHashMap<String, i32> = ChainHashMap::with_capacity(1);
        assert_eq!(small.capacity(), 16);
    }

    /// Invariant: collecting and extending go through put, so later pairs win.
    #[test]
    fn from_iter_and_extend_use_put_semantics() {
        let mut m: ChainHashMap<&str, i32> =
            vec![(Some("a"), 1), (Some("b"), 2), (Some("a"), 3)]
                .into_iter()
                .collect();
        assert_eq!(m.len(), 2);
        assert_eq!(m.get(Some(&"a")), Some(&3));
        m.extend([(None, 0), (Some("b"), 5)]);
        assert_eq!(m.len(), 3);
        assert_eq!(m.get(Some(&"b")), Some(&5));
        assert!(m.contains_key(None::<&&str>));
    }

    /// Invariant: Debug renders as a map over all entries.
    #[test]
    fn debug_renders_entries() {
        let mut m: ChainHashMap<&str, i32> = ChainHashMap::new();
        m.put(Some("a"), 1);
        assert_eq!(format!("{:?}", m), r#"{Some("a"): 1}"#);
    }
}
