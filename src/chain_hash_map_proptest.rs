#![cfg(test)]

// Property tests for ChainHashMap kept inside the crate so they can check
// structural invariants through `assert_invariants`.

use crate::chain_hash_map::ChainHashMap;
use crate::error::Exhausted;
use hashbrown::HashMap;
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::hash::{BuildHasher, Hasher};

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length. `None` picks the null key.
#[derive(Clone, Debug)]
enum Op {
    Put(Option<usize>, i32),
    Get(Option<usize>),
    Delete(Option<usize>),
    Mutate(Option<usize>, i32),
    Iterate,
}

fn key_from(pool: &[String], i: Option<usize>) -> Option<String> {
    i.map(|i| pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=24).prop_flat_map(|pool| {
        let n = pool.len();
        let idx = move || proptest::option::weighted(0.9, 0..n);
        let op = prop_oneof![
            4 => (idx(), any::<i32>()).prop_map(|(i, v)| Op::Put(i, v)),
            2 => idx().prop_map(Op::Get),
            2 => idx().prop_map(Op::Delete),
            1 => (idx(), any::<i32>()).prop_map(|(i, d)| Op::Mutate(i, d)),
            1 => Just(Op::Iterate),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn run<S: BuildHasher>(
    mut sut: ChainHashMap<String, i32, S>,
    pool: Vec<String>,
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<Option<String>, i32> = HashMap::new();
    let mut last_capacity = sut.capacity();

    for op in ops {
        match op {
            Op::Put(i, v) => {
                let k = key_from(&pool, i);
                let was_new = !model.contains_key(&k);
                let prev = sut.put(k.clone(), v);
                prop_assert_eq!(prev, model.insert(k, v));
                if !was_new {
                    prop_assert_eq!(sut.capacity(), last_capacity, "update must not grow");
                }
            }
            Op::Get(i) => {
                let k = key_from(&pool, i);
                prop_assert_eq!(sut.get(k.as_deref()), model.get(&k));
                prop_assert_eq!(sut.contains_key(k.as_deref()), model.contains_key(&k));
            }
            Op::Delete(i) => {
                let k = key_from(&pool, i);
                let before = sut.capacity();
                prop_assert_eq!(sut.delete(k.as_deref()), model.remove(&k));
                prop_assert_eq!(sut.capacity(), before, "delete must not shrink");
            }
            Op::Mutate(i, d) => {
                let k = key_from(&pool, i);
                if let Some(v) = sut.get_mut(k.as_deref()) {
                    *v = v.saturating_add(d);
                    let mv = model.get_mut(&k).expect("present in model");
                    *mv = mv.saturating_add(d);
                } else {
                    prop_assert!(!model.contains_key(&k));
                }
            }
            Op::Iterate => {
                let mut keys = sut.keys();
                let mut seen = BTreeSet::new();
                while keys.has_next() {
                    let k = keys.try_next().expect("has_next promised an element");
                    prop_assert!(seen.insert(k.cloned()), "key yielded twice");
                }
                prop_assert_eq!(keys.try_next(), Err(Exhausted));
                let m_keys: BTreeSet<_> = model.keys().cloned().collect();
                prop_assert_eq!(seen, m_keys);

                prop_assert_eq!(sut.values().count(), model.len());
                for e in sut.entries() {
                    let k = e.key().cloned();
                    prop_assert_eq!(Some(e.value()), model.get(&k));
                }
            }
        }

        // Post-conditions after each op
        prop_assert!(sut.capacity() >= last_capacity);
        last_capacity = sut.capacity();
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        sut.assert_invariants();
    }
    Ok(())
}

// Property: state-machine equivalence against hashbrown::HashMap keyed by
// Option<String>. Exercised across random operation sequences:
// - put returns the previous value, get/contains_key/delete match the model.
// - Updates never grow and deletes never shrink the bucket array.
// - Views yield each live key exactly once, then report Exhausted.
// - Structural invariants hold after every step.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run(ChainHashMap::new(), pool, ops)?;
    }
}

// Constant hasher: every key, null included, shares bucket 0.
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
    }
}

// Property: same invariants as above under worst-case collisions. This
// stresses chain walking, unlinking at every position, and relocation of a
// single long chain during resize.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run(ChainHashMap::with_hasher(ConstBuildHasher), pool, ops)?;
    }
}

// Property: inserting n distinct keys leaves the smallest capacity that keeps
// the load ratio at or under 0.75, starting from 16.
proptest! {
    #[test]
    fn prop_capacity_tracks_distinct_keys(n in 0usize..600) {
        let mut m: ChainHashMap<String, usize> = ChainHashMap::new();
        for i in 0..n {
            m.put(Some(format!("key{i}")), i);
        }
        let mut expected = 16;
        while n * 4 > expected * 3 {
            expected *= 2;
        }
        prop_assert_eq!(m.capacity(), expected);
        for i in 0..n {
            let k = format!("key{i}");
            prop_assert_eq!(m.get(Some(k.as_str())), Some(&i));
        }
    }
}
