#![cfg(test)]

// Property tests for Dictionary kept inside the crate so they can check
// internal bookkeeping alongside the public behavior.

use crate::comparer::KeyComparer;
use crate::dictionary::Dictionary;
use crate::error::DictError;
use proptest::prelude::*;
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hasher};
use std::string::String;
use std::vec::Vec;

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    TryInsert(usize, i32),
    Upsert(usize, i32),
    Remove(usize),
    Get(usize),
    Contains(String),
    ContainsValue(i32),
    Mutate(usize, i32),
    Clear,
    Iterate,
    Walk,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=12).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), -8i32..8).prop_map(|(i, v)| OpI::TryInsert(i, v)),
            3 => (idx.clone(), -8i32..8).prop_map(|(i, v)| OpI::Upsert(i, v)),
            3 => idx.clone().prop_map(OpI::Remove),
            2 => idx.clone().prop_map(OpI::Get),
            1 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            1 => (-8i32..8).prop_map(OpI::ContainsValue),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Clear),
            1 => Just(OpI::Iterate),
            1 => Just(OpI::Walk),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Reference model: a std HashMap for contents plus a slot list with a LIFO
// free stack, which predicts enumeration order.
#[derive(Default)]
struct Model {
    map: HashMap<Key, i32>,
    slots: Vec<Option<Key>>,
    free: Vec<usize>,
}

impl Model {
    fn insert_new(&mut self, k: Key, v: i32) {
        match self.free.pop() {
            Some(i) => self.slots[i] = Some(k.clone()),
            None => self.slots.push(Some(k.clone())),
        }
        self.map.insert(k, v);
    }

    fn remove(&mut self, k: &Key) -> Option<i32> {
        let v = self.map.remove(k)?;
        let i = self
            .slots
            .iter()
            .position(|s| s.as_ref() == Some(k))
            .expect("model slot for live key");
        self.slots[i] = None;
        self.free.push(i);
        Some(v)
    }

    fn clear(&mut self) {
        self.map.clear();
        self.slots.clear();
        self.free.clear();
    }

    fn order(&self) -> Vec<Key> {
        self.slots.iter().flatten().cloned().collect()
    }
}

fn run_state_machine<S>(
    mut sut: Dictionary<Key, i32, S>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError>
where
    S: KeyComparer<Key> + KeyComparer<str>,
{
    let mut model = Model::default();

    for op in ops {
        let before = sut.version();
        let mut mutated = false;
        match op {
            OpI::TryInsert(i, v) => {
                let k = key_from(pool, i);
                let already = model.map.contains_key(&k);
                match sut.try_insert(k.clone(), v) {
                    Ok(()) => {
                        prop_assert!(!already, "insert-if-absent must fail on duplicate");
                        model.insert_new(k, v);
                        mutated = true;
                    }
                    Err(e) => {
                        prop_assert_eq!(e, DictError::DuplicateKey);
                        prop_assert!(already, "duplicate error only when key exists");
                        prop_assert_eq!(sut.get(&k), model.map.get(&k));
                    }
                }
            }
            OpI::Upsert(i, v) => {
                let k = key_from(pool, i);
                let prev = sut.insert(k.clone(), v);
                match model.map.get_mut(&k) {
                    Some(mv) => {
                        prop_assert_eq!(prev, Some(*mv));
                        *mv = v;
                    }
                    None => {
                        prop_assert_eq!(prev, None);
                        model.insert_new(k, v);
                    }
                }
                mutated = true;
            }
            OpI::Remove(i) => {
                let k = key_from(pool, i);
                let removed = sut.remove_entry(&k);
                match model.remove(&k) {
                    Some(mv) => {
                        prop_assert_eq!(removed, Some((k, mv)));
                        mutated = true;
                    }
                    None => prop_assert!(removed.is_none()),
                }
            }
            OpI::Get(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.get(&k), model.map.get(&k));
                prop_assert_eq!(sut.get(k.0.as_str()), model.map.get(&k));
            }
            OpI::Contains(s) => {
                let has_model = model.map.keys().any(|k| k.0 == s);
                prop_assert_eq!(sut.contains_key(s.as_str()), has_model);
            }
            OpI::ContainsValue(v) => {
                let has_model = model.map.values().any(|&mv| mv == v);
                prop_assert_eq!(sut.contains_value(&v), has_model);
            }
            OpI::Mutate(i, d) => {
                let k = key_from(pool, i);
                if let Some(vr) = sut.get_mut(&k) {
                    *vr = vr.wrapping_add(d);
                    let mv = model.map.get_mut(&k).expect("present in model");
                    *mv = mv.wrapping_add(d);
                    mutated = true;
                } else {
                    prop_assert!(!model.map.contains_key(&k));
                }
            }
            OpI::Clear => {
                let had_slots = !model.slots.is_empty();
                sut.clear();
                model.clear();
                mutated = had_slots;
            }
            OpI::Iterate => {
                let keys: Vec<Key> = sut.keys().iter().cloned().collect();
                prop_assert_eq!(keys, model.order());
                for (k, v) in &sut {
                    prop_assert_eq!(model.map.get(k), Some(v));
                }
            }
            OpI::Walk => {
                let mut cursor = sut.cursor();
                let mut seen = Vec::new();
                while cursor.advance(&sut)? {
                    let (k, v) = cursor.current(&sut)?;
                    prop_assert_eq!(model.map.get(k), Some(v));
                    seen.push(k.clone());
                }
                prop_assert_eq!(seen, model.order());
                prop_assert_eq!(cursor.current(&sut), Err(DictError::InvalidCursorState));
            }
        }

        // Post-conditions after each op
        // 1) Version moves exactly on successful mutation
        prop_assert_eq!(sut.version() != before, mutated);
        // 2) Size parity
        prop_assert_eq!(sut.len(), model.map.len());
        prop_assert_eq!(sut.is_empty(), model.map.is_empty());
        // 3) Capacity is zero or prime, and never below the high-water mark
        let cap = sut.capacity();
        prop_assert!(cap == 0 || crate::primes::is_prime(cap));
        prop_assert!(cap >= model.slots.len());
    }
    Ok(())
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - Insert-if-absent rejects duplicates without touching the stored value.
// - Upsert returns the previous value and overwrites in place.
// - `remove_entry` returns the owned pair and frees its slot for reuse.
// - Enumeration (iterators and cursors) follows slot order with LIFO slot reuse.
// - The version changes exactly on mutating calls, value writes included.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_state_machine(Dictionary::new(), &pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress equality resolution.
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

// Property: Same state-machine invariants as above, under worst-case
// collision behavior (constant hasher). Every key shares one chain, which
// stresses chain splicing on removal.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_state_machine(Dictionary::with_comparer(ConstBuildHasher), &pool, ops)?;
    }
}

// Property: a pre-sized table never grows while its entry count stays
// within the hint, and its keys survive every later growth step.
proptest! {
    #[test]
    fn prop_capacity_hint_holds(hint in 0usize..200, extra in 0usize..400) {
        let mut d: Dictionary<usize, usize> = Dictionary::with_capacity(hint);
        let initial = d.capacity();
        prop_assert!(initial >= hint);
        for i in 0..hint {
            d.insert(i, i);
        }
        prop_assert_eq!(d.capacity(), initial);
        for i in hint..hint + extra {
            d.insert(i, i);
        }
        for i in 0..hint + extra {
            prop_assert_eq!(d.get(&i), Some(&i));
        }
    }
}
