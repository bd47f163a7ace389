#![cfg(test)]

// Property tests for HashChain kept inside the crate so they can inspect
// chain layout through the arena-level iterators.

use crate::hash::{hash_key, WeightedSum};
use crate::hash_chain::HashChain;
use crate::MapConfig;
use proptest::prelude::*;
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::hash::{BuildHasher, Hasher};
use std::rc::Rc;

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Set(usize, i32),
    Get(usize),
    Contains(String),
    Mutate(usize, i32),
    Iterate,
    ToggleDestructor,
}

fn arb_scenario() -> impl Strategy<Value = (usize, Vec<String>, Vec<OpI>)> {
    (1usize..=5, proptest::collection::vec("[a-z]{0,5}", 1..=8)).prop_flat_map(|(buckets, pool)| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            3 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Set(i, v)),
            1 => idx.clone().prop_map(OpI::Get),
            1 => prop_oneof![contains_pool.prop_map(|s: String| s), "[a-z]{0,5}".prop_map(|s| s)]
                .prop_map(OpI::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Iterate),
            1 => Just(OpI::ToggleDestructor),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (buckets, pool.clone(), ops))
    })
}

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

// Runs one scenario against `std::collections::HashMap` as the model.
// Invariants exercised after every op:
// - `get`/`contains_key`/`len` parity with the model.
// - Chain layout: each bucket lists exactly the keys hashing to it, in
//   first-insertion order, with no duplicates.
// - Destructor sees exactly the values displaced while it was registered,
//   and at teardown exactly the values still stored.
fn check_scenario<S: BuildHasher + Clone>(
    hasher: S,
    buckets: usize,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let config = MapConfig::new().with_buckets(buckets);
    let mut sut: HashChain<i32, S> =
        HashChain::with_config_and_hasher(config, hasher.clone()).expect("valid config");
    let mut model: HashMap<String, i32> = HashMap::new();
    let mut order: Vec<Vec<String>> = vec![Vec::new(); buckets];

    let disposed = Rc::new(RefCell::new(Vec::new()));
    let mut expected_disposed: Vec<i32> = Vec::new();
    let mut armed = false;

    for op in ops {
        match op {
            OpI::Set(i, v) => {
                let k = &pool[i];
                let prev = model.insert(k.clone(), v);
                match prev {
                    Some(old) if armed => expected_disposed.push(old),
                    Some(_) => {}
                    None => {
                        let b = (hash_key(&hasher, k) % buckets as u64) as usize;
                        order[b].push(k.clone());
                    }
                }
                sut.set(k, v).expect("set");
            }
            OpI::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k), model.get(k));
            }
            OpI::Contains(s) => {
                prop_assert_eq!(sut.contains_key(&s), model.contains_key(&s));
            }
            OpI::Mutate(i, d) => {
                let k = &pool[i];
                match (sut.get_mut(k), model.get_mut(k)) {
                    (Some(sv), Some(mv)) => {
                        *sv = sv.wrapping_add(d);
                        *mv = mv.wrapping_add(d);
                    }
                    (None, None) => {}
                    _ => prop_assert!(false, "get_mut presence differs from model"),
                }
            }
            OpI::Iterate => {
                let s_keys: BTreeSet<String> = sut.iter().map(|(_, k, _)| k.to_string()).collect();
                let m_keys: BTreeSet<String> = model.keys().cloned().collect();
                prop_assert_eq!(s_keys, m_keys);
            }
            OpI::ToggleDestructor => {
                if armed {
                    sut.clear_destructor();
                } else {
                    let sink = disposed.clone();
                    sut.set_destructor(move |v| sink.borrow_mut().push(v));
                }
                armed = !armed;
            }
        }

        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        for (b, expected) in order.iter().enumerate() {
            let got: Vec<&str> = sut.chain(b).map(|(_, n)| n.key()).collect();
            prop_assert_eq!(&got, expected);
        }
        prop_assert_eq!(&*disposed.borrow(), &expected_disposed);
    }

    // Teardown hands over every remaining value when a destructor is armed.
    let before = disposed.borrow().len();
    if !armed {
        let sink = disposed.clone();
        sut.set_destructor(move |v| sink.borrow_mut().push(v));
    }
    sut.destroy();
    let mut at_teardown: Vec<i32> = disposed.borrow()[before..].to_vec();
    let mut remaining: Vec<i32> = model.values().copied().collect();
    at_teardown.sort_unstable();
    remaining.sort_unstable();
    prop_assert_eq!(at_teardown, remaining);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((buckets, pool, ops) in arb_scenario()) {
        check_scenario(WeightedSum, buckets, &pool, ops)?;
    }
}

// Same invariants under worst-case collisions: every key shares bucket 0.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((buckets, pool, ops) in arb_scenario()) {
        check_scenario(ConstBuildHasher, buckets, &pool, ops)?;
    }
}

proptest! {
    // Property: bucket choice is pure and always in range.
    #[test]
    fn prop_bucket_of_is_stable(key in "\\PC{0,40}", buckets in 1usize..64) {
        let m: HashChain<()> = HashChain::with_config(MapConfig::new().with_buckets(buckets)).unwrap();
        let b = m.bucket_of(&key);
        prop_assert!(b < buckets);
        prop_assert_eq!(b, m.bucket_of(&key));
    }
}
