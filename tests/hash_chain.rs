// HashChain end-to-end suite.
//
// Each test documents what behavior is being verified. The core invariants
// exercised:
// - Lookup: distinct keys are independently retrievable, colliding or not.
// - Overwrite: one entry per key; the previous value goes to the destructor
//   exactly once, the new value never does.
// - Layout: chains list colliding keys head first in insertion order.
// - Teardown: every stored value reaches the destructor exactly once.
use hashchain::{HashChain, MapConfig, SetError};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

// Keys "a" (97) and "c" (99) share bucket 1 with two buckets; "b" (98) is
// alone in bucket 0.
const COLLIDING: (&str, &str) = ("a", "c");

// Test: basic insert and lookup on the reference sizing without a destructor.
// Verifies: both keys found; an unseen key is not.
#[test]
fn two_keys_round_trip() {
    let mut m: HashChain<i32> = HashChain::new();
    assert_eq!(m.bucket_count(), 2);
    m.set("a", 1).unwrap();
    m.set("b", 2).unwrap();
    assert_eq!(m.get("a"), Some(&1));
    assert_eq!(m.get("b"), Some(&2));
    assert_eq!(m.get("c"), None);
}

// Test: overwrite of the same key.
// Verifies: the latest value wins and only one chain entry carries the key.
#[test]
fn overwrite_same_key() {
    let mut m: HashChain<i32> = HashChain::new();
    m.set("a", 1).unwrap();
    m.set("a", 2).unwrap();
    assert_eq!(m.get("a"), Some(&2));
    let b = m.bucket_of("a");
    let hits = m.chain(b).filter(|(_, n)| n.key() == "a").count();
    assert_eq!(hits, 1);
    assert_eq!(m.len(), 1);
}

// Test: destructor on overwrite with boxed values.
// Verifies: the destructor has run exactly once, on the box holding 5,
// by the time the second `set` returns.
#[test]
fn overwrite_frees_previous_box() {
    let freed: Rc<RefCell<Vec<i32>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = freed.clone();
    let mut m: HashChain<Box<i32>> = HashChain::new();
    m.set_destructor(move |v: Box<i32>| sink.borrow_mut().push(*v));

    m.set("x", Box::new(5)).unwrap();
    assert!(freed.borrow().is_empty());
    m.set("x", Box::new(7)).unwrap();
    assert_eq!(*freed.borrow(), vec![5]);
    assert_eq!(m.get("x").map(|b| **b), Some(7));
}

// Test: two keys hashing to the same bucket.
// Verifies: both retrievable; chain traversal visits the head first, then
// the chained successor.
#[test]
fn colliding_keys_share_a_chain() {
    let (first, second) = COLLIDING;
    let mut m: HashChain<i32> = HashChain::new();
    assert_eq!(m.bucket_of(first), m.bucket_of(second));

    m.set(first, 10).unwrap();
    m.set(second, 20).unwrap();
    assert_eq!(m.get(first), Some(&10));
    assert_eq!(m.get(second), Some(&20));

    let chain: Vec<(&str, i32)> = m
        .chain(m.bucket_of(first))
        .map(|(_, n)| (n.key(), *n.value()))
        .collect();
    assert_eq!(chain, [(first, 10), (second, 20)]);

    let dump = m.dump().to_string();
    assert_eq!(dump, "1: a: 10\n  1: c: 20\n");
}

// Test: teardown with chains longer than one.
// Verifies: every value, including non-head entries, is passed to the
// destructor exactly once.
#[test]
fn destroy_frees_non_head_entries() {
    let calls = Rc::new(Cell::new(0usize));
    let sum = Rc::new(Cell::new(0i32));
    let (c, s) = (calls.clone(), sum.clone());

    let mut m: HashChain<Box<i32>> = HashChain::new();
    m.set_destructor(move |v: Box<i32>| {
        c.set(c.get() + 1);
        s.set(s.get() + *v);
    });
    for (i, k) in ["a", "b", "c", "d", "e", "f"].iter().enumerate() {
        m.set(k, Box::new(i as i32 + 1)).unwrap();
    }
    assert!(m.chain(0).count() > 1 && m.chain(1).count() > 1);

    m.destroy();
    assert_eq!(calls.get(), 6);
    assert_eq!(sum.get(), 1 + 2 + 3 + 4 + 5 + 6);
}

// Test: destructor call accounting across overwrites and teardown.
// Verifies: calls == overwrites + entries alive at teardown.
#[test]
fn destructor_calls_match_overwrites_plus_live_entries() {
    let calls = Rc::new(Cell::new(0usize));
    let c = calls.clone();
    let mut m: HashChain<u32> = HashChain::with_config(MapConfig::new().with_buckets(3)).unwrap();
    m.set_destructor(move |_| c.set(c.get() + 1));

    let mut overwrites = 0;
    for round in 0..4u32 {
        for k in ["alpha", "beta", "gamma", "delta"] {
            if m.contains_key(k) {
                overwrites += 1;
            }
            m.set(k, round).unwrap();
        }
    }
    assert_eq!(calls.get(), overwrites);
    let live = m.len();
    drop(m);
    assert_eq!(calls.get(), overwrites + live);
}

// Test: chained `set` calls through the returned map reference.
#[test]
fn set_chains_and_propagates_errors() -> Result<(), SetError> {
    let mut m: HashChain<&'static str> = HashChain::new();
    m.set("one", "1")?.set("two", "2")?.set("one", "uno")?;
    assert_eq!(m.get("one"), Some(&"uno"));
    assert_eq!(m.get("two"), Some(&"2"));
    Ok(())
}

// Test: a larger bucket array spreads keys but keeps lookups exact.
#[test]
fn many_keys_many_buckets() {
    let mut m: HashChain<usize> = HashChain::with_config(MapConfig::new().with_buckets(31)).unwrap();
    for i in 0..500 {
        m.set(&format!("k{:04}", i), i).unwrap();
    }
    assert_eq!(m.len(), 500);
    for i in 0..500 {
        assert_eq!(m.get(&format!("k{:04}", i)), Some(&i));
    }
    assert_eq!(m.iter().count(), 500);
    let total: usize = (0..m.bucket_count()).map(|b| m.chain(b).count()).sum();
    assert_eq!(total, 500);
}

// Test: the default maximum key length.
// Verifies: a 2000-byte key is stored as its first 1023 bytes and found by
// any key sharing that prefix.
#[test]
fn overlong_keys_are_truncated() {
    let mut m: HashChain<i32> = HashChain::new();
    let long = "z".repeat(2000);
    m.set(&long, 1).unwrap();
    let (_, stored, _) = m.iter().next().unwrap();
    assert_eq!(stored.len(), 1023);
    assert_eq!(m.get(&"z".repeat(1023)), Some(&1));
    assert_eq!(m.get(&"z".repeat(1500)), Some(&1));
    assert_eq!(m.get(&"z".repeat(1022)), None);
}
