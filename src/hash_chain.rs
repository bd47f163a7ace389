//! HashChain: fixed bucket array with singly-linked collision chains.
//!
//! Each bucket holds the head `NodeId` of a chain stored in a `NodeArena`.
//! New keys are appended at the chain tail, so chain order is first-insertion
//! order. An existing key is overwritten in place; its node is never
//! recreated.
//!
//! Value ownership follows the registered destructor: a value displaced by
//! an overwrite, or still stored at teardown, is passed to the destructor
//! exactly once. Without a destructor it is dropped like any other owned
//! value. The structure is made consistent before the destructor runs.

use crate::config::{MapConfig, DEFAULT_BUCKETS, DEFAULT_MAX_KEY_LEN};
use crate::error::{BuildError, SetError};
use crate::hash::{hash_key, WeightedSum};
use crate::node::{bounded_key, Chain, Node, NodeArena, NodeId};
use core::fmt;
use core::hash::BuildHasher;
use std::io;

type Destructor<V> = Box<dyn FnMut(V)>;

pub struct HashChain<V, S = WeightedSum> {
    buckets: Vec<Option<NodeId>>, // chain heads, fixed length
    nodes: NodeArena<V>,
    destructor: Option<Destructor<V>>,
    hasher: S,
    max_key_len: usize,
}

impl<V> HashChain<V> {
    /// Empty map with two buckets and no destructor.
    pub fn new() -> Self {
        Self::with_hasher(WeightedSum)
    }

    pub fn with_config(config: MapConfig) -> Result<Self, BuildError> {
        Self::with_config_and_hasher(config, WeightedSum)
    }
}

impl<V> Default for HashChain<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, S> HashChain<V, S>
where
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            buckets: vec![None; DEFAULT_BUCKETS],
            nodes: NodeArena::new(),
            destructor: None,
            hasher,
            max_key_len: DEFAULT_MAX_KEY_LEN,
        }
    }

    pub fn with_config_and_hasher(config: MapConfig, hasher: S) -> Result<Self, BuildError> {
        config.validate()?;
        let mut buckets = Vec::new();
        buckets.try_reserve_exact(config.buckets)?;
        buckets.resize(config.buckets, None);
        log::debug!(
            "created map: {} buckets, max key length {}",
            config.buckets,
            config.max_key_len
        );
        Ok(Self {
            buckets,
            nodes: NodeArena::new(),
            destructor: None,
            hasher,
            max_key_len: config.max_key_len,
        })
    }

    /// Register the callback that receives displaced and torn-down values.
    ///
    /// Replaces any earlier destructor. Values already handed off are not
    /// revisited; only later overwrites and the final teardown use `f`.
    pub fn set_destructor<F>(&mut self, f: F)
    where
        F: FnMut(V) + 'static,
    {
        self.destructor = Some(Box::new(f));
    }

    /// Unregister the destructor. Returns whether one was set.
    pub fn clear_destructor(&mut self) -> bool {
        self.destructor.take().is_some()
    }

    pub fn has_destructor(&self) -> bool {
        self.destructor.is_some()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
    pub fn max_key_len(&self) -> usize {
        self.max_key_len
    }

    /// Bucket index `key` maps to, after truncation to the key length limit.
    pub fn bucket_of(&self, key: &str) -> usize {
        self.index_for(bounded_key(key, self.max_key_len))
    }

    fn index_for(&self, bounded: &str) -> usize {
        (hash_key(&self.hasher, bounded) % self.buckets.len() as u64) as usize
    }

    fn find_id(&self, bounded: &str) -> Option<NodeId> {
        let head = self.buckets[self.index_for(bounded)];
        self.nodes
            .chain(head)
            .find(|(_, n)| n.key == bounded)
            .map(|(id, _)| id)
    }

    /// Insert `key -> value`, or overwrite the value of an existing key.
    ///
    /// An overwrite hands the previous value to the destructor (if any)
    /// exactly once; a fresh insert never calls it. On error the map is
    /// unchanged.
    pub fn set(&mut self, key: &str, value: V) -> Result<&mut Self, SetError> {
        let key = bounded_key(key, self.max_key_len);
        let idx = self.index_for(key);

        let Some(head) = self.buckets[idx] else {
            let node = Node::create(key, value, None, self.max_key_len)?;
            self.buckets[idx] = Some(self.nodes.insert(node));
            log::trace!("set {:?}: new head of bucket {}", key, idx);
            return Ok(self);
        };

        let found = self
            .nodes
            .chain(Some(head))
            .find(|(_, n)| n.key == key)
            .map(|(id, _)| id);
        if let Some(node) = found.and_then(|id| self.nodes.get_mut(id)) {
            let old = core::mem::replace(&mut node.value, value);
            log::trace!("set {:?}: overwrite in bucket {}", key, idx);
            self.dispose(old);
            return Ok(self);
        }

        // Allocate before linking so a failure leaves the chain untouched.
        let node = Node::create(key, value, None, self.max_key_len)?;
        let tail = self.nodes.find_tail(head);
        let id = self.nodes.insert(node);
        if let Some(t) = self.nodes.get_mut(tail) {
            t.next = Some(id);
        }
        log::trace!("set {:?}: appended to bucket {}", key, idx);
        Ok(self)
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        let id = self.find_id(bounded_key(key, self.max_key_len))?;
        self.nodes.get(id).map(|n| &n.value)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let id = self.find_id(bounded_key(key, self.max_key_len))?;
        self.nodes.get_mut(id).map(|n| &mut n.value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.find_id(bounded_key(key, self.max_key_len)).is_some()
    }

    fn dispose(&mut self, value: V) {
        match self.destructor.as_mut() {
            Some(d) => d(value),
            None => drop(value),
        }
    }
}

impl<V, S> HashChain<V, S> {
    /// Entries of one bucket, head first. Out-of-range buckets are empty.
    pub fn chain(&self, bucket: usize) -> Chain<'_, V> {
        self.nodes.chain(self.buckets.get(bucket).copied().flatten())
    }

    /// All entries in bucket order, then chain order within a bucket.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            nodes: &self.nodes,
            heads: self.buckets.iter().enumerate(),
            bucket: 0,
            chain: self.nodes.chain(None),
        }
    }

    /// Tree-style listing of every bucket chain.
    ///
    /// One line per entry, `bucket: key: value`; the k-th successor in a
    /// chain is indented by `2 * k` spaces. Empty buckets print nothing.
    pub fn dump(&self) -> Dump<'_, V>
    where
        V: fmt::Display,
    {
        Dump {
            heads: &self.buckets,
            nodes: &self.nodes,
        }
    }

    pub fn dump_to<W>(&self, out: &mut W) -> io::Result<()>
    where
        V: fmt::Display,
        W: io::Write,
    {
        write!(out, "{}", self.dump())
    }

    /// Tear the map down, passing every stored value to the destructor.
    pub fn destroy(self) {
        drop(self);
    }

    fn teardown(&mut self) {
        let mut released = 0usize;
        for slot in self.buckets.iter_mut() {
            let mut cur = slot.take();
            while let Some(id) = cur {
                cur = self.nodes.get(id).and_then(|n| n.next);
                if let Some(value) = self.nodes.release(Some(id)) {
                    released += 1;
                    if let Some(d) = self.destructor.as_mut() {
                        d(value);
                    }
                }
            }
        }
        log::debug!("destroyed map: released {} entries", released);
    }
}

impl<V, S> Drop for HashChain<V, S> {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl<V, S> fmt::Debug for HashChain<V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashChain")
            .field("buckets", &self.buckets.len())
            .field("len", &self.nodes.len())
            .field("max_key_len", &self.max_key_len)
            .field("destructor", &self.destructor.is_some())
            .finish()
    }
}

/// Iterator over `(bucket, key, value)` in bucket-then-chain order.
pub struct Iter<'a, V> {
    nodes: &'a NodeArena<V>,
    heads: core::iter::Enumerate<core::slice::Iter<'a, Option<NodeId>>>,
    bucket: usize,
    chain: Chain<'a, V>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (usize, &'a str, &'a V);
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((_, n)) = self.chain.next() {
                return Some((self.bucket, n.key(), n.value()));
            }
            let (i, head) = self.heads.next()?;
            self.bucket = i;
            self.chain = self.nodes.chain(*head);
        }
    }
}

impl<'a, V, S> IntoIterator for &'a HashChain<V, S> {
    type Item = (usize, &'a str, &'a V);
    type IntoIter = Iter<'a, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Display adapter returned by `HashChain::dump`.
pub struct Dump<'a, V> {
    heads: &'a [Option<NodeId>],
    nodes: &'a NodeArena<V>,
}

impl<'a, V: fmt::Display> fmt::Display for Dump<'a, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, head) in self.heads.iter().enumerate() {
            for (depth, (_, n)) in self.nodes.chain(*head).enumerate() {
                writeln!(
                    f,
                    "{:indent$}{}: {}: {}",
                    "",
                    i,
                    n.key(),
                    n.value(),
                    indent = depth * 2
                )?;
            }
        }
        Ok(())
    }
}
