//! Chain nodes and the arena that owns them.
//!
//! Nodes live in a `SlotMap`; a chain link is a generational `NodeId`
//! rather than a pointer. The arena never follows links on its own except
//! in `find_tail` and `Chain`; splicing nodes into buckets is the map's job.

use slotmap::{DefaultKey, SlotMap};
use std::collections::TryReserveError;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(DefaultKey);

impl NodeId {
    pub(crate) fn new(k: DefaultKey) -> Self {
        NodeId(k)
    }
    pub(crate) fn raw(&self) -> DefaultKey {
        self.0
    }
}

/// One key/value pair plus the link to its successor in the bucket chain.
#[derive(Debug)]
pub struct Node<V> {
    pub(crate) key: String,
    pub(crate) value: V,
    pub(crate) next: Option<NodeId>,
}

impl<V> Node<V> {
    /// Build a node, copying at most `max_key_len` bytes of `key`.
    ///
    /// Excess bytes are dropped at the nearest character boundary; an
    /// overlong key is not an error. Fails only if the key copy cannot be
    /// allocated.
    pub fn create(
        key: &str,
        value: V,
        next: Option<NodeId>,
        max_key_len: usize,
    ) -> Result<Self, TryReserveError> {
        let key = copy_key(key, max_key_len)?;
        Ok(Self { key, value, next })
    }

    pub fn key(&self) -> &str {
        &self.key
    }
    pub fn value(&self) -> &V {
        &self.value
    }
    pub fn next(&self) -> Option<NodeId> {
        self.next
    }
}

/// Longest prefix of `key` that fits in `max_len` bytes without splitting a
/// character.
pub fn bounded_key(key: &str, max_len: usize) -> &str {
    if key.len() <= max_len {
        return key;
    }
    let mut end = max_len;
    while !key.is_char_boundary(end) {
        end -= 1;
    }
    &key[..end]
}

fn copy_key(key: &str, max_len: usize) -> Result<String, TryReserveError> {
    let bounded = bounded_key(key, max_len);
    let mut owned = String::new();
    owned.try_reserve_exact(bounded.len())?;
    owned.push_str(bounded);
    Ok(owned)
}

/// Owning storage for every node of a map.
#[derive(Debug)]
pub struct NodeArena<V> {
    slots: SlotMap<DefaultKey, Node<V>>,
}

impl<V> NodeArena<V> {
    pub fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn insert(&mut self, node: Node<V>) -> NodeId {
        NodeId::new(self.slots.insert(node))
    }

    pub fn get(&self, id: NodeId) -> Option<&Node<V>> {
        self.slots.get(id.raw())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<V>> {
        self.slots.get_mut(id.raw())
    }

    /// Free one node and hand back its value. Neighbours are untouched, so
    /// the caller must already have unlinked it. `None` is a no-op.
    pub fn release(&mut self, id: Option<NodeId>) -> Option<V> {
        let id = id?;
        self.slots.remove(id.raw()).map(|n| n.value)
    }

    /// Last node of the chain starting at `id`; `id` itself when it has no
    /// successor or does not resolve.
    pub fn find_tail(&self, id: NodeId) -> NodeId {
        let mut cur = id;
        while let Some(next) = self.get(cur).and_then(|n| n.next) {
            cur = next;
        }
        cur
    }

    /// Iterate a chain head first.
    pub fn chain(&self, head: Option<NodeId>) -> Chain<'_, V> {
        Chain {
            arena: self,
            cur: head,
        }
    }
}

/// Iterator over one bucket chain.
pub struct Chain<'a, V> {
    arena: &'a NodeArena<V>,
    cur: Option<NodeId>,
}

impl<'a, V> Iterator for Chain<'a, V> {
    type Item = (NodeId, &'a Node<V>);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cur?;
        let node = self.arena.get(id)?;
        self.cur = node.next;
        Some((id, node))
    }
}
