//! EntryList: ordered, doubly-linked sequence over a generational arena.
//!
//! Nodes live in a `SlotMap` and link to each other by `EntryKey`, so a key
//! stays valid while its node is relinked anywhere in the sequence and is
//! invalidated only when that node is removed. Removed keys never resolve
//! again, even after their slot is reused.

use slotmap::{new_key_type, SecondaryMap, SlotMap};

new_key_type! {
    /// Stable handle to a node of an [`EntryList`].
    pub struct EntryKey;
}

#[derive(Debug)]
struct Node<T> {
    prev: Option<EntryKey>,
    next: Option<EntryKey>,
    value: T,
}

pub struct EntryList<T> {
    nodes: SlotMap<EntryKey, Node<T>>,
    head: Option<EntryKey>,
    tail: Option<EntryKey>,
}

impl<T> Default for EntryList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EntryList<T> {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            head: None,
            tail: None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, k: EntryKey) -> bool {
        self.nodes.contains_key(k)
    }

    /// First node in sequence order.
    pub fn first(&self) -> Option<EntryKey> {
        self.head
    }

    /// Last node in sequence order.
    pub fn last(&self) -> Option<EntryKey> {
        self.tail
    }

    /// Successor of `k`; `None` at the end or for a dead key.
    pub fn next(&self, k: EntryKey) -> Option<EntryKey> {
        self.nodes.get(k).and_then(|n| n.next)
    }

    /// Predecessor of `k`; `None` at the front or for a dead key.
    pub fn prev(&self, k: EntryKey) -> Option<EntryKey> {
        self.nodes.get(k).and_then(|n| n.prev)
    }

    pub fn get(&self, k: EntryKey) -> Option<&T> {
        self.nodes.get(k).map(|n| &n.value)
    }

    pub fn get_mut(&mut self, k: EntryKey) -> Option<&mut T> {
        self.nodes.get_mut(k).map(|n| &mut n.value)
    }

    /// Append `value` at the tail and return its key.
    pub fn push_back(&mut self, value: T) -> EntryKey {
        let prev = self.tail;
        let k = self.nodes.insert(Node {
            prev,
            next: None,
            value,
        });
        match prev {
            Some(p) => self.nodes[p].next = Some(k),
            None => self.head = Some(k),
        }
        self.tail = Some(k);
        k
    }

    /// Move `node` so it sits immediately before `at`, without touching its
    /// value. O(1). No-op when `node == at` or either key is dead.
    pub fn splice_before(&mut self, at: EntryKey, node: EntryKey) {
        if at == node || !self.nodes.contains_key(at) || !self.nodes.contains_key(node) {
            return;
        }
        if self.nodes[at].prev == Some(node) {
            // Already in place.
            return;
        }
        self.unlink(node);
        let prev = self.nodes[at].prev;
        {
            let n = &mut self.nodes[node];
            n.prev = prev;
            n.next = Some(at);
        }
        self.nodes[at].prev = Some(node);
        match prev {
            Some(p) => self.nodes[p].next = Some(node),
            None => self.head = Some(node),
        }
    }

    /// Detach and return the value at `k`. O(1).
    pub fn remove(&mut self, k: EntryKey) -> Option<T> {
        if !self.nodes.contains_key(k) {
            return None;
        }
        self.unlink(k);
        self.nodes.remove(k).map(|n| n.value)
    }

    /// Drop every node. All outstanding keys stop resolving.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.tail = None;
    }

    /// Sequence-order iterator yielding `(key, &value)`.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            front: self.head,
            remaining: self.len(),
        }
    }

    /// Sequence-order iterator yielding `(key, &mut value)`.
    ///
    /// Starting the walk allocates an O(n) side table of node borrows, so
    /// prefer `get_mut` when only a few nodes are touched.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        let remaining = self.len();
        let front = self.head;
        let mut nodes = SecondaryMap::with_capacity(remaining);
        for (k, n) in self.nodes.iter_mut() {
            nodes.insert(k, n);
        }
        IterMut {
            nodes,
            front,
            remaining,
        }
    }

    // Splice `k` out of the chain; the node itself stays in the arena.
    fn unlink(&mut self, k: EntryKey) {
        let (prev, next) = {
            let n = &self.nodes[k];
            (n.prev, n.next)
        };
        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(nx) => self.nodes[nx].prev = prev,
            None => self.tail = prev,
        }
        let n = &mut self.nodes[k];
        n.prev = None;
        n.next = None;
    }
}

impl<T: core::fmt::Debug> core::fmt::Debug for EntryList<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.iter().map(|(_, v)| v)).finish()
    }
}

/// Iterator over shared nodes of an [`EntryList`], in sequence order.
pub struct Iter<'a, T> {
    list: &'a EntryList<T>,
    front: Option<EntryKey>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (EntryKey, &'a T);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let k = self.front?;
        let list = self.list;
        let node = &list.nodes[k];
        self.front = node.next;
        self.remaining -= 1;
        Some((k, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

/// Iterator over mutable nodes of an [`EntryList`], in sequence order.
///
/// Borrows every node up front and hands each one out exactly once while
/// walking the links.
pub struct IterMut<'a, T> {
    nodes: SecondaryMap<EntryKey, &'a mut Node<T>>,
    front: Option<EntryKey>,
    remaining: usize,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = (EntryKey, &'a mut T);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let k = self.front?;
        let node = self.nodes.remove(k)?;
        self.front = node.next;
        self.remaining -= 1;
        Some((k, &mut node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}
