//! RunHashMap: string keys to fixed-size byte payloads, chained through one
//! entry list.
//!
//! Every entry lives in a single `EntryList`. The bucket index holds, per
//! bucket, the key of the first entry of that bucket's run: the maximal
//! stretch of consecutive list entries hashing to the bucket. Runs are never
//! split. Insert and rehash relink an entry to the front of its run, so no
//! operation ever scans a whole run to place an entry.

use crate::capacity::{array_bytes, entry_bytes, growth_target, rehash_target};
use crate::config::{clamp_load_factor, MapConfig};
use crate::cursor::{Cursor, MapId, Pair, PairMut};
use crate::entry_list::{self, EntryKey, EntryList};
use crate::error::{MapError, Result};
use crate::hash::hash_of;
use tracing::{debug, trace};

#[derive(Debug)]
struct Entry {
    // Digest of `key`, computed once at creation.
    hash: u64,
    key: Box<str>,
    payload: Box<[u8]>,
}

impl Entry {
    /// Copy `key` and allocate a zeroed payload of `element_size` bytes.
    fn new(key: &str, element_size: usize) -> Result<Self> {
        entry_bytes(core::mem::size_of::<Entry>().saturating_add(key.len()), element_size)?;

        let mut key_copy = String::new();
        key_copy.try_reserve_exact(key.len())?;
        key_copy.push_str(key);

        let mut payload = Vec::new();
        payload.try_reserve_exact(element_size)?;
        payload.resize(element_size, 0u8);

        Ok(Entry {
            hash: hash_of(&key_copy),
            key: key_copy.into_boxed_str(),
            payload: payload.into_boxed_slice(),
        })
    }
}

/// Outcome of [`RunHashMap::insert`].
#[derive(Debug)]
pub struct Inserted<'a> {
    /// `false` when the key was already present; nothing was changed then.
    pub inserted: bool,
    /// Position of the new or pre-existing entry.
    pub cursor: Cursor,
    /// Payload of the new or pre-existing entry.
    pub payload: &'a mut [u8],
}

/// Hash map from string keys to payloads of one fixed byte size.
///
/// Not synchronized: share across threads only behind external locking.
pub struct RunHashMap {
    id: MapId,
    entries: EntryList<Entry>,
    // Head of each bucket's run, `None` for an empty bucket.
    buckets: Vec<Option<EntryKey>>,
    element_size: usize,
    max_load_factor: f32,
    max_size: usize,
    max_bucket_count: usize,
}

/// Allocate an all-empty bucket index of `n` slots.
fn alloc_buckets(n: usize) -> Result<Vec<Option<EntryKey>>> {
    array_bytes(n, core::mem::size_of::<Option<EntryKey>>())?;
    let mut buckets = Vec::new();
    buckets.try_reserve_exact(n)?;
    buckets.resize(n, None);
    Ok(buckets)
}

impl RunHashMap {
    /// Empty map with payloads of `element_size` bytes and default
    /// [`MapConfig`].
    ///
    /// An `element_size` too large to allocate is accepted here; every
    /// insert then fails with [`MapError::Overflow`].
    pub fn new(element_size: usize) -> Result<Self> {
        Self::with_config(element_size, MapConfig::default())
    }

    pub fn with_config(element_size: usize, config: MapConfig) -> Result<Self> {
        let initial = config
            .initial_bucket_count
            .min(config.max_bucket_count)
            .max(1);
        let buckets = alloc_buckets(initial)?;
        Ok(Self {
            id: MapId::fresh(),
            entries: EntryList::new(),
            buckets,
            element_size,
            max_load_factor: clamp_load_factor(config.max_load_factor),
            max_size: config.max_size,
            max_bucket_count: config.max_bucket_count,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Payload size in bytes, fixed at construction.
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    /// Cap on the number of entries.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn max_bucket_count(&self) -> usize {
        self.max_bucket_count
    }

    #[inline]
    fn bucket_index(&self, hash: u64) -> usize {
        // The bucket index is never empty.
        (hash % self.buckets.len() as u64) as usize
    }

    fn entry_hash(&self, k: EntryKey) -> Option<u64> {
        self.entries.get(k).map(|e| e.hash)
    }

    /// Keys of bucket `b`'s run, in list order.
    fn run(&self, b: usize) -> impl Iterator<Item = EntryKey> + '_ {
        core::iter::successors(self.buckets[b], move |&k| self.entries.next(k))
            .take_while(move |&k| self.entry_hash(k).map(|h| self.bucket_index(h)) == Some(b))
    }

    /// Number of entries in bucket `n`; zero for an out-of-range bucket.
    /// O(bucket size).
    pub fn bucket_size(&self, n: usize) -> usize {
        if n >= self.bucket_count() {
            return 0;
        }
        self.run(n).count()
    }

    /// Bucket that `key` maps to under the current bucket count, whether or
    /// not the key is present.
    pub fn bucket(&self, key: &str) -> usize {
        self.bucket_index(hash_of(key))
    }

    /// Entries per bucket.
    pub fn load_factor(&self) -> f32 {
        self.len() as f32 / self.bucket_count() as f32
    }

    pub fn max_load_factor(&self) -> f32 {
        self.max_load_factor
    }

    /// Set the maximum load factor (values below 0.25 become 0.25) and grow
    /// immediately if the current entries no longer fit.
    ///
    /// On failure the previous factor is kept and the map is unchanged.
    pub fn set_max_load_factor(&mut self, z: f32) -> Result<()> {
        let previous = self.max_load_factor;
        self.max_load_factor = clamp_load_factor(z);
        let res = self.rehash_if_needed(self.len());
        if res.is_err() {
            self.max_load_factor = previous;
        }
        res
    }

    /// Cursor at the first entry, or `end()` when empty.
    pub fn begin(&self) -> Cursor {
        Cursor::new(self.id, self.entries.first())
    }

    /// One-past-the-last sentinel. Always compares equal to itself.
    pub fn end(&self) -> Cursor {
        Cursor::new(self.id, None)
    }

    fn cursor_at(&self, k: EntryKey) -> Cursor {
        Cursor::new(self.id, Some(k))
    }

    /// Resolve a cursor minted by this map to its position; fails for
    /// foreign or stale cursors.
    fn check_cursor(&self, c: Cursor) -> Result<Option<EntryKey>> {
        if c.owner != self.id {
            return Err(MapError::InvalidArgument);
        }
        match c.pos {
            Some(k) if !self.entries.contains(k) => Err(MapError::InvalidArgument),
            pos => Ok(pos),
        }
    }

    /// Move `c` by `offset` entries: forward for positive, backward for
    /// negative. The result must stay within `[begin(), end()]`. O(|offset|).
    pub fn advance(&self, c: Cursor, offset: isize) -> Result<Cursor> {
        let mut pos = self.check_cursor(c)?;
        if offset >= 0 {
            for _ in 0..offset {
                let k = pos.ok_or(MapError::InvalidArgument)?;
                pos = self.entries.next(k);
            }
        } else {
            for _ in 0..offset.unsigned_abs() {
                let back = match pos {
                    None => self.entries.last(),
                    Some(k) => self.entries.prev(k),
                };
                pos = Some(back.ok_or(MapError::InvalidArgument)?);
            }
        }
        Ok(Cursor::new(self.id, pos))
    }

    /// Entry at `c`; `None` at the end or for foreign or stale cursors.
    pub fn at(&self, c: Cursor) -> Option<Pair<'_>> {
        let k = self.check_cursor(c).ok()??;
        self.entries.get(k).map(|e| Pair {
            key: &e.key,
            payload: &e.payload,
        })
    }

    /// Mutable entry at `c`; `None` at the end or for foreign or stale
    /// cursors.
    pub fn at_mut(&mut self, c: Cursor) -> Option<PairMut<'_>> {
        let k = self.check_cursor(c).ok()??;
        self.entries.get_mut(k).map(|e| PairMut {
            key: &e.key,
            payload: &mut e.payload,
        })
    }

    fn find_key(&self, key: &str) -> Option<EntryKey> {
        let hash = hash_of(key);
        let b = self.bucket_index(hash);
        // A matching digest alone is not a match.
        self.run(b).find(|&k| {
            self.entries
                .get(k)
                .is_some_and(|e| e.hash == hash && &*e.key == key)
        })
    }

    /// Cursor at `key`, or `end()` if absent.
    pub fn find(&self, key: &str) -> Cursor {
        Cursor::new(self.id, self.find_key(key))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.find_key(key).is_some()
    }

    pub fn get(&self, key: &str) -> Option<&[u8]> {
        let k = self.find_key(key)?;
        self.entries.get(k).map(|e| &*e.payload)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut [u8]> {
        let k = self.find_key(key)?;
        self.entries.get_mut(k).map(|e| &mut *e.payload)
    }

    /// Make `k` the head of bucket `b`'s run. An empty bucket leaves `k`
    /// where it is; otherwise `k` is relinked in front of the current head.
    fn link_run_front(&mut self, b: usize, k: EntryKey) {
        if let Some(head) = self.buckets[b] {
            self.entries.splice_before(head, k);
        }
        self.buckets[b] = Some(k);
    }

    /// Insert `key` with a zeroed payload, or locate it if already present.
    ///
    /// A present key returns `inserted: false` and its existing payload
    /// without changing anything. Fails with `Overflow` when the map is at
    /// `max_size`, the payload size is unrepresentable, or the required
    /// growth exceeds the bucket limits; with `OutOfMemory` when an
    /// allocation fails. The map is unchanged on failure.
    pub fn insert(&mut self, key: &str) -> Result<Inserted<'_>> {
        if let Some(k) = self.find_key(key) {
            return self.inserted(k, false);
        }

        if self.len() >= self.max_size {
            debug!(len = self.len(), max_size = self.max_size, "insert rejected: map full");
            return Err(MapError::Overflow);
        }

        let entry = Entry::new(key, self.element_size)?;
        self.rehash_if_needed(self.len() + 1)?;

        let b = self.bucket_index(entry.hash);
        // New entries land at the tail, then move to the front of their run.
        let k = self.entries.push_back(entry);
        self.link_run_front(b, k);
        trace!(key, bucket = b, "inserted");
        self.inserted(k, true)
    }

    // `k` was just found or linked; a dead key surfaces as InvalidArgument.
    fn inserted(&mut self, k: EntryKey, inserted: bool) -> Result<Inserted<'_>> {
        let cursor = self.cursor_at(k);
        let e = self.entries.get_mut(k).ok_or(MapError::InvalidArgument)?;
        Ok(Inserted {
            inserted,
            cursor,
            payload: &mut e.payload,
        })
    }

    /// Destroy the entry at `c`. O(1) regardless of bucket occupancy.
    ///
    /// Fails with `InvalidArgument` for `end()`, a stale cursor, or a cursor
    /// from another map. Invalidates `c` and any copies of it.
    pub fn erase(&mut self, c: Cursor) -> Result<()> {
        let k = self.check_cursor(c)?.ok_or(MapError::InvalidArgument)?;
        let hash = self.entry_hash(k).ok_or(MapError::InvalidArgument)?;
        let b = self.bucket_index(hash);

        if self.buckets[b] == Some(k) {
            let successor = self
                .entries
                .next(k)
                .filter(|&n| self.entry_hash(n).map(|h| self.bucket_index(h)) == Some(b));
            self.buckets[b] = successor;
        }

        if let Some(e) = self.entries.remove(k) {
            trace!(key = &*e.key, bucket = b, "erased");
        }
        Ok(())
    }

    /// Erase `key` if present. Returns whether an entry was removed.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.find_key(key) {
            Some(k) => self.erase(self.cursor_at(k)).is_ok(),
            None => false,
        }
    }

    /// Destroy every entry. Bucket count and load-factor settings are kept;
    /// every outstanding cursor except `end()` is invalidated.
    pub fn clear(&mut self) {
        trace!(len = self.len(), "clear");
        self.entries.clear();
        self.buckets.fill(None);
    }

    /// Grow to at least `n` buckets: the smallest capacity tier `>= n`, or
    /// exactly `n` beyond the tier table. Never shrinks; `n <=
    /// bucket_count()` is a no-op.
    ///
    /// Entries are relinked, not reallocated, so cursors and payload
    /// references obtained earlier stay valid. On failure the bucket index
    /// and every entry are left untouched.
    pub fn rehash(&mut self, n: usize) -> Result<()> {
        if n <= self.bucket_count() {
            return Ok(());
        }
        if n > self.max_bucket_count {
            debug!(requested = n, max = self.max_bucket_count, "rehash rejected");
            return Err(MapError::Overflow);
        }
        let target = rehash_target(n).min(self.max_bucket_count).max(n);
        self.rehash_to(target)
    }

    /// Make room for `n` entries at the current maximum load factor.
    /// Requests already within `ceil(bucket_count * max_load_factor)` are
    /// no-ops that cannot fail.
    pub fn reserve(&mut self, n: usize) -> Result<()> {
        let capacity = (self.bucket_count() as f32 * self.max_load_factor).ceil() as usize;
        if n <= capacity {
            return Ok(());
        }
        self.rehash_if_needed(n)
    }

    /// Grow to the tier that keeps `elements` within the maximum load
    /// factor, if the current bucket count is not enough.
    fn rehash_if_needed(&mut self, elements: usize) -> Result<()> {
        let required = growth_target(elements, self.max_load_factor).map_err(|e| {
            debug!(elements, max_load_factor = self.max_load_factor, "growth target unrepresentable");
            e
        })?;
        if required <= self.bucket_count() {
            return Ok(());
        }
        if required > self.max_bucket_count {
            debug!(required, max = self.max_bucket_count, "growth exceeds bucket limit");
            return Err(MapError::Overflow);
        }
        self.rehash_to(required)
    }

    /// Swap in an `n`-slot bucket index and rethread every run in one pass
    /// over the list, in list order.
    fn rehash_to(&mut self, n: usize) -> Result<()> {
        let fresh = alloc_buckets(n)?;
        let old = core::mem::replace(&mut self.buckets, fresh);
        debug!(from = old.len(), to = n, entries = self.len(), "rehash");

        // Every entry visited so far sits before `cur`, so relinking in
        // front of a visited head never disturbs the walk.
        let mut cur = self.entries.first();
        while let Some(k) = cur {
            cur = self.entries.next(k);
            if let Some(hash) = self.entry_hash(k) {
                let b = self.bucket_index(hash);
                self.link_run_front(b, k);
            }
        }
        Ok(())
    }

    /// Entries in list order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    /// Entries in list order with mutable payloads.
    ///
    /// Each call allocates O(len) bookkeeping before yielding; use
    /// [`get_mut`](Self::get_mut) or a cursor to touch a few entries.
    pub fn iter_mut(&mut self) -> IterMut<'_> {
        IterMut {
            inner: self.entries.iter_mut(),
        }
    }

    /// Check the run structure and key uniqueness, panicking on violation.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        use std::collections::HashSet;

        let mut closed_runs = HashSet::new();
        let mut keys = HashSet::new();
        let mut current = None;
        for (k, e) in self.entries.iter() {
            assert_eq!(e.hash, hash_of(&e.key), "stale digest for {:?}", e.key);
            assert_eq!(e.payload.len(), self.element_size);
            assert!(keys.insert(&*e.key), "duplicate key {:?}", e.key);
            let b = self.bucket_index(e.hash);
            if current != Some(b) {
                assert!(closed_runs.insert(b), "run of bucket {b} is split");
                assert_eq!(self.buckets[b], Some(k), "bucket {b} head is not its run start");
                current = Some(b);
            }
        }
        for (b, head) in self.buckets.iter().enumerate() {
            assert_eq!(head.is_some(), closed_runs.contains(&b), "bucket {b} head mismatch");
        }
        assert_eq!(
            (0..self.bucket_count()).map(|b| self.bucket_size(b)).sum::<usize>(),
            self.len()
        );
    }
}

impl core::fmt::Debug for RunHashMap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over `(key, payload)` in list order.
pub struct Iter<'a> {
    inner: entry_list::Iter<'a, Entry>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a [u8]);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, e)| (&*e.key, &*e.payload))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

/// Iterator over `(key, mutable payload)` in list order.
pub struct IterMut<'a> {
    inner: entry_list::IterMut<'a, Entry>,
}

impl<'a> Iterator for IterMut<'a> {
    type Item = (&'a str, &'a mut [u8]);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, e)| (&*e.key, &mut *e.payload))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for IterMut<'_> {}

impl<'a> IntoIterator for &'a RunHashMap {
    type Item = (&'a str, &'a [u8]);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for &'a mut RunHashMap {
    type Item = (&'a str, &'a mut [u8]);
    type IntoIter = IterMut<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
