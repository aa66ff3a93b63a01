//! run-hashmap: a single-threaded map from string keys to fixed-size byte
//! payloads, with stable cursors and buckets threaded through one entry
//! list.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: separate chaining without per-bucket containers. Every entry
//!   lives in one ordered `EntryList`; a bucket is a contiguous run of that
//!   list, and the bucket index stores only the key of each run's first
//!   entry.
//! - Layers:
//!   - EntryList<T>: doubly-linked sequence over a generational `SlotMap`.
//!     Keys survive relinking ("splice") and are invalidated only by
//!     removal of that node.
//!   - capacity: the prime tier table and every overflow guard on growth
//!     arithmetic.
//!   - RunHashMap: hashing, bucket runs, insert/find/erase, rehash, and the
//!     `Cursor` facade.
//!
//! Constraints
//! - Single-threaded use; callers synchronize any sharing.
//! - Keys are unique and compared byte-exactly. Each entry owns a copy of
//!   its key, a cached digest, and a zeroed payload of the map's
//!   `element_size`.
//! - Runs are never split: for every non-empty bucket `b`, `buckets[b]`
//!   names the first list entry hashing to `b`, and all entries hashing to
//!   `b` follow it consecutively.
//!
//! Placement policy
//! - Insert appends the entry at the list tail and relinks it in front of
//!   its bucket's current head (or leaves it in place if the bucket was
//!   empty). Rehash walks the list once, in list order, applying the same
//!   step to each entry. Iteration order is therefore deterministic between
//!   mutations, but neither sorted nor insertion order.
//!
//! Failure semantics
//! - Every operation reports `MapError::{InvalidArgument, OutOfMemory,
//!   Overflow}` through its return value. Allocation happens before any
//!   structural change, so a failed call leaves the map as it was.
//! - Growth computes `elements / max_load_factor` in `f32` and refuses
//!   quotients above `2^24`, where the tier lookup could under-allocate.
//!
//! Cursor validity
//! - A `Cursor` is a map identity plus an entry key. Rehash and insert move
//!   entries between runs without reallocating them, so cursors and payload
//!   slices stay valid; only erase, clear, or dropping the map invalidates
//!   them. Stale and foreign cursors are detected, never dereferenced.
//!
//! Notes and non-goals
//! - No shrinking, no ordered iteration, no persistence.
//! - The digest is djb2: deterministic and fast, not collision resistant.

mod capacity;
mod config;
mod cursor;
pub mod entry_list;
mod error;
mod hash;
mod run_hash_map;
mod run_hash_map_proptest;

// Public surface
pub use capacity::{ideal_bucket_count, CAPACITY_TIERS};
pub use config::{MapConfig, DEFAULT_INITIAL_BUCKET_COUNT, DEFAULT_MAX_LOAD_FACTOR, MIN_MAX_LOAD_FACTOR};
pub use cursor::{Cursor, Pair, PairMut};
pub use error::{MapError, Result};
pub use hash::hash_of;
pub use run_hash_map::{Inserted, Iter, IterMut, RunHashMap};
