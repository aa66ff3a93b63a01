//! Cursor: position handle into a `RunHashMap`'s entry list.

use crate::entry_list::EntryKey;
use crate::error::Result;
use crate::run_hash_map::RunHashMap;
use core::sync::atomic::{AtomicU64, Ordering};

static NEXT_MAP_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one map instance; cursors carry it so a map can reject
/// positions minted by another map.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct MapId(u64);

impl MapId {
    pub(crate) fn fresh() -> Self {
        MapId(NEXT_MAP_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A position in a map's entry list: either a live entry or the end
/// sentinel.
///
/// A cursor stays valid while its entry lives, including across rehashes
/// that move the entry to another bucket run. Erasing the entry, clearing
/// the map, or dropping the map invalidates it; an invalid cursor resolves
/// to nothing and is rejected by `erase`/`advance`.
///
/// Read access goes through `&RunHashMap` and write access through
/// `&mut RunHashMap`, so the same handle serves both roles.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Cursor {
    pub(crate) owner: MapId,
    pub(crate) pos: Option<EntryKey>,
}

impl Cursor {
    pub(crate) fn new(owner: MapId, pos: Option<EntryKey>) -> Self {
        Self { owner, pos }
    }

    /// True for the end sentinel.
    pub fn is_end(&self) -> bool {
        self.pos.is_none()
    }

    pub fn key<'a>(&self, map: &'a RunHashMap) -> Option<&'a str> {
        map.at(*self).map(|p| p.key)
    }

    pub fn payload<'a>(&self, map: &'a RunHashMap) -> Option<&'a [u8]> {
        map.at(*self).map(|p| p.payload)
    }

    pub fn payload_mut<'a>(&self, map: &'a mut RunHashMap) -> Option<&'a mut [u8]> {
        map.at_mut(*self).map(|p| p.payload)
    }

    /// Shorthand for [`RunHashMap::advance`].
    pub fn advance(self, map: &RunHashMap, offset: isize) -> Result<Cursor> {
        map.advance(self, offset)
    }
}

/// Read-only view of one entry.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Pair<'a> {
    pub key: &'a str,
    pub payload: &'a [u8],
}

/// Mutable view of one entry; the key stays read-only.
#[derive(Debug, Eq, PartialEq)]
pub struct PairMut<'a> {
    pub key: &'a str,
    pub payload: &'a mut [u8],
}
