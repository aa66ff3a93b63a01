//! Error taxonomy shared by every fallible map operation.

use thiserror::Error;

/// Failure kinds reported by [`RunHashMap`](crate::RunHashMap).
///
/// Every mutating operation that returns one of these leaves the map exactly
/// as it was before the call.
#[derive(Error, Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MapError {
    /// A cursor was stale, minted by another map, at the end position where
    /// an entry is required, or advanced outside `[begin, end]`.
    #[error("invalid argument")]
    InvalidArgument,

    /// Allocating a key copy, a payload, or the bucket index failed.
    #[error("out of memory")]
    OutOfMemory,

    /// A payload size, element count, or bucket count exceeds what the map
    /// can represent, or the load-factor calculation would lose precision.
    #[error("value too large for the map")]
    Overflow,
}

impl From<std::collections::TryReserveError> for MapError {
    fn from(_: std::collections::TryReserveError) -> Self {
        MapError::OutOfMemory
    }
}

pub type Result<T> = core::result::Result<T, MapError>;
