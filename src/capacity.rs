//! Capacity tiers and the overflow guards around growth arithmetic.

use crate::error::{MapError, Result};

/// Ascending prime bucket counts. Growth always lands on one of these while
/// the request fits the table; the spacing trades memory against rehash cost.
#[rustfmt::skip]
pub const CAPACITY_TIERS: [usize; 30] = [
    5, 11, 23,
    47, 53, 97,
    193, 389, 769,
    1543, 3079, 6151,
    12289, 24593, 49157,
    98317, 196613, 393241,
    786433, 1572869, 3145739,
    6291469, 12582917, 25165843,
    50331653, 100663319, 201326611,
    402653189, 805306457, 1610612741,
];

/// Largest element/load-factor quotient that `f32` represents without
/// rounding: `2^24`.
const EXACT_F32_LIMIT: f32 = (1u32 << f32::MANTISSA_DIGITS) as f32;

/// Smallest tier `>= n`; the first tier for small `n`; the last tier when
/// `n` is beyond the table.
pub fn ideal_bucket_count(n: usize) -> usize {
    CAPACITY_TIERS
        .iter()
        .copied()
        .find(|&tier| tier >= n)
        .unwrap_or(CAPACITY_TIERS[CAPACITY_TIERS.len() - 1])
}

/// Bucket count an explicit `rehash(n)` grows to: the matching tier, or
/// `n` itself when the table cannot satisfy it.
pub(crate) fn rehash_target(n: usize) -> usize {
    ideal_bucket_count(n).max(n)
}

/// Ideal bucket count for holding `elements` at `max_load_factor`. The
/// quotient is rounded up, so the result never leaves the load factor above
/// `max_load_factor`.
///
/// Fails with `Overflow` when `elements / max_load_factor` exceeds `2^24`:
/// beyond that the quotient loses integer precision and the tier lookup
/// could under-allocate. The cap also keeps every answer inside the table.
pub(crate) fn growth_target(elements: usize, max_load_factor: f32) -> Result<usize> {
    let count = elements as f32 / max_load_factor;
    // Written as a negated `<=` so NaN is rejected too.
    if !(count <= EXACT_F32_LIMIT) {
        return Err(MapError::Overflow);
    }
    Ok(ideal_bucket_count(count.ceil() as usize))
}

/// Byte size of `count` elements of `width` bytes, rejecting anything an
/// allocation could never satisfy.
pub(crate) fn array_bytes(count: usize, width: usize) -> Result<usize> {
    count
        .checked_mul(width)
        .filter(|&bytes| bytes <= isize::MAX as usize)
        .ok_or(MapError::Overflow)
}

/// Total size of an entry carrying `header` bytes of bookkeeping plus an
/// inline payload of `element_size` bytes.
pub(crate) fn entry_bytes(header: usize, element_size: usize) -> Result<usize> {
    header
        .checked_add(element_size)
        .filter(|&bytes| bytes <= isize::MAX as usize)
        .ok_or(MapError::Overflow)
}
