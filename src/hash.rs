//! Key digest used for bucket derivation.

/// Seed of the djb2 digest.
const SEED: u64 = 5381;

/// djb2 digest of `key`: `h = h * 33 + byte` over every byte, seeded with
/// [`SEED`]. Deterministic across processes and platforms; not suitable
/// where collision resistance matters.
#[inline]
pub fn hash_of(key: &str) -> u64 {
    key.bytes().fold(SEED, |h, b| {
        (h << 5).wrapping_add(h).wrapping_add(u64::from(b))
    })
}
