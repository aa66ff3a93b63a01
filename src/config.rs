//! Construction-time limits and defaults for `RunHashMap`.

/// Bucket count of a freshly constructed map.
pub const DEFAULT_INITIAL_BUCKET_COUNT: usize = 5;

/// Load factor of a freshly constructed map.
pub const DEFAULT_MAX_LOAD_FACTOR: f32 = 1.0;

/// Lowest accepted maximum load factor; smaller requests are raised to it.
pub const MIN_MAX_LOAD_FACTOR: f32 = 0.25;

/// Tunables applied by [`RunHashMap::with_config`](crate::RunHashMap::with_config).
///
/// ```
/// use run_hashmap::{MapConfig, RunHashMap};
///
/// let config = MapConfig::default().with_max_size(1_000).with_max_load_factor(0.5);
/// let map = RunHashMap::with_config(8, config).unwrap();
/// assert_eq!(map.max_load_factor(), 0.5);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MapConfig {
    pub(crate) initial_bucket_count: usize,
    pub(crate) max_load_factor: f32,
    pub(crate) max_size: usize,
    pub(crate) max_bucket_count: usize,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            initial_bucket_count: DEFAULT_INITIAL_BUCKET_COUNT,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
            max_size: usize::MAX,
            max_bucket_count: isize::MAX as usize,
        }
    }
}

impl MapConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bucket count allocated at construction. Zero is raised to one.
    pub fn with_initial_bucket_count(mut self, n: usize) -> Self {
        self.initial_bucket_count = n.max(1);
        self
    }

    /// Initial maximum load factor, clamped to [`MIN_MAX_LOAD_FACTOR`].
    pub fn with_max_load_factor(mut self, z: f32) -> Self {
        self.max_load_factor = clamp_load_factor(z);
        self
    }

    /// Cap on the number of live entries.
    pub fn with_max_size(mut self, n: usize) -> Self {
        self.max_size = n;
        self
    }

    /// Cap on the number of buckets automatic or explicit growth may reach.
    pub fn with_max_bucket_count(mut self, n: usize) -> Self {
        self.max_bucket_count = n.max(1);
        self
    }

    pub fn initial_bucket_count(&self) -> usize {
        self.initial_bucket_count
    }

    pub fn max_load_factor(&self) -> f32 {
        self.max_load_factor
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn max_bucket_count(&self) -> usize {
        self.max_bucket_count
    }
}

/// Raise `z` to [`MIN_MAX_LOAD_FACTOR`] when below it (NaN included).
pub(crate) fn clamp_load_factor(z: f32) -> f32 {
    if z >= MIN_MAX_LOAD_FACTOR {
        z
    } else {
        MIN_MAX_LOAD_FACTOR
    }
}
