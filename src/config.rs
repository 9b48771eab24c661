//! Tuning knobs for a sort call.

/// Length of the insertion-sorted runs the first merge level starts from.
pub const RUN_SIZE: usize = 16;

/// Smallest run length accepted by [`BlockSortConfig::with_run_size`].
pub const MIN_RUN_SIZE: usize = 4;

/// Largest run length accepted by [`BlockSortConfig::with_run_size`].
pub const MAX_RUN_SIZE: usize = 64;

/// Default number of elements the bounded cache holds.
pub const DEFAULT_CACHE_CAPACITY: usize = 512;

/// Configuration for [`block_sort_with`](crate::block_sort_with).
///
/// ```
/// use blocksort::{block_sort_with, BlockSortConfig};
/// use blocksort::core::Natural;
///
/// // No cache at all: every level is merged around internal buffers.
/// let config = BlockSortConfig::default().with_cache_capacity(0);
///
/// let mut data: Vec<u32> = (0..500).rev().collect();
/// block_sort_with(&mut data, &mut Natural, &config);
/// assert!(data.windows(2).all(|w| w[0] <= w[1]));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockSortConfig {
    cache_capacity: usize,
    run_size: usize,
}

impl Default for BlockSortConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            run_size: RUN_SIZE,
        }
    }
}

impl BlockSortConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of elements the cache may hold. The cache is allocated once per call, with
    /// room for at most as many elements as are being sorted.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Sets the run length, clamped to [`MIN_RUN_SIZE`]..=[`MAX_RUN_SIZE`] and rounded up to a
    /// power of two.
    ///
    /// Short runs make the first levels small relative to the sequence, which is mostly useful
    /// for exercising the buffer search on small inputs.
    pub fn with_run_size(mut self, run_size: usize) -> Self {
        self.run_size = run_size.clamp(MIN_RUN_SIZE, MAX_RUN_SIZE).next_power_of_two();
        self
    }

    pub fn cache_capacity(&self) -> usize {
        self.cache_capacity
    }

    pub fn run_size(&self) -> usize {
        self.run_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BlockSortConfig::default();
        assert_eq!(config.cache_capacity(), 512);
        assert_eq!(config.run_size(), 16);
        assert_eq!(config, BlockSortConfig::new());
    }

    #[test]
    fn test_run_size_rounding() {
        assert_eq!(BlockSortConfig::new().with_run_size(0).run_size(), 4);
        assert_eq!(BlockSortConfig::new().with_run_size(5).run_size(), 8);
        assert_eq!(BlockSortConfig::new().with_run_size(32).run_size(), 32);
        assert_eq!(BlockSortConfig::new().with_run_size(1 << 20).run_size(), MAX_RUN_SIZE);
        assert_eq!(BlockSortConfig::new().with_run_size(usize::MAX).run_size(), MAX_RUN_SIZE);
    }

    #[test]
    fn test_huge_run_size_still_sorts() {
        let config = BlockSortConfig::new().with_run_size(usize::MAX);
        let mut data: Vec<u32> = (0..100).rev().collect();
        crate::block_sort_with(&mut data, &mut crate::Natural, &config);
        assert_eq!(data, (0..100).collect::<Vec<_>>());
    }
}
