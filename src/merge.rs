//! Merge primitives shared by every level of the block merge.
//!
//! Three ways of merging two adjacent sorted ranges are available, each with weaker scratch
//! requirements than the one before:
//! - **External**: the A range is copied into the bounded `Cache` and merged back.
//! - **Internal**: the A range is parked in the second internal buffer and merged back by
//!   exchanges.
//! - **Rotating**: no scratch at all; binary search plus rotations.
//!
//! Rotations themselves use the cache when the shorter side fits, and fall back to a triple
//! reversal otherwise.

use crate::core::SortOps;
use crate::range::Range;
use crate::search::{binary_first, binary_last};
use crate::tracking;
use std::cmp::Ordering;

/// Fixed-capacity scratch space, shared by every merge of one sort call.
#[derive(Debug)]
pub(crate) struct Cache<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T: Clone> Cache<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline(always)]
    pub fn fits(&self, len: usize) -> bool {
        len <= self.capacity
    }

    /// Replaces the cache contents with clones of `seq[range]`.
    fn load(&mut self, seq: &[T], range: Range) {
        debug_assert!(self.fits(range.len()));
        self.items.clear();
        self.items.extend_from_slice(&seq[range.start..range.end]);
    }
}

/// How an A range is merged with the B values that follow it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeStrategy {
    /// A fits into the bounded cache.
    External,
    /// A is parked in the given internal buffer.
    Internal(Range),
    /// No scratch space: rotate A into B piece by piece.
    Rotating,
}

impl MergeStrategy {
    /// Picks the strategy for an A range of `len` elements: cache first, then the second internal
    /// buffer (if one exists), then the buffer-free rotation merge.
    ///
    /// ```
    /// use blocksort::merge::MergeStrategy;
    /// use blocksort::range::Range;
    ///
    /// let buffer = Range::new(0, 32);
    /// assert_eq!(MergeStrategy::select(16, 512, buffer), MergeStrategy::External);
    /// assert_eq!(MergeStrategy::select(1024, 512, buffer), MergeStrategy::Internal(buffer));
    /// assert_eq!(MergeStrategy::select(1024, 512, Range::empty_at(0)), MergeStrategy::Rotating);
    /// ```
    pub fn select(len: usize, cache_capacity: usize, buffer2: Range) -> Self {
        if len <= cache_capacity {
            MergeStrategy::External
        } else if !buffer2.is_empty() {
            MergeStrategy::Internal(buffer2)
        } else {
            MergeStrategy::Rotating
        }
    }

    /// Whether the A block is moved out of the way before merging.
    pub fn uses_scratch(&self) -> bool {
        !matches!(self, MergeStrategy::Rotating)
    }
}

/// Whether a rotation may overwrite the cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CacheUse {
    Allowed,
    /// The cache holds a staged A block that must survive.
    Reserved,
}

/// The sequence being sorted together with the operations and scratch used to sort it.
pub(crate) struct Merger<'a, T, O> {
    pub seq: &'a mut [T],
    pub ops: &'a mut O,
    pub cache: Cache<T>,
}

impl<'a, T: Clone, O: SortOps<T>> Merger<'a, T, O> {
    pub fn new(seq: &'a mut [T], ops: &'a mut O, cache_capacity: usize) -> Self {
        let capacity = cache_capacity.min(seq.len());
        Self {
            seq,
            ops,
            cache: Cache::new(capacity),
        }
    }

    #[inline(always)]
    pub fn compare(&mut self, i: usize, j: usize) -> Ordering {
        self.ops.compare(&self.seq[i], &self.seq[j])
    }

    #[inline(always)]
    pub fn exchange(&mut self, i: usize, j: usize) {
        self.ops.exchange(self.seq, i, j);
    }

    #[inline(always)]
    fn copy_within(&mut self, from: usize, to: usize) {
        let value = self.seq[from].clone();
        self.ops.write_at(value, self.seq, to);
    }

    /// Exchanges `len` elements starting at `a` with `len` elements starting at `b`.
    pub fn swap_blocks(&mut self, a: usize, b: usize, len: usize) {
        for i in 0..len {
            self.exchange(a + i, b + i);
        }
    }

    fn reverse(&mut self, range: Range) {
        if range.len() < 2 {
            return;
        }
        let (mut i, mut j) = (range.start, range.end - 1);
        while i < j {
            self.exchange(i, j);
            i += 1;
            j -= 1;
        }
    }

    /// Swaps `seq[range.start..split]` with `seq[split..range.end]`.
    pub fn rotate(&mut self, range: Range, split: usize, cache: CacheUse) {
        debug_assert!(range.start <= split && split <= range.end);
        if split == range.start || split == range.end {
            return;
        }

        let left = split - range.start;
        let right = range.end - split;

        if cache == CacheUse::Allowed {
            if left <= right {
                if self.cache.fits(left) {
                    self.cache.load(self.seq, Range::new(range.start, split));
                    for i in 0..right {
                        self.copy_within(split + i, range.start + i);
                    }
                    self.write_cached(0, left, range.start + right);
                    return;
                }
            } else if self.cache.fits(right) {
                self.cache.load(self.seq, Range::new(split, range.end));
                for i in (0..left).rev() {
                    self.copy_within(range.start + i, range.start + right + i);
                }
                self.write_cached(0, right, range.start);
                return;
            }
        }

        self.reverse(Range::new(range.start, split));
        self.reverse(Range::new(split, range.end));
        self.reverse(range);
    }

    /// Writes `cache[from..to]` to the sequence starting at `dest`.
    fn write_cached(&mut self, from: usize, to: usize, dest: usize) {
        for i in from..to {
            let value = self.cache.items[i].clone();
            self.ops.write_at(value, self.seq, dest + i - from);
        }
    }

    /// Merges the cached copy of A (`from..p` in the sequence) with the B range `p..to`.
    ///
    /// A's original slots are dead once the copy is taken, so results are written over them left
    /// to right. Ties take the cached element, which keeps the merge stable.
    pub fn merge_external(&mut self, from: usize, p: usize, to: usize) {
        debug_assert_eq!(self.cache.items.len(), p - from);
        tracking::register_merge(tracking::MergeKind::External, p - from, to.saturating_sub(p));

        let a_len = p - from;
        let (mut a, mut b, mut dest) = (0, p, from);

        while a < a_len && b < to {
            let value = if self.ops.compare(&self.cache.items[a], &self.seq[b]) != Ordering::Greater {
                a += 1;
                self.cache.items[a - 1].clone()
            } else {
                b += 1;
                self.seq[b - 1].clone()
            };
            self.ops.write_at(value, self.seq, dest);
            dest += 1;
        }

        self.write_cached(a, a_len, dest);
    }

    /// Merges A (parked at `buffer`) with the B range `p..to` into `from..to`.
    ///
    /// `from..p` holds the buffer's original contents; they end up back in `buffer`, permuted.
    pub fn merge_internal(&mut self, from: usize, p: usize, to: usize, buffer: usize) {
        tracking::register_merge(tracking::MergeKind::Internal, p - from, to.saturating_sub(p));

        let a_len = p - from;
        let b_len = to.saturating_sub(p);
        let (mut a_count, mut b_count, mut i) = (0, 0, 0);

        if a_len > 0 && b_len > 0 {
            loop {
                if self.compare(p + b_count, buffer + a_count) != Ordering::Less {
                    self.exchange(from + i, buffer + a_count);
                    a_count += 1;
                    i += 1;
                    if a_count >= a_len {
                        break;
                    }
                } else {
                    self.exchange(from + i, p + b_count);
                    b_count += 1;
                    i += 1;
                    if b_count >= b_len {
                        break;
                    }
                }
            }
        }

        self.swap_blocks(buffer + a_count, from + i, a_len - a_count);
    }

    /// Merges `from..p` with `p..to` without any scratch space.
    pub fn merge_in_place(&mut self, mut from: usize, mut p: usize, to: usize) {
        tracking::register_merge(tracking::MergeKind::Rotating, p - from, to.saturating_sub(p));

        if from == p || p >= to {
            return;
        }

        loop {
            // Everything in B before `mid` goes in front of A's head.
            let mid = binary_first(self.seq, &self.seq[from], Range::new(p, to), self.ops);
            let amount = mid - p;
            self.rotate(Range::new(from, mid), p, CacheUse::Allowed);
            if mid == to {
                break;
            }

            // A now starts at `from + amount`; skip its run of values equal to its head.
            let a = Range::new(from + amount, mid);
            from = binary_last(self.seq, &self.seq[a.start], a, self.ops);
            p = mid;
            if from == p {
                break;
            }
        }
    }

    /// Moves the A block at `block` out of the way as `strategy` requires.
    pub fn stage(&mut self, strategy: MergeStrategy, block: Range) {
        match strategy {
            MergeStrategy::External => self.cache.load(self.seq, block),
            MergeStrategy::Internal(buffer) => self.swap_blocks(block.start, buffer.start, block.len()),
            MergeStrategy::Rotating => {}
        }
    }

    /// Merges a staged A block with the B values in `a.end..to`.
    pub fn merge_staged(&mut self, strategy: MergeStrategy, a: Range, to: usize) {
        match strategy {
            MergeStrategy::External => self.merge_external(a.start, a.end, to),
            MergeStrategy::Internal(buffer) => self.merge_internal(a.start, a.end, to, buffer.start),
            MergeStrategy::Rotating => self.merge_in_place(a.start, a.end, to),
        }
    }

    /// Stable insertion sort of `range`. Elements already in place are never written.
    pub fn insertion_sort(&mut self, range: Range) {
        for i in range.start + 1.min(range.len())..range.end {
            if self.compare(i, i - 1) != Ordering::Less {
                continue;
            }

            let value = self.seq[i].clone();
            self.copy_within(i - 1, i);
            let mut j = i - 1;
            while j > range.start && self.ops.compare(&value, &self.seq[j - 1]) == Ordering::Less {
                self.copy_within(j - 1, j);
                j -= 1;
            }
            self.ops.write_at(value, self.seq, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Counting, Natural};

    fn merger<'a>(seq: &'a mut [u32], ops: &'a mut Natural, cache: usize) -> Merger<'a, u32, Natural> {
        Merger::new(seq, ops, cache)
    }

    #[test]
    fn test_rotate_with_and_without_cache() {
        for cache in [0, 2, 16] {
            for split in 0..=7 {
                let mut seq: Vec<u32> = (0..7).collect();
                let mut ops = Natural;
                let mut m = merger(&mut seq, &mut ops, cache);
                m.rotate(Range::new(0, 7), split, CacheUse::Allowed);

                let mut expected: Vec<u32> = (0..7).collect();
                expected.rotate_left(split);
                assert_eq!(seq, expected, "cache {cache} split {split}");
            }
        }
    }

    #[test]
    fn test_rotate_reserved_keeps_cache() {
        let mut seq: Vec<u32> = vec![9, 8, 1, 2, 3, 4];
        let mut ops = Natural;
        let mut m = merger(&mut seq, &mut ops, 8);
        m.stage(MergeStrategy::External, Range::new(0, 2));
        m.rotate(Range::new(2, 6), 3, CacheUse::Reserved);
        assert_eq!(m.cache.items, vec![9, 8]);
        assert_eq!(seq, vec![9, 8, 2, 3, 4, 1]);
    }

    #[test]
    fn test_merge_external() {
        let mut seq: Vec<u32> = vec![1, 4, 6, 2, 3, 5, 7];
        let mut ops = Natural;
        let mut m = merger(&mut seq, &mut ops, 8);
        m.stage(MergeStrategy::External, Range::new(0, 3));
        m.merge_staged(MergeStrategy::External, Range::new(0, 3), 7);
        assert_eq!(seq, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_merge_internal_restores_buffer() {
        // Buffer 100..103 at the end, A = 1 4 6, B = 2 3 5.
        let mut seq: Vec<u32> = vec![1, 4, 6, 2, 3, 5, 100, 101, 102];
        let mut ops = Natural;
        let mut m = merger(&mut seq, &mut ops, 0);
        let strategy = MergeStrategy::select(3, 0, Range::new(6, 9));
        assert_eq!(strategy, MergeStrategy::Internal(Range::new(6, 9)));

        m.stage(strategy, Range::new(0, 3));
        m.merge_staged(strategy, Range::new(0, 3), 6);

        assert_eq!(&seq[..6], &[1, 2, 3, 4, 5, 6]);
        let mut buffer = seq[6..].to_vec();
        buffer.sort();
        assert_eq!(buffer, vec![100, 101, 102]);
    }

    #[test]
    fn test_merge_in_place() {
        let mut seq: Vec<u32> = vec![2, 2, 5, 9, 1, 2, 3, 6, 10];
        let mut ops = Natural;
        let mut m = merger(&mut seq, &mut ops, 0);
        m.merge_in_place(0, 4, 9);
        assert_eq!(seq, vec![1, 2, 2, 2, 3, 5, 6, 9, 10]);
    }

    #[test]
    fn test_merges_are_stable() {
        // (key, original position); compare by key only.
        let a = [(1, 0), (3, 1), (3, 2), (5, 3)];
        let b = [(1, 4), (3, 5), (4, 6), (5, 7)];
        let expected = vec![(1, 0), (1, 4), (3, 1), (3, 2), (3, 5), (4, 6), (5, 3), (5, 7)];

        for strategy in [
            MergeStrategy::External,
            MergeStrategy::Internal(Range::new(8, 12)),
            MergeStrategy::Rotating,
        ] {
            let mut seq: Vec<(u32, u32)> = a.iter().chain(b.iter()).copied().collect();
            seq.extend((0..4).map(|i| (100 + i, 100 + i)));
            let mut ops = crate::core::by_fn(|x: &(u32, u32), y: &(u32, u32)| x.0.cmp(&y.0));
            let mut m = Merger::new(&mut seq, &mut ops, 8);
            m.stage(strategy, Range::new(0, 4));
            m.merge_staged(strategy, Range::new(0, 4), 8);
            assert_eq!(&seq[..8], &expected[..], "{strategy:?}");
        }
    }

    #[test]
    fn test_insertion_sort_skips_sorted() {
        let mut seq: Vec<u32> = (0..32).collect();
        let mut ops = Counting::new(Natural);
        let mut m = Merger::new(&mut seq, &mut ops, 0);
        m.insertion_sort(Range::new(0, 32));
        assert_eq!(ops.counts().writes, 0);
        assert_eq!(ops.counts().compares, 31);

        let mut seq: Vec<u32> = vec![5, 3, 1, 4, 2];
        let mut ops = Natural;
        let mut m = merger(&mut seq, &mut ops, 0);
        m.insertion_sort(Range::new(0, 5));
        assert_eq!(seq, vec![1, 2, 3, 4, 5]);
    }
}
