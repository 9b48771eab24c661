//! Block merge sort driver.
//!
//! The sequence is cut into runs of [`RUN_SIZE`](crate::config::RUN_SIZE) elements which are
//! insertion sorted, then merged bottom-up one level at a time. Each level takes one of two paths:
//! - **Cache**: every A range fits into the bounded cache, so each A+B pair is merged through it.
//! - **In place**: distinct values are pulled out into internal buffers, A is cut into blocks
//!   tagged with buffer values, and the blocks are rolled through B and merged locally.
//!
//! The main entry points are [`block_sort`], [`block_sort_by`], [`block_sort_by_key`] and
//! [`block_sort_with`].

use crate::buffer::InternalBuffers;
use crate::config::BlockSortConfig;
use crate::core::{ByFn, Natural, SortOps};
use crate::merge::{CacheUse, MergeStrategy, Merger};
use crate::range::{LevelIterator, Range};
use crate::search::binary_first;
use crate::tracking::{self, LevelPath};
use std::cmp::Ordering;

/// Sorts a slice in place with a stable block merge sort.
///
/// Uses the default [`BlockSortConfig`]: at most 512 elements of scratch space, whatever the
/// length of the slice.
///
/// # Examples
///
/// ```
/// use blocksort::block_sort;
///
/// let mut data = vec![5, 3, 1, 4, 2];
/// block_sort(&mut data);
///
/// assert_eq!(data, vec![1, 2, 3, 4, 5]);
/// ```
pub fn block_sort<T: Ord + Clone>(data: &mut [T]) {
    block_sort_with(data, &mut Natural, &BlockSortConfig::default());
}

/// Sorts a slice in place with a comparison closure.
///
/// Elements that compare equal keep their relative order.
///
/// # Examples
///
/// ```
/// use blocksort::block_sort_by;
///
/// let mut data = vec![(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd')];
/// block_sort_by(&mut data, |a, b| a.0.cmp(&b.0));
///
/// assert_eq!(data, vec![(1, 'b'), (1, 'd'), (2, 'a'), (2, 'c')]);
/// ```
pub fn block_sort_by<T: Clone, F: FnMut(&T, &T) -> Ordering>(data: &mut [T], compare: F) {
    block_sort_with(data, &mut ByFn(compare), &BlockSortConfig::default());
}

/// Sorts a slice in place by a key extracted from each element.
///
/// The key is extracted again for every comparison.
///
/// # Examples
///
/// ```
/// use blocksort::block_sort_by_key;
///
/// let mut data = vec!["banana", "fig", "apple", "kiwi"];
/// block_sort_by_key(&mut data, |s| s.len());
///
/// assert_eq!(data, vec!["fig", "kiwi", "apple", "banana"]);
/// ```
pub fn block_sort_by_key<T: Clone, K: Ord, F: FnMut(&T) -> K>(data: &mut [T], mut key: F) {
    block_sort_by(data, |a, b| key(a).cmp(&key(b)));
}

/// Sorts a slice in place, driving every comparison, exchange and write through `ops`.
///
/// This is the entry point the others delegate to. See [`SortOps`] for the operation contract
/// and [`BlockSortConfig`] for the knobs.
pub fn block_sort_with<T: Clone, O: SortOps<T>>(data: &mut [T], ops: &mut O, config: &BlockSortConfig) {
    let len = data.len();
    if len < 2 {
        return;
    }

    let run_size = config.run_size();
    let mut m = Merger::new(data, ops, config.cache_capacity());

    if len < run_size {
        m.insertion_sort(Range::new(0, len));
        return;
    }

    let mut iterator = LevelIterator::new(len, run_size);
    while !iterator.finished() {
        let run = iterator.next_range();
        m.insertion_sort(run);
    }

    // A level whose ranges already span the sequence has nothing to merge.
    while iterator.length() < len {
        if iterator.length() < m.cache.capacity() {
            merge_level_cached(&mut m, &mut iterator);
        } else {
            merge_level_in_place(&mut m, &mut iterator);
        }
        iterator.next_level();
    }
}

/// Merges every A+B pair of the level through the cache.
fn merge_level_cached<T: Clone, O: SortOps<T>>(m: &mut Merger<'_, T, O>, iterator: &mut LevelIterator) {
    tracking::register_level(iterator.length(), LevelPath::Cache);

    iterator.begin();
    while !iterator.finished() {
        let a = iterator.next_range();
        let b = iterator.next_range();

        if m.compare(b.end - 1, a.start) == Ordering::Less {
            // B sorts entirely before A.
            m.rotate(Range::new(a.start, b.end), a.end, CacheUse::Allowed);
        } else if m.compare(a.end - 1, a.end) == Ordering::Greater {
            m.stage(MergeStrategy::External, a);
            m.merge_staged(MergeStrategy::External, a, b.end);
        }
    }
}

/// Merges every A+B pair of the level around internal buffers.
fn merge_level_in_place<T: Clone, O: SortOps<T>>(m: &mut Merger<'_, T, O>, iterator: &mut LevelIterator) {
    let length = iterator.length();
    tracking::register_level(length, LevelPath::InPlace);

    let block_size = length.isqrt();
    let buffer_size = length / block_size + 1;

    let mut buffers = InternalBuffers::find(m, iterator, block_size, buffer_size);
    buffers.pull_out(m);

    // Fewer distinct values than hoped for means fewer, larger blocks.
    let buffer1 = buffers.buffer1;
    let buffer2 = buffers.buffer2;
    let block_size = length / buffer1.len() + 1;

    iterator.begin();
    while !iterator.finished() {
        let mut a = iterator.next_range();
        let mut b = iterator.next_range();
        if !buffers.trim(&mut a, &mut b) {
            continue;
        }

        if m.compare(b.end - 1, a.start) == Ordering::Less {
            m.rotate(Range::new(a.start, b.end), a.end, CacheUse::Allowed);
        } else if m.compare(a.end - 1, a.end) == Ordering::Greater {
            roll_blocks(m, a, b, block_size, buffer1, buffer2);
        }
    }

    // Merging left buffer2 permuted; buffer1 was restored tag by tag.
    m.insertion_sort(buffer2);
    buffers.redistribute(m);
}

/// Block-rolling merge of `a` with `b`.
///
/// A is cut into an uneven first block followed by blocks of `block_size`, each tagged by
/// exchanging its first value with the next value of `buffer1`. The tagged blocks are rolled
/// through B block by block. Whenever the smallest remaining A block belongs before the last B
/// block, it is dropped there and the previously dropped A block is merged with the B values that
/// now follow it.
fn roll_blocks<T: Clone, O: SortOps<T>>(
    m: &mut Merger<'_, T, O>,
    a: Range,
    b: Range,
    block_size: usize,
    buffer1: Range,
    buffer2: Range,
) {
    let capacity = m.cache.capacity();
    let mut block_a = a;
    let first_a = Range::new(a.start, a.start + a.len() % block_size);

    let mut index_a = buffer1.start;
    for index in (first_a.end..block_a.end).step_by(block_size) {
        m.exchange(index_a, index);
        index_a += 1;
    }
    debug_assert!(index_a <= buffer1.end, "more A blocks than tags");

    let mut last_a = first_a;
    let mut last_b = Range::empty_at(first_a.end);
    let mut block_b = Range::new(b.start, b.start + block_size.min(b.len()));
    block_a.start += first_a.len();

    let mut strategy = MergeStrategy::select(last_a.len(), capacity, buffer2);
    let block_strategy = MergeStrategy::select(block_size, capacity, buffer2);
    m.stage(strategy, last_a);

    let mut index_a = buffer1.start;
    if !block_a.is_empty() {
        loop {
            let drop_a = block_b.is_empty()
                || (!last_b.is_empty() && m.compare(last_b.end - 1, index_a) != Ordering::Less);

            if drop_a {
                let b_split = binary_first(m.seq, &m.seq[index_a], last_b, m.ops);
                let b_rem = last_b.end - b_split;

                // The block with the smallest tag is the next one in A's original order.
                let mut min_a = block_a.start;
                for find_a in (min_a + block_size..block_a.end).step_by(block_size) {
                    if m.compare(find_a, min_a) == Ordering::Less {
                        min_a = find_a;
                    }
                }
                m.swap_blocks(block_a.start, min_a, block_size);

                // Untag it.
                m.exchange(block_a.start, index_a);
                index_a += 1;

                m.merge_staged(strategy, last_a, b_split);

                if block_strategy.uses_scratch() {
                    // The A block's slots are free once it is staged, so the rest of the B block
                    // is swapped over them rather than rotated.
                    m.stage(block_strategy, Range::new(block_a.start, block_a.start + block_size));
                    m.swap_blocks(b_split, block_a.start + block_size - b_rem, b_rem);
                } else {
                    m.rotate(
                        Range::new(b_split, block_a.start + block_size),
                        block_a.start,
                        CacheUse::Allowed,
                    );
                }
                strategy = block_strategy;

                last_a = Range::new(block_a.start - b_rem, block_a.start + block_size - b_rem);
                last_b = Range::new(last_a.end, last_a.end + b_rem);

                block_a.start += block_size;
                if block_a.is_empty() {
                    break;
                }
            } else if block_b.len() < block_size {
                // The uneven last B block goes in front of the remaining A blocks. The cache may
                // still hold the previous A block.
                m.rotate(Range::new(block_a.start, block_b.end), block_b.start, CacheUse::Reserved);

                last_b = Range::new(block_a.start, block_a.start + block_b.len());
                block_a.start += block_b.len();
                block_a.end += block_b.len();
                block_b = Range::empty_at(block_a.end);
            } else {
                // Roll the leftmost A block past the next B block.
                m.swap_blocks(block_a.start, block_b.start, block_size);

                last_b = Range::new(block_a.start, block_a.start + block_size);
                block_a.start += block_size;
                block_a.end += block_size;
                block_b = Range::new(block_b.end, (block_b.end + block_size).min(b.end));
            }
        }
    }

    m.merge_staged(strategy, last_a, b.end);
}
