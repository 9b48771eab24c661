//! Core traits and types for blocksort.
//!
//! This module defines:
//! - [`SortOps`]: The trait the sorting engine drives. Every comparison, exchange and write the
//!   engine performs on the sequence goes through it.
//! - [`Natural`] and [`ByFn`]: Ready-made operations for `Ord` types and comparison closures.
//! - [`Counting`]: A wrapper that counts the operations of another [`SortOps`].

use std::cmp::Ordering;

/// The operations the block merge engine uses to inspect and mutate a sequence.
///
/// Only [`compare`](SortOps::compare) is required. The provided
/// [`exchange`](SortOps::exchange) and [`write_at`](SortOps::write_at) perform a plain
/// `slice::swap` and assignment; override them to instrument or redirect writes.
///
/// `compare` must be a total order and must stay the same for the whole sort. A comparator that
/// breaks this contract leaves the sequence in an unspecified (but fully initialized) order.
///
/// # Examples
///
/// Sorting in descending order while counting writes:
///
/// ```
/// use std::cmp::Ordering;
/// use blocksort::{block_sort_with, BlockSortConfig, SortOps};
///
/// struct Descending {
///     writes: usize,
/// }
///
/// impl SortOps<u32> for Descending {
///     fn compare(&mut self, a: &u32, b: &u32) -> Ordering {
///         b.cmp(a)
///     }
///
///     fn write_at(&mut self, value: u32, seq: &mut [u32], index: usize) {
///         self.writes += 1;
///         seq[index] = value;
///     }
/// }
///
/// let mut data = vec![1, 5, 3, 2, 4];
/// let mut ops = Descending { writes: 0 };
/// block_sort_with(&mut data, &mut ops, &BlockSortConfig::default());
///
/// assert_eq!(data, vec![5, 4, 3, 2, 1]);
/// ```
pub trait SortOps<T> {
    /// Compares two elements.
    fn compare(&mut self, a: &T, b: &T) -> Ordering;

    /// Swaps the elements at positions `i` and `j`.
    #[inline(always)]
    fn exchange(&mut self, seq: &mut [T], i: usize, j: usize) {
        seq.swap(i, j);
    }

    /// Overwrites position `index` with `value`.
    #[inline(always)]
    fn write_at(&mut self, value: T, seq: &mut [T], index: usize) {
        seq[index] = value;
    }
}

impl<T, O: SortOps<T> + ?Sized> SortOps<T> for &mut O {
    #[inline(always)]
    fn compare(&mut self, a: &T, b: &T) -> Ordering {
        (**self).compare(a, b)
    }

    #[inline(always)]
    fn exchange(&mut self, seq: &mut [T], i: usize, j: usize) {
        (**self).exchange(seq, i, j)
    }

    #[inline(always)]
    fn write_at(&mut self, value: T, seq: &mut [T], index: usize) {
        (**self).write_at(value, seq, index)
    }
}

/// Operations ordering elements by their [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Natural;

impl<T: Ord> SortOps<T> for Natural {
    #[inline(always)]
    fn compare(&mut self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

/// Operations ordering elements with a comparison closure.
#[derive(Clone, Copy, Debug)]
pub struct ByFn<F>(pub F);

/// Wraps a comparison closure into [`SortOps`].
///
/// ```
/// use blocksort::core::{by_fn, SortOps};
///
/// let mut ops = by_fn(|a: &i32, b: &i32| b.cmp(a));
/// assert!(ops.compare(&1, &2).is_gt());
/// ```
pub fn by_fn<T, F: FnMut(&T, &T) -> Ordering>(compare: F) -> ByFn<F> {
    ByFn(compare)
}

impl<T, F: FnMut(&T, &T) -> Ordering> SortOps<T> for ByFn<F> {
    #[inline(always)]
    fn compare(&mut self, a: &T, b: &T) -> Ordering {
        (self.0)(a, b)
    }
}

/// Operation totals recorded by [`Counting`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OpCounts {
    pub compares: usize,
    pub exchanges: usize,
    pub writes: usize,
}

impl OpCounts {
    /// Number of element positions modified, counting both sides of an exchange.
    pub fn touches(&self) -> usize {
        self.exchanges * 2 + self.writes
    }
}

/// Wraps another [`SortOps`] and counts every operation it forwards.
///
/// ```
/// use blocksort::core::{Counting, Natural};
/// use blocksort::{block_sort_with, BlockSortConfig};
///
/// let mut data: Vec<u32> = (0..1000).collect();
/// let mut ops = Counting::new(Natural);
/// block_sort_with(&mut data, &mut ops, &BlockSortConfig::default());
///
/// // Already sorted input is never modified.
/// assert_eq!(ops.counts().touches(), 0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Counting<O> {
    inner: O,
    counts: OpCounts,
}

impl<O> Counting<O> {
    pub fn new(inner: O) -> Self {
        Self {
            inner,
            counts: OpCounts::default(),
        }
    }

    pub fn counts(&self) -> OpCounts {
        self.counts
    }

    /// Zeroes the totals, keeping the wrapped operations.
    pub fn reset(&mut self) {
        self.counts = OpCounts::default();
    }

    /// Unwraps the counted operations.
    pub fn into_inner(self) -> O {
        self.inner
    }
}

impl<T, O: SortOps<T>> SortOps<T> for Counting<O> {
    #[inline(always)]
    fn compare(&mut self, a: &T, b: &T) -> Ordering {
        self.counts.compares += 1;
        self.inner.compare(a, b)
    }

    #[inline(always)]
    fn exchange(&mut self, seq: &mut [T], i: usize, j: usize) {
        self.counts.exchanges += 1;
        self.inner.exchange(seq, i, j)
    }

    #[inline(always)]
    fn write_at(&mut self, value: T, seq: &mut [T], index: usize) {
        self.counts.writes += 1;
        self.inner.write_at(value, seq, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counting_reset_and_unwrap() {
        let mut ops = Counting::new(by_fn(|a: &u32, b: &u32| b.cmp(a)));
        let mut seq = vec![1u32, 2, 3];

        assert!(ops.compare(&seq[0], &seq[1]).is_gt());
        ops.exchange(&mut seq, 0, 2);
        ops.write_at(9, &mut seq, 1);
        assert_eq!(
            ops.counts(),
            OpCounts {
                compares: 1,
                exchanges: 1,
                writes: 1
            }
        );
        assert_eq!(ops.counts().touches(), 3);
        assert_eq!(seq, vec![3, 9, 1]);

        ops.reset();
        assert_eq!(ops.counts(), OpCounts::default());

        let mut inner = ops.into_inner();
        assert!(inner.compare(&1, &2).is_gt());
    }
}
