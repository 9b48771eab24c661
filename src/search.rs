//! Binary searches and block-skipping searches over a sorted range.
//!
//! The block-skipping variants take a `unique` hint: the number of distinct values the caller
//! expects to find in the range. They stride through the range in steps of `len / unique` and
//! finish with a binary search inside the block that contains the answer, which costs far fewer
//! comparisons than a plain binary search when the answer is usually near the starting edge.

use crate::core::SortOps;
use crate::range::Range;
use std::cmp::Ordering;

/// Index of the first element in `range` that is not less than `value`.
pub(crate) fn binary_first<T, O: SortOps<T>>(seq: &[T], value: &T, range: Range, ops: &mut O) -> usize {
    let (mut first, mut last) = (range.start, range.end);
    while first < last {
        let mid = first + (last - first) / 2;
        if ops.compare(&seq[mid], value) == Ordering::Less {
            first = mid + 1;
        } else {
            last = mid;
        }
    }
    first
}

/// Index of the first element in `range` that is greater than `value`.
pub(crate) fn binary_last<T, O: SortOps<T>>(seq: &[T], value: &T, range: Range, ops: &mut O) -> usize {
    let (mut first, mut last) = (range.start, range.end);
    while first < last {
        let mid = first + (last - first) / 2;
        if ops.compare(&seq[mid], value) != Ordering::Greater {
            first = mid + 1;
        } else {
            last = mid;
        }
    }
    first
}

#[inline(always)]
fn skip_for(range: Range, unique: usize) -> usize {
    (range.len() / unique.max(1)).max(1)
}

/// Same answer as [`binary_first`], searching from the start of `range`.
pub(crate) fn first_forward<T, O: SortOps<T>>(
    seq: &[T],
    value: &T,
    range: Range,
    unique: usize,
    ops: &mut O,
) -> usize {
    if range.is_empty() {
        return range.start;
    }

    let skip = skip_for(range, unique);
    let mut index = range.start + skip;
    while ops.compare(&seq[index - 1], value) == Ordering::Less {
        if index >= range.end - skip {
            return binary_first(seq, value, Range::new(index, range.end), ops);
        }
        index += skip;
    }

    binary_first(seq, value, Range::new(index - skip, index), ops)
}

/// Same answer as [`binary_last`], searching from the start of `range`.
pub(crate) fn last_forward<T, O: SortOps<T>>(
    seq: &[T],
    value: &T,
    range: Range,
    unique: usize,
    ops: &mut O,
) -> usize {
    if range.is_empty() {
        return range.start;
    }

    let skip = skip_for(range, unique);
    let mut index = range.start + skip;
    while ops.compare(&seq[index - 1], value) != Ordering::Greater {
        if index >= range.end - skip {
            return binary_last(seq, value, Range::new(index, range.end), ops);
        }
        index += skip;
    }

    binary_last(seq, value, Range::new(index - skip, index), ops)
}

/// Same answer as [`binary_first`], searching from the end of `range`.
pub(crate) fn first_backward<T, O: SortOps<T>>(
    seq: &[T],
    value: &T,
    range: Range,
    unique: usize,
    ops: &mut O,
) -> usize {
    if range.is_empty() {
        return range.start;
    }

    let skip = skip_for(range, unique);
    let mut index = range.end - skip;
    while index > range.start && ops.compare(&seq[index - 1], value) != Ordering::Less {
        if index < range.start + skip {
            return binary_first(seq, value, Range::new(range.start, index), ops);
        }
        index -= skip;
    }

    binary_first(seq, value, Range::new(index, index + skip), ops)
}

/// Same answer as [`binary_last`], searching from the end of `range`.
pub(crate) fn last_backward<T, O: SortOps<T>>(
    seq: &[T],
    value: &T,
    range: Range,
    unique: usize,
    ops: &mut O,
) -> usize {
    if range.is_empty() {
        return range.start;
    }

    let skip = skip_for(range, unique);
    let mut index = range.end - skip;
    while index > range.start && ops.compare(&seq[index - 1], value) == Ordering::Greater {
        if index < range.start + skip {
            return binary_last(seq, value, Range::new(range.start, index), ops);
        }
        index -= skip;
    }

    binary_last(seq, value, Range::new(index, index + skip), ops)
}
