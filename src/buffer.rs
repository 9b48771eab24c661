//! Internal buffers: runs of distinct values pulled out of the sequence and used as scratch.
//!
//! On every in-place level the first A/B pairs are scanned for runs of distinct values. Up to two
//! buffers are established:
//! - `buffer1` holds the tags that mark each A block during block rolling.
//! - `buffer2` is scratch space for merging blocks that do not fit into the cache.
//!
//! The values are gathered at the edge of their A range (or B range) with rotations, the level is
//! merged around them, and finally they are put back where they belong.

use crate::core::SortOps;
use crate::merge::{CacheUse, Merger};
use crate::range::{LevelIterator, Pull, PullDirection, Range};
use crate::search::{first_backward, first_forward, last_backward, last_forward};
use crate::tracking;
use cuneiform::cuneiform;

// The two pull records of a level, kept on one cache line.
#[cuneiform]
struct Pulls {
    data: [Pull; 2],
}

/// The buffers established for one level, and how to undo them.
pub(crate) struct InternalBuffers {
    pub buffer1: Range,
    pub buffer2: Range,
    pulls: Pulls,
}

impl InternalBuffers {
    /// Scans the level for `buffer_size` distinct values (twice that if blocks of `block_size` do
    /// not fit into the cache).
    ///
    /// If no run of `buffer_size` distinct values exists, `buffer1` is the longest run found and
    /// `buffer2` stays empty.
    pub fn find<T: Clone, O: SortOps<T>>(
        m: &mut Merger<'_, T, O>,
        iterator: &mut LevelIterator,
        block_size: usize,
        buffer_size: usize,
    ) -> Self {
        let cache_fits_block = m.cache.fits(block_size);
        let full = buffer_size * 2;

        let mut buffer1 = Range::default();
        let mut buffer2 = Range::default();
        let mut pulls = Pulls {
            data: [Pull::default(); 2],
        };
        let mut pull_index = 0;

        let mut find = full;
        let mut find_separately = false;
        if cache_fits_block {
            // Blocks are merged through the cache, only the tag buffer is needed.
            find = buffer_size;
        } else if find > iterator.length() {
            // Both buffers cannot come out of the same A or B range.
            find = buffer_size;
            find_separately = true;
        }

        iterator.begin();
        while !iterator.finished() {
            let a = iterator.next_range();
            let b = iterator.next_range();
            let span = Range::new(a.start, b.end);

            // Distinct values at the start of A, pulled to the left.
            let (last, count) = scan_forward(m, a, find);
            if count >= buffer_size {
                pulls.data[pull_index] = Pull {
                    range: span,
                    count,
                    from: last,
                    to: a.start,
                };
                pull_index = 1;

                if count == full {
                    buffer1 = Range::new(a.start, a.start + buffer_size);
                    buffer2 = Range::new(a.start + buffer_size, a.start + count);
                    break;
                } else if find == full {
                    buffer1 = Range::new(a.start, a.start + count);
                    find = buffer_size;
                } else if cache_fits_block {
                    buffer1 = Range::new(a.start, a.start + count);
                    break;
                } else if find_separately {
                    buffer1 = Range::new(a.start, a.start + count);
                    find_separately = false;
                } else {
                    buffer2 = Range::new(a.start, a.start + count);
                    break;
                }
            } else if pull_index == 0 && count > buffer1.len() {
                buffer1 = Range::new(a.start, a.start + count);
                pulls.data[0] = Pull {
                    range: span,
                    count,
                    from: last,
                    to: a.start,
                };
            }

            // Distinct values at the end of B, pulled to the right.
            let (last, count) = scan_backward(m, b, find);
            if count >= buffer_size {
                pulls.data[pull_index] = Pull {
                    range: span,
                    count,
                    from: last,
                    to: b.end,
                };
                pull_index = 1;

                if count == full {
                    buffer1 = Range::new(b.end - count, b.end - buffer_size);
                    buffer2 = Range::new(b.end - buffer_size, b.end);
                    break;
                } else if find == full {
                    buffer1 = Range::new(b.end - count, b.end);
                    find = buffer_size;
                } else if cache_fits_block {
                    buffer1 = Range::new(b.end - count, b.end);
                    break;
                } else if find_separately {
                    buffer1 = Range::new(b.end - count, b.end);
                    find_separately = false;
                } else {
                    // buffer1 came out of this pair's A range: its values must not be put back
                    // past buffer2.
                    if pulls.data[0].range.start == a.start {
                        pulls.data[0].range.end -= pulls.data[1].count;
                    }
                    buffer2 = Range::new(b.end - count, b.end);
                    break;
                }
            } else if pull_index == 0 && count > buffer1.len() {
                buffer1 = Range::new(b.end - count, b.end);
                pulls.data[0] = Pull {
                    range: span,
                    count,
                    from: last,
                    to: b.end,
                };
            }
        }

        tracking::register_buffers(buffer1.len(), buffer2.len());

        Self {
            buffer1,
            buffer2,
            pulls,
        }
    }

    /// Gathers the distinct values recorded by each pull at its range edge.
    pub fn pull_out<T: Clone, O: SortOps<T>>(&mut self, m: &mut Merger<'_, T, O>) {
        for pull in self.pulls.data.iter_mut() {
            let length = pull.count;

            match pull.direction() {
                PullDirection::Left => {
                    let mut index = pull.from;
                    for count in 1..length {
                        let search = Range::new(pull.to, pull.from - (count - 1));
                        index = first_backward(m.seq, &m.seq[index - 1], search, length - count, m.ops);
                        let range = Range::new(index + 1, pull.from + 1);
                        m.rotate(range, range.end - count, CacheUse::Allowed);
                        pull.from = index + count;
                    }
                }
                PullDirection::Right => {
                    let mut index = pull.from + 1;
                    for count in 1..length {
                        let search = Range::new(index, pull.to);
                        index = last_forward(m.seq, &m.seq[index], search, length - count, m.ops);
                        let range = Range::new(pull.from, index - 1);
                        m.rotate(range, range.start + count, CacheUse::Allowed);
                        pull.from = index - 1 - count;
                    }
                }
                PullDirection::None => {}
            }
        }
    }

    /// Shrinks a level's A and B ranges so they exclude any buffer pulled out of them.
    ///
    /// Returns `false` when a buffer took up the whole of A or B, leaving nothing to merge.
    pub fn trim(&self, a: &mut Range, b: &mut Range) -> bool {
        let start = a.start;
        for pull in self.pulls.data.iter() {
            if pull.range.start != start {
                continue;
            }
            match pull.direction() {
                PullDirection::Left => {
                    a.start += pull.count;
                    if a.is_empty() {
                        return false;
                    }
                }
                PullDirection::Right => {
                    b.end -= pull.count;
                    if b.is_empty() {
                        return false;
                    }
                }
                PullDirection::None => {}
            }
        }
        true
    }

    /// Puts the buffered values back into their ranges.
    ///
    /// `buffer2` must have been sorted first; `buffer1` is back in order once every tag is
    /// restored.
    pub fn redistribute<T: Clone, O: SortOps<T>>(&self, m: &mut Merger<'_, T, O>) {
        for pull in self.pulls.data.iter() {
            let mut unique = pull.count * 2;

            match pull.direction() {
                PullDirection::Left => {
                    let mut buffer = Range::new(pull.range.start, pull.range.start + pull.count);
                    while !buffer.is_empty() {
                        let search = Range::new(buffer.end, pull.range.end);
                        let index = first_forward(m.seq, &m.seq[buffer.start], search, unique, m.ops);
                        let amount = index - buffer.end;

                        m.rotate(Range::new(buffer.start, index), buffer.end, CacheUse::Allowed);
                        buffer.start += amount + 1;
                        buffer.end += amount;
                        unique -= 2;
                    }
                }
                PullDirection::Right => {
                    let mut buffer = Range::new(pull.range.end - pull.count, pull.range.end);
                    while !buffer.is_empty() {
                        let search = Range::new(pull.range.start, buffer.start);
                        let index = last_backward(m.seq, &m.seq[buffer.end - 1], search, unique, m.ops);
                        let amount = buffer.start - index;

                        m.rotate(Range::new(index, buffer.end), buffer.start, CacheUse::Allowed);
                        buffer.start -= amount;
                        buffer.end -= amount + 1;
                        unique -= 2;
                    }
                }
                PullDirection::None => {}
            }
        }
    }
}

/// Counts distinct values from the start of `a`, up to `find`.
///
/// Returns the index of the last distinct value reached and how many were found.
fn scan_forward<T: Clone, O: SortOps<T>>(m: &mut Merger<'_, T, O>, a: Range, find: usize) -> (usize, usize) {
    let mut last = a.start;
    let mut count = 1;
    while count < find {
        let search = Range::new(last + 1, a.end);
        let index = last_forward(m.seq, &m.seq[last], search, find - count, m.ops);
        if index == a.end {
            break;
        }
        last = index;
        count += 1;
    }
    (last, count)
}

/// Counts distinct values from the end of `b`, up to `find`.
fn scan_backward<T: Clone, O: SortOps<T>>(m: &mut Merger<'_, T, O>, b: Range, find: usize) -> (usize, usize) {
    let mut last = b.end - 1;
    let mut count = 1;
    while count < find {
        let search = Range::new(b.start, last);
        let index = first_backward(m.seq, &m.seq[last], search, find - count, m.ops);
        if index == b.start {
            break;
        }
        last = index - 1;
        count += 1;
    }
    (last, count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Natural;

    fn is_sorted(seq: &[u32]) -> bool {
        seq.windows(2).all(|w| w[0] <= w[1])
    }

    #[test]
    fn test_scans_count_distinct_values() {
        let mut seq: Vec<u32> = vec![1, 1, 2, 3, 3, 3, 4, 9];
        let mut ops = Natural;
        let mut m = Merger::new(&mut seq, &mut ops, 0);

        assert_eq!(scan_forward(&mut m, Range::new(0, 8), 3), (3, 3));
        assert_eq!(scan_forward(&mut m, Range::new(0, 8), 10), (7, 5));
        // From the back: 9, 4, then the last 3 before the run of 4s.
        assert_eq!(scan_backward(&mut m, Range::new(0, 8), 3), (5, 3));
        assert_eq!(scan_backward(&mut m, Range::new(0, 8), 10).1, 5);
    }

    #[test]
    fn test_no_buffer_in_equal_values() {
        let mut seq: Vec<u32> = vec![7; 64];
        let mut ops = Natural;
        let mut m = Merger::new(&mut seq, &mut ops, 0);
        let mut iter = LevelIterator::new(64, 16);

        let buffers = InternalBuffers::find(&mut m, &mut iter, 4, 5);
        assert_eq!(buffers.buffer1.len(), 1);
        assert!(buffers.buffer2.is_empty());
        assert!(buffers.pulls.data.iter().all(|p| p.direction() == PullDirection::None));
    }

    #[test]
    fn test_pull_out_then_redistribute() {
        // Two sorted runs of 16 with duplicates, both buffers come out of the first A range.
        let a: Vec<u32> = vec![0, 0, 1, 2, 2, 3, 4, 5, 5, 6, 7, 8, 9, 10, 11, 12];
        let b: Vec<u32> = vec![0, 1, 1, 1, 2, 3, 3, 3, 4, 4, 4, 5, 6, 6, 6, 6];
        let mut seq: Vec<u32> = a.iter().chain(b.iter()).copied().collect();
        let mut expected = seq.clone();
        expected.sort();

        let mut ops = Natural;
        let mut m = Merger::new(&mut seq, &mut ops, 0);
        let mut iter = LevelIterator::new(32, 16);

        let mut buffers = InternalBuffers::find(&mut m, &mut iter, 4, 5);
        assert_eq!(buffers.buffer1, Range::new(0, 5));
        assert_eq!(buffers.buffer2, Range::new(5, 10));

        buffers.pull_out(&mut m);
        let gathered: Vec<u32> = m.seq[..10].to_vec();
        assert_eq!(gathered, (0..10).collect::<Vec<u32>>());
        assert!(is_sorted(&m.seq[10..16]));

        let (mut ra, mut rb) = (Range::new(0, 16), Range::new(16, 32));
        assert!(buffers.trim(&mut ra, &mut rb));
        assert_eq!(ra, Range::new(10, 16));
        assert_eq!(rb, Range::new(16, 32));

        // Merge what is left of the level, then put the buffered values back.
        m.insertion_sort(Range::new(10, 32));
        buffers.redistribute(&mut m);
        assert_eq!(seq, expected);
    }
}
