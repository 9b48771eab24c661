//! Index ranges and the level-by-level range iterator.

/// A half-open interval `[start, end)` of sequence indices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Range {
    pub start: usize,
    pub end: usize,
}

impl Range {
    #[inline(always)]
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "invalid range {start}..{end}");
        Self { start, end }
    }

    /// An empty range positioned at `at`.
    #[inline(always)]
    pub fn empty_at(at: usize) -> Self {
        Self { start: at, end: at }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Which edge of its range an internal buffer was pulled to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PullDirection {
    /// Pulled to the start of an A range.
    Left,
    /// Pulled to the end of a B range.
    Right,
    /// Nothing was moved.
    None,
}

/// Provenance of the unique values pulled out to form an internal buffer.
///
/// `range` is the A+B span the values were taken from and must be redistributed back into.
/// `to` is the edge the values were gathered at, `from` the far end of the gathered run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Pull {
    pub range: Range,
    pub count: usize,
    pub from: usize,
    pub to: usize,
}

impl Pull {
    pub fn direction(&self) -> PullDirection {
        if self.to < self.from {
            PullDirection::Left
        } else if self.to > self.from {
            PullDirection::Right
        } else {
            PullDirection::None
        }
    }
}

/// Splits `[0, size)` into adjacent ranges of near-equal length, doubling the length each level.
///
/// The range length is tracked as an integer part plus a `numerator / denominator` fraction, so
/// boundaries never drift and two ranges on one level differ in length by at most one.
///
/// ```
/// use blocksort::range::LevelIterator;
///
/// let mut iter = LevelIterator::new(17, 4);
/// let mut ranges = Vec::new();
/// while !iter.finished() {
///     let r = iter.next_range();
///     ranges.push((r.start, r.end));
/// }
/// assert_eq!(ranges, vec![(0, 4), (4, 8), (8, 12), (12, 17)]);
/// ```
#[derive(Clone, Debug)]
pub struct LevelIterator {
    size: usize,
    decimal: usize,
    numerator: usize,
    denominator: usize,
    decimal_step: usize,
    numerator_step: usize,
}

impl LevelIterator {
    /// Creates an iterator whose first level has ranges of about `min_level` elements.
    ///
    /// `min_level` must be a power of two no larger than `size`.
    pub fn new(size: usize, min_level: usize) -> Self {
        debug_assert!(min_level.is_power_of_two());
        debug_assert!(min_level <= size);

        let power_of_two = floor_power_of_two(size);
        let denominator = (power_of_two / min_level).max(1);

        Self {
            size,
            decimal: 0,
            numerator: 0,
            denominator,
            decimal_step: size / denominator,
            numerator_step: size % denominator,
        }
    }

    /// Rewinds to the first range of the current level.
    pub fn begin(&mut self) {
        self.numerator = 0;
        self.decimal = 0;
    }

    pub fn finished(&self) -> bool {
        self.decimal >= self.size
    }

    /// Integer part of the range length on the current level.
    pub fn length(&self) -> usize {
        self.decimal_step
    }

    pub fn next_range(&mut self) -> Range {
        let start = self.decimal;

        self.decimal += self.decimal_step;
        self.numerator += self.numerator_step;
        if self.numerator >= self.denominator {
            self.numerator -= self.denominator;
            self.decimal += 1;
        }

        Range::new(start, self.decimal)
    }

    /// Doubles the range length. Returns `false` once a single range spans the whole sequence.
    pub fn next_level(&mut self) -> bool {
        self.decimal_step += self.decimal_step;
        self.numerator_step += self.numerator_step;
        if self.numerator_step >= self.denominator {
            self.numerator_step -= self.denominator;
            self.decimal_step += 1;
        }

        self.decimal_step < self.size
    }
}

/// Largest power of two that is `<= x`, or 0 for 0.
fn floor_power_of_two(x: usize) -> usize {
    if x == 0 {
        0
    } else {
        1 << (usize::BITS - 1 - x.leading_zeros())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level_ranges(iter: &mut LevelIterator) -> Vec<Range> {
        iter.begin();
        let mut out = Vec::new();
        while !iter.finished() {
            out.push(iter.next_range());
        }
        out
    }

    fn assert_partition(ranges: &[Range], size: usize) {
        assert_eq!(ranges.first().map(|r| r.start), Some(0));
        assert_eq!(ranges.last().map(|r| r.end), Some(size));
        for pair in ranges.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        let min = ranges.iter().map(Range::len).min().unwrap();
        let max = ranges.iter().map(Range::len).max().unwrap();
        assert!(max - min <= 1, "unbalanced ranges {min}..{max}");
    }

    #[test]
    fn test_floor_power_of_two() {
        assert_eq!(floor_power_of_two(0), 0);
        assert_eq!(floor_power_of_two(1), 1);
        assert_eq!(floor_power_of_two(17), 16);
        assert_eq!(floor_power_of_two(1024), 1024);
        assert_eq!(floor_power_of_two(1023), 512);
    }

    #[test]
    fn test_single_run_for_seventeen() {
        let mut iter = LevelIterator::new(17, 16);
        let ranges = level_ranges(&mut iter);
        assert_eq!(ranges, vec![Range::new(0, 17)]);
        assert!(!iter.next_level());
    }

    #[test]
    fn test_levels_partition_exactly() {
        for size in [16, 17, 31, 100, 1000, 1023, 1025, 4097, 12345] {
            let mut iter = LevelIterator::new(size, 16);
            loop {
                let ranges = level_ranges(&mut iter);
                assert_partition(&ranges, size);
                if iter.length() < size {
                    // Merge levels always pair A with B.
                    assert_eq!(ranges.len() % 2, 0, "odd range count for size {size}");
                }
                if !iter.next_level() {
                    break;
                }
            }
        }
    }

    #[test]
    fn test_length_doubles() {
        let mut iter = LevelIterator::new(1000, 16);
        assert_eq!(iter.length(), 31);
        assert!(iter.next_level());
        assert_eq!(iter.length(), 62);
        assert!(iter.next_level());
        assert_eq!(iter.length(), 125);
    }

    #[test]
    fn test_pull_direction() {
        let mut pull = Pull::default();
        assert_eq!(pull.direction(), PullDirection::None);
        pull.from = 10;
        pull.to = 4;
        assert_eq!(pull.direction(), PullDirection::Left);
        pull.to = 20;
        assert_eq!(pull.direction(), PullDirection::Right);
    }
}
