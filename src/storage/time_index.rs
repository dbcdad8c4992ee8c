//! Time index storage with dense and sparse representations
//!
//! Every analog series pairs its values positionally with a strictly
//! increasing sequence of [`TimeIndex`] values. Regularly sampled data is
//! stored as `start + count` with no per-sample memory; anything else keeps
//! the explicit index array. The choice is made once at construction.
//!
//! # Performance
//! - Boundary search: O(1) dense, O(log n) sparse
//! - Exact lookup: O(1) dense, O(log n) sparse
//! - Positional lookup: O(1)

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::types::TimeIndex;
use std::ops::RangeInclusive;

#[derive(Debug, Clone)]
enum Repr {
    /// `start, start + 1, ..., start + count - 1`
    Dense { start: TimeIndex, count: usize },
    /// Explicit strictly increasing indices
    Sparse(Vec<TimeIndex>),
}

/// Ordered set of time indices, one per stored sample
///
/// Dense and sparse layouts behave identically through this API; the layout
/// only affects memory use and lookup cost.
#[derive(Debug, Clone)]
pub struct TimeIndexStorage {
    repr: Repr,
}

impl TimeIndexStorage {
    /// Consecutive indices `start..start + count`
    ///
    /// Fails when the last index would not fit in an `i64`.
    pub fn dense(start: TimeIndex, count: usize) -> StorageResult<Self> {
        match dense_bounds(start, count) {
            Some((_, last)) if last > i128::from(i64::MAX) => {
                Err(StorageError::TimeIndexOverflow {
                    start: start.value(),
                    count,
                })
            }
            _ => Ok(Self {
                repr: Repr::Dense { start, count },
            }),
        }
    }

    /// Consecutive indices `0..count` for a sample count taken from a buffer or file
    pub(crate) fn zero_based(count: usize) -> Self {
        Self {
            repr: Repr::Dense {
                start: TimeIndex::new(0),
                count,
            },
        }
    }

    /// Storage with no samples
    pub fn empty() -> Self {
        Self::zero_based(0)
    }

    /// Build from explicit indices, validating strict monotonicity
    ///
    /// A consecutive ascending run is stored densely.
    pub fn from_indices(indices: Vec<TimeIndex>) -> StorageResult<Self> {
        if let Some(offending) = indices.windows(2).position(|pair| pair[1] <= pair[0]) {
            return Err(StorageError::NonMonotonic {
                position: offending + 1,
                previous: indices[offending].value(),
                current: indices[offending + 1].value(),
            });
        }

        Ok(Self::from_increasing(indices))
    }

    /// Build from indices already known to be strictly increasing
    pub(crate) fn from_increasing(indices: Vec<TimeIndex>) -> Self {
        let consecutive = match (indices.first(), indices.last()) {
            // Strictly increasing, so a span of len - 1 means no gaps.
            (Some(first), Some(last)) => {
                i128::from(last.value()) - i128::from(first.value()) == indices.len() as i128 - 1
            }
            _ => true,
        };

        if consecutive {
            let start = indices.first().copied().unwrap_or_default();
            Self {
                repr: Repr::Dense {
                    start,
                    count: indices.len(),
                },
            }
        } else {
            Self {
                repr: Repr::Sparse(indices),
            }
        }
    }

    /// Number of indices
    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::Dense { count, .. } => *count,
            Repr::Sparse(indices) => indices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index stored at `position`, if in range
    pub fn get(&self, position: usize) -> Option<TimeIndex> {
        match &self.repr {
            Repr::Dense { start, count } => {
                (position < *count).then(|| start.offset(position as i64))
            }
            Repr::Sparse(indices) => indices.get(position).copied(),
        }
    }

    pub fn first(&self) -> Option<TimeIndex> {
        self.get(0)
    }

    pub fn last(&self) -> Option<TimeIndex> {
        self.len().checked_sub(1).and_then(|p| self.get(p))
    }

    /// Smallest position whose index is `>= query`
    pub fn find_position_greater_or_equal(&self, query: TimeIndex) -> Option<usize> {
        match &self.repr {
            Repr::Dense { start, count } => {
                let (start, last) = dense_bounds(*start, *count)?;
                let query = i128::from(query.value());
                if query <= start {
                    Some(0)
                } else if query > last {
                    None
                } else {
                    Some((query - start) as usize)
                }
            }
            Repr::Sparse(indices) => {
                let position = indices.partition_point(|t| *t < query);
                (position < indices.len()).then_some(position)
            }
        }
    }

    /// Largest position whose index is `<= query`
    pub fn find_position_less_or_equal(&self, query: TimeIndex) -> Option<usize> {
        match &self.repr {
            Repr::Dense { start, count } => {
                let (start, last) = dense_bounds(*start, *count)?;
                let query = i128::from(query.value());
                if query < start {
                    None
                } else if query >= last {
                    Some(*count - 1)
                } else {
                    Some((query - start) as usize)
                }
            }
            Repr::Sparse(indices) => {
                let position = indices.partition_point(|t| *t <= query);
                position.checked_sub(1)
            }
        }
    }

    /// Position holding exactly `query`; nearest matches are rejected
    pub fn find_position_exact(&self, query: TimeIndex) -> Option<usize> {
        match &self.repr {
            Repr::Dense { start, count } => {
                let (start, last) = dense_bounds(*start, *count)?;
                let query = i128::from(query.value());
                (start..=last)
                    .contains(&query)
                    .then(|| (query - start) as usize)
            }
            Repr::Sparse(indices) => indices.binary_search(&query).ok(),
        }
    }

    /// Inclusive position bounds covering `[start, end]` in time
    ///
    /// Returns `None` when no stored index falls inside the interval,
    /// including when `start > end`.
    pub fn range_to_positions(
        &self,
        start: TimeIndex,
        end: TimeIndex,
    ) -> Option<RangeInclusive<usize>> {
        let first = self.find_position_greater_or_equal(start)?;
        let last = self.find_position_less_or_equal(end)?;
        (first <= last).then_some(first..=last)
    }

    /// Lazy view over positions `[start, end)`
    ///
    /// Bounds are clamped to the storage length.
    pub fn range(&self, start: usize, end: usize) -> TimeIndexRange<'_> {
        let end = end.min(self.len());
        TimeIndexRange {
            storage: self,
            start: start.min(end),
            end,
        }
    }

    /// Iterate over every stored index
    pub fn iter(&self) -> TimeIndexIter<'_> {
        self.range(0, self.len()).iter()
    }

    /// Materialize all indices
    pub fn to_vec(&self) -> Vec<TimeIndex> {
        match &self.repr {
            Repr::Dense { .. } => self.iter().collect(),
            Repr::Sparse(indices) => indices.clone(),
        }
    }
}

impl Default for TimeIndexStorage {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for TimeIndexStorage {
    fn eq(&self, other: &Self) -> bool {
        match (&self.repr, &other.repr) {
            (Repr::Dense { start: a, count: n }, Repr::Dense { start: b, count: m }) => {
                n == m && (*n == 0 || a == b)
            }
            _ => self.len() == other.len() && self.iter().eq(other.iter()),
        }
    }
}

/// First and last index of a dense run, widened so `start + count - 1` cannot overflow
fn dense_bounds(start: TimeIndex, count: usize) -> Option<(i128, i128)> {
    if count == 0 {
        return None;
    }
    let start = i128::from(start.value());
    Some((start, start + count as i128 - 1))
}

/// Positions `[start, end)` of a [`TimeIndexStorage`], produced on demand
#[derive(Debug, Clone, Copy)]
pub struct TimeIndexRange<'a> {
    storage: &'a TimeIndexStorage,
    start: usize,
    end: usize,
}

impl<'a> TimeIndexRange<'a> {
    /// A range yielding nothing
    pub fn empty(storage: &'a TimeIndexStorage) -> Self {
        Self {
            storage,
            start: 0,
            end: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Fresh iterator from the beginning of the range
    pub fn iter(&self) -> TimeIndexIter<'a> {
        let storage: &'a TimeIndexStorage = self.storage;
        let inner = match &storage.repr {
            Repr::Dense { start, .. } => IterRepr::Dense {
                start: *start,
                next: self.start,
                end: self.end,
            },
            Repr::Sparse(indices) => IterRepr::Sparse(indices[self.start..self.end].iter()),
        };
        TimeIndexIter { inner }
    }
}

impl<'a> IntoIterator for TimeIndexRange<'a> {
    type Item = TimeIndex;
    type IntoIter = TimeIndexIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for &TimeIndexRange<'a> {
    type Item = TimeIndex;
    type IntoIter = TimeIndexIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone)]
enum IterRepr<'a> {
    Dense {
        start: TimeIndex,
        next: usize,
        end: usize,
    },
    Sparse(std::slice::Iter<'a, TimeIndex>),
}

/// Iterator over time indices; dense indices are generated, sparse ones borrowed
#[derive(Debug, Clone)]
pub struct TimeIndexIter<'a> {
    inner: IterRepr<'a>,
}

impl Iterator for TimeIndexIter<'_> {
    type Item = TimeIndex;

    fn next(&mut self) -> Option<TimeIndex> {
        match &mut self.inner {
            IterRepr::Dense { start, next, end } => {
                if *next >= *end {
                    return None;
                }
                let index = start.offset(*next as i64);
                *next += 1;
                Some(index)
            }
            IterRepr::Sparse(iter) => iter.next().copied(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match &self.inner {
            IterRepr::Dense { next, end, .. } => end.saturating_sub(*next),
            IterRepr::Sparse(iter) => iter.len(),
        };
        (remaining, Some(remaining))
    }
}

impl DoubleEndedIterator for TimeIndexIter<'_> {
    fn next_back(&mut self) -> Option<TimeIndex> {
        match &mut self.inner {
            IterRepr::Dense { start, next, end } => {
                if *next >= *end {
                    return None;
                }
                *end -= 1;
                Some(start.offset(*end as i64))
            }
            IterRepr::Sparse(iter) => iter.next_back().copied(),
        }
    }
}

impl ExactSizeIterator for TimeIndexIter<'_> {}
