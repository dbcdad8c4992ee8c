//! Analog time series
//!
//! An [`AnalogTimeSeries`] pairs a [`TimeIndexStorage`] with one value
//! backend, position for position. Queries resolve time indices to positions
//! through the time storage and then read values through the backend:
//!
//! ```text
//! time query [s, e] ──► range_to_positions ──► [first, last] ──► values
//!                                                 │
//!                          contiguous backend ────┼──► zero-copy &[f32]
//!                          any backend ───────────┴──► TimeValueRange
//! ```
//!
//! The sample count is fixed at construction. Values of the owned vector
//! backend can be overwritten in place; other backends are read-only.

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::time_index::{TimeIndexIter, TimeIndexRange, TimeIndexStorage};
use crate::storage::types::{TimeIndex, TimeValuePoint};
use crate::storage::values::{
    AnalogValues, IndexableRange, LazyViewValueStorage, MemoryMappedValueStorage,
    MmapStorageConfig, SeriesView, StorageKind, ValueStorage, VectorValueStorage,
};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::sync::Arc;

/// Sampled analog signal: strictly increasing time indices plus one `f32` per index
#[derive(Debug)]
pub struct AnalogTimeSeries {
    time_storage: TimeIndexStorage,
    values: AnalogValues,
}

impl AnalogTimeSeries {
    /// Series with no samples
    pub fn empty() -> Self {
        Self::from_values(Vec::new())
    }

    /// Values with explicit time indices
    ///
    /// Fails when the lengths differ or the indices are not strictly
    /// increasing.
    pub fn new(values: Vec<f32>, time_indices: Vec<TimeIndex>) -> StorageResult<Self> {
        if values.len() != time_indices.len() {
            return Err(StorageError::LengthMismatch {
                values: values.len(),
                times: time_indices.len(),
            });
        }
        let time_storage = TimeIndexStorage::from_indices(time_indices)?;
        Ok(Self {
            time_storage,
            values: VectorValueStorage::new(values).into(),
        })
    }

    /// Values at implied time indices `0..values.len()`
    pub fn from_values(values: Vec<f32>) -> Self {
        let time_storage = TimeIndexStorage::zero_based(values.len());
        Self {
            time_storage,
            values: VectorValueStorage::new(values).into(),
        }
    }

    /// Values at implied time indices `0..num_samples`
    pub fn with_sample_count(values: Vec<f32>, num_samples: usize) -> StorageResult<Self> {
        if values.len() != num_samples {
            return Err(StorageError::LengthMismatch {
                values: values.len(),
                times: num_samples,
            });
        }
        Ok(Self::from_values(values))
    }

    /// Series from an ordered `time -> value` map
    pub fn from_map(samples: &BTreeMap<i64, f32>) -> Self {
        let time_indices = samples.keys().copied().map(TimeIndex::new).collect();
        let values = samples.values().copied().collect();
        Self {
            time_storage: TimeIndexStorage::from_increasing(time_indices),
            values: VectorValueStorage::new(values).into(),
        }
    }

    /// Owned values with a prebuilt time storage
    pub fn with_time_storage(
        values: Vec<f32>,
        time_storage: TimeIndexStorage,
    ) -> StorageResult<Self> {
        Self::from_parts(VectorValueStorage::new(values).into(), time_storage)
    }

    /// Any backend with a prebuilt time storage of the same length
    pub fn from_parts(values: AnalogValues, time_storage: TimeIndexStorage) -> StorageResult<Self> {
        if values.len() != time_storage.len() {
            return Err(StorageError::LengthMismatch {
                values: values.len(),
                times: time_storage.len(),
            });
        }
        Ok(Self {
            time_storage,
            values,
        })
    }

    /// Map a binary file and serve its samples without loading them
    pub fn memory_mapped(
        config: MmapStorageConfig,
        time_storage: TimeIndexStorage,
    ) -> StorageResult<Self> {
        let storage = MemoryMappedValueStorage::open(config)?;
        Self::from_parts(storage.into(), time_storage)
    }

    /// Compute every value on access from `view`
    pub fn from_lazy_view<R>(view: R, time_storage: TimeIndexStorage) -> StorageResult<Self>
    where
        R: IndexableRange + 'static,
    {
        Self::from_parts(LazyViewValueStorage::new(view).into(), time_storage)
    }

    /// Number of samples
    pub fn num_samples(&self) -> usize {
        self.time_storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.num_samples() == 0
    }

    /// Value at `position`
    ///
    /// # Panics
    /// Panics if `position >= self.num_samples()`.
    pub fn value_at_position(&self, position: usize) -> f32 {
        assert!(
            position < self.num_samples(),
            "position {} out of range for {} samples",
            position,
            self.num_samples()
        );
        self.values.value_at(position)
    }

    /// Time index at `position`
    ///
    /// # Panics
    /// Panics if `position >= self.num_samples()`.
    pub fn time_index_at_position(&self, position: usize) -> TimeIndex {
        match self.time_storage.get(position) {
            Some(index) => index,
            None => panic!(
                "position {} out of range for {} samples",
                position,
                self.num_samples()
            ),
        }
    }

    pub fn get_value_at_position(&self, position: usize) -> Option<f32> {
        (position < self.num_samples()).then(|| self.values.value_at(position))
    }

    pub fn get_time_index_at_position(&self, position: usize) -> Option<TimeIndex> {
        self.time_storage.get(position)
    }

    /// Position holding exactly `time_index`
    pub fn find_position_for_time_index(&self, time_index: TimeIndex) -> Option<usize> {
        self.time_storage.find_position_exact(time_index)
    }

    /// First position whose time index is `>= query`
    pub fn find_position_greater_or_equal(&self, query: TimeIndex) -> Option<usize> {
        self.time_storage.find_position_greater_or_equal(query)
    }

    /// Last position whose time index is `<= query`
    pub fn find_position_less_or_equal(&self, query: TimeIndex) -> Option<usize> {
        self.time_storage.find_position_less_or_equal(query)
    }

    /// Value stored at exactly `time_index`
    pub fn value_at_time(&self, time_index: TimeIndex) -> Option<f32> {
        self.find_position_for_time_index(time_index)
            .map(|position| self.values.value_at(position))
    }

    /// Inclusive positions covering time indices `[start, end]`
    pub fn positions_in_range(
        &self,
        start: TimeIndex,
        end: TimeIndex,
    ) -> Option<RangeInclusive<usize>> {
        self.time_storage.range_to_positions(start, end)
    }

    /// Zero-copy values for time indices `[start, end]`
    ///
    /// Empty when no index falls in the range or the backend is not
    /// contiguous; use [`time_value_range`](Self::time_value_range) for
    /// backend-independent access.
    pub fn values_in_time_index_range(&self, start: TimeIndex, end: TimeIndex) -> &[f32] {
        match self.positions_in_range(start, end) {
            Some(positions) => self
                .values
                .as_subslice(*positions.start(), *positions.end() + 1),
            None => &[],
        }
    }

    /// `(time, value)` pairs for time indices `[start, end]`, on any backend
    pub fn time_value_range(&self, start: TimeIndex, end: TimeIndex) -> TimeValueRange<'_> {
        match self.positions_in_range(start, end) {
            Some(positions) => TimeValueRange {
                series: self,
                start: *positions.start(),
                end: *positions.end() + 1,
            },
            None => TimeValueRange {
                series: self,
                start: 0,
                end: 0,
            },
        }
    }

    /// Zero-copy values plus lazily generated time indices for `[start, end]`
    ///
    /// `values` is empty when the backend is not contiguous; `time_indices`
    /// always covers the resolved positions.
    pub fn time_value_span_pair(&self, start: TimeIndex, end: TimeIndex) -> TimeValueSpanPair<'_> {
        match self.positions_in_range(start, end) {
            Some(positions) => {
                let (first, end) = (*positions.start(), *positions.end() + 1);
                TimeValueSpanPair {
                    values: self.values.as_subslice(first, end),
                    time_indices: self.time_storage.range(first, end),
                }
            }
            None => TimeValueSpanPair {
                values: &[],
                time_indices: TimeIndexRange::empty(&self.time_storage),
            },
        }
    }

    /// Overwrite the values stored at each of `time_indices`
    ///
    /// Nothing is written when the slices differ in length or the backend is
    /// read-only. Time indices with no exact match are skipped. Returns the
    /// number of values written.
    pub fn overwrite_at_time_indexes(&mut self, values: &[f32], time_indices: &[TimeIndex]) -> usize {
        if values.len() != time_indices.len() {
            tracing::warn!(
                "Ignoring overwrite: {} values for {} time indices",
                values.len(),
                time_indices.len()
            );
            return 0;
        }

        let kind = self.values.storage_kind();
        let Some(buffer) = self.values.as_mut_slice() else {
            tracing::warn!("Ignoring overwrite: {} storage is read-only", kind);
            return 0;
        };

        let mut written = 0;
        for (&value, &time_index) in values.iter().zip(time_indices) {
            match self.time_storage.find_position_exact(time_index) {
                Some(position) => {
                    buffer[position] = value;
                    written += 1;
                }
                None => tracing::debug!("Skipping overwrite at missing time index {}", time_index),
            }
        }
        written
    }

    /// Overwrite the values stored at each of `positions`
    ///
    /// Same policy as [`overwrite_at_time_indexes`](Self::overwrite_at_time_indexes);
    /// positions past the end are skipped.
    pub fn overwrite_at_data_array_indexes(&mut self, values: &[f32], positions: &[usize]) -> usize {
        if values.len() != positions.len() {
            tracing::warn!(
                "Ignoring overwrite: {} values for {} positions",
                values.len(),
                positions.len()
            );
            return 0;
        }

        let kind = self.values.storage_kind();
        let Some(buffer) = self.values.as_mut_slice() else {
            tracing::warn!("Ignoring overwrite: {} storage is read-only", kind);
            return 0;
        };

        let mut written = 0;
        for (&value, &position) in values.iter().zip(positions) {
            match buffer.get_mut(position) {
                Some(slot) => {
                    *slot = value;
                    written += 1;
                }
                None => tracing::debug!("Skipping overwrite at position {} (out of range)", position),
            }
        }
        written
    }

    pub fn time_storage(&self) -> &TimeIndexStorage {
        &self.time_storage
    }

    /// Every time index, materialized
    pub fn time_indices(&self) -> Vec<TimeIndex> {
        self.time_storage.to_vec()
    }

    /// The value backend
    pub fn values(&self) -> &AnalogValues {
        &self.values
    }

    /// All values as one slice; empty unless the backend is contiguous
    pub fn as_slice(&self) -> &[f32] {
        self.values.as_slice()
    }

    /// Copy every value out of the backend
    pub fn to_values(&self) -> Vec<f32> {
        if self.values.is_contiguous() {
            return self.values.as_slice().to_vec();
        }
        (0..self.values.len())
            .map(|position| self.values.value_at(position))
            .collect()
    }

    pub fn storage_kind(&self) -> StorageKind {
        self.values.storage_kind()
    }

    pub fn is_contiguous(&self) -> bool {
        self.values.is_contiguous()
    }

    /// Iterate over every sample
    pub fn samples(&self) -> TimeValueIter<'_> {
        TimeValueRange {
            series: self,
            start: 0,
            end: self.num_samples(),
        }
        .iter()
    }

    /// Copy of this series backed by an owned vector
    pub fn materialize(&self) -> AnalogTimeSeries {
        Self {
            time_storage: self.time_storage.clone(),
            values: VectorValueStorage::new(self.to_values()).into(),
        }
    }

    /// Lazy view over this series for composing transforms
    pub fn view(self: &Arc<Self>) -> SeriesView {
        SeriesView::new(Arc::clone(self))
    }
}

impl Default for AnalogTimeSeries {
    fn default() -> Self {
        Self::empty()
    }
}

/// Restartable sequence of samples over a position range
#[derive(Debug, Clone, Copy)]
pub struct TimeValueRange<'a> {
    series: &'a AnalogTimeSeries,
    start: usize,
    end: usize,
}

impl<'a> TimeValueRange<'a> {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Fresh iterator from the first sample of the range
    pub fn iter(&self) -> TimeValueIter<'a> {
        let series: &'a AnalogTimeSeries = self.series;
        TimeValueIter {
            values: &series.values,
            times: series.time_storage.range(self.start, self.end).iter(),
            next: self.start,
            end: self.end,
        }
    }
}

impl<'a> IntoIterator for TimeValueRange<'a> {
    type Item = TimeValuePoint;
    type IntoIter = TimeValueIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for &TimeValueRange<'a> {
    type Item = TimeValuePoint;
    type IntoIter = TimeValueIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over [`TimeValuePoint`]s of a [`TimeValueRange`]
#[derive(Debug, Clone)]
pub struct TimeValueIter<'a> {
    values: &'a AnalogValues,
    times: TimeIndexIter<'a>,
    next: usize,
    end: usize,
}

impl Iterator for TimeValueIter<'_> {
    type Item = TimeValuePoint;

    fn next(&mut self) -> Option<TimeValuePoint> {
        let time_index = self.times.next()?;
        let value = self.values.value_at(self.next);
        self.next += 1;
        Some(TimeValuePoint::new(time_index, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.times.size_hint()
    }
}

impl DoubleEndedIterator for TimeValueIter<'_> {
    fn next_back(&mut self) -> Option<TimeValuePoint> {
        let time_index = self.times.next_back()?;
        self.end -= 1;
        Some(TimeValuePoint::new(time_index, self.values.value_at(self.end)))
    }
}

impl ExactSizeIterator for TimeValueIter<'_> {}

/// Zero-copy values alongside their lazily generated time indices
#[derive(Debug, Clone, Copy)]
pub struct TimeValueSpanPair<'a> {
    /// Empty when the backend is not contiguous
    pub values: &'a [f32],
    pub time_indices: TimeIndexRange<'a>,
}
