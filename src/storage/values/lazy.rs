//! Lazily computed value storage
//!
//! A [`LazyViewValueStorage`] wraps a random-access [`IndexableRange`] and
//! evaluates it once per access, with no caching. Ranges compose through
//! [`IndexableRange::map`], so a transform such as z-score normalization over
//! an existing series costs nothing until a value is read:
//!
//! ```ignore
//! let normalized = series.view().map(move |p| (p.time_index, (p.value - mean) / std));
//! let storage = LazyViewValueStorage::new(normalized);
//! ```

use crate::series::AnalogTimeSeries;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::types::{TimeIndex, TimeValuePoint};
use crate::storage::values::{StorageKind, ValueStorage};
use std::sync::Arc;

/// Element of a lazy range that carries a sample value
pub trait SampleValue {
    fn sample_value(&self) -> f32;
}

impl SampleValue for f32 {
    fn sample_value(&self) -> f32 {
        *self
    }
}

impl SampleValue for TimeValuePoint {
    fn sample_value(&self) -> f32 {
        self.value
    }
}

impl SampleValue for (TimeIndex, f32) {
    fn sample_value(&self) -> f32 {
        self.1
    }
}

/// Random-access sequence with a known length
pub trait IndexableRange: Send + Sync {
    type Item: SampleValue;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index`
    ///
    /// # Panics
    /// May panic if `index >= self.len()`.
    fn get(&self, index: usize) -> Self::Item;

    /// Apply `f` to every element on access
    fn map<F, U>(self, f: F) -> Map<Self, F>
    where
        Self: Sized,
        F: Fn(Self::Item) -> U + Send + Sync,
        U: SampleValue,
    {
        Map { range: self, f }
    }
}

impl<T> IndexableRange for Vec<T>
where
    T: SampleValue + Clone + Send + Sync,
{
    type Item = T;

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get(&self, index: usize) -> T {
        self[index].clone()
    }
}

/// Range produced by [`IndexableRange::map`]
#[derive(Clone)]
pub struct Map<R, F> {
    range: R,
    f: F,
}

impl<R, F, U> IndexableRange for Map<R, F>
where
    R: IndexableRange,
    F: Fn(R::Item) -> U + Send + Sync,
    U: SampleValue,
{
    type Item = U;

    fn len(&self) -> usize {
        self.range.len()
    }

    fn get(&self, index: usize) -> U {
        (self.f)(self.range.get(index))
    }
}

/// Shared view over a series, yielding one [`TimeValuePoint`] per position
#[derive(Debug, Clone)]
pub struct SeriesView {
    series: Arc<AnalogTimeSeries>,
}

impl SeriesView {
    pub fn new(series: Arc<AnalogTimeSeries>) -> Self {
        Self { series }
    }

    pub fn series(&self) -> &Arc<AnalogTimeSeries> {
        &self.series
    }
}

impl IndexableRange for SeriesView {
    type Item = TimeValuePoint;

    fn len(&self) -> usize {
        self.series.num_samples()
    }

    fn get(&self, index: usize) -> TimeValuePoint {
        TimeValuePoint::new(
            self.series.time_index_at_position(index),
            self.series.value_at_position(index),
        )
    }
}

/// Object-safe face of an [`IndexableRange`]
trait ErasedRange: Send + Sync {
    fn value_at(&self, index: usize) -> f32;
}

impl<R: IndexableRange> ErasedRange for R {
    fn value_at(&self, index: usize) -> f32 {
        self.get(index).sample_value()
    }
}

/// Read-only backend that computes each value from a wrapped range
pub struct LazyViewValueStorage {
    view: Box<dyn ErasedRange>,
    num_samples: usize,
}

impl LazyViewValueStorage {
    /// Expose every element of `view`
    pub fn new<R>(view: R) -> Self
    where
        R: IndexableRange + 'static,
    {
        let num_samples = view.len();
        Self {
            view: Box::new(view),
            num_samples,
        }
    }

    /// Expose the first `num_samples` elements of `view`
    pub fn with_sample_count<R>(view: R, num_samples: usize) -> StorageResult<Self>
    where
        R: IndexableRange + 'static,
    {
        if num_samples > view.len() {
            return Err(StorageError::InvalidLayout(format!(
                "lazy view holds {} elements, {} requested",
                view.len(),
                num_samples
            )));
        }
        Ok(Self {
            view: Box::new(view),
            num_samples,
        })
    }
}

impl ValueStorage for LazyViewValueStorage {
    #[inline]
    fn value_at(&self, position: usize) -> f32 {
        assert!(
            position < self.num_samples,
            "position {} out of range for {} lazy samples",
            position,
            self.num_samples
        );
        self.view.value_at(position)
    }

    #[inline]
    fn len(&self) -> usize {
        self.num_samples
    }

    fn as_slice(&self) -> &[f32] {
        &[]
    }

    fn is_contiguous(&self) -> bool {
        false
    }

    fn storage_kind(&self) -> StorageKind {
        StorageKind::LazyView
    }
}

impl std::fmt::Debug for LazyViewValueStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyViewValueStorage")
            .field("num_samples", &self.num_samples)
            .finish_non_exhaustive()
    }
}
