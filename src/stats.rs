//! Summary statistics over analog series
//!
//! Accumulation runs in `f64` with Welford's update, so long series do not
//! lose precision. Contiguous backends are read through their slice; other
//! backends through positional access.
//!
//! The approximate standard deviations read every `step`-th sample instead of
//! the whole series, which keeps page faults low on memory-mapped channels.

use crate::series::AnalogTimeSeries;
use crate::storage::types::TimeIndex;
use crate::storage::values::ValueStorage;
use serde::Serialize;
use std::ops::Range;

/// Count, mean, population standard deviation and extrema of a set of samples
///
/// An empty set has `NaN` mean and deviation and no extrema.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f32,
    pub std_dev: f32,
    pub min: Option<f32>,
    pub max: Option<f32>,
}

impl Summary {
    fn from_values(values: impl Iterator<Item = f32>) -> Self {
        let mut count = 0usize;
        let mut mean = 0.0f64;
        let mut m2 = 0.0f64;
        let mut min: Option<f32> = None;
        let mut max: Option<f32> = None;

        for value in values {
            count += 1;
            let x = f64::from(value);
            let delta = x - mean;
            mean += delta / count as f64;
            m2 += delta * (x - mean);
            min = Some(min.map_or(value, |m| m.min(value)));
            max = Some(max.map_or(value, |m| m.max(value)));
        }

        if count == 0 {
            return Self {
                count,
                mean: f32::NAN,
                std_dev: f32::NAN,
                min,
                max,
            };
        }

        Self {
            count,
            mean: mean as f32,
            std_dev: (m2 / count as f64).sqrt() as f32,
            min,
            max,
        }
    }
}

/// Summary of positions `[range.start, range.end)`, clamped to the series
pub fn summarize_positions(series: &AnalogTimeSeries, range: Range<usize>) -> Summary {
    let end = range.end.min(series.num_samples());
    let start = range.start.min(end);
    let values = series.values();

    if values.is_contiguous() {
        Summary::from_values(values.as_subslice(start, end).iter().copied())
    } else {
        Summary::from_values((start..end).map(|position| values.value_at(position)))
    }
}

/// Summary of the whole series
pub fn summarize(series: &AnalogTimeSeries) -> Summary {
    summarize_positions(series, 0..series.num_samples())
}

/// Summary of samples whose time index lies in `[start, end]`
pub fn summarize_time_range(series: &AnalogTimeSeries, start: TimeIndex, end: TimeIndex) -> Summary {
    match series.positions_in_range(start, end) {
        Some(positions) => summarize_positions(series, *positions.start()..*positions.end() + 1),
        None => summarize_positions(series, 0..0),
    }
}

pub fn mean(series: &AnalogTimeSeries) -> f32 {
    summarize(series).mean
}

/// Population standard deviation
pub fn std_dev(series: &AnalogTimeSeries) -> f32 {
    summarize(series).std_dev
}

/// Default share of samples read by [`std_dev_approximate`], in percent
pub const DEFAULT_SAMPLE_PERCENTAGE: f32 = 0.1;
/// Default sample count below which [`std_dev_approximate`] reads everything
pub const DEFAULT_MIN_SAMPLE_THRESHOLD: usize = 1000;

/// Population standard deviation of every `step`-th position in `range`
fn std_dev_systematic(series: &AnalogTimeSeries, range: Range<usize>, step: usize) -> f32 {
    let values = series.values();
    Summary::from_values(range.step_by(step.max(1)).map(|position| values.value_at(position)))
        .std_dev
}

/// Systematic-sampling estimate over positions `range`
///
/// Falls back to the exact value when the sample would hold fewer than
/// `min_sample_threshold` samples or would cover the whole range anyway.
fn std_dev_approximate_positions(
    series: &AnalogTimeSeries,
    range: Range<usize>,
    sample_percentage: f32,
    min_sample_threshold: usize,
) -> f32 {
    let len = range.len();
    let target = (len as f64 * f64::from(sample_percentage) / 100.0).ceil() as usize;
    if target == 0 || target < min_sample_threshold || target >= len {
        return summarize_positions(series, range).std_dev;
    }

    let step = len / target;
    tracing::trace!("Approximate std dev: {} of {} samples (step {})", len / step, len, step);
    std_dev_systematic(series, range, step)
}

/// Standard deviation estimated from `sample_percentage` percent of the samples
///
/// `sample_percentage` is a percentage, so `0.1` reads one sample in a
/// thousand. When that is fewer than `min_sample_threshold` samples the exact
/// [`std_dev`] is returned instead.
pub fn std_dev_approximate(
    series: &AnalogTimeSeries,
    sample_percentage: f32,
    min_sample_threshold: usize,
) -> f32 {
    std_dev_approximate_positions(
        series,
        0..series.num_samples(),
        sample_percentage,
        min_sample_threshold,
    )
}

/// [`std_dev_approximate`] restricted to time indices in `[start, end]`
pub fn std_dev_approximate_in_time_range(
    series: &AnalogTimeSeries,
    start: TimeIndex,
    end: TimeIndex,
    sample_percentage: f32,
    min_sample_threshold: usize,
) -> f32 {
    let range = match series.positions_in_range(start, end) {
        Some(positions) => *positions.start()..*positions.end() + 1,
        None => 0..0,
    };
    std_dev_approximate_positions(series, range, sample_percentage, min_sample_threshold)
}

/// Standard deviation from a growing systematic sample
///
/// Starts from `initial_sample_size` samples and doubles the sample until two
/// consecutive estimates differ by at most `convergence_tolerance` (relative)
/// or `max_sample_size` samples have been read. Series no longer than
/// `initial_sample_size` get the exact value.
pub fn std_dev_adaptive(
    series: &AnalogTimeSeries,
    initial_sample_size: usize,
    max_sample_size: usize,
    convergence_tolerance: f32,
) -> f32 {
    let len = series.num_samples();
    let initial = initial_sample_size.max(1);
    if len <= initial {
        return std_dev(series);
    }

    let max_sample_size = max_sample_size.clamp(initial, len);
    let mut sample_size = initial;
    let mut estimate = std_dev_systematic(series, 0..len, len / sample_size);

    while sample_size < max_sample_size {
        sample_size = (sample_size * 2).min(max_sample_size);
        let next = std_dev_systematic(series, 0..len, len / sample_size);
        let change = (next - estimate).abs();
        estimate = next;
        if change <= convergence_tolerance * estimate.abs() {
            tracing::trace!("Adaptive std dev converged at {} samples", sample_size);
            break;
        }
    }

    estimate
}

pub fn min(series: &AnalogTimeSeries) -> Option<f32> {
    summarize(series).min
}

pub fn max(series: &AnalogTimeSeries) -> Option<f32> {
    summarize(series).max
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::time_index::TimeIndexStorage;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn t(value: i64) -> TimeIndex {
        TimeIndex::new(value)
    }

    #[test]
    fn test_whole_series() {
        let series = AnalogTimeSeries::from_values(vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);

        assert_relative_eq!(mean(&series), 5.0);
        assert_relative_eq!(std_dev(&series), 2.0);
        assert_eq!(min(&series), Some(2.0));
        assert_eq!(max(&series), Some(9.0));
        assert_eq!(summarize(&series).count, 8);
    }

    #[test]
    fn test_empty_inputs() {
        let series = AnalogTimeSeries::empty();
        let summary = summarize(&series);

        assert_eq!(summary.count, 0);
        assert!(summary.mean.is_nan());
        assert!(summary.std_dev.is_nan());
        assert_eq!(summary.min, None);
        assert_eq!(summary.max, None);

        let series = AnalogTimeSeries::from_values(vec![1.0, 2.0]);
        assert_eq!(summarize_positions(&series, 2..1).count, 0);
        assert_eq!(summarize_time_range(&series, t(5), t(9)).count, 0);
    }

    #[test]
    fn test_position_range_is_clamped() {
        let series = AnalogTimeSeries::from_values(vec![1.0, 2.0, 3.0, 10.0]);

        let summary = summarize_positions(&series, 1..3);
        assert_eq!(summary.count, 2);
        assert_relative_eq!(summary.mean, 2.5);

        let summary = summarize_positions(&series, 2..100);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.max, Some(10.0));
    }

    #[test]
    fn test_time_range() {
        let series = AnalogTimeSeries::new(
            vec![10.0, 20.0, 30.0, 40.0, 50.0],
            [2, 4, 6, 8, 10].into_iter().map(TimeIndex::new).collect(),
        )
        .unwrap();

        let summary = summarize_time_range(&series, t(3), t(9));
        assert_eq!(summary.count, 3);
        assert_relative_eq!(summary.mean, 30.0);
        assert_eq!(summary.min, Some(20.0));
        assert_eq!(summary.max, Some(40.0));
    }

    #[test]
    fn test_lazy_and_owned_backends_agree() {
        let mut rng = StdRng::seed_from_u64(99);
        let values: Vec<f32> = (0..500).map(|_| rng.gen_range(-100.0..100.0)).collect();

        let owned = AnalogTimeSeries::from_values(values.clone());
        let times = TimeIndexStorage::dense(t(0), 500).unwrap();
        let lazy = AnalogTimeSeries::from_lazy_view(values, times).unwrap();
        assert!(!lazy.is_contiguous());

        let a = summarize_positions(&owned, 17..421);
        let b = summarize_positions(&lazy, 17..421);
        assert_eq!(a, b);
    }

    fn noisy_series(len: usize, seed: u64) -> AnalogTimeSeries {
        let mut rng = StdRng::seed_from_u64(seed);
        AnalogTimeSeries::from_values((0..len).map(|_| rng.gen_range(-50.0..50.0)).collect())
    }

    #[test]
    fn test_approximate_std_dev_tracks_exact_on_large_series() {
        let series = noisy_series(2_000_000, 5);
        let exact = std_dev(&series);

        let approximate =
            std_dev_approximate(&series, DEFAULT_SAMPLE_PERCENTAGE, DEFAULT_MIN_SAMPLE_THRESHOLD);
        assert_ne!(approximate, exact);
        assert_relative_eq!(approximate, exact, max_relative = 0.05);

        let finer = std_dev_approximate(&series, 5.0, DEFAULT_MIN_SAMPLE_THRESHOLD);
        assert_relative_eq!(finer, exact, max_relative = 0.02);
    }

    #[test]
    fn test_approximate_std_dev_falls_back_below_threshold() {
        let series = noisy_series(50_000, 6);
        let exact = std_dev(&series);

        // 0.1% of 50k is 50 samples, under the 1000-sample floor
        assert_eq!(
            std_dev_approximate(&series, DEFAULT_SAMPLE_PERCENTAGE, DEFAULT_MIN_SAMPLE_THRESHOLD),
            exact
        );
        assert_eq!(std_dev_approximate(&series, 0.0, 0), exact);
        assert_eq!(std_dev_approximate(&series, 100.0, 10), exact);
        assert!(std_dev_approximate(&AnalogTimeSeries::empty(), 1.0, 10).is_nan());
    }

    #[test]
    fn test_approximate_std_dev_in_time_range() {
        let mut rng = StdRng::seed_from_u64(8);
        let len = 400_000;
        let values: Vec<f32> = (0..len).map(|_| rng.gen_range(0.0..10.0)).collect();
        let times: Vec<TimeIndex> = (0..len as i64).map(|i| t(i * 2)).collect();
        let series = AnalogTimeSeries::new(values, times).unwrap();

        let (start, end) = (t(100_000), t(700_000));
        let exact = summarize_time_range(&series, start, end).std_dev;

        let approximate = std_dev_approximate_in_time_range(&series, start, end, 1.0, 100);
        assert_relative_eq!(approximate, exact, max_relative = 0.05);

        let fallback = std_dev_approximate_in_time_range(
            &series,
            start,
            end,
            DEFAULT_SAMPLE_PERCENTAGE,
            DEFAULT_MIN_SAMPLE_THRESHOLD,
        );
        assert_eq!(fallback, exact);

        assert!(std_dev_approximate_in_time_range(&series, t(-9), t(-1), 1.0, 0).is_nan());
    }

    #[test]
    fn test_adaptive_std_dev() {
        let series = noisy_series(1_000_000, 9);
        let exact = std_dev(&series);

        let adaptive = std_dev_adaptive(&series, 100, 10_000, 0.001);
        assert_relative_eq!(adaptive, exact, max_relative = 0.05);

        let capped = std_dev_adaptive(&series, 100, 100, 0.0);
        assert_relative_eq!(capped, exact, max_relative = 0.25);

        let small = noisy_series(80, 10);
        assert_eq!(std_dev_adaptive(&small, 100, 10_000, 0.01), std_dev(&small));
    }

    #[test]
    fn test_approximate_std_dev_on_lazy_backend() {
        let values: Vec<f32> = (0..200_000).map(|i| ((i % 17) as f32) - 8.0).collect();
        let times = TimeIndexStorage::dense(t(0), values.len()).unwrap();
        let lazy = AnalogTimeSeries::from_lazy_view(values.clone(), times).unwrap();
        let owned = AnalogTimeSeries::from_values(values);

        assert_eq!(
            std_dev_approximate(&lazy, 2.0, 100),
            std_dev_approximate(&owned, 2.0, 100)
        );
    }

    #[test]
    fn test_large_offset_keeps_precision() {
        let values: Vec<f32> = (0..1000).map(|i| 10_000.0 + (i % 2) as f32).collect();
        let series = AnalogTimeSeries::from_values(values);

        assert_relative_eq!(mean(&series), 10_000.5);
        assert_relative_eq!(std_dev(&series), 0.5, epsilon = 1e-6);
    }
}
