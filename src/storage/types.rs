//! Core data types for analog time-series storage
//!
//! - `TimeIndex`: a frame index along a discrete time axis
//! - `TimeValuePoint`: one sample paired with its time index

use serde::{Deserialize, Serialize};

/// A signed frame index along a discrete time axis
///
/// Carries no unit; mapping to wall-clock time is done elsewhere.
/// Only comparison and offsetting are supported.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TimeIndex(i64);

impl TimeIndex {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Raw frame number
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Index shifted by `delta` frames
    pub const fn offset(self, delta: i64) -> Self {
        Self(self.0 + delta)
    }
}

impl From<i64> for TimeIndex {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<TimeIndex> for i64 {
    fn from(index: TimeIndex) -> Self {
        index.0
    }
}

impl std::fmt::Display for TimeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single sample: time index plus value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeValuePoint {
    pub time_index: TimeIndex,
    pub value: f32,
}

impl TimeValuePoint {
    pub fn new(time_index: TimeIndex, value: f32) -> Self {
        Self { time_index, value }
    }

    pub fn value(&self) -> f32 {
        self.value
    }
}

impl From<(TimeIndex, f32)> for TimeValuePoint {
    fn from((time_index, value): (TimeIndex, f32)) -> Self {
        Self { time_index, value }
    }
}
