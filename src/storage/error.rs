//! Storage error types
//!
//! Defines all errors that can occur while building analog time series
//! and their value backends.

use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in the storage layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A data file could not be opened
    #[error("Failed to open {path:?}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A data file was opened but could not be memory-mapped
    #[error("Failed to map {path:?}: {source}")]
    MapFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Values and time indices disagree on sample count
    #[error("Length mismatch: {values} values but {times} time indices")]
    LengthMismatch { values: usize, times: usize },

    /// Time indices are not strictly increasing
    #[error("Time indices must be strictly increasing: position {position} holds {current} after {previous}")]
    NonMonotonic {
        position: usize,
        previous: i64,
        current: i64,
    },

    /// A dense run of time indices extends past `i64::MAX`
    #[error("Time index overflow: {count} indices starting at {start}")]
    TimeIndexOverflow { start: i64, count: usize },

    /// Requested layout does not fit the backing file
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    /// Loader configuration rejected
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
