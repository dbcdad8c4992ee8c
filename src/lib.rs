//! # chronicle-analog
//!
//! Storage and query engine for sampled analog signals.
//!
//! ## Features
//!
//! - **Dense or sparse time indices**: regular sampling costs no per-sample memory
//! - **Boundary search**: O(1) dense, O(log n) sparse
//! - **Zero-copy ranges**: contiguous backends hand out slices of their buffer
//! - **Memory-mapped files**: typed, strided, scaled access to raw recordings
//! - **Lazy transforms**: compose per-sample transforms without materializing
//!
//! ## Modules
//!
//! - [`storage`]: time indices and value backends
//! - [`series`]: the [`AnalogTimeSeries`] query surface
//! - [`stats`]: summary statistics
//! - [`loader`]: flat binary file loading
//! - [`config`]: application configuration
//!
//! ## Quick Start
//!
//! ```rust
//! use chronicle_analog::{AnalogTimeSeries, TimeIndex};
//!
//! let series = AnalogTimeSeries::new(
//!     vec![10.0, 20.0, 30.0, 40.0, 50.0],
//!     [2, 4, 6, 8, 10].into_iter().map(TimeIndex::new).collect(),
//! )?;
//!
//! assert_eq!(
//!     series.values_in_time_index_range(TimeIndex::new(3), TimeIndex::new(9)),
//!     &[20.0, 30.0, 40.0]
//! );
//! for point in series.time_value_range(TimeIndex::new(3), TimeIndex::new(9)) {
//!     println!("{} -> {}", point.time_index, point.value);
//! }
//! # Ok::<(), chronicle_analog::StorageError>(())
//! ```

pub mod config;
pub mod loader;
pub mod series;
pub mod stats;
pub mod storage;

// Re-export top-level types for convenience
pub use storage::{
    AnalogValues, MemoryMappedValueStorage, MmapDataType, MmapStorageConfig, StorageError,
    StorageKind, StorageResult, TimeIndex, TimeIndexStorage, TimeValuePoint, ValueStorage,
    VectorValueStorage,
};

pub use series::{AnalogTimeSeries, TimeValueRange, TimeValueSpanPair};

pub use loader::{load_binary_analog, load_binary_analog_json, BinaryLoaderOptions};

pub use config::{Config, ConfigError, LoaderConfig, LoggingConfig};
