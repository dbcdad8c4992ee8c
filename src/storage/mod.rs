//! Analog storage
//!
//! - **types**: `TimeIndex` and `TimeValuePoint`
//! - **time_index**: dense/sparse time index storage with boundary search
//! - **values**: value backends (vector, memory-mapped, lazy view)
//! - **error**: error types
//!
//! # Architecture
//!
//! ```text
//! AnalogTimeSeries
//!   ├── TimeIndexStorage   Dense { start, count } | Sparse(Vec<TimeIndex>)
//!   └── AnalogValues       Vector | MemoryMapped | LazyView | Custom
//! ```

pub mod error;
pub mod time_index;
pub mod types;
pub mod values;

pub use error::{StorageError, StorageResult};
pub use time_index::{TimeIndexIter, TimeIndexRange, TimeIndexStorage};
pub use types::{TimeIndex, TimeValuePoint};
pub use values::{
    AnalogValues, IndexableRange, LazyViewValueStorage, MemoryMappedValueStorage, MmapDataType,
    MmapStorageConfig, SampleValue, SeriesView, StorageKind, ValueStorage, VectorValueStorage,
};
