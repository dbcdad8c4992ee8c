//! Value storage backends
//!
//! Sample values live in one of three backends behind the [`ValueStorage`]
//! trait:
//!
//! - **vector**: owned contiguous `Vec<f32>`, zero-copy slices
//! - **mmap**: read-only file mapping with per-access type conversion
//! - **lazy**: computes each value on access from an upstream view
//!
//! Code that knows its backend type calls the trait statically. The series
//! aggregate holds an [`AnalogValues`] enum, which dispatches by `match`
//! rather than through a vtable; only [`AnalogValues::Custom`] goes through
//! a trait object.

pub mod lazy;
pub mod mmap;
pub mod vector;

pub use lazy::{IndexableRange, LazyViewValueStorage, Map, SampleValue, SeriesView};
pub use mmap::{MemoryMappedValueStorage, MmapDataType, MmapStorageConfig};
pub use vector::VectorValueStorage;

use serde::Serialize;

/// Runtime tag identifying a value backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    Vector,
    MemoryMapped,
    LazyView,
    Custom,
}

impl std::fmt::Display for StorageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageKind::Vector => write!(f, "vector"),
            StorageKind::MemoryMapped => write!(f, "memory_mapped"),
            StorageKind::LazyView => write!(f, "lazy_view"),
            StorageKind::Custom => write!(f, "custom"),
        }
    }
}

/// Read access to a positional sequence of `f32` samples
pub trait ValueStorage {
    /// Value at `position`
    ///
    /// # Panics
    /// May panic if `position >= self.len()`.
    fn value_at(&self, position: usize) -> f32;

    /// Number of samples
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All values as one slice; empty unless [`is_contiguous`](Self::is_contiguous)
    fn as_slice(&self) -> &[f32];

    /// Values at positions `[start, end)` as one slice
    ///
    /// Empty when the backend is not contiguous, when `start >= end`, or
    /// when `end > len`.
    fn as_subslice(&self, start: usize, end: usize) -> &[f32] {
        if !self.is_contiguous() || start >= end || end > self.len() {
            return &[];
        }
        &self.as_slice()[start..end]
    }

    /// Whether the values occupy one unbroken `f32` region in memory
    fn is_contiguous(&self) -> bool;

    fn storage_kind(&self) -> StorageKind;
}

/// The value backend owned by an analog series
pub enum AnalogValues {
    Vector(VectorValueStorage),
    MemoryMapped(MemoryMappedValueStorage),
    LazyView(LazyViewValueStorage),
    /// Caller-supplied backend
    Custom(Box<dyn ValueStorage + Send + Sync>),
}

impl AnalogValues {
    /// Mutable values, available only for the owned vector backend
    pub fn as_mut_slice(&mut self) -> Option<&mut [f32]> {
        match self {
            AnalogValues::Vector(storage) => Some(storage.as_mut_slice()),
            _ => None,
        }
    }
}

impl ValueStorage for AnalogValues {
    #[inline]
    fn value_at(&self, position: usize) -> f32 {
        match self {
            AnalogValues::Vector(s) => s.value_at(position),
            AnalogValues::MemoryMapped(s) => s.value_at(position),
            AnalogValues::LazyView(s) => s.value_at(position),
            AnalogValues::Custom(s) => s.value_at(position),
        }
    }

    #[inline]
    fn len(&self) -> usize {
        match self {
            AnalogValues::Vector(s) => s.len(),
            AnalogValues::MemoryMapped(s) => s.len(),
            AnalogValues::LazyView(s) => s.len(),
            AnalogValues::Custom(s) => s.len(),
        }
    }

    fn as_slice(&self) -> &[f32] {
        match self {
            AnalogValues::Vector(s) => s.as_slice(),
            AnalogValues::MemoryMapped(s) => s.as_slice(),
            AnalogValues::LazyView(s) => s.as_slice(),
            AnalogValues::Custom(s) => s.as_slice(),
        }
    }

    fn as_subslice(&self, start: usize, end: usize) -> &[f32] {
        match self {
            AnalogValues::Vector(s) => s.as_subslice(start, end),
            AnalogValues::MemoryMapped(s) => s.as_subslice(start, end),
            AnalogValues::LazyView(s) => s.as_subslice(start, end),
            AnalogValues::Custom(s) => s.as_subslice(start, end),
        }
    }

    fn is_contiguous(&self) -> bool {
        match self {
            AnalogValues::Vector(s) => s.is_contiguous(),
            AnalogValues::MemoryMapped(s) => s.is_contiguous(),
            AnalogValues::LazyView(s) => s.is_contiguous(),
            AnalogValues::Custom(s) => s.is_contiguous(),
        }
    }

    fn storage_kind(&self) -> StorageKind {
        match self {
            AnalogValues::Vector(s) => s.storage_kind(),
            AnalogValues::MemoryMapped(s) => s.storage_kind(),
            AnalogValues::LazyView(s) => s.storage_kind(),
            AnalogValues::Custom(s) => s.storage_kind(),
        }
    }
}

impl std::fmt::Debug for AnalogValues {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalogValues::Vector(s) => f.debug_tuple("Vector").field(s).finish(),
            AnalogValues::MemoryMapped(s) => f.debug_tuple("MemoryMapped").field(s).finish(),
            AnalogValues::LazyView(s) => f.debug_tuple("LazyView").field(s).finish(),
            AnalogValues::Custom(s) => f
                .debug_struct("Custom")
                .field("kind", &s.storage_kind())
                .field("len", &s.len())
                .finish(),
        }
    }
}

impl From<VectorValueStorage> for AnalogValues {
    fn from(storage: VectorValueStorage) -> Self {
        AnalogValues::Vector(storage)
    }
}

impl From<MemoryMappedValueStorage> for AnalogValues {
    fn from(storage: MemoryMappedValueStorage) -> Self {
        AnalogValues::MemoryMapped(storage)
    }
}

impl From<LazyViewValueStorage> for AnalogValues {
    fn from(storage: LazyViewValueStorage) -> Self {
        AnalogValues::LazyView(storage)
    }
}
