//! Owned in-memory value storage

use crate::storage::values::{StorageKind, ValueStorage};

/// Contiguous `Vec<f32>` backend
///
/// All slice access is a direct view into the owned buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorValueStorage {
    data: Vec<f32>,
}

impl VectorValueStorage {
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Underlying buffer
    pub fn as_vec(&self) -> &Vec<f32> {
        &self.data
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.data
    }
}

impl ValueStorage for VectorValueStorage {
    #[inline]
    fn value_at(&self, position: usize) -> f32 {
        self.data[position]
    }

    #[inline]
    fn len(&self) -> usize {
        self.data.len()
    }

    fn as_slice(&self) -> &[f32] {
        &self.data
    }

    fn is_contiguous(&self) -> bool {
        true
    }

    fn storage_kind(&self) -> StorageKind {
        StorageKind::Vector
    }
}

impl From<Vec<f32>> for VectorValueStorage {
    fn from(data: Vec<f32>) -> Self {
        Self::new(data)
    }
}
