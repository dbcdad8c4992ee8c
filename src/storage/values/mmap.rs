//! Memory-mapped value storage
//!
//! Serves samples straight out of a read-only mapping of a flat binary file.
//! Nothing is loaded up front; each access locates the raw element, decodes
//! it according to [`MmapDataType`] and applies `raw * scale + offset`.
//!
//! File layout:
//! ```text
//! ┌──────────────────────────────┐
//! │ HEADER (header_size bytes)   │  skipped
//! ├──────────────────────────────┤
//! │ e0 e1 e2 ... (little-endian) │  element i of sample p lives at
//! │                              │  offset + p * stride
//! └──────────────────────────────┘
//! ```
//!
//! With `stride = N` and `offset = c` one channel of an N-channel
//! interleaved recording is read without copying the others.

use crate::config::ConfigError;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::values::{StorageKind, ValueStorage};
use memmap2::Mmap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// On-disk element type of a binary channel file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MmapDataType {
    Float32,
    Float64,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
}

impl MmapDataType {
    /// Every supported element type
    pub fn all() -> &'static [MmapDataType] {
        &[
            MmapDataType::Float32,
            MmapDataType::Float64,
            MmapDataType::Int8,
            MmapDataType::UInt8,
            MmapDataType::Int16,
            MmapDataType::UInt16,
            MmapDataType::Int32,
            MmapDataType::UInt32,
        ]
    }

    /// Width of one element in bytes
    pub fn element_size(self) -> usize {
        match self {
            MmapDataType::Int8 | MmapDataType::UInt8 => 1,
            MmapDataType::Int16 | MmapDataType::UInt16 => 2,
            MmapDataType::Float32 | MmapDataType::Int32 | MmapDataType::UInt32 => 4,
            MmapDataType::Float64 => 8,
        }
    }

    /// Parse a configuration name, accepting `float` and `double` aliases
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "float32" | "float" => Some(MmapDataType::Float32),
            "float64" | "double" => Some(MmapDataType::Float64),
            "int8" => Some(MmapDataType::Int8),
            "uint8" => Some(MmapDataType::UInt8),
            "int16" => Some(MmapDataType::Int16),
            "uint16" => Some(MmapDataType::UInt16),
            "int32" => Some(MmapDataType::Int32),
            "uint32" => Some(MmapDataType::UInt32),
            _ => None,
        }
    }

    /// Parse a configuration name, falling back to `Int16` with a warning
    pub fn parse_or_default(name: &str) -> Self {
        Self::parse(name).unwrap_or_else(|| {
            tracing::warn!("Unknown data type {:?}, defaulting to int16", name);
            MmapDataType::Int16
        })
    }

    /// Decode one little-endian element into `f32`
    ///
    /// `bytes` must hold at least [`element_size`](Self::element_size) bytes.
    #[inline]
    pub(crate) fn decode(self, bytes: &[u8]) -> f32 {
        match self {
            MmapDataType::Float32 => f32::from_le_bytes(le_array(bytes)),
            MmapDataType::Float64 => f64::from_le_bytes(le_array(bytes)) as f32,
            MmapDataType::Int8 => bytes[0] as i8 as f32,
            MmapDataType::UInt8 => bytes[0] as f32,
            MmapDataType::Int16 => i16::from_le_bytes(le_array(bytes)) as f32,
            MmapDataType::UInt16 => u16::from_le_bytes(le_array(bytes)) as f32,
            MmapDataType::Int32 => i32::from_le_bytes(le_array(bytes)) as f32,
            MmapDataType::UInt32 => u32::from_le_bytes(le_array(bytes)) as f32,
        }
    }
}

#[inline]
fn le_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut buf = [0u8; N];
    buf.copy_from_slice(&bytes[..N]);
    buf
}

impl FromStr for MmapDataType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ConfigError::InvalidDataType(s.to_string()))
    }
}

impl std::fmt::Display for MmapDataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MmapDataType::Float32 => "float32",
            MmapDataType::Float64 => "float64",
            MmapDataType::Int8 => "int8",
            MmapDataType::UInt8 => "uint8",
            MmapDataType::Int16 => "int16",
            MmapDataType::UInt16 => "uint16",
            MmapDataType::Int32 => "int32",
            MmapDataType::UInt32 => "uint32",
        };
        write!(f, "{}", name)
    }
}

/// Number of samples a channel can hold
///
/// One sample per whole `stride`-element frame after the header,
/// `data_bytes / (element_size * stride)`, limited to the samples whose
/// element at `offset + p * stride` still lies inside the data.
pub(crate) fn sample_capacity(
    data_bytes: usize,
    element_size: usize,
    offset: usize,
    stride: usize,
) -> usize {
    if stride == 0 || element_size == 0 {
        return 0;
    }
    let available = data_bytes / element_size;
    if offset >= available {
        return 0;
    }
    let frames = available / stride;
    frames.min((available - offset).div_ceil(stride))
}

/// Layout and conversion settings for a memory-mapped channel
#[derive(Debug, Clone, PartialEq)]
pub struct MmapStorageConfig {
    /// Binary data file
    pub file_path: PathBuf,
    /// Bytes to skip at the start of the file
    pub header_size: usize,
    /// Elements to skip after the header
    pub offset: usize,
    /// Elements between consecutive samples
    pub stride: usize,
    /// Samples to expose (0 = everything the file holds)
    pub num_samples: usize,
    pub data_type: MmapDataType,
    pub scale_factor: f32,
    pub offset_value: f32,
}

impl Default for MmapStorageConfig {
    fn default() -> Self {
        Self {
            file_path: PathBuf::new(),
            header_size: 0,
            offset: 0,
            stride: 1,
            num_samples: 0,
            data_type: MmapDataType::Float32,
            scale_factor: 1.0,
            offset_value: 0.0,
        }
    }
}

impl MmapStorageConfig {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            ..Default::default()
        }
    }

    /// Builder: resolve a relative `file_path` against `parent_dir`
    pub fn relative_to(mut self, parent_dir: impl AsRef<Path>) -> Self {
        if self.file_path.is_relative() {
            self.file_path = parent_dir.as_ref().join(&self.file_path);
        }
        self
    }

    pub fn header_size(mut self, bytes: usize) -> Self {
        self.header_size = bytes;
        self
    }

    pub fn offset(mut self, elements: usize) -> Self {
        self.offset = elements;
        self
    }

    pub fn stride(mut self, elements: usize) -> Self {
        self.stride = elements;
        self
    }

    pub fn num_samples(mut self, samples: usize) -> Self {
        self.num_samples = samples;
        self
    }

    pub fn data_type(mut self, data_type: MmapDataType) -> Self {
        self.data_type = data_type;
        self
    }

    /// Builder: set the `raw * scale + offset` conversion
    pub fn conversion(mut self, scale_factor: f32, offset_value: f32) -> Self {
        self.scale_factor = scale_factor;
        self.offset_value = offset_value;
        self
    }

    /// Mapped bytes already are the requested `f32` sequence
    fn is_identity_f32(&self) -> bool {
        self.stride == 1
            && self.data_type == MmapDataType::Float32
            && self.scale_factor == 1.0
            && self.offset_value == 0.0
            && cfg!(target_endian = "little")
    }
}

/// Read-only memory-mapped channel
///
/// Owns the mapping for its whole lifetime; the file is unmapped when the
/// inner [`Mmap`] is dropped with the storage. The storage can be moved but
/// not cloned.
#[derive(Debug)]
pub struct MemoryMappedValueStorage {
    config: MmapStorageConfig,
    /// `None` when the file holds no samples
    mmap: Option<Mmap>,
    num_samples: usize,
    element_size: usize,
    contiguous: bool,
}

impl MemoryMappedValueStorage {
    /// Open and map the configured file
    ///
    /// Fails if the file cannot be opened or mapped, if `stride` is zero, or
    /// if an explicit `num_samples` reaches past the end of the file. A file
    /// shorter than its header yields zero samples.
    pub fn open(config: MmapStorageConfig) -> StorageResult<Self> {
        if config.stride == 0 {
            return Err(StorageError::InvalidLayout(
                "stride must be at least 1".to_string(),
            ));
        }

        let path = config.file_path.clone();
        let file = File::open(&path).map_err(|source| StorageError::FileOpen {
            path: path.clone(),
            source,
        })?;
        let file_len = usize::try_from(file.metadata()?.len()).map_err(|_| {
            StorageError::InvalidLayout(format!("{:?} is too large to map", path))
        })?;

        if file_len < config.header_size {
            tracing::warn!(
                "File {:?} ({} bytes) is shorter than its {}-byte header; no samples",
                path,
                file_len,
                config.header_size
            );
        }

        let element_size = config.data_type.element_size();
        let capacity = sample_capacity(
            file_len.saturating_sub(config.header_size),
            element_size,
            config.offset,
            config.stride,
        );

        let num_samples = match config.num_samples {
            0 => capacity,
            n if n <= capacity => n,
            n => {
                return Err(StorageError::InvalidLayout(format!(
                    "{} samples requested but {:?} holds {} at offset {} stride {}",
                    n, path, capacity, config.offset, config.stride
                )))
            }
        };

        let mmap = if num_samples == 0 {
            None
        } else {
            // SAFETY: the mapping is read-only and owned by this storage for
            // its whole lifetime. Callers must not truncate or rewrite the
            // file while it is mapped.
            let mmap = unsafe { Mmap::map(&file) }
                .map_err(|source| StorageError::MapFailed { path, source })?;
            Some(mmap)
        };

        let mut storage = Self {
            config,
            mmap,
            num_samples,
            element_size,
            contiguous: false,
        };
        storage.contiguous = storage.config.is_identity_f32()
            && (storage.num_samples == 0
                || bytemuck::try_cast_slice::<u8, f32>(storage.raw_region()).is_ok());

        tracing::debug!(
            "Mapped {:?}: {} samples of {} (offset {}, stride {}, contiguous: {})",
            storage.config.file_path,
            storage.num_samples,
            storage.config.data_type,
            storage.config.offset,
            storage.config.stride,
            storage.contiguous
        );

        Ok(storage)
    }

    pub fn config(&self) -> &MmapStorageConfig {
        &self.config
    }

    pub fn path(&self) -> &Path {
        &self.config.file_path
    }

    /// Width of one raw element in bytes
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    /// Expose at most `num_samples` samples
    pub fn truncate(&mut self, num_samples: usize) {
        self.num_samples = self.num_samples.min(num_samples);
    }

    fn bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    /// Raw bytes of a stride-1 channel, from the first to the last sample
    fn raw_region(&self) -> &[u8] {
        let start = self.config.header_size + self.config.offset * self.element_size;
        let end = start + self.num_samples * self.element_size;
        self.bytes().get(start..end).unwrap_or(&[])
    }
}

impl ValueStorage for MemoryMappedValueStorage {
    #[inline]
    fn value_at(&self, position: usize) -> f32 {
        assert!(
            position < self.num_samples,
            "position {} out of range for {} mapped samples",
            position,
            self.num_samples
        );
        let element = self.config.offset + position * self.config.stride;
        let start = self.config.header_size + element * self.element_size;
        let raw = self
            .config
            .data_type
            .decode(&self.bytes()[start..start + self.element_size]);
        raw * self.config.scale_factor + self.config.offset_value
    }

    #[inline]
    fn len(&self) -> usize {
        self.num_samples
    }

    fn as_slice(&self) -> &[f32] {
        if !self.contiguous {
            return &[];
        }
        bytemuck::try_cast_slice(self.raw_region()).unwrap_or(&[])
    }

    fn is_contiguous(&self) -> bool {
        self.contiguous
    }

    fn storage_kind(&self) -> StorageKind {
        StorageKind::MemoryMapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;
    use tempfile::{tempdir, TempDir};

    fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(bytes).unwrap();
        path
    }

    fn encode(data_type: MmapDataType, values: &[f64]) -> Vec<u8> {
        let mut bytes = Vec::new();
        for &v in values {
            match data_type {
                MmapDataType::Float32 => bytes.extend((v as f32).to_le_bytes()),
                MmapDataType::Float64 => bytes.extend(v.to_le_bytes()),
                MmapDataType::Int8 => bytes.extend((v as i8).to_le_bytes()),
                MmapDataType::UInt8 => bytes.extend((v as u8).to_le_bytes()),
                MmapDataType::Int16 => bytes.extend((v as i16).to_le_bytes()),
                MmapDataType::UInt16 => bytes.extend((v as u16).to_le_bytes()),
                MmapDataType::Int32 => bytes.extend((v as i32).to_le_bytes()),
                MmapDataType::UInt32 => bytes.extend((v as u32).to_le_bytes()),
            }
        }
        bytes
    }

    fn sample_values(data_type: MmapDataType) -> Vec<f64> {
        match data_type {
            MmapDataType::Float32 | MmapDataType::Float64 => vec![-2.5, 0.0, 1.25, 1000.5],
            MmapDataType::Int8 => vec![-128.0, -1.0, 0.0, 127.0],
            MmapDataType::UInt8 => vec![0.0, 1.0, 128.0, 255.0],
            MmapDataType::Int16 => vec![-32768.0, -5.0, 7.0, 32767.0],
            MmapDataType::UInt16 => vec![0.0, 5.0, 40000.0, 65535.0],
            MmapDataType::Int32 => vec![-2_000_000.0, -3.0, 3.0, 2_000_000.0],
            MmapDataType::UInt32 => vec![0.0, 3.0, 3_000_000.0, 4_000_000_000.0],
        }
    }

    #[test]
    fn test_every_type_reads_back_exactly() {
        let dir = tempdir().unwrap();
        for &data_type in MmapDataType::all() {
            let expected = sample_values(data_type);
            let path = write_file(&dir, &format!("{}.bin", data_type), &encode(data_type, &expected));

            let storage =
                MemoryMappedValueStorage::open(MmapStorageConfig::new(&path).data_type(data_type))
                    .unwrap();

            assert_eq!(storage.len(), expected.len(), "{}", data_type);
            for (position, &value) in expected.iter().enumerate() {
                assert_eq!(storage.value_at(position), value as f32, "{}", data_type);
            }
        }
    }

    #[test]
    fn test_every_type_applies_affine_conversion() {
        let dir = tempdir().unwrap();
        for &data_type in MmapDataType::all() {
            let raw = sample_values(data_type);
            let path = write_file(&dir, &format!("{}_scaled.bin", data_type), &encode(data_type, &raw));

            let storage = MemoryMappedValueStorage::open(
                MmapStorageConfig::new(&path)
                    .data_type(data_type)
                    .conversion(0.5, -3.0),
            )
            .unwrap();

            assert!(!storage.is_contiguous());
            for (position, &value) in raw.iter().enumerate() {
                assert_relative_eq!(
                    storage.value_at(position),
                    value as f32 * 0.5 - 3.0,
                    max_relative = 1e-6
                );
            }
        }
    }

    #[test]
    fn test_strided_channel_with_offset() {
        let dir = tempdir().unwrap();
        let mut interleaved = Vec::new();
        for i in 0..50 {
            for channel in 0..3 {
                interleaved.push((i * 100 + channel) as f64);
            }
        }
        let path = write_file(&dir, "strided.bin", &encode(MmapDataType::Int16, &interleaved));

        let storage = MemoryMappedValueStorage::open(
            MmapStorageConfig::new(&path)
                .data_type(MmapDataType::Int16)
                .offset(1)
                .stride(3),
        )
        .unwrap();

        assert_eq!(storage.len(), 50);
        for i in 0..50 {
            assert_eq!(storage.value_at(i), (i * 100 + 1) as f32);
        }
        assert!(storage.as_slice().is_empty());
    }

    #[test]
    fn test_header_skipped_and_scaled() {
        let dir = tempdir().unwrap();
        let mut bytes = vec![0xAA; 256];
        let raw: Vec<f64> = (0..100).map(|i| (i + 1000) as f64).collect();
        bytes.extend(encode(MmapDataType::Int16, &raw));
        let path = write_file(&dir, "header.bin", &bytes);

        let storage = MemoryMappedValueStorage::open(
            MmapStorageConfig::new(&path)
                .header_size(256)
                .data_type(MmapDataType::Int16)
                .conversion(0.1, -100.0)
                .num_samples(100),
        )
        .unwrap();

        assert_eq!(storage.len(), 100);
        for i in 0..100 {
            let expected = (i + 1000) as f32 * 0.1 - 100.0;
            assert!((storage.value_at(i) - expected).abs() < 0.01);
        }
    }

    #[test]
    fn test_plain_float32_is_zero_copy() {
        let dir = tempdir().unwrap();
        let values = [1.5, 2.5, 3.5, 4.5, 5.5];
        let mut bytes = vec![0u8; 16];
        bytes.extend(encode(MmapDataType::Float32, &values));
        let path = write_file(&dir, "f32.bin", &bytes);

        let storage = MemoryMappedValueStorage::open(
            MmapStorageConfig::new(&path).header_size(16).offset(1),
        )
        .unwrap();

        assert_eq!(storage.storage_kind(), StorageKind::MemoryMapped);
        assert_eq!(storage.len(), 4);
        assert!(storage.is_contiguous());
        assert_eq!(storage.as_slice(), &[2.5, 3.5, 4.5, 5.5]);

        let mapped = storage.bytes();
        let expected_ptr = mapped[16 + 4..].as_ptr() as *const f32;
        assert!(std::ptr::eq(storage.as_slice().as_ptr(), expected_ptr));
        assert_eq!(storage.as_subslice(1, 3), &[3.5, 4.5]);
    }

    #[test]
    fn test_misaligned_float32_falls_back_to_conversion() {
        let dir = tempdir().unwrap();
        let mut bytes = vec![0u8; 3];
        bytes.extend(encode(MmapDataType::Float32, &[1.0, 2.0]));
        let path = write_file(&dir, "odd_header.bin", &bytes);

        let storage =
            MemoryMappedValueStorage::open(MmapStorageConfig::new(&path).header_size(3)).unwrap();

        assert!(!storage.is_contiguous());
        assert!(storage.as_slice().is_empty());
        assert_eq!(storage.value_at(1), 2.0);
    }

    #[test]
    fn test_int16_without_scaling_is_not_contiguous() {
        let dir = tempdir().unwrap();
        let path = write_file(&dir, "i16.bin", &encode(MmapDataType::Int16, &[1.0, 2.0]));

        let storage = MemoryMappedValueStorage::open(
            MmapStorageConfig::new(&path).data_type(MmapDataType::Int16),
        )
        .unwrap();

        assert!(!storage.is_contiguous());
        assert!(storage.as_subslice(0, 2).is_empty());
    }

    #[test]
    fn test_file_shorter_than_header_has_no_samples() {
        let dir = tempdir().unwrap();
        let path = write_file(&dir, "short.bin", &[1, 2, 3, 4]);

        let storage =
            MemoryMappedValueStorage::open(MmapStorageConfig::new(&path).header_size(64)).unwrap();
        assert_eq!(storage.len(), 0);
        assert!(storage.is_empty());

        let empty = write_file(&dir, "empty.bin", &[]);
        let storage = MemoryMappedValueStorage::open(MmapStorageConfig::new(&empty)).unwrap();
        assert_eq!(storage.len(), 0);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = MemoryMappedValueStorage::open(MmapStorageConfig::new(
            "/nonexistent/path/to/file.bin",
        ))
        .unwrap_err();
        assert!(matches!(err, StorageError::FileOpen { .. }));
    }

    #[test]
    fn test_invalid_layouts_rejected() {
        let dir = tempdir().unwrap();
        let path = write_file(&dir, "ten.bin", &encode(MmapDataType::Float32, &[0.0; 10]));

        let err = MemoryMappedValueStorage::open(MmapStorageConfig::new(&path).num_samples(11))
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidLayout(_)));

        let err =
            MemoryMappedValueStorage::open(MmapStorageConfig::new(&path).stride(0)).unwrap_err();
        assert!(matches!(err, StorageError::InvalidLayout(_)));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_value_past_end_panics() {
        let dir = tempdir().unwrap();
        let path = write_file(&dir, "two.bin", &encode(MmapDataType::Float32, &[1.0, 2.0]));
        let storage = MemoryMappedValueStorage::open(MmapStorageConfig::new(&path)).unwrap();
        storage.value_at(2);
    }

    #[test]
    fn test_sample_capacity() {
        // 3 interleaved channels, 50 frames of int16
        assert_eq!(sample_capacity(300, 2, 0, 3), 50);
        assert_eq!(sample_capacity(300, 2, 2, 3), 50);
        assert_eq!(sample_capacity(40, 4, 2, 1), 8);
        assert_eq!(sample_capacity(40, 4, 10, 1), 0);
        assert_eq!(sample_capacity(3, 4, 0, 1), 0);
        // Incomplete last frame
        assert_eq!(sample_capacity(20, 2, 0, 3), 3);
        assert_eq!(sample_capacity(21, 2, 0, 3), 3);
        assert_eq!(sample_capacity(20, 2, 5, 3), 2);
        assert_eq!(sample_capacity(20, 2, 0, 0), 0);
    }

    #[test]
    fn test_partial_trailing_frame_not_counted() {
        let dir = tempdir().unwrap();
        let raw: Vec<f64> = (0..10).map(f64::from).collect();
        let path = write_file(&dir, "ten_i16.bin", &encode(MmapDataType::Int16, &raw));

        let cases = [
            (0, vec![0.0, 3.0, 6.0]),
            (1, vec![1.0, 4.0, 7.0]),
            (2, vec![2.0, 5.0, 8.0]),
        ];
        for (offset, expected) in cases {
            let storage = MemoryMappedValueStorage::open(
                MmapStorageConfig::new(&path)
                    .data_type(MmapDataType::Int16)
                    .offset(offset)
                    .stride(3),
            )
            .unwrap();

            assert_eq!(storage.len(), 3, "offset {}", offset);
            let values: Vec<f32> = (0..storage.len()).map(|p| storage.value_at(p)).collect();
            assert_eq!(values, expected);
        }

        let err = MemoryMappedValueStorage::open(
            MmapStorageConfig::new(&path)
                .data_type(MmapDataType::Int16)
                .stride(3)
                .num_samples(4),
        )
        .unwrap_err();
        assert!(matches!(err, StorageError::InvalidLayout(_)));
    }

    #[test]
    fn test_data_type_parsing() {
        assert_eq!(MmapDataType::parse("float"), Some(MmapDataType::Float32));
        assert_eq!(MmapDataType::parse("double"), Some(MmapDataType::Float64));
        assert_eq!(MmapDataType::parse("UINT16"), Some(MmapDataType::UInt16));
        assert_eq!(MmapDataType::parse("int12"), None);
        assert_eq!(MmapDataType::parse_or_default("int12"), MmapDataType::Int16);
        assert!("bogus".parse::<MmapDataType>().is_err());
        for &data_type in MmapDataType::all() {
            assert_eq!(data_type.to_string().parse::<MmapDataType>().unwrap(), data_type);
        }
    }

    #[test]
    fn test_relative_path_resolution() {
        let config = MmapStorageConfig::new("data.bin").relative_to("/recordings");
        assert_eq!(config.file_path, PathBuf::from("/recordings/data.bin"));

        let config = MmapStorageConfig::new("/abs/data.bin").relative_to("/recordings");
        assert_eq!(config.file_path, PathBuf::from("/abs/data.bin"));
    }

    #[test]
    fn test_storage_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MemoryMappedValueStorage>();
    }
}
