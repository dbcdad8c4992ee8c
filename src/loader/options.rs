//! Binary loader options
//!
//! Options arrive as a JSON object using the keys `filepath` (or `filename`),
//! `parent_dir`, `header_size`, `num_channels`, `use_memory_mapped`,
//! `offset`, `stride`, `data_type`, `scale_factor`, `offset_value` and
//! `num_samples`. Unknown keys are ignored.
//!
//! Two entry points exist. [`BinaryLoaderOptions::from_json`] rejects an
//! unrecognized `data_type`; [`BinaryLoaderOptions::from_json_lenient`]
//! falls back to int16 with a warning. Both reject a zero channel count or
//! stride and negative sizes.

use crate::config::ConfigError;
use crate::storage::values::{MmapDataType, MmapStorageConfig};
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::path::PathBuf;

/// Layout of a flat binary file holding one or more interleaved channels
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryLoaderOptions {
    pub filepath: PathBuf,
    /// Directory a relative `filepath` is resolved against
    pub parent_dir: Option<PathBuf>,
    /// Bytes to skip at the start of the file
    pub header_size: usize,
    pub num_channels: NonZeroUsize,
    pub use_memory_mapped: bool,
    /// Elements to skip after the header
    pub offset: usize,
    /// Frames between consecutive samples of one channel
    pub stride: NonZeroUsize,
    pub data_type: MmapDataType,
    pub scale_factor: f32,
    pub offset_value: f32,
    /// Samples per channel (0 = everything the file holds)
    pub num_samples: usize,
}

#[derive(Debug, Deserialize)]
struct RawOptions {
    #[serde(alias = "filename")]
    filepath: PathBuf,
    #[serde(default)]
    parent_dir: Option<PathBuf>,
    #[serde(default)]
    header_size: usize,
    #[serde(default = "one")]
    num_channels: NonZeroUsize,
    #[serde(default)]
    use_memory_mapped: bool,
    #[serde(default)]
    offset: usize,
    #[serde(default = "one")]
    stride: NonZeroUsize,
    #[serde(default)]
    data_type: Option<String>,
    #[serde(default = "unit_scale")]
    scale_factor: f32,
    #[serde(default)]
    offset_value: f32,
    #[serde(default)]
    num_samples: usize,
}

fn one() -> NonZeroUsize {
    NonZeroUsize::MIN
}

fn unit_scale() -> f32 {
    1.0
}

impl BinaryLoaderOptions {
    /// Single-channel int16 file with no header
    pub fn new(filepath: impl Into<PathBuf>) -> Self {
        Self {
            filepath: filepath.into(),
            parent_dir: None,
            header_size: 0,
            num_channels: one(),
            use_memory_mapped: false,
            offset: 0,
            stride: one(),
            data_type: MmapDataType::Int16,
            scale_factor: 1.0,
            offset_value: 0.0,
            num_samples: 0,
        }
    }

    /// Parse options, rejecting an unknown `data_type`
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ConfigError> {
        let raw = Self::raw(value)?;
        let data_type = match raw.data_type.as_deref() {
            Some(name) => name.parse()?,
            None => MmapDataType::Int16,
        };
        Ok(Self::from_raw(raw, data_type))
    }

    /// Parse options, defaulting an unknown `data_type` to int16
    pub fn from_json_lenient(value: &serde_json::Value) -> Result<Self, ConfigError> {
        let raw = Self::raw(value)?;
        let data_type = raw
            .data_type
            .as_deref()
            .map_or(MmapDataType::Int16, MmapDataType::parse_or_default);
        Ok(Self::from_raw(raw, data_type))
    }

    fn raw(value: &serde_json::Value) -> Result<RawOptions, ConfigError> {
        RawOptions::deserialize(value).map_err(|e| ConfigError::InvalidOptions(e.to_string()))
    }

    fn from_raw(raw: RawOptions, data_type: MmapDataType) -> Self {
        Self {
            filepath: raw.filepath,
            parent_dir: raw.parent_dir,
            header_size: raw.header_size,
            num_channels: raw.num_channels,
            use_memory_mapped: raw.use_memory_mapped,
            offset: raw.offset,
            stride: raw.stride,
            data_type,
            scale_factor: raw.scale_factor,
            offset_value: raw.offset_value,
            num_samples: raw.num_samples,
        }
    }

    pub fn header_size(mut self, bytes: usize) -> Self {
        self.header_size = bytes;
        self
    }

    pub fn num_channels(mut self, channels: NonZeroUsize) -> Self {
        self.num_channels = channels;
        self
    }

    pub fn memory_mapped(mut self, enabled: bool) -> Self {
        self.use_memory_mapped = enabled;
        self
    }

    pub fn offset(mut self, elements: usize) -> Self {
        self.offset = elements;
        self
    }

    pub fn stride(mut self, frames: NonZeroUsize) -> Self {
        self.stride = frames;
        self
    }

    pub fn data_type(mut self, data_type: MmapDataType) -> Self {
        self.data_type = data_type;
        self
    }

    pub fn conversion(mut self, scale_factor: f32, offset_value: f32) -> Self {
        self.scale_factor = scale_factor;
        self.offset_value = offset_value;
        self
    }

    pub fn num_samples(mut self, samples: usize) -> Self {
        self.num_samples = samples;
        self
    }

    /// Builder: set the directory relative paths are resolved against
    pub fn parent_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.parent_dir = Some(dir.into());
        self
    }

    /// Data file path with `parent_dir` applied
    pub fn resolved_path(&self) -> PathBuf {
        match &self.parent_dir {
            Some(parent) if self.filepath.is_relative() => parent.join(&self.filepath),
            _ => self.filepath.clone(),
        }
    }

    /// Elements between consecutive samples of one channel
    pub fn element_stride(&self) -> usize {
        self.stride.get() * self.num_channels.get()
    }

    /// Mapping layout of `channel`
    pub fn channel_config(&self, channel: usize) -> MmapStorageConfig {
        MmapStorageConfig::new(self.resolved_path())
            .header_size(self.header_size)
            .offset(self.offset + channel)
            .stride(self.element_stride())
            .num_samples(self.num_samples)
            .data_type(self.data_type)
            .conversion(self.scale_factor, self.offset_value)
    }
}
