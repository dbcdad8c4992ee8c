//! Flat binary file loading
//!
//! Produces one [`AnalogTimeSeries`] per channel, channel 0 first, with dense
//! time indices `0..n`. Sample `i` of channel `c` is the element at
//! `offset + c + i * stride * num_channels` after the header.
//!
//! - **memory-mapped**: one read-only mapping per channel; values convert on access
//! - **in-memory**: the file is read once, de-interleaved and converted to
//!   owned `f32` buffers; the raw bytes are released before returning

use crate::loader::options::BinaryLoaderOptions;
use crate::series::AnalogTimeSeries;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::time_index::TimeIndexStorage;
use crate::storage::values::mmap::sample_capacity;
use crate::storage::values::{MemoryMappedValueStorage, ValueStorage, VectorValueStorage};
use std::sync::Arc;

/// Load every channel described by `options`
pub fn load_binary_analog(
    options: &BinaryLoaderOptions,
) -> StorageResult<Vec<Arc<AnalogTimeSeries>>> {
    let channels = if options.use_memory_mapped {
        load_memory_mapped(options)?
    } else {
        load_in_memory(options)?
    };

    tracing::info!(
        "Loaded {} channel(s) x {} samples from {:?} ({})",
        channels.len(),
        channels.first().map_or(0, |series| series.num_samples()),
        options.resolved_path(),
        if options.use_memory_mapped { "memory-mapped" } else { "in-memory" }
    );

    Ok(channels.into_iter().map(Arc::new).collect())
}

/// Parse loader options from JSON and load them
///
/// `strict` selects [`BinaryLoaderOptions::from_json`], which rejects an
/// unknown `data_type`; otherwise it falls back to int16.
pub fn load_binary_analog_json(
    config: &serde_json::Value,
    strict: bool,
) -> StorageResult<Vec<Arc<AnalogTimeSeries>>> {
    let options = if strict {
        BinaryLoaderOptions::from_json(config)?
    } else {
        BinaryLoaderOptions::from_json_lenient(config)?
    };
    load_binary_analog(&options)
}

fn load_memory_mapped(options: &BinaryLoaderOptions) -> StorageResult<Vec<AnalogTimeSeries>> {
    let mut storages = (0..options.num_channels.get())
        .map(|channel| MemoryMappedValueStorage::open(options.channel_config(channel)))
        .collect::<StorageResult<Vec<_>>>()?;

    // Channels share the whole-frame count unless `offset` reaches into the
    // next frame, which leaves the later channels one sample short.
    let num_samples = storages.iter().map(|s| s.len()).min().unwrap_or(0);
    if storages.iter().any(|s| s.len() != num_samples) {
        tracing::warn!(
            "Ignoring incomplete trailing frame in {:?}",
            options.resolved_path()
        );
    }

    let time_storage = TimeIndexStorage::zero_based(num_samples);
    storages
        .iter_mut()
        .for_each(|storage| storage.truncate(num_samples));
    storages
        .into_iter()
        .map(|storage| AnalogTimeSeries::from_parts(storage.into(), time_storage.clone()))
        .collect()
}

fn load_in_memory(options: &BinaryLoaderOptions) -> StorageResult<Vec<AnalogTimeSeries>> {
    let path = options.resolved_path();
    let bytes = std::fs::read(&path).map_err(|source| StorageError::FileOpen {
        path: path.clone(),
        source,
    })?;

    if bytes.len() < options.header_size {
        tracing::warn!(
            "File {:?} ({} bytes) is shorter than its {}-byte header; no samples",
            path,
            bytes.len(),
            options.header_size
        );
    }
    let data = bytes.get(options.header_size..).unwrap_or(&[]);

    let width = options.data_type.element_size();
    let element_stride = options.element_stride();
    let last_channel = options.num_channels.get() - 1;
    let capacity = sample_capacity(
        data.len(),
        width,
        options.offset + last_channel,
        element_stride,
    );

    let num_samples = match options.num_samples {
        0 => capacity,
        n if n <= capacity => n,
        n => {
            return Err(StorageError::InvalidLayout(format!(
                "{} samples requested but {:?} holds {} per channel",
                n, path, capacity
            )))
        }
    };

    let time_storage = TimeIndexStorage::zero_based(num_samples);
    let channels = (0..options.num_channels.get())
        .map(|channel| {
            let values: Vec<f32> = (0..num_samples)
                .map(|i| {
                    let start = (options.offset + channel + i * element_stride) * width;
                    options.data_type.decode(&data[start..start + width]) * options.scale_factor
                        + options.offset_value
                })
                .collect();
            AnalogTimeSeries::from_parts(VectorValueStorage::new(values).into(), time_storage.clone())
        })
        .collect::<StorageResult<Vec<_>>>()?;

    drop(bytes);
    Ok(channels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::storage::types::TimeIndex;
    use crate::storage::values::{MmapDataType, StorageKind};
    use approx::assert_relative_eq;
    use std::num::NonZeroUsize;
    use std::path::PathBuf;
    use tempfile::{tempdir, TempDir};

    fn channels(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn write(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    /// `frames` frames of `num_channels` int16 values, channel `c` holding `base + c`
    fn interleaved_int16(num_channels: usize, frames: usize, base: i16) -> Vec<u8> {
        let mut bytes = Vec::new();
        for _ in 0..frames {
            for c in 0..num_channels {
                bytes.extend((base + c as i16).to_le_bytes());
            }
        }
        bytes
    }

    #[test]
    fn test_interleaved_channels_on_both_paths() {
        let dir = tempdir().unwrap();
        let path = write(&dir, "three.bin", &interleaved_int16(3, 50, 75));

        for mmap in [false, true] {
            let options = BinaryLoaderOptions::new(&path)
                .num_channels(channels(3))
                .memory_mapped(mmap);
            let loaded = load_binary_analog(&options).unwrap();

            assert_eq!(loaded.len(), 3);
            for (c, series) in loaded.iter().enumerate() {
                assert_eq!(series.num_samples(), 50);
                assert!(series.to_values().iter().all(|&v| v == 75.0 + c as f32));
                assert_eq!(series.time_index_at_position(49), TimeIndex::new(49));
            }
            let kind = if mmap { StorageKind::MemoryMapped } else { StorageKind::Vector };
            assert_eq!(loaded[0].storage_kind(), kind);
        }
    }

    #[test]
    fn test_paths_agree_with_header_offset_and_scaling() {
        let dir = tempdir().unwrap();
        let mut bytes = vec![0xFF; 32];
        for i in 0..40u32 {
            for c in 0..2u32 {
                bytes.extend(((i * 10 + c) as f32).to_le_bytes());
            }
        }
        let path = write(&dir, "header.bin", &bytes);

        let options = BinaryLoaderOptions::new(&path)
            .header_size(32)
            .num_channels(channels(2))
            .data_type(MmapDataType::Float32)
            .conversion(2.0, 1.0);

        let owned = load_binary_analog(&options).unwrap();
        let mapped = load_binary_analog(&options.clone().memory_mapped(true)).unwrap();

        for c in 0..2 {
            assert_eq!(owned[c].to_values(), mapped[c].to_values());
            assert_relative_eq!(owned[c].value_at_position(3), (30 + c) as f32 * 2.0 + 1.0);
        }
    }

    #[test]
    fn test_single_channel_float32_mapping_is_contiguous() {
        let dir = tempdir().unwrap();
        let bytes: Vec<u8> = (0..16).flat_map(|i| (i as f32).to_le_bytes()).collect();
        let path = write(&dir, "mono.bin", &bytes);

        let options = BinaryLoaderOptions::new(&path)
            .data_type(MmapDataType::Float32)
            .memory_mapped(true);
        let loaded = load_binary_analog(&options).unwrap();

        assert!(loaded[0].is_contiguous());
        assert_eq!(
            loaded[0].values_in_time_index_range(TimeIndex::new(2), TimeIndex::new(4)),
            &[2.0, 3.0, 4.0]
        );
    }

    #[test]
    fn test_explicit_sample_count() {
        let dir = tempdir().unwrap();
        let path = write(&dir, "count.bin", &interleaved_int16(2, 10, 0));

        for mmap in [false, true] {
            let options = BinaryLoaderOptions::new(&path)
                .num_channels(channels(2))
                .num_samples(4)
                .memory_mapped(mmap);
            let loaded = load_binary_analog(&options).unwrap();
            assert!(loaded.iter().all(|series| series.num_samples() == 4));

            let err = load_binary_analog(&options.clone().num_samples(11)).unwrap_err();
            assert!(matches!(err, StorageError::InvalidLayout(_)));
        }
    }

    #[test]
    fn test_incomplete_trailing_frame_dropped() {
        let dir = tempdir().unwrap();
        let mut bytes = interleaved_int16(3, 5, 1);
        bytes.extend(1i16.to_le_bytes());
        let path = write(&dir, "partial.bin", &bytes);

        for mmap in [false, true] {
            let options = BinaryLoaderOptions::new(&path)
                .num_channels(channels(3))
                .memory_mapped(mmap);
            let loaded = load_binary_analog(&options).unwrap();
            assert!(loaded.iter().all(|series| series.num_samples() == 5));
        }
    }

    #[test]
    fn test_strided_single_channel_counts_whole_frames() {
        let dir = tempdir().unwrap();
        let values: Vec<u8> = (0..10i16).flat_map(|v| v.to_le_bytes()).collect();
        let path = write(&dir, "ten.bin", &values);

        for mmap in [false, true] {
            let options = BinaryLoaderOptions::new(&path)
                .stride(channels(3))
                .memory_mapped(mmap);
            let loaded = load_binary_analog(&options).unwrap();
            assert_eq!(loaded[0].to_values(), vec![0.0, 3.0, 6.0]);
        }
    }

    #[test]
    fn test_file_shorter_than_header() {
        let dir = tempdir().unwrap();
        let path = write(&dir, "tiny.bin", &[1, 2, 3]);

        for mmap in [false, true] {
            let options = BinaryLoaderOptions::new(&path)
                .header_size(128)
                .num_channels(channels(2))
                .memory_mapped(mmap);
            let loaded = load_binary_analog(&options).unwrap();

            assert_eq!(loaded.len(), 2);
            assert!(loaded.iter().all(|series| series.is_empty()));
        }
    }

    #[test]
    fn test_relative_path_uses_parent_dir() {
        let dir = tempdir().unwrap();
        write(&dir, "rel.bin", &interleaved_int16(1, 3, 9));

        let options = BinaryLoaderOptions::new("rel.bin").parent_dir(dir.path());
        let loaded = load_binary_analog(&options).unwrap();
        assert_eq!(loaded[0].to_values(), vec![9.0, 9.0, 9.0]);
    }

    #[test]
    fn test_missing_file() {
        for mmap in [false, true] {
            let options = BinaryLoaderOptions::new("/nonexistent/recording.bin").memory_mapped(mmap);
            let err = load_binary_analog(&options).unwrap_err();
            assert!(matches!(err, StorageError::FileOpen { .. }));
        }
    }

    #[test]
    fn test_stride_skips_frames() {
        let dir = tempdir().unwrap();
        let values: Vec<u8> = (0..12i16).flat_map(|v| v.to_le_bytes()).collect();
        let path = write(&dir, "skip.bin", &values);

        for mmap in [false, true] {
            let options = BinaryLoaderOptions::new(&path)
                .num_channels(channels(2))
                .stride(channels(2))
                .offset(1)
                .memory_mapped(mmap);
            let loaded = load_binary_analog(&options).unwrap();

            assert_eq!(loaded[0].to_values(), vec![1.0, 5.0, 9.0]);
            assert_eq!(loaded[1].to_values(), vec![2.0, 6.0, 10.0]);
        }
    }

    #[test]
    fn test_lenient_json_defaults_data_type() {
        let dir = tempdir().unwrap();
        write(&dir, "legacy.bin", &interleaved_int16(2, 4, 100));

        let value = serde_json::json!({
            "filename": "legacy.bin",
            "parent_dir": dir.path(),
            "num_channels": 2,
            "data_type": "int24",
        });

        let err = load_binary_analog_json(&value, true).unwrap_err();
        assert!(matches!(err, StorageError::Config(ConfigError::InvalidDataType(_))));

        let loaded = load_binary_analog_json(&value, false).unwrap();
        assert_eq!(loaded[1].to_values(), vec![101.0; 4]);
    }
}
