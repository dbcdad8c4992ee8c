//! Binary analog loading
//!
//! - **options**: file layout options and their JSON entry points
//! - **binary**: memory-mapped and in-memory loading paths
//!
//! # Example
//!
//! ```rust,no_run
//! use chronicle_analog::loader::{load_binary_analog, BinaryLoaderOptions};
//!
//! let options = BinaryLoaderOptions::from_json(&serde_json::json!({
//!     "filepath": "recording.bin",
//!     "parent_dir": "/data",
//!     "num_channels": 32,
//!     "use_memory_mapped": true,
//!     "data_type": "int16",
//!     "scale_factor": 0.195,
//! }))?;
//!
//! let channels = load_binary_analog(&options)?;
//! println!("channel 0 holds {} samples", channels[0].num_samples());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod binary;
pub mod options;

pub use binary::{load_binary_analog, load_binary_analog_json};
pub use options::BinaryLoaderOptions;
