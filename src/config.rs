//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub loader: LoaderConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Defaults applied to binary loads that do not specify them
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoaderConfig {
    /// Directory that relative data file paths are resolved against
    #[serde(default)]
    pub parent_dir: Option<PathBuf>,

    /// Reject unknown data types instead of falling back to int16
    #[serde(default)]
    pub strict_options: bool,

    #[serde(default)]
    pub use_memory_mapped: bool,

    #[serde(default = "default_data_type")]
    pub data_type: String,
}

fn default_data_type() -> String {
    "int16".to_string()
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            parent_dir: None,
            strict_options: false,
            use_memory_mapped: false,
            data_type: default_data_type(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            error: e.to_string(),
        })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("chronicle-analog").join("config.toml")),
            Some(PathBuf::from("/etc/chronicle-analog/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Logging overrides
        if let Some(level) = lookup("CHRONICLE_ANALOG_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("CHRONICLE_ANALOG_LOG_FORMAT") {
            self.logging.format = format;
        }

        // Loader overrides
        if let Some(parent_dir) = lookup("CHRONICLE_ANALOG_PARENT_DIR") {
            self.loader.parent_dir = Some(PathBuf::from(parent_dir));
        }
        if let Some(strict) = lookup("CHRONICLE_ANALOG_STRICT_OPTIONS") {
            match strict.parse() {
                Ok(strict) => self.loader.strict_options = strict,
                Err(_) => tracing::warn!(
                    "Ignoring CHRONICLE_ANALOG_STRICT_OPTIONS={:?}: expected true or false",
                    strict
                ),
            }
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid data type {0:?}: expected one of int8, uint8, int16, uint16, int32, uint32, float32, float64")]
    InvalidDataType(String),

    #[error("Invalid loader options: {0}")]
    InvalidOptions(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# chronicle-analog configuration
#
# Environment variables override these settings:
# - CHRONICLE_ANALOG_LOG_LEVEL
# - CHRONICLE_ANALOG_LOG_FORMAT
# - CHRONICLE_ANALOG_PARENT_DIR
# - CHRONICLE_ANALOG_STRICT_OPTIONS

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

[loader]
# Directory that relative data file paths are resolved against
# parent_dir = "/data/recordings"

# Reject unknown data types instead of falling back to int16
strict_options = false

# Map files instead of reading them into memory
use_memory_mapped = false

# Element type: int8, uint8, int16, uint16, int32, uint32, float32, float64
data_type = "int16"
"#
    .to_string()
}
