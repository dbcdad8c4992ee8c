//! chronicle-analog CLI
//!
//! Command-line interface for analog binary recordings:
//! - Inspect channels and their summary statistics
//! - Print the samples of a time range
//! - Generate a default config file

use anyhow::{bail, Context};
use chronicle_analog::config::{generate_default_config, Config, LoggingConfig};
use chronicle_analog::stats::{self, Summary};
use chronicle_analog::{load_binary_analog_json, AnalogTimeSeries, StorageKind, TimeIndex};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "chronicle-analog")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect and query analog binary recordings")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: standard locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show per-channel sample counts, backends and statistics
    Inspect {
        /// Binary data file
        file: PathBuf,
        #[command(flatten)]
        loader: LoaderArgs,
    },

    /// Print the samples whose time index lies in [start, end]
    Range {
        /// Binary data file
        file: PathBuf,
        #[arg(long, allow_hyphen_values = true)]
        start: i64,
        #[arg(long, allow_hyphen_values = true)]
        end: i64,
        /// Channel to print
        #[arg(short, long, default_value_t = 0)]
        channel: usize,
        #[command(flatten)]
        loader: LoaderArgs,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Layout of the binary file
#[derive(Args, Debug)]
pub struct LoaderArgs {
    /// Bytes to skip at the start of the file
    #[arg(long, default_value_t = 0)]
    pub header_size: usize,

    /// Number of interleaved channels
    #[arg(long, default_value = "1")]
    pub channels: NonZeroUsize,

    /// Map the file instead of reading it into memory
    #[arg(long)]
    pub mmap: bool,

    /// Elements to skip after the header
    #[arg(long, default_value_t = 0)]
    pub offset: usize,

    /// Frames between consecutive samples
    #[arg(long, default_value = "1")]
    pub stride: NonZeroUsize,

    /// Element type (int8, uint8, int16, uint16, int32, uint32, float32, float64)
    #[arg(long)]
    pub data_type: Option<String>,

    /// Multiplier applied to raw values
    #[arg(long, default_value_t = 1.0, allow_hyphen_values = true)]
    pub scale: f32,

    /// Added after scaling
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub offset_value: f32,

    /// Samples per channel (0 = whole file)
    #[arg(long, default_value_t = 0)]
    pub num_samples: usize,

    /// Reject unknown data types instead of falling back to int16
    #[arg(long)]
    pub strict: bool,
}

impl LoaderArgs {
    /// Loader options in their JSON form, with config defaults filled in
    fn to_json(&self, file: &Path, config: &Config) -> serde_json::Value {
        let mut value = serde_json::json!({
            "filepath": file,
            "header_size": self.header_size,
            "num_channels": self.channels,
            "use_memory_mapped": self.mmap || config.loader.use_memory_mapped,
            "offset": self.offset,
            "stride": self.stride,
            "data_type": self.data_type.as_deref().unwrap_or(&config.loader.data_type),
            "scale_factor": self.scale,
            "offset_value": self.offset_value,
            "num_samples": self.num_samples,
        });
        if let Some(parent_dir) = &config.loader.parent_dir {
            value["parent_dir"] = serde_json::json!(parent_dir);
        }
        value
    }
}

#[derive(Serialize)]
struct ChannelReport {
    channel: usize,
    num_samples: usize,
    storage_kind: StorageKind,
    contiguous: bool,
    summary: Summary,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    init_logging(&config.logging);

    match cli.command {
        Commands::Inspect { file, loader } => {
            let channels = load(&file, &loader, &config)?;
            let reports: Vec<ChannelReport> = channels
                .iter()
                .enumerate()
                .map(|(channel, series)| ChannelReport {
                    channel,
                    num_samples: series.num_samples(),
                    storage_kind: series.storage_kind(),
                    contiguous: series.is_contiguous(),
                    summary: stats::summarize(series),
                })
                .collect();

            match cli.format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&reports)?),
                _ => print_reports(&reports),
            }
        }

        Commands::Range {
            file,
            start,
            end,
            channel,
            loader,
        } => {
            let channels = load(&file, &loader, &config)?;
            let Some(series) = channels.get(channel) else {
                bail!("Channel {} out of range ({} channels loaded)", channel, channels.len());
            };

            let range = series.time_value_range(TimeIndex::new(start), TimeIndex::new(end));
            match cli.format.as_str() {
                "json" => {
                    let points: Vec<_> = range.iter().collect();
                    println!("{}", serde_json::to_string_pretty(&points)?);
                }
                _ => {
                    println!("{:>12} {:>14}", "TIME", "VALUE");
                    for point in range {
                        println!("{:>12} {:>14.6}", point.time_index.value(), point.value);
                    }
                    println!("\n{} sample(s)", range.len());
                }
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

fn load(
    file: &Path,
    loader: &LoaderArgs,
    config: &Config,
) -> anyhow::Result<Vec<Arc<AnalogTimeSeries>>> {
    let strict = loader.strict || config.loader.strict_options;
    let channels = load_binary_analog_json(&loader.to_json(file, config), strict)
        .with_context(|| format!("Failed to load {:?}", file))?;
    Ok(channels)
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("chronicle_analog={}", config.level)));
    let registry = tracing_subscriber::registry().with(filter);

    match config.format.as_str() {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        _ => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn print_reports(reports: &[ChannelReport]) {
    println!(
        "{:>7} {:>10} {:>14} {:>10} {:>12} {:>12} {:>12} {:>12}",
        "CHANNEL", "SAMPLES", "BACKEND", "CONTIG", "MEAN", "STD", "MIN", "MAX"
    );
    for report in reports {
        let fmt_opt = |v: Option<f32>| v.map_or_else(|| "-".to_string(), |v| format!("{:.4}", v));
        println!(
            "{:>7} {:>10} {:>14} {:>10} {:>12.4} {:>12.4} {:>12} {:>12}",
            report.channel,
            report.num_samples,
            report.storage_kind.to_string(),
            report.contiguous,
            report.summary.mean,
            report.summary.std_dev,
            fmt_opt(report.summary.min),
            fmt_opt(report.summary.max),
        );
    }
}
