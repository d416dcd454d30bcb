//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Stream Syncer - replay timestamped streams through a multi-stream synchronizer
#[derive(Parser, Debug)]
#[command(
    name = "stream-syncer",
    author,
    version,
    about = "Multi-stream temporal synchronizer",
    long_about = "Aligns independently timestamped input streams into synchronized tuples.\n\n\
                  Builds a synchronizer from a TOML/JSON blueprint, replays a JSONL trace \n\
                  through it and writes every emitted tuple as a JSON line."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "STREAM_SYNCER_VERBOSE")]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "STREAM_SYNCER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a trace through the synchronizer
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "sync.toml", env = "STREAM_SYNCER_CONFIG")]
    pub config: PathBuf,

    /// JSONL trace to replay, one `{"stream", "time", "sub_id", "value"}` per line
    #[arg(short, long, env = "STREAM_SYNCER_TRACE")]
    pub trace: PathBuf,

    /// Write emitted tuples here instead of stdout
    #[arg(short, long, env = "STREAM_SYNCER_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Stop after this many emissions (0 = unlimited)
    #[arg(long, default_value = "0", env = "STREAM_SYNCER_MAX_EMISSIONS")]
    pub max_emissions: u64,

    /// Replay speed multiplier (0 = as fast as possible)
    #[arg(long, default_value = "0", env = "STREAM_SYNCER_SPEED")]
    pub speed: f64,

    /// Wall-clock microseconds per timestamp unit at speed 1.0
    #[arg(long, default_value = "1", env = "STREAM_SYNCER_TICK_US")]
    pub tick_us: u64,

    /// Validate configuration and exit without replaying
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "STREAM_SYNCER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "sync.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "sync.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => observability::LogFormat::Json,
            LogFormat::Pretty => observability::LogFormat::Pretty,
            LogFormat::Compact => observability::LogFormat::Compact,
        }
    }
}
