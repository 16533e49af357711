//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::vehicle::{FineStatus, UNKNOWN_VEHICLE_TYPE};

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Search command arguments.
#[derive(Debug, Args)]
pub struct SearchCommand {
    /// Text to look for in plates and owner names (case-insensitive)
    pub query: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Exact plate number
    pub plate: String,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Register command arguments.
#[derive(Debug, Args)]
pub struct RegisterCommand {
    /// Exact plate number
    pub plate: String,

    /// Vehicle classification
    #[arg(short = 't', long = "type", default_value = UNKNOWN_VEHICLE_TYPE)]
    pub vehicle_type: String,
}

/// Fine command arguments.
#[derive(Debug, Args)]
pub struct FineCommand {
    /// Exact plate number
    pub plate: String,

    /// Kind of violation, e.g. "Speeding"
    #[arg(long)]
    pub violation: String,

    /// Fine amount
    #[arg(short, long)]
    pub amount: u64,

    /// Where the violation happened (defaults to the configured location)
    #[arg(short, long)]
    pub location: Option<String>,

    /// Payment state of the fine
    #[arg(short, long, value_enum, default_value = "pending")]
    pub status: StatusArg,
}

/// Delete command arguments.
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Exact plate number
    pub plate: String,
}

/// Stats command arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Payload ingestion commands.
#[derive(Debug, Subcommand)]
pub enum IngestCommand {
    /// Apply one live-feed frame analysis
    Frame {
        /// JSON file with `detectedPlates`, `count` and optional `violations`
        file: PathBuf,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Apply a batch of video detections and issue fines
    Video {
        /// JSON file with an array of detections
        file: PathBuf,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },
}

/// Watch command arguments.
#[derive(Debug, Args)]
pub struct WatchCommand {
    /// JSON file with an array of recorded frame analyses
    pub file: PathBuf,

    /// Interval between frames in milliseconds (defaults to configuration)
    #[arg(short, long)]
    pub interval_ms: Option<u64>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Fine status argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    /// Already settled
    Paid,
    /// Still outstanding
    Pending,
}

impl From<StatusArg> for FineStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Paid => Self::Paid,
            StatusArg::Pending => Self::Pending,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}
