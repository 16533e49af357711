//! Command-line interface for traffix.
//!
//! This module provides the CLI structure for the `traffix` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::LogFormat;

pub use commands::{
    ConfigCommand, DeleteCommand, FineCommand, IngestCommand, ListCommand, OutputFormat,
    RegisterCommand, SearchCommand, ShowCommand, StatsCommand, StatusArg, WatchCommand,
};

/// traffix - Vehicle registry and violation ledger
///
/// Looks up vehicles, issues fines, and applies plate detections from live
/// camera frames and analyzed video clips. The registry lives in memory and
/// starts from the demo vehicles on every run.
#[derive(Debug, Parser)]
#[command(name = "traffix")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Format of log lines written to stderr
    #[arg(long, value_enum, global = true, default_value = "text")]
    pub log_format: LogFormat,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List every registered vehicle
    List(ListCommand),

    /// Search vehicles by plate or owner
    Search(SearchCommand),

    /// Show one vehicle and its fine history
    Show(ShowCommand),

    /// Register a plate if it is not known yet
    ///
    /// The registry is rebuilt on every run, so the new record only lives
    /// for this invocation.
    Register(RegisterCommand),

    /// Issue a fine to a registered vehicle
    ///
    /// The registry is rebuilt on every run, so the fine is reported but
    /// not kept.
    Fine(FineCommand),

    /// Delete a vehicle and its history
    ///
    /// The registry is rebuilt on every run, so the deletion only lasts
    /// for this invocation.
    Delete(DeleteCommand),

    /// Show registry statistics
    Stats(StatsCommand),

    /// Apply an analysis payload from a file
    #[command(subcommand)]
    Ingest(IngestCommand),

    /// Replay recorded frame analyses through the live feed
    Watch(WatchCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "traffix");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_flags() {
        use crate::logging::Verbosity;

        assert_eq!(parse(&["traffix", "-q", "list"]).verbosity(), Verbosity::Quiet);
        assert_eq!(parse(&["traffix", "list"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["traffix", "-v", "list"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["traffix", "-vv", "list"]).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_search() {
        let cli = parse(&["traffix", "search", "abc", "--format", "json"]);
        match cli.command {
            Command::Search(cmd) => {
                assert_eq!(cmd.query, "abc");
                assert_eq!(cmd.format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_register_default_type() {
        let cli = parse(&["traffix", "register", "XY-000"]);
        match cli.command {
            Command::Register(cmd) => {
                assert_eq!(cmd.plate, "XY-000");
                assert_eq!(cmd.vehicle_type, "Unknown");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_fine() {
        let cli = parse(&[
            "traffix", "fine", "ABC-1234", "--violation", "Speeding", "--amount", "150",
        ]);
        match cli.command {
            Command::Fine(cmd) => {
                assert_eq!(cmd.plate, "ABC-1234");
                assert_eq!(cmd.amount, 150);
                assert_eq!(cmd.status, StatusArg::Pending);
                assert!(cmd.location.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_ingest_video() {
        let cli = parse(&["traffix", "ingest", "video", "clip.json"]);
        assert!(matches!(
            cli.command,
            Command::Ingest(IngestCommand::Video { .. })
        ));
    }

    #[test]
    fn test_parse_watch_with_interval() {
        let cli = parse(&["traffix", "watch", "frames.json", "--interval-ms", "10"]);
        match cli.command {
            Command::Watch(cmd) => {
                assert_eq!(cmd.file, PathBuf::from("frames.json"));
                assert_eq!(cmd.interval_ms, Some(10));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_log_format_flag() {
        assert_eq!(parse(&["traffix", "list"]).log_format, LogFormat::Text);
        let cli = parse(&["traffix", "stats", "--log-format", "json"]);
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn test_mutating_commands_mention_non_persistence() {
        let mut command = Cli::command();
        command.build();
        for name in ["register", "fine", "delete"] {
            let mut sub = command.find_subcommand(name).unwrap().clone();
            let help = sub.render_long_help().to_string();
            assert!(help.contains("every run"), "{name}: {help}");
        }
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["traffix", "-c", "/custom/config.toml", "stats"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_fine_requires_amount() {
        let result = Cli::try_parse_from(["traffix", "fine", "ABC-1234", "--violation", "x"]);
        assert!(result.is_err());
    }
}
