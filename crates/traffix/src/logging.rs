//! Logging configuration for traffix.
//!
//! Sets up the tracing subscriber used by the `traffix` binary. Logs always
//! go to stderr; stdout is reserved for command output, which may itself be
//! JSON.

use clap::ValueEnum;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Verbosity level for logging output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Suppress all output except errors.
    Quiet,
    /// Normal output level (info and above).
    #[default]
    Normal,
    /// Verbose output (debug and above).
    Verbose,
    /// Very verbose output (trace level).
    Trace,
}

impl Verbosity {
    /// Convert verbosity to tracing level filter.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }
}

/// Shape of each log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable single lines.
    #[default]
    Text,
    /// One JSON object per event, for log shippers.
    Json,
}

/// Filter directive used when `RUST_LOG` is not set.
fn default_directive(verbosity: Verbosity) -> String {
    format!("traffix={}", verbosity.to_level_filter())
}

/// Initialize the logging system.
///
/// Call once at startup. `RUST_LOG` takes precedence over `verbosity`.
/// Later calls are ignored.
///
/// # Examples
///
/// ```no_run
/// use traffix::{init_logging, logging::{LogFormat, Verbosity}};
///
/// init_logging(Verbosity::Verbose, LogFormat::Json);
/// ```
pub fn init_logging(verbosity: Verbosity, format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = match format {
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_current_span(false),
            )
            .try_init(),
    };

    if installed.is_ok() {
        tracing::trace!(?verbosity, ?format, "Logging initialized");
    }
}
