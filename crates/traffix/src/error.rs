//! Error types for traffix.
//!
//! Registry operations never fail: a missing or duplicate plate is reported
//! through their boolean or `Option` results. This type covers everything
//! around the registry (configuration, payload files, the analysis seam).

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for traffix operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Registry Errors ===
    /// An initial record set contained the same plate twice.
    #[error("duplicate plate in initial records: {plate}")]
    DuplicatePlate {
        /// The plate that appeared more than once.
        plate: String,
    },

    // === Ingest Errors ===
    /// Failed to read an analysis payload file.
    #[error("failed to read payload {path}: {source}")]
    PayloadRead {
        /// Path to the payload file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The external analysis service failed for a frame.
    #[error("frame analysis failed in '{analyzer}': {message}")]
    Analysis {
        /// Name of the analyzer.
        analyzer: &'static str,
        /// Description of what went wrong.
        message: String,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for traffix operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an analysis error for the named analyzer.
    #[must_use]
    pub fn analysis(analyzer: &'static str, message: impl Into<String>) -> Self {
        Self::Analysis {
            analyzer,
            message: message.into(),
        }
    }

    /// Create a configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }
}
