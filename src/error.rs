//! Error types for scdl-parallel
//!
//! This module provides the error handling for the library, including:
//! - A single domain error type covering configuration, URL classification,
//!   external tool execution and filesystem failures
//! - Process exit code mapping for the command-line binary
//!
//! Per-track failures never surface as [`Error`] past the dispatcher; they are
//! folded into a [`DownloadOutcome::Failure`](crate::types::DownloadOutcome).

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for scdl-parallel operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for scdl-parallel
///
/// Each variant carries enough context to produce a useful log line without
/// any additional lookup.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "threads")
        key: Option<String>,
    },

    /// The input is not a recognized SoundCloud playlist or user URL
    #[error("invalid SoundCloud URL: {0}")]
    InvalidUrl(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// External tool could not be executed or communicated with
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// External tool ran but reported failure through its exit status
    #[error("{tool} exited with {}: {detail}", describe_status(.status))]
    ToolFailed {
        /// Name of the tool that failed (e.g., "scdl")
        tool: String,
        /// Exit code, `None` if the process was terminated by a signal
        status: Option<i32>,
        /// Trailing diagnostic output captured from the tool
        detail: String,
    },

    /// External tool did not finish within the configured task timeout
    #[error("timed out after {}s", .after.as_secs())]
    TimedOut {
        /// The timeout that elapsed
        after: Duration,
    },

    /// Output directory could not be prepared
    #[error("cannot prepare output directory {path}: {reason}")]
    OutputDir {
        /// The directory that could not be created
        path: PathBuf,
        /// The underlying reason
        reason: String,
    },

    /// Work was cancelled before it could complete
    #[error("cancelled")]
    Cancelled,

    /// Operation not supported (missing binary, etc.)
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Configuration file could not be parsed
    #[error("failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

impl Error {
    /// Shorthand for a configuration error tied to a specific key
    pub fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }
}

/// Convert errors to process exit codes for the command-line binary
///
/// Codes follow sysexits.h where one fits.
pub trait ToExitCode {
    /// Get the process exit code for this error
    fn exit_code(&self) -> i32;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

/// Exit code used when the run was interrupted
pub const EXIT_CANCELLED: i32 = 130;

impl ToExitCode for Error {
    fn exit_code(&self) -> i32 {
        match self {
            // Usage errors - bad input from the caller
            Error::InvalidUrl(_) => 2,
            Error::Config { .. } | Error::ConfigParse(_) => 78,

            // Required external tool missing
            Error::NotSupported(_) => 69,

            // I/O and filesystem
            Error::Io(_) | Error::OutputDir { .. } => 74,

            // External tool problems
            Error::ExternalTool(_) | Error::ToolFailed { .. } | Error::TimedOut { .. } => 1,

            Error::Cancelled => EXIT_CANCELLED,

            Error::Other(_) => 70,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::InvalidUrl(_) => "invalid_url",
            Error::Io(_) => "io_error",
            Error::ExternalTool(_) => "external_tool_error",
            Error::ToolFailed { .. } => "tool_failed",
            Error::TimedOut { .. } => "timed_out",
            Error::OutputDir { .. } => "output_dir_error",
            Error::Cancelled => "cancelled",
            Error::NotSupported(_) => "not_supported",
            Error::ConfigParse(_) => "config_parse_error",
            Error::Other(_) => "internal_error",
        }
    }
}
