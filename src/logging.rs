//! Logging setup
//!
//! One timestamped, human-readable stream on stderr. `RUST_LOG` picks the
//! filter unless `--debug` is given, which forces debug output for this crate.

use crate::error::{Error, Result};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEBUG_FILTER: &str = "scdl_parallel=debug,info";
const DEFAULT_FILTER: &str = "info";

/// Install the global tracing subscriber
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(debug: bool) -> Result<()> {
    tracing_subscriber::registry()
        .with(build_filter(debug))
        .with(fmt::layer().with_target(debug).with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| Error::Other(format!("failed to initialize logging: {}", e)))
}

fn build_filter(debug: bool) -> EnvFilter {
    if debug {
        EnvFilter::new(DEBUG_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}
