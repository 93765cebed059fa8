//! # scdl-parallel
//!
//! Parallel SoundCloud downloader built on the `scdl` command-line tool.
//!
//! A playlist or user URL is expanded into individual track URLs, and each
//! track is downloaded by its own `scdl` process on a bounded pool of
//! workers. Every invocation shares one archive file, so re-running the same
//! URL only fetches tracks that are not recorded yet.
//!
//! ## Quick Start
//!
//! ```no_run
//! use scdl_parallel::{Config, ScdlDownloader, app};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         threads: 8,
//!         ..Default::default()
//!     };
//!     let downloader = Arc::new(ScdlDownloader::from_config(&config.downloader)?);
//!
//!     let report = app::run(
//!         &config,
//!         "https://soundcloud.com/someuser/sets/myplaylist",
//!         downloader,
//!         CancellationToken::new(),
//!     )
//!     .await?;
//!
//!     app::log_report(&report);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Top-level run orchestration
pub mod app;
/// Archive ledger inspection
pub mod archive;
/// Command-line arguments
pub mod cli;
/// Configuration types
pub mod config;
/// Bounded parallel download dispatch
pub mod dispatcher;
/// External downloader abstraction
pub mod downloader;
/// Track enumeration
pub mod enumerator;
/// Error types
pub mod error;
/// Logging setup
pub mod logging;
/// Retry logic with exponential backoff
pub mod retry;
/// SoundCloud URL classification
pub mod source;
/// Core types
pub mod types;
/// Single-track download worker
pub mod worker;

pub use archive::ArchiveLedger;
pub use config::{Config, DownloaderConfig, RetryConfig};
pub use dispatcher::Dispatcher;
pub use downloader::{ScdlDownloader, TrackDownloader};
pub use error::{Error, Result, ToExitCode};
pub use source::{Source, SourceKind};
pub use types::{DownloadOutcome, DownloadTask, RunReport, TrackUrl};

use tokio_util::sync::CancellationToken;

/// Cancel `token` when the process receives SIGINT or SIGTERM (Ctrl+C on
/// other platforms)
///
/// Meant to be spawned next to the run. If no signal handler can be
/// installed, the token is left alone.
pub async fn cancel_on_signal(token: CancellationToken) {
    if wait_for_signal().await {
        tracing::warn!("Cancelling remaining downloads");
        token.cancel();
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> bool {
    use tokio::signal::unix::{SignalKind, signal};

    // Signal registration may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
            true
        }
        (Err(e), Ok(mut sigint)) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            sigint.recv().await;
            tracing::info!("Received SIGINT signal (Ctrl+C)");
            true
        }
        (Ok(mut sigterm), Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            sigterm.recv().await;
            tracing::info!("Received SIGTERM signal");
            true
        }
        (Err(e), Err(_)) => {
            tracing::error!(error = %e, "Could not register any signal handlers, using ctrl_c fallback");
            tokio::signal::ctrl_c().await.is_ok()
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> bool {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
            false
        }
    }
}
