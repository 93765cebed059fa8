//! Single-track download worker
//!
//! Runs one download task to completion and folds every failure path into a
//! [`DownloadOutcome`]; nothing escapes as an error.

use crate::config::{Config, RetryConfig};
use crate::downloader::TrackDownloader;
use crate::error::{Error, Result};
use crate::retry::download_with_retry;
use crate::types::{DownloadOutcome, DownloadTask};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

/// How a worker runs each task
#[derive(Clone, Debug, Default)]
pub struct WorkerPolicy {
    /// Retry behavior for failed attempts
    pub retry: RetryConfig,
    /// Limit for a single attempt (None = unlimited)
    pub timeout: Option<Duration>,
}

impl WorkerPolicy {
    /// Build the policy from configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            retry: config.retry.clone(),
            timeout: config.task_timeout,
        }
    }
}

/// Download one track and report how it went
///
/// The clock starts before the first spawn and stops after the last attempt
/// finished, so the reported time covers retries and backoff.
pub async fn download_one(
    downloader: &dyn TrackDownloader,
    task: &DownloadTask,
    policy: &WorkerPolicy,
    cancel: &CancellationToken,
) -> DownloadOutcome {
    let start = Instant::now();

    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        result = download_with_retry(&policy.retry, || attempt(downloader, task, policy.timeout)) => result,
    };

    let elapsed = start.elapsed();

    match result {
        Ok(()) => {
            tracing::debug!(
                track = %task.track_url,
                elapsed_secs = elapsed.as_secs_f64(),
                "Track finished"
            );
            DownloadOutcome::success(task.track_url.clone(), elapsed)
        }
        Err(e) => {
            tracing::warn!(track = %task.track_url, error = %e, "Track failed");
            DownloadOutcome::failure(task.track_url.clone(), e.to_string())
        }
    }
}

async fn attempt(
    downloader: &dyn TrackDownloader,
    task: &DownloadTask,
    timeout: Option<Duration>,
) -> Result<()> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, downloader.download_track(task))
            .await
            .map_err(|_| Error::TimedOut { after: limit })?,
        None => downloader.download_track(task).await,
    }
}
