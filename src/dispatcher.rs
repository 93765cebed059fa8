//! Bounded parallel fan-out of download tasks
//!
//! At most `parallelism` workers run at once. Outcomes are collected in
//! completion order, one per input track, and a task that panics is reported
//! as a failure for its own URL without disturbing the others.

use crate::config::Config;
use crate::downloader::TrackDownloader;
use crate::error::{Error, Result};
use crate::types::{DownloadOutcome, DownloadTask, TrackUrl};
use crate::worker::{WorkerPolicy, download_one};
use futures::stream::{self, StreamExt};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Runs download tasks on a bounded pool of workers
pub struct Dispatcher {
    downloader: Arc<dyn TrackDownloader>,
    parallelism: usize,
    policy: WorkerPolicy,
    cancel: CancellationToken,
}

impl Dispatcher {
    /// Create a dispatcher using the thread count and worker policy from `config`
    ///
    /// A thread count of zero is treated as one.
    pub fn new(downloader: Arc<dyn TrackDownloader>, config: &Config) -> Self {
        Self {
            downloader,
            parallelism: config.threads.max(1),
            policy: WorkerPolicy::from_config(config),
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally owned cancellation token
    ///
    /// Once it fires, tasks that have not started yet resolve to a
    /// "cancelled" failure and running downloads are killed.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Maximum number of concurrent workers
    pub fn parallelism(&self) -> usize {
        self.parallelism
    }

    /// Download every track into `output_dir`, sharing `archive_file`
    ///
    /// Returns exactly one outcome per input track.
    ///
    /// # Errors
    ///
    /// Fails only if `output_dir` cannot be created; individual download
    /// failures are reported as [`DownloadOutcome::Failure`].
    pub async fn run_all(
        &self,
        tracks: Vec<TrackUrl>,
        output_dir: &Path,
        archive_file: &Path,
    ) -> Result<Vec<DownloadOutcome>> {
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| Error::OutputDir {
                path: output_dir.to_path_buf(),
                reason: e.to_string(),
            })?;

        let total = tracks.len();
        tracing::info!(
            total,
            parallelism = self.parallelism,
            output_dir = %output_dir.display(),
            "Starting downloads"
        );

        let mut finished = 0usize;
        let outcomes = stream::iter(tracks)
            .map(|track_url| {
                let task = DownloadTask {
                    track_url: track_url.clone(),
                    output_dir: output_dir.to_path_buf(),
                    archive_file: archive_file.to_path_buf(),
                };
                let downloader = Arc::clone(&self.downloader);
                let policy = self.policy.clone();
                let cancel = self.cancel.clone();

                let handle = tokio::spawn(async move {
                    download_one(downloader.as_ref(), &task, &policy, &cancel).await
                });

                async move {
                    match handle.await {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            tracing::error!(track = %track_url, error = %e, "Download task panicked");
                            DownloadOutcome::failure(track_url, format!("task failed: {}", e))
                        }
                    }
                }
            })
            .buffer_unordered(self.parallelism)
            .inspect(|outcome| {
                finished += 1;
                tracing::debug!(
                    finished,
                    total,
                    track = %outcome.track_url(),
                    success = outcome.is_success(),
                    "Task completed"
                );
            })
            .collect::<Vec<_>>()
            .await;

        Ok(outcomes)
    }
}
