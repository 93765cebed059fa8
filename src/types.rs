//! Core types for scdl-parallel

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// URL of a single downloadable track
///
/// Opaque to this crate; canonicalization belongs to scdl.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrackUrl(String);

impl TrackUrl {
    /// Create a new TrackUrl
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Borrow the URL text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TrackUrl {
    fn from(url: String) -> Self {
        Self(url)
    }
}

impl From<&str> for TrackUrl {
    fn from(url: &str) -> Self {
        Self(url.to_string())
    }
}

impl AsRef<str> for TrackUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One unit of work handed to a download worker
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadTask {
    /// Track to download
    pub track_url: TrackUrl,
    /// Directory scdl writes into
    pub output_dir: PathBuf,
    /// Archive ledger shared by every invocation of the run
    pub archive_file: PathBuf,
}

/// Result of one download task
#[derive(Clone, Debug, PartialEq)]
pub enum DownloadOutcome {
    /// scdl exited successfully (including "already archived" skips)
    Success {
        /// Track that was downloaded
        track_url: TrackUrl,
        /// Wall-clock time across all attempts, rounded to two decimals
        elapsed_seconds: f64,
    },
    /// scdl failed, could not be run, or the task itself went wrong
    Failure {
        /// Track that failed
        track_url: TrackUrl,
        /// Human-readable failure detail
        error: String,
    },
}

impl DownloadOutcome {
    /// Build a success outcome from a measured duration
    pub fn success(track_url: TrackUrl, elapsed: Duration) -> Self {
        DownloadOutcome::Success {
            track_url,
            elapsed_seconds: round_secs(elapsed),
        }
    }

    /// Build a failure outcome
    pub fn failure(track_url: TrackUrl, error: impl Into<String>) -> Self {
        DownloadOutcome::Failure {
            track_url,
            error: error.into(),
        }
    }

    /// Track this outcome belongs to
    pub fn track_url(&self) -> &TrackUrl {
        match self {
            DownloadOutcome::Success { track_url, .. } => track_url,
            DownloadOutcome::Failure { track_url, .. } => track_url,
        }
    }

    /// Whether the task succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, DownloadOutcome::Success { .. })
    }
}

impl fmt::Display for DownloadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadOutcome::Success {
                track_url,
                elapsed_seconds,
            } => write!(
                f,
                "Successfully downloaded: {} in {:.2} seconds",
                track_url, elapsed_seconds
            ),
            DownloadOutcome::Failure { track_url, error } => {
                write!(f, "Error downloading {}: {}", track_url, error)
            }
        }
    }
}

fn round_secs(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 100.0).round() / 100.0
}

/// What a complete run produced
#[derive(Clone, Debug, PartialEq)]
pub enum RunReport {
    /// Enumeration found nothing; no downloads were attempted
    NoTracks,
    /// Every enumerated track produced an outcome, in completion order
    Completed {
        /// Outcomes in the order they were collected
        outcomes: Vec<DownloadOutcome>,
        /// Whether the run was interrupted before all tracks could start
        cancelled: bool,
    },
}

impl RunReport {
    /// Collected outcomes (empty for [`RunReport::NoTracks`])
    pub fn outcomes(&self) -> &[DownloadOutcome] {
        match self {
            RunReport::NoTracks => &[],
            RunReport::Completed { outcomes, .. } => outcomes,
        }
    }

    /// Number of successful downloads
    pub fn succeeded(&self) -> usize {
        self.outcomes().iter().filter(|o| o.is_success()).count()
    }

    /// Number of failed downloads
    pub fn failed(&self) -> usize {
        self.outcomes().len() - self.succeeded()
    }

    /// Whether the run was cancelled
    pub fn was_cancelled(&self) -> bool {
        matches!(self, RunReport::Completed { cancelled: true, .. })
    }
}
