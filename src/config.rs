//! Configuration types for scdl-parallel

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// External downloader settings
///
/// Groups settings for locating the `scdl` binary.
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloaderConfig {
    /// Path to scdl executable (auto-detected if None)
    #[serde(default)]
    pub scdl_path: Option<PathBuf>,

    /// Whether to search PATH for scdl if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            scdl_path: None,
            search_path: true,
        }
    }
}

/// Retry configuration for transient download failures
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first try (default: 0)
    #[serde(default)]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 2 seconds)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 60 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 0,
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

/// Main configuration, built once at startup and passed explicitly to the
/// enumerator and dispatcher.
///
/// Can be loaded from a TOML file; every field has a default so an empty file
/// is a valid configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Number of downloads running at once (default: 4)
    #[serde(default = "default_threads")]
    pub threads: usize,

    /// Base output directory (default: "./downloads")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Archive ledger handed to every scdl invocation (default: "archive.txt")
    #[serde(default = "default_archive_file")]
    pub archive_file: PathBuf,

    /// Verbose logging
    #[serde(default)]
    pub debug: bool,

    /// Per-task timeout (None = wait forever)
    #[serde(default, with = "optional_duration_serde")]
    pub task_timeout: Option<Duration>,

    /// Exit non-zero when any track failed
    #[serde(default)]
    pub strict: bool,

    /// External downloader settings
    #[serde(default)]
    pub downloader: DownloaderConfig,

    /// Retry behavior for failed downloads
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            output_dir: default_output_dir(),
            archive_file: default_archive_file(),
            debug: false,
            task_timeout: None,
            strict: false,
            downloader: DownloaderConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("cannot read {}: {}", path.display(), e),
            key: None,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Check that the configuration can drive a run
    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(Error::config("threads", "must be at least 1"));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(Error::config("output_dir", "must not be empty"));
        }
        if self.archive_file.as_os_str().is_empty() {
            return Err(Error::config("archive_file", "must not be empty"));
        }
        if let Some(timeout) = self.task_timeout
            && timeout.is_zero()
        {
            return Err(Error::config("task_timeout", "must be greater than zero"));
        }
        if !self.retry.backoff_multiplier.is_finite() || self.retry.backoff_multiplier < 1.0 {
            return Err(Error::config(
                "retry.backoff_multiplier",
                "must be a finite number >= 1.0",
            ));
        }
        if self.retry.initial_delay > self.retry.max_delay {
            return Err(Error::config(
                "retry.initial_delay",
                "must not exceed retry.max_delay",
            ));
        }
        Ok(())
    }
}

fn default_threads() -> usize {
    4
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_archive_file() -> PathBuf {
    PathBuf::from("archive.txt")
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(2)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(60)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Optional Duration serialization helper
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
