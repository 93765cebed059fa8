//! Command-line arguments

use crate::config::Config;
use crate::error::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Download SoundCloud playlists and user feeds with parallel scdl workers
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "scdl-parallel")]
#[command(version)]
#[command(about = "Download SoundCloud playlists and user feeds with parallel scdl workers")]
pub struct Args {
    /// SoundCloud playlist or user URL
    pub url: String,

    /// Number of parallel downloads [default: 4]
    #[arg(long)]
    pub threads: Option<usize>,

    /// Base output directory [default: ./downloads]
    #[arg(long = "output_dir", alias = "output-dir", value_name = "PATH")]
    pub output_dir: Option<PathBuf>,

    /// Archive file shared by all downloads [default: archive.txt]
    #[arg(long = "archive_file", alias = "archive-file", value_name = "PATH")]
    pub archive_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// TOML configuration file; flags given on the command line win
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to the scdl executable (default: search PATH)
    #[arg(long = "scdl_path", alias = "scdl-path", value_name = "PATH")]
    pub scdl_path: Option<PathBuf>,

    /// Retry a failed track this many times
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,

    /// Give up on a single track after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Exit with status 1 if any track failed
    #[arg(long)]
    pub strict: bool,
}

impl Args {
    /// Build the effective configuration: file (or defaults), then flags
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, or the
    /// merged configuration is invalid.
    pub fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_toml_file(path)?,
            None => Config::default(),
        };

        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        if let Some(output_dir) = self.output_dir {
            config.output_dir = output_dir;
        }
        if let Some(archive_file) = self.archive_file {
            config.archive_file = archive_file;
        }
        if let Some(scdl_path) = self.scdl_path {
            config.downloader.scdl_path = Some(scdl_path);
        }
        if let Some(retries) = self.retries {
            config.retry.max_attempts = retries;
        }
        if let Some(secs) = self.timeout {
            config.task_timeout = Some(Duration::from_secs(secs));
        }
        config.debug |= self.debug;
        config.strict |= self.strict;

        config.validate()?;
        Ok(config)
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["scdl-parallel", "https://soundcloud.com/u"]).unwrap();
        assert_eq!(args.url, "https://soundcloud.com/u");

        let config = args.into_config().unwrap();
        assert_eq!(config.threads, 4);
        assert_eq!(config.output_dir, PathBuf::from("./downloads"));
        assert_eq!(config.archive_file, PathBuf::from("archive.txt"));
        assert!(!config.debug);
        assert!(!config.strict);
        assert_eq!(config.retry.max_attempts, 0);
        assert_eq!(config.task_timeout, None);
    }

    #[test]
    fn test_underscore_flags_and_aliases() {
        let args = Args::try_parse_from([
            "scdl-parallel",
            "--threads",
            "8",
            "--output_dir",
            "/music",
            "--archive-file",
            "/music/ledger.txt",
            "--debug",
            "https://soundcloud.com/u/sets/p",
        ])
        .unwrap();

        let config = args.into_config().unwrap();
        assert_eq!(config.threads, 8);
        assert_eq!(config.output_dir, PathBuf::from("/music"));
        assert_eq!(config.archive_file, PathBuf::from("/music/ledger.txt"));
        assert!(config.debug);
    }

    #[test]
    fn test_supplementary_flags() {
        let args = Args::try_parse_from([
            "scdl-parallel",
            "https://soundcloud.com/u",
            "--retries",
            "2",
            "--timeout",
            "300",
            "--strict",
            "--scdl_path",
            "/opt/scdl/bin/scdl",
        ])
        .unwrap();

        let config = args.into_config().unwrap();
        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.task_timeout, Some(Duration::from_secs(300)));
        assert!(config.strict);
        assert_eq!(
            config.downloader.scdl_path,
            Some(PathBuf::from("/opt/scdl/bin/scdl"))
        );
    }

    #[test]
    fn test_missing_url_is_rejected() {
        assert!(Args::try_parse_from(["scdl-parallel", "--threads", "2"]).is_err());
    }

    #[test]
    fn test_zero_threads_is_config_error() {
        let args =
            Args::try_parse_from(["scdl-parallel", "--threads", "0", "https://soundcloud.com/u"])
                .unwrap();
        assert!(matches!(args.into_config(), Err(Error::Config { .. })));
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scdl-parallel.toml");
        std::fs::write(
            &path,
            "threads = 6\narchive_file = \"from-file.txt\"\n\n[retry]\nmax_attempts = 3\n",
        )
        .unwrap();

        let args = Args::try_parse_from([
            "scdl-parallel",
            "--config",
            path.to_str().unwrap(),
            "--threads",
            "2",
            "https://soundcloud.com/u",
        ])
        .unwrap();

        let config = args.into_config().unwrap();
        assert_eq!(config.threads, 2);
        assert_eq!(config.archive_file, PathBuf::from("from-file.txt"));
        assert_eq!(config.retry.max_attempts, 3);
    }
}
