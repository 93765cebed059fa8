//! External downloader abstraction
//!
//! This module provides a trait-based architecture for driving the tool that
//! actually talks to SoundCloud. The orchestration code (enumerator, worker,
//! dispatcher) only sees [`TrackDownloader`], so tests can substitute an
//! in-process implementation for the real binary.
//!
//! - [`ScdlDownloader`]: runs the external `scdl` binary
//!
//! ## Usage
//!
//! ```no_run
//! use scdl_parallel::downloader::{ScdlDownloader, TrackDownloader};
//! use scdl_parallel::source::Source;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = ScdlDownloader::from_path()
//!         .expect("scdl binary not found");
//!
//!     let source = Source::parse("https://soundcloud.com/someuser/sets/myplaylist")?;
//!     let tracks = downloader.list_tracks(&source, Path::new("archive.txt")).await?;
//!     println!("{} tracks", tracks.len());
//!     Ok(())
//! }
//! ```

mod lines;
mod scdl;

pub use lines::DiagnosticLines;
pub use scdl::ScdlDownloader;

use crate::source::Source;
use crate::types::{DownloadTask, TrackUrl};
use async_trait::async_trait;
use std::path::Path;

/// Trait for the external tool that enumerates and downloads tracks
///
/// Implementations own the archive-file semantics: a download for a track that
/// is already recorded in the archive must succeed without fetching it again.
#[async_trait]
pub trait TrackDownloader: Send + Sync {
    /// List the track URLs of a playlist or user feed
    ///
    /// Tracks already present in the archive are still listed; skipping
    /// happens inside each download.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool cannot be executed or reports failure.
    async fn list_tracks(&self, source: &Source, archive_file: &Path)
    -> crate::Result<Vec<TrackUrl>>;

    /// Download one track into `task.output_dir`, recording it in
    /// `task.archive_file`
    ///
    /// Progress output is forwarded to the log as it is produced.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool cannot be executed or exits with a
    /// failure status.
    async fn download_track(&self, task: &DownloadTask) -> crate::Result<()>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
