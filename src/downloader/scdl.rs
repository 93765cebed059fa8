//! CLI-based downloader using the external scdl binary

use super::TrackDownloader;
use super::lines::DiagnosticLines;
use crate::config::DownloaderConfig;
use crate::error::Error;
use crate::source::{Source, SourceKind};
use crate::types::{DownloadTask, TrackUrl};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncRead;
use tokio::process::Command;

/// Output policy shared by every invocation: lossless audio, no original-file
/// fallback, files organized by artist.
const FORMAT_ARGS: &[&str] = &["--extract-artist", "--flac", "--no-original"];

/// Diagnostic lines kept for the failure detail of a download
const FAILURE_TAIL_LINES: usize = 5;

const TOOL_NAME: &str = "scdl";

/// Downloader that shells out to `scdl`
///
/// # Examples
///
/// ```no_run
/// use scdl_parallel::downloader::{ScdlDownloader, TrackDownloader};
/// use std::path::PathBuf;
///
/// // Create with explicit path
/// let downloader = ScdlDownloader::new(PathBuf::from("/usr/local/bin/scdl"));
///
/// // Or auto-discover from PATH
/// let downloader = ScdlDownloader::from_path()
///     .expect("scdl not found in PATH");
/// assert_eq!(downloader.name(), "cli-scdl");
/// ```
#[derive(Clone, Debug)]
pub struct ScdlDownloader {
    binary_path: PathBuf,
}

impl ScdlDownloader {
    /// Create a new downloader with an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self { binary_path }
    }

    /// Attempt to find scdl in PATH
    ///
    /// Returns `None` if the binary cannot be found.
    pub fn from_path() -> Option<Self> {
        which::which(TOOL_NAME).ok().map(Self::new)
    }

    /// Resolve the binary from configuration: an explicit path wins, then PATH
    /// (when allowed).
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSupported`] when no usable binary is found.
    pub fn from_config(config: &DownloaderConfig) -> crate::Result<Self> {
        if let Some(path) = &config.scdl_path {
            return which::which(path).map(Self::new).map_err(|e| {
                Error::NotSupported(format!(
                    "configured scdl binary {} is not executable: {}",
                    path.display(),
                    e
                ))
            });
        }

        if config.search_path
            && let Some(downloader) = Self::from_path()
        {
            return Ok(downloader);
        }

        Err(Error::NotSupported(
            "scdl binary not found. Install scdl or pass --scdl_path.".into(),
        ))
    }

    /// Path of the binary being executed
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    /// Arguments for the URL-only listing of a playlist or user feed
    pub(crate) fn list_args(source: &Source, archive_file: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = match source.kind() {
            SourceKind::Playlist => vec!["--url".into(), source.url().into()],
            SourceKind::User => vec!["-c".into(), "-l".into(), source.url().into()],
        };
        args.push("--only".into());
        args.push("url".into());
        args.push("--download-archive".into());
        args.push(archive_file.as_os_str().to_owned());
        args.extend(FORMAT_ARGS.iter().map(OsString::from));
        args
    }

    /// Arguments for downloading a single track
    pub(crate) fn download_args(task: &DownloadTask) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-l".into(),
            task.track_url.as_str().into(),
            "-o".into(),
            task.output_dir.as_os_str().to_owned(),
            "--download-archive".into(),
            task.archive_file.as_os_str().to_owned(),
        ];
        args.extend(FORMAT_ARGS.iter().map(OsString::from));
        args
    }

    fn command(&self, args: &[OsString]) -> Command {
        let mut command = Command::new(&self.binary_path);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    fn spawn_error(&self, e: std::io::Error) -> Error {
        Error::ExternalTool(format!(
            "Failed to execute {}: {}",
            self.binary_path.display(),
            e
        ))
    }

    fn describe(&self, args: &[OsString]) -> String {
        std::iter::once(self.binary_path.as_os_str())
            .chain(args.iter().map(OsString::as_os_str))
            .map(|part| part.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl TrackDownloader for ScdlDownloader {
    async fn list_tracks(
        &self,
        source: &Source,
        archive_file: &Path,
    ) -> crate::Result<Vec<TrackUrl>> {
        let args = Self::list_args(source, archive_file);
        tracing::debug!(command = %self.describe(&args), "Listing tracks");

        let output = self
            .command(&args)
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stderr.lines().map(str::trim).filter(|l| !l.is_empty()) {
            tracing::debug!(source = source.url(), "{}", line);
        }

        if !output.status.success() {
            return Err(Error::ToolFailed {
                tool: TOOL_NAME.to_string(),
                status: output.status.code(),
                detail: tail_detail(stderr.lines()),
            });
        }

        Ok(parse_track_list(&output.stdout))
    }

    async fn download_track(&self, task: &DownloadTask) -> crate::Result<()> {
        let args = Self::download_args(task);
        tracing::info!(track = %task.track_url, "Executing command: {}", self.describe(&args));

        let mut child = self.command(&args).spawn().map_err(|e| self.spawn_error(e))?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::ExternalTool("Failed to capture scdl stderr".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::ExternalTool("Failed to capture scdl stdout".to_string()))?;

        // Drain both pipes while waiting so neither can fill up and block scdl
        let (tail, (), status) = tokio::try_join!(
            forward_diagnostics(stderr, &task.track_url),
            forward_output(stdout, &task.track_url),
            async { child.wait().await.map_err(Error::from) },
        )?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::ToolFailed {
                tool: TOOL_NAME.to_string(),
                status: status.code(),
                detail: tail_detail(tail.iter().map(String::as_str)),
            })
        }
    }

    fn name(&self) -> &'static str {
        "cli-scdl"
    }
}

/// Log every diagnostic line as it arrives, keeping the last few for error
/// reporting
async fn forward_diagnostics<R>(stream: R, track: &TrackUrl) -> crate::Result<VecDeque<String>>
where
    R: AsyncRead + Unpin,
{
    let mut lines = DiagnosticLines::new(stream);
    let mut tail = VecDeque::with_capacity(FAILURE_TAIL_LINES);
    while let Some(line) = lines.next_line().await? {
        tracing::info!(track = %track, "{}", line);
        if tail.len() == FAILURE_TAIL_LINES {
            tail.pop_front();
        }
        tail.push_back(line);
    }
    Ok(tail)
}

async fn forward_output<R>(stream: R, track: &TrackUrl) -> crate::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut lines = DiagnosticLines::new(stream);
    while let Some(line) = lines.next_line().await? {
        tracing::debug!(track = %track, "stdout: {}", line);
    }
    Ok(())
}

/// Split the listing output into track URLs, preserving order
pub(crate) fn parse_track_list(stdout: &[u8]) -> Vec<TrackUrl> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(TrackUrl::from)
        .collect()
}

fn tail_detail<'a>(lines: impl Iterator<Item = &'a str>) -> String {
    let collected: Vec<&str> = lines.map(str::trim).filter(|l| !l.is_empty()).collect();
    let start = collected.len().saturating_sub(FAILURE_TAIL_LINES);
    let detail = collected[start..].join(" | ");
    if detail.is_empty() {
        "no diagnostic output".to_string()
    } else {
        detail
    }
}
