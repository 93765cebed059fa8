//! SoundCloud source URL classification
//!
//! A source is either a playlist (`/<user>/sets/<playlist>`) or a user feed
//! (`/<user>`, optionally followed by a tab such as `/tracks`). The last named
//! component becomes the subdirectory under the base output directory.

use crate::error::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

const SOUNDCLOUD_DOMAIN: &str = "soundcloud.com";

/// Kind of source a URL points at
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    /// A playlist (`/sets/` URL)
    Playlist,
    /// A user profile / track feed
    User,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Playlist => f.write_str("playlist"),
            SourceKind::User => f.write_str("user"),
        }
    }
}

/// A classified SoundCloud URL
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Source {
    url: String,
    kind: SourceKind,
    name: String,
}

impl Source {
    /// Classify a SoundCloud playlist or user URL
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] when the input is not a SoundCloud URL or
    /// has no user component.
    ///
    /// # Examples
    ///
    /// ```
    /// use scdl_parallel::source::{Source, SourceKind};
    ///
    /// let source = Source::parse("https://soundcloud.com/someuser/sets/myplaylist").unwrap();
    /// assert_eq!(source.kind(), SourceKind::Playlist);
    /// assert_eq!(source.name(), "myplaylist");
    ///
    /// assert!(Source::parse("https://example.com/not-soundcloud").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let normalized = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            // Pasted without a scheme, e.g. "soundcloud.com/user/sets/name"
            format!("https://{}", trimmed)
        };
        let url = Url::parse(&normalized)
            .map_err(|e| Error::InvalidUrl(format!("{} ({})", trimmed, e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl(format!(
                "{} (unsupported scheme {})",
                trimmed,
                url.scheme()
            )));
        }

        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        if host != SOUNDCLOUD_DOMAIN && !host.ends_with(".soundcloud.com") {
            return Err(Error::InvalidUrl(format!(
                "{} (not a {} address)",
                trimmed, SOUNDCLOUD_DOMAIN
            )));
        }

        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        let user = segments
            .first()
            .ok_or_else(|| Error::InvalidUrl(format!("{} (no user or playlist path)", trimmed)))?;

        // A bare "/sets" tab without a playlist name is still the user's feed
        let playlist = segments
            .windows(2)
            .find(|pair| pair[0] == "sets")
            .map(|pair| pair[1]);
        let (kind, raw_name) = match playlist {
            Some(name) => (SourceKind::Playlist, name),
            None => (SourceKind::User, *user),
        };

        let name = decode_segment(raw_name);
        if name.is_empty() || name == "." || name == ".." {
            return Err(Error::InvalidUrl(format!(
                "{} (unusable name {:?})",
                trimmed, raw_name
            )));
        }

        Ok(Self {
            url: normalized,
            kind,
            name,
        })
    }

    /// The URL handed to scdl (given URL, with `https://` added when it had no scheme)
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Playlist or user
    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Playlist name or user name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory downloads of this source land in
    pub fn output_dir(&self, base: &Path) -> PathBuf {
        base.join(&self.name)
    }
}

/// Percent-decode a path segment and strip path separators
fn decode_segment(raw: &str) -> String {
    let decoded = urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    decoded.replace(['/', '\\'], "_")
}
