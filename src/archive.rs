//! Download archive ledger
//!
//! scdl owns the archive file: it reads it to skip tracks that were already
//! downloaded and appends an entry after each successful download. This crate
//! only hands the same path to every invocation of a run and counts its entries
//! for diagnostics. Entries are never rewritten or removed here.

use crate::error::Result;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Handle to the archive file shared by every scdl invocation of a run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveLedger {
    path: PathBuf,
}

impl ArchiveLedger {
    /// Create a ledger handle for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path passed to `--download-archive`
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Make sure scdl can create the ledger: creates missing parent directories.
    ///
    /// An existing ledger is left untouched.
    pub async fn prepare(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Load the recorded entries. A missing ledger has no entries.
    async fn entries(&self) -> Result<Vec<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Number of recorded entries
    pub async fn entry_count(&self) -> Result<usize> {
        Ok(self.entries().await?.len())
    }
}
