//! Track enumeration for a classified source

use crate::archive::ArchiveLedger;
use crate::downloader::TrackDownloader;
use crate::source::Source;
use crate::types::TrackUrl;

/// List the tracks behind a playlist or user URL
///
/// Never fails: if the downloader cannot list the source the error is logged
/// and an empty list comes back, which the caller treats as "nothing to do".
pub async fn enumerate(
    downloader: &dyn TrackDownloader,
    source: &Source,
    ledger: &ArchiveLedger,
) -> Vec<TrackUrl> {
    tracing::info!(kind = %source.kind(), name = source.name(), "Enumerating tracks");

    match downloader.list_tracks(source, ledger.path()).await {
        Ok(tracks) => {
            tracing::info!(count = tracks.len(), "Found {} tracks", tracks.len());
            tracks
        }
        Err(e) => {
            tracing::error!(
                url = source.url(),
                downloader = downloader.name(),
                error = %e,
                "Error fetching track URLs"
            );
            Vec::new()
        }
    }
}
