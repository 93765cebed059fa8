//! Top-level run orchestration
//!
//! classify URL → prepare ledger → enumerate → dispatch → report.

use crate::archive::ArchiveLedger;
use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::downloader::TrackDownloader;
use crate::enumerator::enumerate;
use crate::error::{EXIT_CANCELLED, Result};
use crate::source::Source;
use crate::types::RunReport;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Download everything behind `url`
///
/// # Errors
///
/// Returns an error when the URL cannot be classified (nothing is executed in
/// that case) or when the output directory cannot be prepared. Enumeration
/// and per-track failures are not errors: they show up in the report.
pub async fn run(
    config: &Config,
    url: &str,
    downloader: Arc<dyn TrackDownloader>,
    cancel: CancellationToken,
) -> Result<RunReport> {
    let source = Source::parse(url)?;
    tracing::info!(
        kind = %source.kind(),
        name = source.name(),
        downloader = downloader.name(),
        "Processing {} URL",
        source.kind()
    );

    let ledger = ArchiveLedger::new(&config.archive_file);
    ledger.prepare().await?;
    match ledger.entry_count().await {
        Ok(count) => tracing::debug!(
            archive = %ledger.path().display(),
            entries = count,
            "Archive ledger loaded"
        ),
        Err(e) => tracing::warn!(
            archive = %ledger.path().display(),
            error = %e,
            "Could not read archive ledger"
        ),
    }

    let tracks = enumerate(downloader.as_ref(), &source, &ledger).await;
    if tracks.is_empty() {
        tracing::info!("No tracks found for the given URL.");
        return Ok(RunReport::NoTracks);
    }

    let output_dir = source.output_dir(&config.output_dir);
    let dispatcher = Dispatcher::new(downloader, config).with_cancellation(cancel.clone());
    let outcomes = dispatcher
        .run_all(tracks, &output_dir, ledger.path())
        .await?;

    Ok(RunReport::Completed {
        outcomes,
        cancelled: cancel.is_cancelled(),
    })
}

/// Log every outcome in collection order, then a summary line
pub fn log_report(report: &RunReport) {
    for outcome in report.outcomes() {
        if outcome.is_success() {
            tracing::info!("{}", outcome);
        } else {
            tracing::error!("{}", outcome);
        }
    }

    if let RunReport::Completed { outcomes, cancelled } = report {
        tracing::info!(
            total = outcomes.len(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            cancelled,
            "Run finished"
        );
    }
}

/// Process exit code for a finished run
///
/// Partial failure only changes the exit code when `strict` is set.
pub fn exit_code(report: &RunReport, strict: bool) -> i32 {
    if report.was_cancelled() {
        EXIT_CANCELLED
    } else if strict && report.failed() > 0 {
        1
    } else {
        0
    }
}
