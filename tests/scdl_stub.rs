//! End-to-end tests against a shell script standing in for scdl
//!
//! The stub honors the archive file the same way scdl does, which lets these
//! tests check idempotent re-runs, failure isolation and timeouts without
//! network access.

#![cfg(unix)]
// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{StubEnv, track};
use scdl_parallel::{
    Config, DownloadOutcome, DownloadTask, Error, RunReport, ScdlDownloader, Source,
    TrackDownloader, TrackUrl, app,
};
use serial_test::serial;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

fn config_for(env: &StubEnv, threads: usize) -> Config {
    Config {
        threads,
        output_dir: env.output_dir.clone(),
        archive_file: env.archive_file.clone(),
        ..Config::default()
    }
}

fn downloader_for(env: &StubEnv) -> Arc<ScdlDownloader> {
    Arc::new(ScdlDownloader::new(env.binary.clone()))
}

#[tokio::test]
#[serial]
async fn test_list_tracks_reads_stdout_in_order() {
    let env = StubEnv::new(&[track("one"), track("two"), track("three")]);
    let downloader = downloader_for(&env);
    let source = Source::parse("https://soundcloud.com/artist/sets/mix").unwrap();

    let tracks = downloader
        .list_tracks(&source, &env.archive_file)
        .await
        .unwrap();

    assert_eq!(
        tracks,
        vec![
            TrackUrl::from(track("one")),
            TrackUrl::from(track("two")),
            TrackUrl::from(track("three")),
        ]
    );
}

#[tokio::test]
#[serial]
async fn test_list_tracks_failure_is_tool_error() {
    let env = StubEnv::new(&[track("one")]);
    let downloader = downloader_for(&env);
    let source = Source::parse("https://soundcloud.com/broken-user").unwrap();

    match downloader.list_tracks(&source, &env.archive_file).await {
        Err(Error::ToolFailed { status, detail, .. }) => {
            assert_eq!(status, Some(1));
            assert!(detail.contains("could not resolve"));
        }
        other => panic!("expected ToolFailed, got {:?}", other),
    }
}

#[tokio::test]
#[serial]
async fn test_download_track_writes_file_and_archive() {
    let env = StubEnv::new(&[]);
    let downloader = downloader_for(&env);
    std::fs::create_dir_all(env.archive_file.parent().unwrap()).unwrap();
    let task = DownloadTask {
        track_url: TrackUrl::from(track("song")),
        output_dir: env.output_dir.join("mix"),
        archive_file: env.archive_file.clone(),
    };

    downloader.download_track(&task).await.unwrap();

    assert!(env.output_dir.join("mix").join("song.flac").is_file());
    assert_eq!(env.archive_entries(), vec!["soundcloud song"]);
}

#[tokio::test]
#[serial]
async fn test_download_failure_carries_stderr_detail() {
    let env = StubEnv::new(&[]);
    let downloader = downloader_for(&env);
    let task = DownloadTask {
        track_url: TrackUrl::from(track("fail-me")),
        output_dir: env.output_dir.clone(),
        archive_file: env.archive_file.clone(),
    };

    match downloader.download_track(&task).await {
        Err(Error::ToolFailed { status, detail, .. }) => {
            assert_eq!(status, Some(1));
            assert!(detail.contains("fail-me is not streamable"), "detail: {}", detail);
        }
        other => panic!("expected ToolFailed, got {:?}", other),
    }
    assert!(env.downloads().is_empty());
}

#[tokio::test]
#[serial]
async fn test_run_isolates_failures() {
    let env = StubEnv::new(&[track("t1"), track("fail-t2"), track("t3")]);
    let config = config_for(&env, 3);

    let report = app::run(
        &config,
        "https://soundcloud.com/artist/sets/summer",
        downloader_for(&env),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.outcomes().len(), 3);
    for outcome in report.outcomes() {
        let failed_track = outcome.track_url().as_str().ends_with("fail-t2");
        assert_eq!(outcome.is_success(), !failed_track, "{}", outcome);
        if let DownloadOutcome::Success {
            elapsed_seconds, ..
        } = outcome
        {
            assert!(*elapsed_seconds >= 0.0);
        }
    }

    let playlist_dir = env.output_dir.join("summer");
    assert!(playlist_dir.join("t1.flac").is_file());
    assert!(playlist_dir.join("t3.flac").is_file());
    assert!(!playlist_dir.join("fail-t2.flac").exists());

    let mut archived = env.archive_entries();
    archived.sort();
    assert_eq!(archived, vec!["soundcloud t1", "soundcloud t3"]);
}

#[tokio::test]
#[serial]
async fn test_rerun_skips_archived_tracks() {
    let env = StubEnv::new(&[track("a"), track("b"), track("c"), track("d")]);
    let config = config_for(&env, 2);
    let url = "https://soundcloud.com/artist";

    let first = app::run(&config, url, downloader_for(&env), CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(first.succeeded(), 4);
    assert_eq!(env.downloads().len(), 4);

    let second = app::run(&config, url, downloader_for(&env), CancellationToken::new())
        .await
        .unwrap();

    // Archived tracks still succeed but nothing is fetched twice
    assert_eq!(second.succeeded(), 4);
    assert_eq!(env.downloads().len(), 4);
    assert_eq!(env.archive_entries().len(), 4);
    assert!(env.output_dir.join("artist").join("d.flac").is_file());
}

#[tokio::test]
#[serial]
async fn test_enumeration_failure_means_no_tracks() {
    let env = StubEnv::new(&[track("never")]);
    let config = config_for(&env, 2);

    let report = app::run(
        &config,
        "https://soundcloud.com/broken-artist/sets/gone",
        downloader_for(&env),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(report, RunReport::NoTracks);
    assert!(env.downloads().is_empty());
    assert!(!env.output_dir.join("gone").exists());
}

#[tokio::test]
#[serial]
async fn test_timeout_kills_slow_track() {
    let env = StubEnv::new(&[track("slow-one"), track("quick")]);
    let config = Config {
        task_timeout: Some(Duration::from_millis(500)),
        ..config_for(&env, 2)
    };

    let started = Instant::now();
    let report = app::run(
        &config,
        "https://soundcloud.com/artist/sets/mixed",
        downloader_for(&env),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert!(started.elapsed() < Duration::from_secs(4));
    let slow = report
        .outcomes()
        .iter()
        .find(|o| o.track_url().as_str().ends_with("slow-one"))
        .unwrap();
    match slow {
        DownloadOutcome::Failure { error, .. } => assert!(error.contains("timed out")),
        other => panic!("expected timeout, got {:?}", other),
    }
    assert_eq!(env.downloads(), vec!["quick"]);
}

#[tokio::test]
#[serial]
async fn test_from_config_accepts_explicit_stub() {
    let env = StubEnv::new(&[]);
    let config = Config {
        downloader: scdl_parallel::DownloaderConfig {
            scdl_path: Some(env.binary.clone()),
            search_path: false,
        },
        ..Config::default()
    };

    let downloader = ScdlDownloader::from_config(&config.downloader).unwrap();
    assert_eq!(downloader.binary_path(), env.binary.as_path());
}
