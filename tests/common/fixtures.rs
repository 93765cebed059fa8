//! Stub scdl executable and scratch directory layout

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Shell script that honors the subset of scdl's interface this crate uses.
///
/// - `--only url` prints the contents of the tracks file (one URL per line).
///   Source URLs containing `broken` fail instead.
/// - A single-track download skips tracks whose id is already in the archive,
///   fails for ids containing `fail`, sleeps for ids containing `slow`, and
///   otherwise writes `<id>.flac` into `-o`, appends `soundcloud <id>` to the
///   archive and records the id in the downloads log.
const STUB_TEMPLATE: &str = r#"#!/bin/sh
tracks_file="@TRACKS@"
downloads_log="@DOWNLOADS@"
url=""
out="."
archive=""
only=""
while [ $# -gt 0 ]; do
    case "$1" in
        -l|--url) url="$2"; shift 2 ;;
        -o) out="$2"; shift 2 ;;
        --download-archive) archive="$2"; shift 2 ;;
        --only) only="$2"; shift 2 ;;
        *) shift ;;
    esac
done

if [ "$only" = "url" ]; then
    case "$url" in
        *broken*) echo "ERROR: could not resolve $url" >&2; exit 1 ;;
    esac
    echo "Resolving $url" >&2
    if [ -f "$tracks_file" ]; then
        cat "$tracks_file"
    fi
    exit 0
fi

id=$(basename "$url")
if [ -n "$archive" ] && [ -f "$archive" ] && grep -qx "soundcloud $id" "$archive"; then
    echo "$id already downloaded" >&2
    exit 0
fi

case "$id" in
    *fail*) echo "Downloading $id" >&2; echo "ERROR: $id is not streamable" >&2; exit 1 ;;
    *slow*) sleep 5 ;;
esac

printf ' 50%%|#####     |\r100%%|##########|\n' >&2
mkdir -p "$out"
echo "audio" > "$out/$id.flac"
echo "soundcloud $id" >> "$archive"
echo "$id" >> "$downloads_log"
echo "Downloaded $id" >&2
exit 0
"#;

/// Scratch workspace with a stub scdl binary
pub struct StubEnv {
    /// Keeps the directory alive for the duration of the test
    pub dir: TempDir,
    /// Executable stub
    pub binary: PathBuf,
    /// File the stub lists tracks from
    pub tracks_file: PathBuf,
    /// One line per real (non-skipped) download
    pub downloads_log: PathBuf,
    /// Base output directory for runs
    pub output_dir: PathBuf,
    /// Archive ledger for runs
    pub archive_file: PathBuf,
}

impl StubEnv {
    /// Create the stub; `tracks` is what the listing mode prints
    pub fn new(tracks: &[String]) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let root = dir.path();

        let tracks_file = root.join("tracks.txt");
        let downloads_log = root.join("downloads.log");
        let binary = root.join("scdl");

        let mut listing = tracks.join("\n");
        listing.push('\n');
        fs::write(&tracks_file, listing).expect("write tracks file");

        let script = STUB_TEMPLATE
            .replace("@TRACKS@", &tracks_file.to_string_lossy())
            .replace("@DOWNLOADS@", &downloads_log.to_string_lossy());
        write_executable(&binary, &script);

        let output_dir = root.join("downloads");
        let archive_file = root.join("state").join("archive.txt");

        Self {
            dir,
            binary,
            tracks_file,
            downloads_log,
            output_dir,
            archive_file,
        }
    }

    /// Ids the stub actually downloaded, in log order
    pub fn downloads(&self) -> Vec<String> {
        read_lines(&self.downloads_log)
    }

    /// Current archive entries
    pub fn archive_entries(&self) -> Vec<String> {
        read_lines(&self.archive_file)
    }
}

/// Track URL for a stub track id
pub fn track(id: &str) -> String {
    format!("https://soundcloud.com/artist/{}", id)
}

fn write_executable(path: &Path, content: &str) {
    fs::write(path, content).expect("write stub script");
    let mut perms = fs::metadata(path).expect("stat stub").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).expect("chmod stub");
}

fn read_lines(path: &Path) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(content) => content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect(),
        Err(_) => Vec::new(),
    }
}
