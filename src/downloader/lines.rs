//! Incremental line reader for child process diagnostics

use std::io;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Upper bound for a single line; longer runs without a terminator are split
const MAX_LINE_BYTES: usize = 64 * 1024;

/// Lazy, finite sequence of diagnostic lines read from a child process stream
///
/// Lines end at `\n` or `\r`, so progress bars that redraw with carriage
/// returns surface as they are drawn instead of after the download finishes.
/// Lines are trimmed and empty lines are skipped. Invalid UTF-8 is replaced
/// rather than treated as an error.
pub struct DiagnosticLines<R> {
    reader: BufReader<R>,
    pending: Vec<u8>,
}

impl<R: AsyncRead + Unpin> DiagnosticLines<R> {
    /// Wrap a readable stream (typically `ChildStderr`)
    pub fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
            pending: Vec::new(),
        }
    }

    /// Next non-empty line, or `None` once the stream is exhausted
    pub async fn next_line(&mut self) -> io::Result<Option<String>> {
        loop {
            let available = self.reader.fill_buf().await?;

            if available.is_empty() {
                if self.pending.is_empty() {
                    return Ok(None);
                }
                if let Some(line) = self.take_pending() {
                    return Ok(Some(line));
                }
                continue;
            }

            match available.iter().position(|b| *b == b'\n' || *b == b'\r') {
                Some(pos) => {
                    self.pending.extend_from_slice(&available[..pos]);
                    self.reader.consume(pos + 1);
                    if let Some(line) = self.take_pending() {
                        return Ok(Some(line));
                    }
                }
                None => {
                    let len = available.len();
                    self.pending.extend_from_slice(available);
                    self.reader.consume(len);
                    if self.pending.len() >= MAX_LINE_BYTES
                        && let Some(line) = self.take_pending()
                    {
                        return Ok(Some(line));
                    }
                }
            }
        }
    }

    fn take_pending(&mut self) -> Option<String> {
        let raw = std::mem::take(&mut self.pending);
        let line = String::from_utf8_lossy(&raw).trim().to_string();
        (!line.is_empty()).then_some(line)
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    async fn collect(input: &[u8]) -> Vec<String> {
        let mut lines = DiagnosticLines::new(input);
        let mut out = Vec::new();
        while let Some(line) = lines.next_line().await.unwrap() {
            out.push(line);
        }
        out
    }

    #[tokio::test]
    async fn test_splits_on_newlines() {
        let lines = collect(b"Found 3 tracks\nDownloading 1/3\n").await;
        assert_eq!(lines, vec!["Found 3 tracks", "Downloading 1/3"]);
    }

    #[tokio::test]
    async fn test_splits_on_carriage_returns() {
        let lines = collect(b" 10%|#   |\r 50%|#### |\r100%|########|\r\nDone.\n").await;
        assert_eq!(
            lines,
            vec!["10%|#   |", "50%|#### |", "100%|########|", "Done."]
        );
    }

    #[tokio::test]
    async fn test_unterminated_last_line_is_returned() {
        let lines = collect(b"first\nsecond").await;
        assert_eq!(lines, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_blank_lines_skipped() {
        let lines = collect(b"\n\n   \r\nonly\n\n").await;
        assert_eq!(lines, vec!["only"]);
    }

    #[tokio::test]
    async fn test_empty_stream() {
        assert!(collect(b"").await.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_replaced() {
        let lines = collect(b"caf\xff\n").await;
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("caf"));
    }

    #[tokio::test]
    async fn test_overlong_line_is_split() {
        let input = vec![b'x'; MAX_LINE_BYTES * 2 + 10];
        let lines = collect(&input).await;
        assert!(lines.len() >= 2);
        assert_eq!(
            lines.iter().map(String::len).sum::<usize>(),
            MAX_LINE_BYTES * 2 + 10
        );
    }

    #[tokio::test]
    async fn test_reads_incrementally() {
        use tokio::io::AsyncWriteExt;

        let (mut writer, reader) = tokio::io::duplex(64);
        let mut lines = DiagnosticLines::new(reader);

        writer.write_all(b"first\r").await.unwrap();
        // The first line is available before the writer is closed
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("first"));

        writer.write_all(b"second\n").await.unwrap();
        drop(writer);
        assert_eq!(lines.next_line().await.unwrap().as_deref(), Some("second"));
        assert_eq!(lines.next_line().await.unwrap(), None);
    }
}
