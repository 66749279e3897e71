//! Per-file timestamp extraction.
//!
//! Each log file is read strictly in on-disk order by a single worker. Lines
//! are decoded lossily so one stray non-UTF-8 byte does not cost the rest of
//! the file. Malformed timestamps are logged and skipped; the file carries on.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use investigator_core::error::{InvestigatorError, Result};
use investigator_core::models::FileScan;
use investigator_core::time_utils::parse_log_line;
use tracing::{debug, error, warn};

// ── Public API ────────────────────────────────────────────────────────────────

/// Open `path` and collect the timestamp of every line that carries one.
///
/// Returns [`InvestigatorError::LogFileUnavailable`] when the file cannot be
/// opened. Once open, the scan never fails: read errors end the scan early
/// and keep whatever was collected before them.
///
/// `cancel` is checked between lines; once set, the scan stops.
pub fn scan_file(path: &Path, cancel: &AtomicBool) -> Result<FileScan> {
    let file = File::open(path).map_err(|e| InvestigatorError::LogFileUnavailable {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut reader = BufReader::new(file);
    let scan = scan_reader(&mut reader, path, cancel);

    debug!(
        "File {}: {} lines, {} timestamps, {} malformed",
        path.display(),
        scan.lines_read,
        scan.timestamps.len(),
        scan.malformed_lines,
    );
    Ok(scan)
}

/// Scan an already-open reader. `path` is only used for diagnostics.
pub fn scan_reader<R: BufRead>(reader: &mut R, path: &Path, cancel: &AtomicBool) -> FileScan {
    let mut scan = FileScan::new(path);
    let mut line_buf = Vec::new();

    loop {
        if cancel.load(Ordering::Relaxed) {
            debug!("Scan of {} cancelled after {} lines", path.display(), scan.lines_read);
            scan.stopped_early = true;
            break;
        }

        line_buf.clear();
        match reader.read_until(b'\n', &mut line_buf) {
            Ok(0) => break,
            Ok(_) => {
                scan.lines_read += 1;
                let line = String::from_utf8_lossy(strip_line_ending(&line_buf));
                match parse_log_line(&line) {
                    Ok(Some(ts)) => scan.timestamps.push(ts),
                    Ok(None) => {}
                    Err(e) => {
                        scan.malformed_lines += 1;
                        warn!(
                            path = %path.display(),
                            line = scan.lines_read,
                            "Skipping log note: {}",
                            e
                        );
                    }
                }
            }
            Err(e) => {
                let err = InvestigatorError::LogFileRead {
                    path: path.to_path_buf(),
                    line: scan.lines_read + 1,
                    source: e,
                };
                error!("{}", err);
                scan.stopped_early = true;
                break;
            }
        }
    }

    scan
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Drop a trailing `\n` or `\r\n`.
fn strip_line_ending(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
