//! Statistics report writer.
//!
//! The destination is opened once per run and truncated. Lines go straight
//! to the file, unbuffered, so a line counts as written only once the OS has
//! accepted it. A failing line is logged and counted, and the remaining lines
//! are still attempted; the writer is always flushed at the end. [`WriteMode::Atomic`] stages the
//! report in a sibling temp file and renames it into place.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use investigator_core::error::{InvestigatorError, Result};
use investigator_core::formatting::format_report_line;
use investigator_core::models::{ReportEntry, WriteMode};
use tracing::{debug, error, info};

/// What happened while writing the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub lines_written: usize,
    pub failures: usize,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Write `entries` to `path`, one formatted line each.
///
/// Returns [`InvestigatorError::ReportWriteFailure`] only when the destination
/// cannot be opened (or, in atomic mode, cannot be replaced). Per-line
/// failures are reported through [`WriteSummary::failures`].
pub fn write_report(entries: &[ReportEntry], path: &Path, mode: WriteMode) -> Result<WriteSummary> {
    let summary = match mode {
        WriteMode::Overwrite => write_direct(entries, path)?,
        WriteMode::Atomic => write_atomic(entries, path)?,
    };

    info!(
        "Statistics written to {}: {} lines, {} failed",
        path.display(),
        summary.lines_written,
        summary.failures
    );
    Ok(summary)
}

/// Write every entry to `writer`, then flush. Never stops early.
pub fn write_entries<W: Write>(entries: &[ReportEntry], writer: &mut W, path: &Path) -> WriteSummary {
    let mut summary = WriteSummary::default();

    for entry in entries {
        let mut line = format_report_line(entry);
        line.push('\n');
        // One write per line so a failure never leaves half a line behind.
        match writer.write_all(line.as_bytes()) {
            Ok(()) => {
                summary.lines_written += 1;
                debug!("New statistics added: {}", line.trim_end());
            }
            Err(e) => {
                summary.failures += 1;
                error!("{}", write_failure(path, e));
            }
        }
    }

    if let Err(e) = writer.flush() {
        summary.failures += 1;
        error!("{}", write_failure(path, e));
    }

    summary
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn write_direct(entries: &[ReportEntry], path: &Path) -> Result<WriteSummary> {
    let mut file = File::create(path).map_err(|e| write_failure(path, e))?;
    Ok(write_entries(entries, &mut file, path))
}

fn write_atomic(entries: &[ReportEntry], path: &Path) -> Result<WriteSummary> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|e| write_failure(path, e))?;
    let summary = write_entries(entries, tmp.as_file_mut(), path);

    tmp.persist(path).map_err(|e| write_failure(path, e.error))?;
    Ok(summary)
}

fn write_failure(path: &Path, source: std::io::Error) -> InvestigatorError {
    InvestigatorError::ReportWriteFailure {
        path: path.to_path_buf(),
        source,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
