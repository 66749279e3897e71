//! End-to-end investigation run.
//!
//! Scans the log directory, parses every file on the worker pool, counts the
//! timestamps per minute and writes the statistics report. Failures scoped to
//! a file or a line are logged and absorbed along the way; only a missing
//! log directory or an unwritable report destination end the run with an
//! error, which is returned unlogged for the caller to report.

use std::path::{Path, PathBuf};
use std::time::Instant;

use investigator_core::error::{InvestigatorError, Result};
use investigator_core::models::{RunSummary, WriteMode};
use investigator_core::settings::Settings;
use investigator_data::aggregator::aggregate;
use investigator_data::report::write_report;
use investigator_data::scanner::scan_directory;

use crate::worker_pool::{parse_all, PoolOptions};

// ── PipelineOptions ───────────────────────────────────────────────────────────

/// Tunables of one run besides the two paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineOptions {
    pub pool: PoolOptions,
    pub write_mode: WriteMode,
}

impl From<&Settings> for PipelineOptions {
    fn from(s: &Settings) -> Self {
        PipelineOptions {
            pool: PoolOptions {
                workers: s.workers as usize,
                timeout: s.timeout(),
            },
            write_mode: s.write_mode(),
        }
    }
}

// ── InvestigationOrchestrator ─────────────────────────────────────────────────

/// Runs the scan → parse → aggregate → write pipeline once.
pub struct InvestigationOrchestrator {
    /// Directory holding the log files.
    logs_path: PathBuf,
    /// Destination of the statistics report.
    statistics_path: PathBuf,
    options: PipelineOptions,
}

impl InvestigationOrchestrator {
    pub fn new(
        logs_path: impl Into<PathBuf>,
        statistics_path: impl Into<PathBuf>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            logs_path: logs_path.into(),
            statistics_path: statistics_path.into(),
            options,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.logs_path.clone(),
            settings.statistics_path.clone(),
            PipelineOptions::from(settings),
        )
    }

    /// Execute the pipeline.
    ///
    /// With a missing log directory nothing is written and
    /// [`InvestigatorError::DirectoryNotFound`] is returned. An empty
    /// directory still produces an (empty) report.
    pub async fn run(&self) -> Result<RunSummary> {
        run_investigation(&self.logs_path, &self.statistics_path, &self.options).await
    }
}

// ── Public function ───────────────────────────────────────────────────────────

/// Free-function form of [`InvestigationOrchestrator::run`].
pub async fn run_investigation(
    logs_path: &Path,
    statistics_path: &Path,
    options: &PipelineOptions,
) -> Result<RunSummary> {
    let started = Instant::now();

    // ── Step 1: Scan ──────────────────────────────────────────────────────────
    let files = scan_directory(logs_path)?;
    if files.is_empty() {
        tracing::warn!("{}", InvestigatorError::EmptyDirectory(logs_path.to_path_buf()));
    } else {
        tracing::info!("Found {} log files in {}", files.len(), logs_path.display());
    }
    let files_found = files.len();

    // ── Step 2: Parse (barrier) ───────────────────────────────────────────────
    let outcome = parse_all(files, &options.pool).await;
    tracing::info!("Log notes found: {}", outcome.timestamps.len());

    // ── Step 3: Aggregate ─────────────────────────────────────────────────────
    let entries = aggregate(&outcome.timestamps);

    // ── Step 4: Write ─────────────────────────────────────────────────────────
    let written = write_report(&entries, statistics_path, options.write_mode)?;

    let summary = RunSummary {
        files_found,
        files_processed: outcome.files_processed,
        files_failed: outcome.files_failed,
        lines_parsed: outcome.timestamps.len(),
        malformed_lines: outcome.malformed_lines,
        buckets_written: written.lines_written,
        write_failures: written.failures,
        timed_out: outcome.timed_out,
        elapsed_seconds: started.elapsed().as_secs_f64(),
    };

    match serde_json::to_string(&summary) {
        Ok(json) => tracing::debug!(summary = %json, "run finished"),
        Err(e) => tracing::debug!(error = %e, "run summary not serializable"),
    }

    Ok(summary)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
