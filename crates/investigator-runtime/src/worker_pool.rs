//! Bounded parallel file parsing.
//!
//! Every log file becomes one task on a [`JoinSet`]. A [`Semaphore`] caps how
//! many tasks read at once, and each read runs on tokio's blocking pool. Tasks
//! keep their own [`FileScan`] buffer; buffers are merged into a single
//! [`ParseOutcome`] as tasks finish, so workers share no mutable state.
//!
//! The caller waits for every task or for the deadline, whichever comes
//! first. The deadline is checked before each wait, so a task is only merged
//! if it was collected in time; a zero timeout with files present always
//! times out. On timeout the shared cancellation flag is raised, outstanding
//! tasks are abandoned and the outcome holds whatever finished in time.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use investigator_core::error::{InvestigatorError, Result};
use investigator_core::models::{FileScan, ParsedTimestamp};
use investigator_core::settings::{DEFAULT_TIMEOUT_SECS, DEFAULT_WORKERS};
use investigator_data::parser::scan_file;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tokio::time::Instant;
use tracing::{debug, error};

// ── PoolOptions ───────────────────────────────────────────────────────────────

/// Worker count and deadline for [`parse_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolOptions {
    /// Maximum number of files read at the same time (at least 1).
    pub workers: usize,
    /// How long the caller waits for all files.
    pub timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS as usize,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

// ── ParseOutcome ──────────────────────────────────────────────────────────────

/// Everything collected during the parallel phase.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    /// Timestamps from all completed files, in no particular order.
    pub timestamps: Vec<ParsedTimestamp>,
    /// Files whose task finished (possibly stopped early).
    pub files_processed: usize,
    /// Files that could not be opened or whose task failed.
    pub files_failed: usize,
    pub lines_read: usize,
    pub malformed_lines: usize,
    /// The deadline passed before every task finished.
    pub timed_out: bool,
}

impl ParseOutcome {
    /// Fold one finished task into the outcome.
    fn absorb(&mut self, joined: std::result::Result<Result<FileScan>, JoinError>) {
        match joined {
            Ok(Ok(scan)) => {
                self.files_processed += 1;
                self.lines_read += scan.lines_read;
                self.malformed_lines += scan.malformed_lines;
                self.timestamps.extend(scan.timestamps);
            }
            Ok(Err(e)) => {
                error!("{}", e);
                self.files_failed += 1;
            }
            Err(e) => {
                error!("{}", InvestigatorError::WorkerPanicked(e.to_string()));
                self.files_failed += 1;
            }
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Parse every file in `files` on a bounded pool, waiting at most
/// `options.timeout`.
pub async fn parse_all(files: Vec<PathBuf>, options: &PoolOptions) -> ParseOutcome {
    parse_all_with(files, options, scan_file).await
}

/// [`parse_all`] with a custom per-file scanner.
///
/// `scan` runs on the blocking pool and must honour the cancellation flag it
/// is given if it can run for long.
pub async fn parse_all_with<F>(files: Vec<PathBuf>, options: &PoolOptions, scan: F) -> ParseOutcome
where
    F: Fn(&Path, &AtomicBool) -> Result<FileScan> + Send + Sync + 'static,
{
    let scan = Arc::new(scan);
    let semaphore = Arc::new(Semaphore::new(options.workers.max(1)));
    let cancel = Arc::new(AtomicBool::new(false));
    let mut tasks = JoinSet::new();

    for path in files {
        tasks.spawn(run_task(
            path,
            Arc::clone(&scan),
            Arc::clone(&semaphore),
            Arc::clone(&cancel),
        ));
    }

    // `None` when the timeout is too large to represent: wait indefinitely.
    let deadline = Instant::now().checked_add(options.timeout);
    let mut outcome = ParseOutcome::default();
    while !tasks.is_empty() {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            outcome.timed_out = true;
            break;
        }
        let joined = match deadline {
            Some(d) => tokio::time::timeout_at(d, tasks.join_next()).await,
            None => Ok(tasks.join_next().await),
        };
        match joined {
            Ok(Some(joined)) => outcome.absorb(joined),
            Ok(None) => break,
            Err(_) => {
                outcome.timed_out = true;
                break;
            }
        }
    }

    if outcome.timed_out {
        cancel.store(true, Ordering::Relaxed);
        error!(
            abandoned = tasks.len(),
            "{}",
            InvestigatorError::ProcessingTimeout(options.timeout)
        );
        // Blocking reads already running cannot be aborted; they see the flag.
        tasks.abort_all();
    }

    debug!(
        processed = outcome.files_processed,
        failed = outcome.files_failed,
        timestamps = outcome.timestamps.len(),
        "parallel parse finished"
    );
    outcome
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// One file: wait for a permit, then scan on the blocking pool.
async fn run_task<F>(
    path: PathBuf,
    scan: Arc<F>,
    semaphore: Arc<Semaphore>,
    cancel: Arc<AtomicBool>,
) -> Result<FileScan>
where
    F: Fn(&Path, &AtomicBool) -> Result<FileScan> + Send + Sync + 'static,
{
    let permit = semaphore
        .acquire_owned()
        .await
        .map_err(|e| InvestigatorError::WorkerPanicked(e.to_string()))?;

    let task_path = path.clone();
    tokio::task::spawn_blocking(move || {
        let _permit = permit;
        (*scan)(task_path.as_path(), &*cancel)
    })
    .await
    .map_err(|e| InvestigatorError::WorkerPanicked(format!("{}: {}", path.display(), e)))?
}

// ── Tests ─────────────────────────────────────────────────────────────────────
