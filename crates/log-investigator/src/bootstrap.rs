use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How long runtime shutdown waits for file reads abandoned by a timeout.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map the `log_level` setting to a tracing filter directive.
///
/// Unrecognised names pass through unchanged so `EnvFilter` can reject them.
pub fn normalise_level(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_lowercase(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// Output goes to stderr, or is appended to `log_file` when one is given
/// (its parent directory is created if needed). Falls back to `info` when the
/// level cannot be turned into a filter.
pub fn setup_logging(log_level: &str, log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(normalise_level(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, stderr_layer) = match log_file {
        Some(path) => {
            ensure_parent_directory(path)?;
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let layer = fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false);
            (Some(layer), None)
        }
        None => {
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false);
            (None, Some(layer))
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()?;

    Ok(())
}

/// Create the directory that will hold `path`, if it has one.
pub fn ensure_parent_directory(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

// ── Runtime bootstrap ──────────────────────────────────────────────────────────

/// Build the multi-threaded tokio runtime the investigation runs on.
pub fn build_runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("log-investigator")
        .build()?;
    Ok(runtime)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_normalise_level() {
        assert_eq!(normalise_level("DEBUG"), "debug");
        assert_eq!(normalise_level("CRITICAL"), "error");
        assert_eq!(normalise_level("info"), "info");
        assert_eq!(normalise_level("WARNING"), "warn");
        assert_eq!(normalise_level("ERROR"), "error");
        assert_eq!(normalise_level("Trace"), "trace");
    }

    #[test]
    fn test_ensure_parent_directory_creates_nested() {
        let tmp = TempDir::new().expect("tempdir");
        let log = tmp.path().join("a").join("b").join("investigator.log");

        ensure_parent_directory(&log).expect("create parents");

        assert!(tmp.path().join("a").join("b").is_dir());
        assert!(!log.exists(), "only the directory is created");
    }

    #[test]
    fn test_ensure_parent_directory_bare_file_name() {
        ensure_parent_directory(Path::new("investigator.log")).expect("no-op");
    }

    #[test]
    fn test_build_runtime_runs_blocking_work() {
        let runtime = build_runtime().expect("runtime");
        let value = runtime
            .block_on(async { tokio::task::spawn_blocking(|| 21 * 2).await })
            .expect("join");
        runtime.shutdown_timeout(SHUTDOWN_GRACE);
        assert_eq!(value, 42);
    }

    // The only test in this crate that installs the global subscriber.
    #[test]
    fn test_setup_logging_appends_to_file() {
        let tmp = TempDir::new().expect("tempdir");
        let log = tmp.path().join("logs").join("investigator.log");

        setup_logging("INFO", Some(&log)).expect("logging");
        tracing::info!("Found 3 log files");
        tracing::debug!("filtered out");

        let content = std::fs::read_to_string(&log).expect("log file");
        assert!(content.contains("Found 3 log files"));
        assert!(!content.contains("filtered out"));
    }
}
