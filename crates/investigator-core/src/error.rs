use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// All errors produced by the log investigator.
#[derive(Error, Debug)]
pub enum InvestigatorError {
    /// The configured log directory is missing or is not a directory.
    #[error("Directory does not exist: {0}")]
    DirectoryNotFound(PathBuf),

    /// The log directory exists but holds no regular files.
    #[error("No log files found in {0}")]
    EmptyDirectory(PathBuf),

    /// A log file could not be opened (e.g. removed after listing).
    #[error("Log is absent in provided path {path}: {source}")]
    LogFileUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading a log file failed part-way through.
    #[error("Failed to read {path} at line {line}: {source}")]
    LogFileRead {
        path: PathBuf,
        line: usize,
        #[source]
        source: std::io::Error,
    },

    /// A non-blank leading field is not a local date-time.
    #[error("Invalid timestamp \"{value}\": {reason}")]
    MalformedTimestamp { value: String, reason: String },

    /// File processing did not finish before the deadline.
    #[error("Log processing timed out after {0:?}")]
    ProcessingTimeout(Duration),

    /// Writing (or opening) the statistics report failed.
    #[error("Failed to write report {path}: {source}")]
    ReportWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file-processing task panicked or was cancelled by the runtime.
    #[error("Worker task failed: {0}")]
    WorkerPanicked(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A JSON config document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the investigator crates.
pub type Result<T> = std::result::Result<T, InvestigatorError>;
