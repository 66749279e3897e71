use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A point in time extracted from the leading field of a log line.
///
/// Local wall-clock time; the log format carries no zone or offset.
pub type ParsedTimestamp = NaiveDateTime;

/// A timestamp truncated to the start of its minute, used as a grouping key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MinuteBucket(NaiveDateTime);

impl MinuteBucket {
    /// Truncate `ts` to minute precision (seconds and sub-seconds zeroed).
    pub fn from_timestamp(ts: ParsedTimestamp) -> Self {
        let truncated = ts
            .with_nanosecond(0)
            .and_then(|t| t.with_second(0))
            .unwrap_or(ts);
        Self(truncated)
    }
}

impl From<ParsedTimestamp> for MinuteBucket {
    fn from(ts: ParsedTimestamp) -> Self {
        Self::from_timestamp(ts)
    }
}

impl fmt::Display for MinuteBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::time_utils::format_minute(&self.0))
    }
}

/// Number of log notes that fell into one minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub bucket: MinuteBucket,
    pub count: u64,
}

/// Result of reading a single log file.
#[derive(Debug, Clone, Default)]
pub struct FileScan {
    /// File the scan belongs to.
    pub path: PathBuf,
    /// Timestamps in on-disk order.
    pub timestamps: Vec<ParsedTimestamp>,
    /// Lines read, including blank and malformed ones.
    pub lines_read: usize,
    /// Lines whose leading field was non-blank but not a date-time.
    pub malformed_lines: usize,
    /// Reading stopped before end of file (read error or cancellation).
    pub stopped_early: bool,
}

impl FileScan {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }
}

/// How the statistics report reaches its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Truncate the destination and write into it directly.
    #[default]
    Overwrite,
    /// Write a sibling temp file and rename it over the destination.
    Atomic,
}

/// Outcome of one full investigation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub files_found: usize,
    pub files_processed: usize,
    pub files_failed: usize,
    pub lines_parsed: usize,
    pub malformed_lines: usize,
    pub buckets_written: usize,
    pub write_failures: usize,
    pub timed_out: bool,
    pub elapsed_seconds: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(h: u32, m: u32, s: u32, ms: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_milli_opt(h, m, s, ms)
            .unwrap()
    }

    #[test]
    fn test_bucket_zeroes_seconds_and_fraction() {
        let bucket = MinuteBucket::from_timestamp(ts(10, 0, 42, 731));
        assert_eq!(bucket, MinuteBucket::from_timestamp(ts(10, 0, 0, 0)));
        assert_eq!(bucket.to_string(), "2024-01-01T10:00");
    }

    #[test]
    fn test_bucket_same_minute_equal() {
        let a = MinuteBucket::from(ts(10, 0, 5, 0));
        let b = MinuteBucket::from(ts(10, 0, 59, 999));
        assert_eq!(a, b);
    }

    #[test]
    fn test_bucket_ordering_is_chronological() {
        let a = MinuteBucket::from(ts(9, 59, 59, 0));
        let b = MinuteBucket::from(ts(10, 0, 0, 0));
        assert!(a < b);
    }

    #[test]
    fn test_bucket_display_minute_precision() {
        let bucket = MinuteBucket::from(ts(10, 1, 1, 0));
        assert_eq!(bucket.to_string(), "2024-01-01T10:01");
    }

    #[test]
    fn test_file_scan_new_is_empty() {
        let scan = FileScan::new("/logs/a.log");
        assert_eq!(scan.path, PathBuf::from("/logs/a.log"));
        assert!(scan.timestamps.is_empty());
        assert_eq!(scan.malformed_lines, 0);
        assert!(!scan.stopped_early);
    }

    #[test]
    fn test_run_summary_serializes() {
        let summary = RunSummary {
            files_found: 2,
            lines_parsed: 3,
            ..Default::default()
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["files_found"], 2);
        assert_eq!(json["lines_parsed"], 3);
        assert_eq!(json["timed_out"], false);
    }
}
