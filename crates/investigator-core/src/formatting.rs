use crate::models::ReportEntry;

/// Format one line of the statistics report, without the trailing newline.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use investigator_core::formatting::format_report_line;
/// use investigator_core::models::{MinuteBucket, ReportEntry};
///
/// let ts = NaiveDate::from_ymd_opt(2024, 1, 1)
///     .unwrap()
///     .and_hms_opt(10, 0, 5)
///     .unwrap();
/// let entry = ReportEntry { bucket: MinuteBucket::from(ts), count: 2 };
/// assert_eq!(
///     format_report_line(&entry),
///     "From 2024-01-01T10:00 found 2 log notes (errors/warnings)."
/// );
/// ```
pub fn format_report_line(entry: &ReportEntry) -> String {
    format!(
        "From {} found {} log notes (errors/warnings).",
        entry.bucket, entry.count
    )
}
