use std::sync::OnceLock;

use chrono::NaiveDateTime;
use regex::Regex;

use crate::error::{InvestigatorError, Result};
use crate::models::ParsedTimestamp;

// ── Formats ───────────────────────────────────────────────────────────────────

/// Separator between the fields of a log line.
pub const FIELD_SEPARATOR: char = ';';

/// Full form, `%.f` also accepts a missing fraction.
const FULL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// ISO local date-time with the seconds omitted.
const MINUTE_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Exact shape of a leading field, checked before chrono sees it. Group 1 is
/// the optional seconds part.
const TIMESTAMP_SHAPE: &str =
    r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}(:[0-5][0-9](?:\.[0-9]{1,9})?)?$";

const SHAPE_HINT: &str = "expected YYYY-MM-DDTHH:MM[:SS[.fraction]]";

fn timestamp_shape() -> &'static Regex {
    static SHAPE: OnceLock<Regex> = OnceLock::new();
    SHAPE.get_or_init(|| Regex::new(TIMESTAMP_SHAPE).expect("regex is valid"))
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse a leading log field as an ISO-8601 local date-time.
///
/// Accepts `YYYY-MM-DDTHH:MM:SS[.fraction]` and `YYYY-MM-DDTHH:MM`, zero
/// padded, with nothing around them. Signs, zones, offsets, whitespace and
/// leap seconds are rejected. The error carries the offending value.
pub fn parse_log_timestamp(field: &str) -> Result<ParsedTimestamp> {
    let malformed = |reason: String| InvestigatorError::MalformedTimestamp {
        value: field.to_string(),
        reason,
    };

    let Some(caps) = timestamp_shape().captures(field) else {
        return Err(malformed(SHAPE_HINT.to_string()));
    };
    let format = if caps.get(1).is_some() {
        FULL_FORMAT
    } else {
        MINUTE_FORMAT
    };
    NaiveDateTime::parse_from_str(field, format).map_err(|e| malformed(e.to_string()))
}

/// Extract the timestamp of a single log line.
///
/// * `Ok(None)` when the line has no leading field or it is blank.
/// * `Ok(Some(ts))` when the leading field is a valid date-time.
/// * `Err(MalformedTimestamp)` when the leading field is non-blank garbage.
pub fn parse_log_line(line: &str) -> Result<Option<ParsedTimestamp>> {
    let Some(first) = line.split(FIELD_SEPARATOR).next() else {
        return Ok(None);
    };
    if first.trim().is_empty() {
        return Ok(None);
    }
    parse_log_timestamp(first).map(Some)
}

// ── Formatting ────────────────────────────────────────────────────────────────

/// Render `ts` with minute precision, e.g. `2024-01-01T10:00`.
pub fn format_minute(ts: &NaiveDateTime) -> String {
    ts.format(MINUTE_FORMAT).to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
