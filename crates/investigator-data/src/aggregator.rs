//! Per-minute counting of parsed timestamps.

use std::collections::BTreeMap;

use investigator_core::models::{MinuteBucket, ParsedTimestamp, ReportEntry};

// ── MinuteAggregator ──────────────────────────────────────────────────────────

/// Running count of log notes per minute.
///
/// Keeps one counter per bucket rather than the timestamps themselves, so
/// memory grows with the number of distinct minutes, not with log volume.
#[derive(Debug, Clone, Default)]
pub struct MinuteAggregator {
    counts: BTreeMap<MinuteBucket, u64>,
}

impl MinuteAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one log note.
    pub fn add(&mut self, ts: ParsedTimestamp) {
        *self.counts.entry(MinuteBucket::from(ts)).or_insert(0) += 1;
    }

    /// Report entries in ascending chronological order.
    pub fn into_entries(self) -> Vec<ReportEntry> {
        // BTreeMap iteration is already ordered by bucket.
        self.counts
            .into_iter()
            .map(|(bucket, count)| ReportEntry { bucket, count })
            .collect()
    }
}

impl Extend<ParsedTimestamp> for MinuteAggregator {
    fn extend<I: IntoIterator<Item = ParsedTimestamp>>(&mut self, iter: I) {
        for ts in iter {
            self.add(ts);
        }
    }
}

impl FromIterator<ParsedTimestamp> for MinuteAggregator {
    fn from_iter<I: IntoIterator<Item = ParsedTimestamp>>(iter: I) -> Self {
        let mut aggregator = Self::new();
        aggregator.extend(iter);
        aggregator
    }
}

// ── Public function ───────────────────────────────────────────────────────────

/// Group `timestamps` by minute and return the counts, oldest minute first.
pub fn aggregate(timestamps: &[ParsedTimestamp]) -> Vec<ReportEntry> {
    timestamps
        .iter()
        .copied()
        .collect::<MinuteAggregator>()
        .into_entries()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(day: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_same_minute_grouped() {
        let entries = aggregate(&[at(1, 10, 0, 5), at(1, 10, 0, 42)]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].count, 2);
        assert_eq!(entries[0].bucket.to_string(), "2024-01-01T10:00");
    }

    #[test]
    fn test_sorted_regardless_of_input_order() {
        let entries = aggregate(&[
            at(2, 0, 0, 0),
            at(1, 10, 1, 1),
            at(1, 10, 0, 1),
            at(1, 10, 1, 59),
        ]);
        let rendered: Vec<(String, u64)> = entries
            .iter()
            .map(|e| (e.bucket.to_string(), e.count))
            .collect();
        assert_eq!(
            rendered,
            vec![
                ("2024-01-01T10:00".to_string(), 1),
                ("2024-01-01T10:01".to_string(), 2),
                ("2024-01-02T00:00".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_strictly_ascending_and_total_preserved() {
        let input: Vec<NaiveDateTime> = (0..500u32)
            .map(|i| at(1 + (i * 7) % 3, (i * 13) % 24, (i * 31) % 60, (i * 17) % 60))
            .collect();
        let entries = aggregate(&input);

        assert!(entries.windows(2).all(|w| w[0].bucket < w[1].bucket));
        let total: u64 = entries.iter().map(|e| e.count).sum();
        assert_eq!(total, input.len() as u64);
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn test_incremental_aggregator() {
        let mut agg = MinuteAggregator::new();
        agg.add(at(1, 10, 0, 1));
        agg.extend([at(1, 10, 0, 2), at(1, 11, 0, 0)]);
        let entries = agg.into_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].count, 2);
        assert_eq!(entries[1].count, 1);
    }
}
