//! Timestamp normalization.
//!
//! Joins the separate date and time cells into one timestamp per reading,
//! sorts chronologically and derives the calendar date used for grouping.
//! The column is parsed all-or-nothing: one unparsable row fails the whole
//! step, and the readings come back in file order without dates. A row whose
//! date and time cells are both blank is not an error; it stays undated and
//! sorts after every dated row.

use crate::error::PipelineWarning;
use crate::loader::RawDataset;
use crate::types::{Column, Reading};
use crate::util::parse_timestamp;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub readings: Vec<Reading>,
    pub warning: Option<PipelineWarning>,
}

impl Normalized {
    pub fn is_chronological(&self) -> bool {
        self.warning.is_none()
    }
}

pub fn normalize_timestamps(raw: &RawDataset) -> Normalized {
    for column in [Column::Date, Column::Time] {
        if !raw.has(column) {
            return fail_soft(raw, format!("column '{}' is missing", column.header()));
        }
    }

    let mut parsed = Vec::with_capacity(raw.readings.len());
    for (idx, reading) in raw.readings.iter().enumerate() {
        if reading.date_raw.trim().is_empty() && reading.time_raw.trim().is_empty() {
            parsed.push(None);
            continue;
        }
        match parse_timestamp(&reading.date_raw, &reading.time_raw) {
            Some(ts) => parsed.push(Some(ts)),
            None => {
                return fail_soft(
                    raw,
                    format!(
                        "row {} has unreadable date/time '{} {}'",
                        idx + 1,
                        reading.date_raw,
                        reading.time_raw
                    ),
                );
            }
        }
    }

    let mut readings: Vec<Reading> = raw
        .readings
        .iter()
        .zip(parsed)
        .map(|(r, ts)| Reading {
            timestamp: ts,
            date: ts.map(|t| t.date()),
            ..r.clone()
        })
        .collect();
    // `sort_by_key` is stable, so equal timestamps keep file order.
    readings.sort_by_key(|r| (r.timestamp.is_none(), r.timestamp));

    debug!(rows = readings.len(), "timestamps normalized");
    Normalized {
        readings,
        warning: None,
    }
}

fn fail_soft(raw: &RawDataset, reason: String) -> Normalized {
    warn!(%reason, "timestamp normalization failed; keeping file order");
    Normalized {
        readings: raw
            .readings
            .iter()
            .map(|r| Reading {
                timestamp: None,
                date: None,
                ..r.clone()
            })
            .collect(),
        warning: Some(PipelineWarning::ParseFailure { reason }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::LoadReport;
    use crate::types::ColumnSet;
    use chrono::NaiveDate;

    fn reading(date: &str, time: &str, hook_load: f64) -> Reading {
        Reading {
            date_raw: date.to_string(),
            time_raw: time.to_string(),
            hook_load: Some(hook_load),
            ..Reading::default()
        }
    }

    fn dataset(readings: Vec<Reading>, columns: &[Column]) -> RawDataset {
        RawDataset {
            report: LoadReport {
                total_rows: readings.len(),
                parse_errors: 0,
                invalid_cells: 0,
            },
            readings,
            columns: columns.iter().copied().collect::<ColumnSet>(),
        }
    }

    #[test]
    fn test_sorts_and_derives_dates() {
        let raw = dataset(
            vec![
                reading("2024/01/16", "00:00:05", 1.0),
                reading("2024/01/15", "23:59:59", 2.0),
                reading("2024/01/16", "00:00:01", 3.0),
            ],
            &[Column::Date, Column::Time],
        );

        let out = normalize_timestamps(&raw);
        assert!(out.is_chronological());
        let loads: Vec<_> = out.readings.iter().map(|r| r.hook_load).collect();
        assert_eq!(loads, vec![Some(2.0), Some(3.0), Some(1.0)]);
        assert_eq!(out.readings[0].date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(out.readings[2].date, NaiveDate::from_ymd_opt(2024, 1, 16));
    }

    #[test]
    fn test_ties_keep_file_order() {
        let raw = dataset(
            vec![
                reading("2024/01/15", "08:00:00", 1.0),
                reading("2024/01/15", "07:00:00", 2.0),
                reading("2024/01/15", "08:00:00", 3.0),
                reading("2024/01/15", "08:00:00", 4.0),
            ],
            &[Column::Date, Column::Time],
        );

        let out = normalize_timestamps(&raw);
        let loads: Vec<_> = out.readings.iter().map(|r| r.hook_load).collect();
        assert_eq!(loads, vec![Some(2.0), Some(1.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn test_one_bad_row_fails_whole_column() {
        let raw = dataset(
            vec![
                reading("2024/01/16", "00:00:05", 1.0),
                reading("not a date", "23:59:59", 2.0),
                reading("2024/01/15", "00:00:01", 3.0),
            ],
            &[Column::Date, Column::Time],
        );

        let out = normalize_timestamps(&raw);
        assert!(matches!(
            out.warning,
            Some(PipelineWarning::ParseFailure { .. })
        ));
        let loads: Vec<_> = out.readings.iter().map(|r| r.hook_load).collect();
        assert_eq!(loads, vec![Some(1.0), Some(2.0), Some(3.0)]);
        assert!(out.readings.iter().all(|r| r.date.is_none() && r.timestamp.is_none()));
    }

    #[test]
    fn test_blank_rows_stay_undated_and_sort_last() {
        let raw = dataset(
            vec![
                reading("2024/01/16", "08:00:00", 1.0),
                reading("", " ", 2.0),
                reading("2024/01/15", "08:00:00", 3.0),
                reading("", "", 4.0),
            ],
            &[Column::Date, Column::Time],
        );

        let out = normalize_timestamps(&raw);
        assert!(out.is_chronological());
        let loads: Vec<_> = out.readings.iter().map(|r| r.hook_load).collect();
        assert_eq!(loads, vec![Some(3.0), Some(1.0), Some(2.0), Some(4.0)]);
        assert_eq!(out.readings[0].date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert!(out.readings[2..].iter().all(|r| r.timestamp.is_none() && r.date.is_none()));
    }

    #[test]
    fn test_half_blank_row_still_fails() {
        let raw = dataset(
            vec![
                reading("2024/01/15", "08:00:00", 1.0),
                reading("2024/01/15", "", 2.0),
            ],
            &[Column::Date, Column::Time],
        );

        let out = normalize_timestamps(&raw);
        assert!(matches!(
            out.warning,
            Some(PipelineWarning::ParseFailure { .. })
        ));
    }

    #[test]
    fn test_missing_time_column_fails_soft() {
        let raw = dataset(vec![reading("2024/01/15", "", 1.0)], &[Column::Date]);

        let out = normalize_timestamps(&raw);
        match out.warning {
            Some(PipelineWarning::ParseFailure { reason }) => assert!(reason.contains("HH:MM:SS")),
            other => panic!("expected parse failure, got {:?}", other),
        }
    }

    #[test]
    fn test_input_is_not_modified() {
        let raw = dataset(
            vec![
                reading("2024/01/16", "00:00:05", 1.0),
                reading("2024/01/15", "23:59:59", 2.0),
            ],
            &[Column::Date, Column::Time],
        );
        let before = raw.clone();
        let _ = normalize_timestamps(&raw);
        assert_eq!(raw, before);
    }
}
