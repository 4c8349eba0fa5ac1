use crate::error::{Error, PipelineWarning, Result};
use crate::pipeline::{Analysis, AnalysisParams};
use crate::reports::render_daily;
use crate::types::{Advisory, DailyAggregate, DatasetSummary, Flag, UtilizationSource};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

pub const READINGS_FILE: &str = "shaker_readings.csv";
pub const DAILY_FILE: &str = "shaker_daily_summary.csv";
pub const FLAGS_FILE: &str = "shaker_flags.csv";
pub const SUMMARY_FILE: &str = "shaker_summary.json";

/// Everything the presentation side needs besides the row tables.
#[derive(Debug, Serialize)]
pub struct SummaryDocument<'a> {
    pub params: AnalysisParams,
    pub utilization_source: UtilizationSource,
    pub summary: &'a DatasetSummary,
    pub daily: &'a [DailyAggregate],
    pub flags: &'a [Flag],
    pub advisory: &'a Advisory,
    pub warnings: &'a [PipelineWarning],
}

impl<'a> From<&'a Analysis> for SummaryDocument<'a> {
    fn from(a: &'a Analysis) -> Self {
        SummaryDocument {
            params: a.params,
            utilization_source: a.utilization_source,
            summary: &a.summary,
            daily: &a.daily,
            flags: &a.flags,
            advisory: &a.advisory,
            warnings: &a.warnings,
        }
    }
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path).map_err(|e| Error::csv(path, e))?;
    for r in rows {
        wtr.serialize(r).map_err(|e| Error::csv(path, e))?;
    }
    wtr.flush().map_err(|e| Error::io(path, e))?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).map_err(|e| Error::io(path, e))?;
    Ok(())
}

/// Write the four report files into `dir`, creating it if needed.
pub fn write_reports(dir: &Path, analysis: &Analysis) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

    let readings = dir.join(READINGS_FILE);
    write_csv(&readings, &analysis.readings)?;
    let daily = dir.join(DAILY_FILE);
    write_csv(&daily, &render_daily(&analysis.daily))?;
    let flags = dir.join(FLAGS_FILE);
    write_csv(&flags, &analysis.flags)?;
    let summary = dir.join(SUMMARY_FILE);
    write_json(&summary, &SummaryDocument::from(analysis))?;

    info!(dir = %dir.display(), "reports written");
    Ok(vec![readings, daily, flags, summary])
}

pub fn render_table<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}\n", render_table(rows, max_rows));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::read_csv;
    use crate::pipeline::analyze;
    use tempfile::tempdir;

    const SAMPLE: &str = "\
YYYY/MM/DD,HH:MM:SS,MA_Flow_Rate (gal/min),SHAKER #3 (PERCENT),Weight on Bit (klbs),Hook Load (klbs)
2024/01/15,08:00:00,500,60,20,250
2024/01/16,08:00:00,500,99,,280
";

    #[test]
    fn test_write_reports() {
        let raw = read_csv(SAMPLE.as_bytes()).unwrap();
        let analysis = analyze(&raw, AnalysisParams::default());
        let dir = tempdir().unwrap();
        let out = dir.path().join("reports");

        let files = write_reports(&out, &analysis).unwrap();
        assert_eq!(files.len(), 4);
        assert!(files.iter().all(|f| f.exists()));

        let daily = std::fs::read_to_string(out.join(DAILY_FILE)).unwrap();
        let mut lines = daily.lines();
        assert_eq!(
            lines.next(),
            Some("Date,Avg Utilization,Avg Flow Rate,Avg SHKR3,Max SHKR3,Exceeds Threshold")
        );
        assert_eq!(lines.next(), Some("2024-01-15,40.00,500.00,60.00,60.00,false"));
        assert_eq!(lines.next(), Some("2024-01-16,n/a,500.00,99.00,99.00,false"));

        let readings = std::fs::read_to_string(out.join(READINGS_FILE)).unwrap();
        assert!(readings.lines().next().unwrap().contains("Screen Utilization (%)"));
        assert_eq!(readings.lines().count(), 3);

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out.join(SUMMARY_FILE)).unwrap())
                .unwrap();
        assert_eq!(json["params"]["mesh"], "API 100");
        assert_eq!(json["params"]["threshold"], 80);
        assert_eq!(json["utilization_source"], "derived");
        assert_eq!(json["flags"][0]["Severity"], "critical");
        assert_eq!(json["advisory"]["estimated_savings_per_day"], 48.0);
    }

    #[test]
    fn test_render_table_empty() {
        let rows: Vec<Flag> = Vec::new();
        assert_eq!(render_table(&rows, 5), "(no rows)");
    }
}
