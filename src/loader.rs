use crate::error::{Error, Result};
use crate::types::{Column, ColumnSet, RawRow, Reading};
use crate::util::parse_f64_safe;
use csv::ReaderBuilder;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub parse_errors: usize,
    /// Numeric cells that were present but could not be read as a number.
    pub invalid_cells: usize,
}

/// Parsed rows in file order plus the known columns the header carried.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDataset {
    pub readings: Vec<Reading>,
    pub columns: ColumnSet,
    pub report: LoadReport,
}

pub fn load_csv(path: impl AsRef<Path>) -> Result<RawDataset> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| Error::io(path, e))?;
    let dataset = read_csv(file).map_err(|e| Error::csv(path, e))?;
    info!(
        path = %path.display(),
        rows = dataset.readings.len(),
        "loaded shaker data"
    );
    Ok(dataset)
}

/// Read shaker CSV data from any reader. Records that the CSV layer itself
/// rejects are counted and skipped; everything else becomes a `Reading`.
pub fn read_csv<R: Read>(input: R) -> std::result::Result<RawDataset, csv::Error> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(input);
    let columns = ColumnSet::from_headers(rdr.headers()?.iter());
    for missing in columns.missing() {
        debug!(column = missing.header(), "column not present in header");
    }

    let mut total_rows = 0usize;
    let mut parse_errors = 0usize;
    let mut invalid_cells = 0usize;
    let mut readings = Vec::new();

    for result in rdr.deserialize::<RawRow>() {
        total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                debug!(error = %e, "skipping unreadable record");
                parse_errors += 1;
                continue;
            }
        };

        let mut number = |cell: Option<&str>| {
            let parsed = parse_f64_safe(cell);
            if parsed.is_none() && cell.is_some_and(|c| !c.trim().is_empty()) {
                invalid_cells += 1;
            }
            parsed
        };

        readings.push(Reading {
            date_raw: row.date.unwrap_or_default().trim().to_string(),
            time_raw: row.time.unwrap_or_default().trim().to_string(),
            flow_rate: number(row.flow_rate.as_deref()),
            shaker1_units: number(row.shaker1_units.as_deref()),
            shaker2_units: number(row.shaker2_units.as_deref()),
            shaker3_percent: number(row.shaker3_percent.as_deref()),
            weight_on_bit: number(row.weight_on_bit.as_deref()),
            hook_load: number(row.hook_load.as_deref()),
            bit_depth: number(row.bit_depth.as_deref()),
            hole_depth: number(row.hole_depth.as_deref()),
            screen_utilization_pct: number(row.screen_utilization_pct.as_deref()),
            ..Reading::default()
        });
    }

    Ok(RawDataset {
        readings,
        columns,
        report: LoadReport {
            total_rows,
            parse_errors,
            invalid_cells,
        },
    })
}

impl RawDataset {
    pub fn has(&self, column: Column) -> bool {
        self.columns.contains(column)
    }
}
