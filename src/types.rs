use crate::error::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

/// Known input columns, keyed by their exact CSV header text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    Date,
    Time,
    FlowRate,
    Shaker1,
    Shaker2,
    Shaker3,
    WeightOnBit,
    HookLoad,
    ScreenUtilization,
    BitDepth,
    HoleDepth,
}

impl Column {
    pub const ALL: [Column; 11] = [
        Column::Date,
        Column::Time,
        Column::FlowRate,
        Column::Shaker1,
        Column::Shaker2,
        Column::Shaker3,
        Column::WeightOnBit,
        Column::HookLoad,
        Column::ScreenUtilization,
        Column::BitDepth,
        Column::HoleDepth,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::Date => "YYYY/MM/DD",
            Column::Time => "HH:MM:SS",
            Column::FlowRate => "MA_Flow_Rate (gal/min)",
            Column::Shaker1 => "SHAKER #1 (Units)",
            Column::Shaker2 => "SHAKER #2 (Units)",
            Column::Shaker3 => "SHAKER #3 (PERCENT)",
            Column::WeightOnBit => "Weight on Bit (klbs)",
            Column::HookLoad => "Hook Load (klbs)",
            Column::ScreenUtilization => "Screen Utilization (%)",
            Column::BitDepth => "Bit Depth (feet)",
            Column::HoleDepth => "Hole Depth (feet)",
        }
    }

    pub fn from_header(header: &str) -> Option<Column> {
        let header = header.trim();
        Column::ALL.into_iter().find(|c| c.header() == header)
    }
}

/// Which of the known columns were present in the file header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSet(BTreeSet<Column>);

impl ColumnSet {
    pub fn from_headers<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        ColumnSet(headers.into_iter().filter_map(Column::from_header).collect())
    }

    pub fn contains(&self, column: Column) -> bool {
        self.0.contains(&column)
    }

    pub fn missing(&self) -> Vec<Column> {
        Column::ALL
            .into_iter()
            .filter(|c| !self.0.contains(c))
            .collect()
    }
}

impl FromIterator<Column> for ColumnSet {
    fn from_iter<T: IntoIterator<Item = Column>>(iter: T) -> Self {
        ColumnSet(iter.into_iter().collect())
    }
}

/// One CSV record as it comes off disk. Every field is optional text so a
/// blank or garbled cell never aborts the load.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    #[serde(rename = "YYYY/MM/DD")]
    pub date: Option<String>,
    #[serde(rename = "HH:MM:SS")]
    pub time: Option<String>,
    #[serde(rename = "MA_Flow_Rate (gal/min)")]
    pub flow_rate: Option<String>,
    #[serde(rename = "SHAKER #1 (Units)")]
    pub shaker1_units: Option<String>,
    #[serde(rename = "SHAKER #2 (Units)")]
    pub shaker2_units: Option<String>,
    #[serde(rename = "SHAKER #3 (PERCENT)")]
    pub shaker3_percent: Option<String>,
    #[serde(rename = "Weight on Bit (klbs)")]
    pub weight_on_bit: Option<String>,
    #[serde(rename = "Hook Load (klbs)")]
    pub hook_load: Option<String>,
    #[serde(rename = "Screen Utilization (%)")]
    pub screen_utilization_pct: Option<String>,
    #[serde(rename = "Bit Depth (feet)")]
    pub bit_depth: Option<String>,
    #[serde(rename = "Hole Depth (feet)")]
    pub hole_depth: Option<String>,
}

/// A single sensor sample. `None` means "no value", never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Reading {
    #[serde(rename = "YYYY/MM/DD")]
    pub date_raw: String,
    #[serde(rename = "HH:MM:SS")]
    pub time_raw: String,
    #[serde(rename = "Timestamp")]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(rename = "Date")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "MA_Flow_Rate (gal/min)")]
    pub flow_rate: Option<f64>,
    #[serde(rename = "SHAKER #1 (Units)")]
    pub shaker1_units: Option<f64>,
    #[serde(rename = "SHAKER #2 (Units)")]
    pub shaker2_units: Option<f64>,
    #[serde(rename = "SHAKER #3 (PERCENT)")]
    pub shaker3_percent: Option<f64>,
    #[serde(rename = "Weight on Bit (klbs)")]
    pub weight_on_bit: Option<f64>,
    #[serde(rename = "Hook Load (klbs)")]
    pub hook_load: Option<f64>,
    #[serde(rename = "Bit Depth (feet)")]
    pub bit_depth: Option<f64>,
    #[serde(rename = "Hole Depth (feet)")]
    pub hole_depth: Option<f64>,
    #[serde(rename = "Solids Volume Rate (gpm)")]
    pub solids_volume_rate: Option<f64>,
    #[serde(rename = "Screen Utilization (%)")]
    pub screen_utilization_pct: Option<f64>,
}

/// Screen mesh classification and its rated throughput in gal/min.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum MeshType {
    #[default]
    #[serde(rename = "API 100")]
    Api100,
    #[serde(rename = "API 140")]
    Api140,
    #[serde(rename = "API 170")]
    Api170,
    #[serde(rename = "API 200")]
    Api200,
}

impl MeshType {
    pub const ALL: [MeshType; 4] = [
        MeshType::Api100,
        MeshType::Api140,
        MeshType::Api170,
        MeshType::Api200,
    ];

    pub fn capacity(self) -> u32 {
        match self {
            MeshType::Api100 => 250,
            MeshType::Api140 => 200,
            MeshType::Api170 => 160,
            MeshType::Api200 => 120,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MeshType::Api100 => "API 100",
            MeshType::Api140 => "API 140",
            MeshType::Api170 => "API 170",
            MeshType::Api200 => "API 200",
        }
    }
}

impl fmt::Display for MeshType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MeshType {
    type Err = Error;

    /// Accepts "API 140", "api140", "API-140" or a bare "140".
    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        let digits = match upper.strip_prefix("API") {
            Some(rest) => rest
                .strip_prefix(|c: char| matches!(c, ' ' | '-' | '_'))
                .unwrap_or(rest),
            None => upper.as_str(),
        };
        match digits {
            "100" => Ok(MeshType::Api100),
            "140" => Ok(MeshType::Api140),
            "170" => Ok(MeshType::Api170),
            "200" => Ok(MeshType::Api200),
            _ => Err(Error::InvalidMeshType(s.to_string())),
        }
    }
}

/// Daily utilization alarm level, an integer percent in 50..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UtilizationThreshold(u8);

impl UtilizationThreshold {
    pub const MIN: u8 = 50;
    pub const MAX: u8 = 100;

    pub fn new(percent: i64) -> Result<Self> {
        if (Self::MIN as i64..=Self::MAX as i64).contains(&percent) {
            Ok(UtilizationThreshold(percent as u8))
        } else {
            Err(Error::ThresholdOutOfRange(percent))
        }
    }

    pub fn percent(self) -> f64 {
        self.0 as f64
    }
}

impl Default for UtilizationThreshold {
    fn default() -> Self {
        UtilizationThreshold(80)
    }
}

impl fmt::Display for UtilizationThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl FromStr for UtilizationThreshold {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().trim_end_matches('%').trim();
        let value: i64 = trimmed
            .parse()
            .map_err(|_| Error::InvalidThreshold(s.to_string()))?;
        UtilizationThreshold::new(value)
    }
}

/// Where the utilization column of a derived dataset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UtilizationSource {
    /// Taken verbatim from `Screen Utilization (%)`.
    Source,
    /// Computed from weight on bit, flow rate and mesh capacity.
    Derived,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub avg_utilization: Option<f64>,
    pub avg_flow_rate: Option<f64>,
    pub avg_shaker3: Option<f64>,
    pub max_shaker3: Option<f64>,
    pub exceeds_threshold: bool,
}

/// Rendered daily row for CSV export and the console preview.
#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DailySummaryRow {
    #[serde(rename = "Date")]
    #[tabled(rename = "Date")]
    pub date: String,
    #[serde(rename = "Avg Utilization")]
    #[tabled(rename = "Avg Utilization")]
    pub avg_utilization: String,
    #[serde(rename = "Avg Flow Rate")]
    #[tabled(rename = "Avg Flow Rate")]
    pub avg_flow_rate: String,
    #[serde(rename = "Avg SHKR3")]
    #[tabled(rename = "Avg SHKR3")]
    pub avg_shaker3: String,
    #[serde(rename = "Max SHKR3")]
    #[tabled(rename = "Max SHKR3")]
    pub max_shaker3: String,
    #[serde(rename = "Exceeds Threshold")]
    #[tabled(rename = "Exceeds Threshold")]
    pub exceeds_threshold: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Healthy,
    Caution,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Healthy => "healthy",
            Severity::Caution => "caution",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct Flag {
    #[serde(rename = "Severity")]
    #[tabled(rename = "Severity")]
    pub severity: Severity,
    #[serde(rename = "Message")]
    #[tabled(rename = "Message")]
    pub message: String,
}

impl Flag {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Flag {
            severity,
            message: message.into(),
        }
    }
}

/// Whole-dataset statistics shared by the flag and advisory rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub avg_utilization: Option<f64>,
    pub avg_flow_rate: Option<f64>,
    pub avg_shaker3: Option<f64>,
    pub max_shaker3: Option<f64>,
    pub hook_load_std: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvisoryNote {
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advisory {
    pub notes: Vec<AdvisoryNote>,
    pub recommendation: String,
    /// Currency units per day; undefined when utilization is.
    pub estimated_savings_per_day: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_capacities() {
        let caps: Vec<u32> = MeshType::ALL.iter().map(|m| m.capacity()).collect();
        assert_eq!(caps, vec![250, 200, 160, 120]);
        assert_eq!(MeshType::default(), MeshType::Api100);
    }

    #[test]
    fn test_mesh_from_str() {
        assert_eq!("API 140".parse::<MeshType>().unwrap(), MeshType::Api140);
        assert_eq!("api-170".parse::<MeshType>().unwrap(), MeshType::Api170);
        assert_eq!("200".parse::<MeshType>().unwrap(), MeshType::Api200);
        for bad in ["API 120", "APIAPI100", "1 0 0", "API  100", "API-"] {
            assert!(
                matches!(bad.parse::<MeshType>(), Err(Error::InvalidMeshType(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_threshold_range() {
        assert!(UtilizationThreshold::new(50).is_ok());
        assert!(UtilizationThreshold::new(100).is_ok());
        assert!(matches!(
            UtilizationThreshold::new(49),
            Err(Error::ThresholdOutOfRange(49))
        ));
        assert_eq!("85%".parse::<UtilizationThreshold>().unwrap().percent(), 85.0);
        assert!(matches!(
            "eighty".parse::<UtilizationThreshold>(),
            Err(Error::InvalidThreshold(_))
        ));
    }

    #[test]
    fn test_column_set_from_headers() {
        let cols = ColumnSet::from_headers(["YYYY/MM/DD", " Hook Load (klbs) ", "Rig Activity"]);
        assert!(cols.contains(Column::Date));
        assert!(cols.contains(Column::HookLoad));
        assert!(!cols.contains(Column::Time));
        assert_eq!(cols.missing().len(), Column::ALL.len() - 2);
    }
}
