use crate::error::PipelineWarning;
use crate::types::{
    DailyAggregate, DailySummaryRow, DatasetSummary, Reading, UtilizationThreshold,
};
use crate::util::{format_optional, max, mean, sample_std};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// One row per calendar date, ascending. Readings without a date (failed
/// timestamp normalization) are not grouped at all.
pub fn daily_aggregates(
    readings: &[Reading],
    threshold: UtilizationThreshold,
) -> Vec<DailyAggregate> {
    #[derive(Default)]
    struct Acc {
        utilization: Vec<Option<f64>>,
        flow_rate: Vec<Option<f64>>,
        shaker3: Vec<Option<f64>>,
    }

    let mut map: BTreeMap<NaiveDate, Acc> = BTreeMap::new();
    for r in readings {
        let Some(date) = r.date else { continue };
        let e = map.entry(date).or_default();
        e.utilization.push(r.screen_utilization_pct);
        e.flow_rate.push(r.flow_rate);
        e.shaker3.push(r.shaker3_percent);
    }

    map.into_iter()
        .map(|(date, acc)| {
            let avg_utilization = mean(acc.utilization);
            DailyAggregate {
                date,
                avg_utilization,
                avg_flow_rate: mean(acc.flow_rate),
                avg_shaker3: mean(acc.shaker3.iter().copied()),
                max_shaker3: max(acc.shaker3),
                exceeds_threshold: exceeds(avg_utilization, threshold),
            }
        })
        .collect()
}

/// Strictly greater than; an undefined average never exceeds.
pub fn exceeds(avg_utilization: Option<f64>, threshold: UtilizationThreshold) -> bool {
    avg_utilization.is_some_and(|avg| avg > threshold.percent())
}

pub fn summarize(readings: &[Reading]) -> DatasetSummary {
    DatasetSummary {
        rows: readings.len(),
        avg_utilization: mean(readings.iter().map(|r| r.screen_utilization_pct)),
        avg_flow_rate: mean(readings.iter().map(|r| r.flow_rate)),
        avg_shaker3: mean(readings.iter().map(|r| r.shaker3_percent)),
        max_shaker3: max(readings.iter().map(|r| r.shaker3_percent)),
        hook_load_std: sample_std(readings.iter().map(|r| r.hook_load)),
    }
}

/// One `UndefinedAggregate` warning per whole-dataset statistic that came
/// out undefined.
pub fn undefined_statistics(summary: &DatasetSummary) -> Vec<PipelineWarning> {
    [
        ("Average screen utilization", summary.avg_utilization),
        ("Average flow rate", summary.avg_flow_rate),
        ("Average shaker #3 output", summary.avg_shaker3),
        ("Maximum shaker #3 output", summary.max_shaker3),
        ("Hook load standard deviation", summary.hook_load_std),
    ]
    .into_iter()
    .filter(|(_, value)| value.is_none())
    .map(|(name, _)| PipelineWarning::UndefinedAggregate {
        statistic: name.to_string(),
    })
    .collect()
}

pub fn render_daily(rows: &[DailyAggregate]) -> Vec<DailySummaryRow> {
    rows.iter()
        .map(|d| DailySummaryRow {
            date: d.date.format("%Y-%m-%d").to_string(),
            avg_utilization: format_optional(d.avg_utilization, 2),
            avg_flow_rate: format_optional(d.avg_flow_rate, 2),
            avg_shaker3: format_optional(d.avg_shaker3, 2),
            max_shaker3: format_optional(d.max_shaker3, 2),
            exceeds_threshold: d.exceeds_threshold,
        })
        .collect()
}
