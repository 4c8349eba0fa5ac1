//! Health flag rules.
//!
//! Rules run top to bottom and are independent of each other. A rule whose
//! statistic is undefined is skipped. The `healthy` fallback is emitted only
//! when none of the threshold rules fired.

use crate::types::{DatasetSummary, Flag, Severity};
use tracing::debug;

pub const SUSTAINED_LOAD_PCT: f64 = 90.0;
pub const PEAK_SHAKER_PCT: f64 = 98.0;
pub const HOOK_LOAD_STD_LIMIT: f64 = 20.0;

struct Rule {
    name: &'static str,
    check: fn(&DatasetSummary) -> Option<Flag>,
}

const RULES: [Rule; 3] = [
    Rule {
        name: "sustained screen load",
        check: sustained_screen_load,
    },
    Rule {
        name: "peak shaker output",
        check: peak_shaker_output,
    },
    Rule {
        name: "mechanical instability",
        check: mechanical_instability,
    },
];

fn sustained_screen_load(s: &DatasetSummary) -> Option<Flag> {
    let avg = s.avg_utilization?;
    (avg > SUSTAINED_LOAD_PCT).then(|| {
        Flag::new(
            Severity::Critical,
            format!(
                "Sustained screen overload: average utilization {:.1}% exceeds {:.0}%",
                avg, SUSTAINED_LOAD_PCT
            ),
        )
    })
}

fn peak_shaker_output(s: &DatasetSummary) -> Option<Flag> {
    let peak = s.max_shaker3?;
    (peak > PEAK_SHAKER_PCT).then(|| {
        Flag::new(
            Severity::Critical,
            format!(
                "Peak shaker output: SHAKER #3 reached {:.1}% (limit {:.0}%)",
                peak, PEAK_SHAKER_PCT
            ),
        )
    })
}

fn mechanical_instability(s: &DatasetSummary) -> Option<Flag> {
    let std = s.hook_load_std?;
    (std > HOOK_LOAD_STD_LIMIT).then(|| {
        Flag::new(
            Severity::Caution,
            format!(
                "Mechanical instability: hook load standard deviation {:.1} klbs exceeds {:.0}",
                std, HOOK_LOAD_STD_LIMIT
            ),
        )
    })
}

pub fn evaluate_flags(summary: &DatasetSummary) -> Vec<Flag> {
    let mut flags: Vec<Flag> = RULES
        .iter()
        .filter_map(|rule| {
            let flag = (rule.check)(summary);
            debug!(rule = rule.name, fired = flag.is_some(), "flag rule evaluated");
            flag
        })
        .collect();

    if flags.is_empty() {
        flags.push(Flag::new(
            Severity::Healthy,
            "Shaker screens operating within limits",
        ));
    }
    flags
}
