// Narrative advisory and savings estimate.
//
// These rules use their own thresholds (85, 95 + 80, 75 + 70), separate from
// the flag rules in `flags.rs`. The two sets may disagree.
use crate::types::{Advisory, AdvisoryNote, DatasetSummary, Severity};

pub const SCREEN_CHANGE_UTIL_PCT: f64 = 85.0;
pub const ATTENTION_SHAKER_PCT: f64 = 95.0;
pub const ATTENTION_UTIL_PCT: f64 = 80.0;
pub const HEALTHY_UTIL_PCT: f64 = 75.0;
pub const HEALTHY_SHAKER_PCT: f64 = 70.0;

/// Daily currency units recovered at full utilization.
pub const DAILY_SAVINGS_UNIT: f64 = 120.0;

pub fn estimated_savings(avg_utilization: Option<f64>) -> Option<f64> {
    avg_utilization.map(|u| u / 100.0 * DAILY_SAVINGS_UNIT)
}

pub fn build_advisory(summary: &DatasetSummary) -> Advisory {
    let util = summary.avg_utilization;
    let mut notes = Vec::new();

    if let Some(u) = util {
        if u > SCREEN_CHANGE_UTIL_PCT {
            notes.push(AdvisoryNote {
                severity: Severity::Critical,
                message: format!(
                    "Average screen utilization is {:.1}%: recommend a screen change.",
                    u
                ),
            });
        }
    }

    if let (Some(peak), Some(u)) = (summary.max_shaker3, util) {
        if peak > ATTENTION_SHAKER_PCT && u > ATTENTION_UTIL_PCT {
            notes.push(AdvisoryNote {
                severity: Severity::Warning,
                message: format!(
                    "Attention needed: SHAKER #3 peaked at {:.1}% under {:.1}% utilization.",
                    peak, u
                ),
            });
        }
    }

    if let (Some(u), Some(shaker3)) = (util, summary.avg_shaker3) {
        if u < HEALTHY_UTIL_PCT && shaker3 < HEALTHY_SHAKER_PCT {
            notes.push(AdvisoryNote {
                severity: Severity::Healthy,
                message: "System healthy: screen and shaker loads are comfortable.".to_string(),
            });
        }
    }

    if notes.is_empty() {
        notes.push(AdvisoryNote {
            severity: Severity::Caution,
            message: "No advisory rule triggered; continue routine monitoring.".to_string(),
        });
    }

    let recommendation = notes
        .iter()
        .map(|n| n.message.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    Advisory {
        notes,
        recommendation,
        estimated_savings_per_day: estimated_savings(util),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(util: Option<f64>, avg_shaker3: Option<f64>, max_shaker3: Option<f64>) -> DatasetSummary {
        DatasetSummary {
            rows: 100,
            avg_utilization: util,
            avg_flow_rate: Some(550.0),
            avg_shaker3,
            max_shaker3,
            hook_load_std: None,
        }
    }

    fn severities(a: &Advisory) -> Vec<Severity> {
        a.notes.iter().map(|n| n.severity).collect()
    }

    #[test]
    fn test_savings_is_linear() {
        assert_eq!(estimated_savings(Some(50.0)), Some(60.0));
        assert_eq!(estimated_savings(Some(100.0)), Some(120.0));
        assert_eq!(estimated_savings(None), None);
    }

    #[test]
    fn test_screen_change_and_attention() {
        let a = build_advisory(&summary(Some(88.0), Some(80.0), Some(96.0)));
        assert_eq!(severities(&a), vec![Severity::Critical, Severity::Warning]);
        assert!(a.recommendation.contains("screen change"));
        assert!(a.recommendation.contains("Attention needed"));
        assert!((a.estimated_savings_per_day.unwrap() - 105.6).abs() < 1e-9);
    }

    #[test]
    fn test_attention_without_screen_change() {
        let a = build_advisory(&summary(Some(82.0), Some(80.0), Some(96.0)));
        assert_eq!(severities(&a), vec![Severity::Warning]);
    }

    #[test]
    fn test_system_healthy() {
        let a = build_advisory(&summary(Some(25.0), Some(60.0), Some(99.0)));
        assert_eq!(severities(&a), vec![Severity::Healthy]);
        assert!(a.recommendation.starts_with("System healthy"));
    }

    #[test]
    fn test_diverges_from_flag_thresholds() {
        // 87% average trips the screen change advice but not the 90% flag.
        let s = summary(Some(87.0), Some(50.0), Some(60.0));
        let a = build_advisory(&s);
        assert_eq!(severities(&a), vec![Severity::Critical]);
        assert!(crate::flags::evaluate_flags(&s)
            .iter()
            .all(|f| f.severity == Severity::Healthy));
    }

    #[test]
    fn test_neutral_note_when_nothing_fires() {
        let a = build_advisory(&summary(Some(78.0), Some(50.0), Some(60.0)));
        assert_eq!(severities(&a), vec![Severity::Caution]);

        let a = build_advisory(&summary(None, None, None));
        assert_eq!(severities(&a), vec![Severity::Caution]);
        assert_eq!(a.estimated_savings_per_day, None);
    }
}
