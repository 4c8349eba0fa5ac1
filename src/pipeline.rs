//! Full analysis run: raw rows → normalized → derived → aggregates, flags
//! and advisory.
//!
//! `analyze` is a pure function of the raw dataset and the two session
//! parameters. Changing either parameter means calling it again; nothing is
//! carried over between runs.

use crate::advisory::build_advisory;
use crate::derive::derive_utilization;
use crate::error::PipelineWarning;
use crate::flags::evaluate_flags;
use crate::loader::RawDataset;
use crate::normalize::normalize_timestamps;
use crate::reports::{daily_aggregates, summarize, undefined_statistics};
use crate::types::{
    Advisory, DailyAggregate, DatasetSummary, Flag, MeshType, Reading, UtilizationSource,
    UtilizationThreshold,
};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AnalysisParams {
    pub mesh: MeshType,
    pub threshold: UtilizationThreshold,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub params: AnalysisParams,
    pub readings: Vec<Reading>,
    pub utilization_source: UtilizationSource,
    pub daily: Vec<DailyAggregate>,
    pub summary: DatasetSummary,
    pub flags: Vec<Flag>,
    pub advisory: Advisory,
    pub warnings: Vec<PipelineWarning>,
}

pub fn analyze(raw: &RawDataset, params: AnalysisParams) -> Analysis {
    let mut warnings = Vec::new();

    let normalized = normalize_timestamps(raw);
    if !normalized.is_chronological() {
        warn!("readings left in file order; daily grouping skipped");
    }
    warnings.extend(normalized.warning.clone());

    let derived = derive_utilization(&normalized.readings, &raw.columns, params.mesh);
    warnings.extend(derived.warnings);

    let daily = daily_aggregates(&derived.readings, params.threshold);
    let summary = summarize(&derived.readings);
    warnings.extend(undefined_statistics(&summary));

    let flags = evaluate_flags(&summary);
    let advisory = build_advisory(&summary);

    for w in &warnings {
        warn!("{}", w);
    }
    info!(
        mesh = %params.mesh,
        threshold = %params.threshold,
        days = daily.len(),
        flags = flags.len(),
        "analysis complete"
    );

    Analysis {
        params,
        readings: derived.readings,
        utilization_source: derived.source,
        daily,
        summary,
        flags,
        advisory,
        warnings,
    }
}
