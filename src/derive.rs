//! Screen utilization derivation.
//!
//! ```text
//! solids_volume_rate     = weight_on_bit * flow_rate / 100
//! screen_utilization_pct = solids_volume_rate / mesh_capacity * 100
//! ```
//!
//! Only runs when the source has no utilization column of its own. The
//! result depends on nothing but the raw columns and the mesh capacity, so
//! switching mesh type simply means calling this again on the same rows.

use crate::error::PipelineWarning;
use crate::types::{Column, ColumnSet, MeshType, Reading, UtilizationSource};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct Derived {
    pub readings: Vec<Reading>,
    pub source: UtilizationSource,
    pub warnings: Vec<PipelineWarning>,
}

pub fn solids_volume_rate(weight_on_bit: f64, flow_rate: f64) -> f64 {
    weight_on_bit * flow_rate / 100.0
}

pub fn screen_utilization(weight_on_bit: f64, flow_rate: f64, mesh: MeshType) -> f64 {
    solids_volume_rate(weight_on_bit, flow_rate) / mesh.capacity() as f64 * 100.0
}

pub fn derive_utilization(readings: &[Reading], columns: &ColumnSet, mesh: MeshType) -> Derived {
    if columns.contains(Column::ScreenUtilization) {
        debug!("using screen utilization from source data");
        return Derived {
            readings: readings.to_vec(),
            source: UtilizationSource::Source,
            warnings: Vec::new(),
        };
    }

    if !columns.contains(Column::WeightOnBit) {
        warn!("no weight on bit column; screen utilization unavailable");
        return Derived {
            readings: readings
                .iter()
                .map(|r| Reading {
                    solids_volume_rate: None,
                    screen_utilization_pct: None,
                    ..r.clone()
                })
                .collect(),
            source: UtilizationSource::Unavailable,
            warnings: vec![PipelineWarning::MissingColumn {
                column: Column::WeightOnBit.header().to_string(),
                consequence: "screen utilization cannot be derived".to_string(),
            }],
        };
    }

    let mut warnings = Vec::new();
    if !columns.contains(Column::FlowRate) {
        warnings.push(PipelineWarning::MissingColumn {
            column: Column::FlowRate.header().to_string(),
            consequence: "screen utilization cannot be derived".to_string(),
        });
    }

    let readings = readings
        .iter()
        .map(|r| {
            let (svr, util) = match (r.weight_on_bit, r.flow_rate) {
                (Some(wob), Some(flow)) => (
                    Some(solids_volume_rate(wob, flow)),
                    Some(screen_utilization(wob, flow, mesh)),
                ),
                _ => (None, None),
            };
            Reading {
                solids_volume_rate: svr,
                screen_utilization_pct: util,
                ..r.clone()
            }
        })
        .collect();

    debug!(mesh = %mesh, capacity = mesh.capacity(), "screen utilization derived");
    Derived {
        readings,
        source: UtilizationSource::Derived,
        warnings,
    }
}
