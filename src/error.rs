// Error and warning types.
//
// `Error` is only ever raised by the outer surface (file I/O, CLI parsing).
// The analysis pipeline itself never fails: every recoverable problem is a
// `PipelineWarning` returned next to the partial result.
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown screen mesh type '{0}' (expected API 100, API 140, API 170 or API 200)")]
    InvalidMeshType(String),

    #[error("Utilization threshold {0}% is outside the allowed range 50-100")]
    ThresholdOutOfRange(i64),

    #[error("Utilization threshold '{0}' is not a whole percent")]
    InvalidThreshold(String),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Error::Csv {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Non-fatal condition reported by a pipeline stage.
///
/// Stages recover locally and hand these back so the caller can decide
/// whether to surface them.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PipelineWarning {
    #[error("Could not parse timestamp: {reason}")]
    ParseFailure { reason: String },

    #[error("Column '{column}' is missing; {consequence}")]
    MissingColumn {
        column: String,
        consequence: String,
    },

    #[error("{statistic} is undefined: no valid samples")]
    UndefinedAggregate { statistic: String },
}
