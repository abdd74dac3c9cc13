//! Pipeline error types.

use crate::capture::SourceSplit;
use crate::storage::TableFormat;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// An expected capture file is absent; the run aborts before reading anything
    #[error("missing {split} capture: {} not found", path.display())]
    MissingInput { split: SourceSplit, path: PathBuf },

    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{}: required column `{column}` not present", path.display())]
    MissingColumn { path: PathBuf, column: String },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("unknown class label `{0}`")]
    UnknownLabel(String),

    /// LCM of quantized periods no longer fits in u64 ticks (resolution too fine or jittery periods)
    #[error("hyper-period overflow: lcm({acc}, {ticks}) exceeds u64 ticks")]
    HyperPeriodOverflow { acc: u64, ticks: u64 },

    /// Writer for the requested format was not compiled in
    #[error("{0} table writer unavailable")]
    WriterUnavailable(TableFormat),

    #[error("invalid table: {0}")]
    InvalidTable(String),
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
