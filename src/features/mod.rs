//! Windowed feature extraction from normalized capture events.

mod table;
mod window;

pub use table::{ClassCounts, FeatureRow, FeatureTable, FlagCounts, COLUMNS};
pub use window::{frame_bits, WindowAggregator, FRAME_OVERHEAD_BITS};

use crate::capture::Identifier;
use serde::{Deserialize, Serialize};

/// Summary of one (identifier, window) bucket, before labeling.
/// Gap statistics are 0 (never missing) when the bucket has no gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowAggregate {
    pub identifier: Identifier,
    pub hyper_idx: i64,
    pub n_frames: u64,
    pub mean_gap_ms: f64,
    pub std_gap_ms: f64,
    pub util_bits: u64,
    pub has_dos: bool,
    pub has_fuzzy: bool,
    pub has_imp: bool,
}
