//! Run diagnostics: flag/class counts, attack onset, hyper-period and provenance.

mod onset;

pub use onset::{detect_attack_onset, AttackOnset};

use crate::capture::ReadStats;
use crate::features::{ClassCounts, FeatureTable, FlagCounts};
use crate::period::HyperPeriod;
use crate::storage::PersistedTable;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub rows: usize,
    pub frames: u64,
    pub flags: FlagCounts,
    pub classes: ClassCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hyper_period: Option<HyperPeriod>,
    pub profiled_ids: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attack_onset: Option<AttackOnset>,
    pub inputs: Vec<ReadStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PersistedTable>,
}

impl RunSummary {
    pub fn new(table: &FeatureTable, inputs: Vec<ReadStats>) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            generated_at: Utc::now(),
            rows: table.len(),
            frames: table.rows().iter().map(|r| r.window.n_frames).sum(),
            flags: table.flag_counts(),
            classes: table.class_counts(),
            hyper_period: None,
            profiled_ids: 0,
            attack_onset: None,
            inputs,
            output: None,
        }
    }

    /// Raw frames per output row
    pub fn reduction_ratio(&self) -> f64 {
        if self.rows == 0 {
            0.0
        } else {
            self.frames as f64 / self.rows as f64
        }
    }
}
