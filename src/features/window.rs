//! Fixed-window aggregation: events → (identifier, window) buckets → summary statistics.

use super::WindowAggregate;
use crate::capture::{Event, Identifier};
use crate::labels::GroundTruth;
use crate::period::{gaps, mean_std};
use std::collections::BTreeMap;

/// Fixed per-frame bit cost on top of the payload (CAN 2.0A, no stuff bits)
pub const FRAME_OVERHEAD_BITS: u64 = 47;

/// Approximate on-wire bits of one frame: `8 * dlc + 47`
pub fn frame_bits(data_length: u8) -> u64 {
    8 * data_length as u64 + FRAME_OVERHEAD_BITS
}

#[derive(Default)]
struct Bucket {
    timestamps: Vec<f64>,
    util_bits: u64,
    dos: bool,
    fuzzy: bool,
    imp: bool,
}

impl Bucket {
    fn finish(mut self, identifier: Identifier, hyper_idx: i64) -> WindowAggregate {
        // one bucket can mix captures, so order by time before taking gaps
        self.timestamps.sort_by(f64::total_cmp);
        let (mean, std) = mean_std(&gaps(&self.timestamps));
        WindowAggregate {
            identifier,
            hyper_idx,
            n_frames: self.timestamps.len() as u64,
            mean_gap_ms: mean * 1e3,
            std_gap_ms: std * 1e3,
            util_bits: self.util_bits,
            has_dos: self.dos,
            has_fuzzy: self.fuzzy,
            has_imp: self.imp,
        }
    }
}

pub struct WindowAggregator {
    window_secs: f64,
    truth: GroundTruth,
}

impl WindowAggregator {
    /// `window_secs` must be positive; the builder validates it from config.
    pub fn new(window_secs: f64, truth: GroundTruth) -> Self {
        Self { window_secs, truth }
    }

    pub fn window_secs(&self) -> f64 {
        self.window_secs
    }

    /// `floor(timestamp / window_secs)`
    pub fn window_index(&self, timestamp: f64) -> i64 {
        (timestamp / self.window_secs).floor() as i64
    }

    /// Bucket events by (identifier, window) and summarize each bucket.
    /// Rows come out ordered by identifier, then window index.
    pub fn aggregate<'a, I>(&self, events: I) -> Vec<WindowAggregate>
    where
        I: IntoIterator<Item = &'a Event>,
    {
        let mut buckets: BTreeMap<(Identifier, i64), Bucket> = BTreeMap::new();
        for e in events {
            let b = buckets
                .entry((e.identifier.clone(), self.window_index(e.timestamp)))
                .or_default();
            b.timestamps.push(e.timestamp);
            b.util_bits += frame_bits(e.data_length);
            b.dos |= self.truth.is_dos(e);
            b.imp |= self.truth.is_imp(e);
            b.fuzzy |= self.truth.is_fuzzy(e);
        }
        buckets
            .into_iter()
            .map(|((identifier, idx), b)| b.finish(identifier, idx))
            .collect()
    }
}
