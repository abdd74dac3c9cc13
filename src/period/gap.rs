//! Dominant inter-arrival period: mode of gaps rounded to a fixed resolution.

use std::collections::BTreeMap;

/// Consecutive differences of an ascending timestamp sequence.
pub fn gaps(timestamps: &[f64]) -> Vec<f64> {
    timestamps.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Gap rounded to integer ticks of `resolution`.
pub fn to_ticks(seconds: f64, resolution: f64) -> i64 {
    (seconds / resolution).round() as i64
}

/// Most frequent rounded gap, in seconds. `timestamps` must be sorted ascending.
///
/// Returns `None` with fewer than two timestamps. Equally frequent ticks resolve to the
/// smallest tick. No max-period filtering happens here: an identifier whose idle gaps
/// outnumber its burst gaps reports the idle gap.
pub fn estimate_period(timestamps: &[f64], resolution: f64) -> Option<f64> {
    if timestamps.len() < 2 {
        return None;
    }
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for gap in gaps(timestamps) {
        *counts.entry(to_ticks(gap, resolution)).or_insert(0) += 1;
    }
    let mut best: Option<(i64, usize)> = None;
    // ascending tick order; strict > keeps the smallest tick on ties
    for (tick, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((tick, count));
        }
    }
    best.map(|(tick, _)| tick as f64 * resolution)
}
