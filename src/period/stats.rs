//! Per-identifier periodicity profile (mean/std/min/max/mode of inter-arrival gaps).

use super::gap::{estimate_period, gaps};
use crate::capture::{Event, Identifier};
use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentifierPeriodicity {
    #[serde(rename = "Identifier")]
    pub identifier: Identifier,
    pub frames: usize,
    pub mean_period: f64,
    pub std_period: f64,
    pub min_period: f64,
    pub max_period: f64,
    pub mode_period: f64,
    pub freq_hz: f64,
}

/// Arithmetic mean and sample standard deviation (n-1); std is 0 below two samples.
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if values.len() < 2 {
        return (mean, 0.0);
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, var.sqrt())
}

/// Group timestamps by identifier, each sorted ascending.
pub fn timestamps_by_identifier<'a, I>(events: I) -> BTreeMap<Identifier, Vec<f64>>
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut by_id: BTreeMap<Identifier, Vec<f64>> = BTreeMap::new();
    for e in events {
        by_id.entry(e.identifier.clone()).or_default().push(e.timestamp);
    }
    for ts in by_id.values_mut() {
        ts.sort_by(f64::total_cmp);
    }
    by_id
}

/// Profile every identifier that has at least one gap, in identifier order.
pub fn profile<'a, I>(events: I, resolution: f64) -> Vec<IdentifierPeriodicity>
where
    I: IntoIterator<Item = &'a Event>,
{
    timestamps_by_identifier(events)
        .into_iter()
        .filter_map(|(identifier, ts)| {
            let mode_period = estimate_period(&ts, resolution)?;
            let g = gaps(&ts);
            let (mean_period, std_period) = mean_std(&g);
            let min_period = g.iter().copied().fold(f64::INFINITY, f64::min);
            let max_period = g.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            Some(IdentifierPeriodicity {
                identifier,
                frames: ts.len(),
                mean_period,
                std_period,
                min_period,
                max_period,
                mode_period,
                freq_hz: if mean_period > 0.0 { 1.0 / mean_period } else { 0.0 },
            })
        })
        .collect()
}

/// Write a profile as CSV (one row per identifier).
pub fn write_profile_csv(rows: &[IdentifierPeriodicity], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush().map_err(|e| PipelineError::io(path, e))?;
    Ok(())
}
