//! Hyper-period: LCM of the quantized dominant periods of all periodic identifiers.

use super::gap::to_ticks;
use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HyperPeriod {
    pub seconds: f64,
    /// Hyper-period in resolution ticks; a multiple of every contributing tick count
    pub ticks: u64,
    pub resolution_secs: f64,
    /// Distinct contributing tick counts, ascending
    pub period_ticks: Vec<u64>,
}

impl HyperPeriod {
    /// Contributing periods in seconds
    pub fn periods(&self) -> Vec<f64> {
        self.period_ticks
            .iter()
            .map(|t| *t as f64 * self.resolution_secs)
            .collect()
    }
}

pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// Least common multiple; `None` on u64 overflow.
pub fn lcm(a: u64, b: u64) -> Option<u64> {
    if a == 0 || b == 0 {
        return Some(0);
    }
    (a / gcd(a, b)).checked_mul(b)
}

/// Combine per-identifier periods into one hyper-period.
///
/// `None` periods and periods `>= max_period` are dropped, as are periods that quantize
/// to zero ticks. The survivors are deduplicated by tick count and folded with LCM
/// starting from 1, so an empty input yields exactly `resolution`.
pub fn compute_hyper_period<I>(periods: I, resolution: f64, max_period: f64) -> Result<HyperPeriod>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let ticks: BTreeSet<u64> = periods
        .into_iter()
        .flatten()
        .filter(|p| p.is_finite() && *p < max_period)
        .map(|p| to_ticks(p, resolution))
        .filter(|t| *t > 0)
        .map(|t| t as u64)
        .collect();

    let mut acc: u64 = 1;
    for &t in &ticks {
        acc = lcm(acc, t).ok_or(PipelineError::HyperPeriodOverflow { acc, ticks: t })?;
    }

    Ok(HyperPeriod {
        seconds: acc as f64 * resolution,
        ticks: acc,
        resolution_secs: resolution,
        period_ticks: ticks.into_iter().collect(),
    })
}
