//! Fuzzy-attack onset: first window where a burst of never-seen identifiers appears.

use crate::capture::{Event, Identifier};
use crate::config::OnsetConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackOnset {
    /// Window start (seconds) or the configured default
    pub start_secs: f64,
    /// False when no window crossed the threshold and the default was used
    pub detected: bool,
    /// Novel identifiers seen in the triggering window
    pub novel_ids: usize,
}

/// Scan `[k*w, (k+1)*w)` windows in time order. A window triggers when more than
/// `novel_id_threshold` distinct identifiers in it were never seen in any earlier window.
pub fn detect_attack_onset<'a, I>(events: I, config: &OnsetConfig) -> AttackOnset
where
    I: IntoIterator<Item = &'a Event>,
{
    let mut frames: Vec<(f64, &Identifier)> = events.into_iter().map(|e| (e.timestamp, &e.identifier)).collect();
    frames.sort_by(|a, b| a.0.total_cmp(&b.0));

    let not_found = AttackOnset {
        start_secs: config.default_start_secs,
        detected: false,
        novel_ids: 0,
    };
    let Some(t_max) = frames.last().map(|f| f.0) else {
        return not_found;
    };

    let w = config.window_secs;
    let mut seen: HashSet<&Identifier> = HashSet::new();
    let mut pos = 0;
    let mut k: u64 = 0;
    loop {
        let start = k as f64 * w;
        if start >= t_max {
            break;
        }
        let end = start + w;
        let mut novel: HashSet<&Identifier> = HashSet::new();
        let mut in_window: Vec<&Identifier> = Vec::new();
        while pos < frames.len() && frames[pos].0 < end {
            let id = frames[pos].1;
            if !seen.contains(id) {
                novel.insert(id);
            }
            in_window.push(id);
            pos += 1;
        }
        if novel.len() > config.novel_id_threshold {
            return AttackOnset {
                start_secs: start,
                detected: true,
                novel_ids: novel.len(),
            };
        }
        seen.extend(in_window);
        k += 1;
    }
    not_found
}
